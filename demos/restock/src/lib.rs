//! # Restock
//!
//! A supply chain workflow assembled from two small deciders:
//!
//! - [`inventory`] tracks on-hand stock of a single SKU and flags low
//!   stock after a shipment
//! - [`purchasing`] keeps the book of open supplier orders
//!
//! [`supply_chain`] runs a keyed fleet of inventories next to the order
//! book. [`workflow`] closes the loop with a reactor that answers every
//! low-stock flag with a reorder command, so one `Ship` command can come
//! back as `Shipped`, `StockLow` and `OrderPlaced` in a single batch:
//!
//! ```
//! use decider_core::Sum;
//! use restock::inventory::{InventoryCommand, InventoryEvent};
//! use restock::purchasing::{PurchasingEvent, REORDER_QUANTITY};
//! use restock::{workflow, Sku};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let workflow = workflow()?;
//! let beans = Sku::new("coffee-beans");
//!
//! let received = workflow.decide(
//!     &Sum::Left((beans.clone(), InventoryCommand::Receive { quantity: 10 })),
//!     workflow.initial_state(),
//! )?;
//! let stocked = workflow.fold(workflow.initial_state().clone(), &received);
//!
//! let events = workflow.decide(
//!     &Sum::Left((beans.clone(), InventoryCommand::Ship { quantity: 6 })),
//!     &stocked,
//! )?;
//! assert_eq!(
//!     events,
//!     vec![
//!         Sum::Left((beans.clone(), InventoryEvent::Shipped { quantity: 6 })),
//!         Sum::Left((beans.clone(), InventoryEvent::StockLow { on_hand: 4 })),
//!         Sum::Right(PurchasingEvent::OrderPlaced {
//!             sku: beans,
//!             quantity: REORDER_QUANTITY,
//!         }),
//!     ],
//! );
//! # Ok(())
//! # }
//! ```

pub mod inventory;
pub mod purchasing;

use decider_core::error::BuildError;
use decider_core::{Decider, Pair, Reactor, ReactorBuilder, Sum, View, ViewBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use inventory::{InventoryCommand, InventoryEvent, InventoryState};
use purchasing::{PurchasingCommand, PurchasingEvent, PurchasingState, REORDER_QUANTITY};

/// A stock-keeping unit: the key the inventory fleet is addressed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(String);

impl Sku {
    /// Wraps a SKU code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A command addressed to either side of the supply chain.
pub type SupplyChainCommand = Sum<(Sku, InventoryCommand), PurchasingCommand>;

/// An event recorded by either side of the supply chain.
pub type SupplyChainEvent = Sum<(Sku, InventoryEvent), PurchasingEvent>;

/// Per-SKU stock levels paired with the order book.
pub type SupplyChainState = Pair<HashMap<Sku, InventoryState>, PurchasingState>;

/// The supply chain without the reorder loop: a keyed fleet of
/// inventories composed with the order book. Low-stock events are
/// recorded but answered by nobody.
///
/// # Errors
///
/// Never fails in practice: both halves define exactly one initial state.
pub fn supply_chain(
) -> Result<Decider<SupplyChainCommand, SupplyChainState, SupplyChainEvent>, BuildError> {
    Ok(inventory::decider()?
        .many::<Sku>()
        .compose(purchasing::decider()?))
}

/// Answers every low-stock flag with an order for
/// [`REORDER_QUANTITY`] units of the flagged SKU.
#[must_use]
pub fn reorder_reactor() -> Reactor<SupplyChainEvent, SupplyChainCommand> {
    ReactorBuilder::new()
        .react_when(
            |event: &SupplyChainEvent| {
                matches!(event, Sum::Left((_, InventoryEvent::StockLow { .. })))
            },
            |event| {
                let Sum::Left((sku, InventoryEvent::StockLow { .. })) = event else {
                    return Vec::new();
                };
                vec![Sum::Right(PurchasingCommand::PlaceOrder {
                    sku: sku.clone(),
                    quantity: REORDER_QUANTITY,
                })]
            },
        )
        .build()
}

/// The full workflow: [`supply_chain`] with the reorder loop closed by
/// [`reorder_reactor`].
///
/// # Errors
///
/// Never fails in practice: both halves define exactly one initial state.
pub fn workflow(
) -> Result<Decider<SupplyChainCommand, SupplyChainState, SupplyChainEvent>, BuildError> {
    Ok(reorder_reactor().combine_with_decider(supply_chain()?))
}

/// Read model of on-hand units per SKU, folded straight from the
/// supply chain journal.
///
/// # Errors
///
/// Never fails in practice: the view defines exactly one initial state.
pub fn on_hand_view() -> Result<View<HashMap<Sku, u32>, SupplyChainEvent>, BuildError> {
    // Variant dispatch cannot see through the Sum tag into the inner
    // inventory event, so these rules match by predicate.
    ViewBuilder::new()
        .initial_state(HashMap::new())
        .evolve_when(
            |_, event: &SupplyChainEvent| {
                matches!(event, Sum::Left((_, InventoryEvent::Received { .. })))
            },
            |levels: &HashMap<Sku, u32>, event| {
                let Sum::Left((sku, InventoryEvent::Received { quantity })) = event else {
                    return levels.clone();
                };
                let mut next = levels.clone();
                *next.entry(sku.clone()).or_insert(0) += quantity;
                next
            },
        )
        .evolve_when(
            |_, event: &SupplyChainEvent| {
                matches!(event, Sum::Left((_, InventoryEvent::Shipped { .. })))
            },
            |levels: &HashMap<Sku, u32>, event| {
                let Sum::Left((sku, InventoryEvent::Shipped { quantity })) = event else {
                    return levels.clone();
                };
                let mut next = levels.clone();
                let level = next.entry(sku.clone()).or_insert(0);
                *level = level.saturating_sub(*quantity);
                next
            },
        )
        .build()
}
