//! The order book shared by the whole warehouse.

use decider_core::error::BuildError;
use decider_core::{Decider, DeciderBuilder};
use serde::{Deserialize, Serialize};

use crate::Sku;

/// Units requested per automatic reorder.
pub const REORDER_QUANTITY: u32 = 10;

/// Commands against the order book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PurchasingCommand {
    /// Order units from the supplier.
    PlaceOrder {
        /// What to order.
        sku: Sku,
        /// Units to order.
        quantity: u32,
    },
}

/// Events recorded in the order book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PurchasingEvent {
    /// An order went out to the supplier.
    OrderPlaced {
        /// What was ordered.
        sku: Sku,
        /// Units ordered.
        quantity: u32,
    },
}

/// An order that has not been fulfilled yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    /// What was ordered.
    pub sku: Sku,
    /// Units ordered.
    pub quantity: u32,
}

/// Orders currently out with suppliers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchasingState {
    /// Orders placed and not yet fulfilled.
    pub open_orders: Vec<PurchaseOrder>,
}

/// Builds the purchasing decider. Placing an order always succeeds.
///
/// # Errors
///
/// Never fails in practice: the rules define exactly one initial state.
pub fn decider() -> Result<Decider<PurchasingCommand, PurchasingState, PurchasingEvent>, BuildError>
{
    DeciderBuilder::new()
        .initial_state(PurchasingState::default())
        .decide_any(|command: &PurchasingCommand, _| {
            let PurchasingCommand::PlaceOrder { sku, quantity } = command;
            Ok(vec![PurchasingEvent::OrderPlaced {
                sku: sku.clone(),
                quantity: *quantity,
            }])
        })
        .evolve_any(|state: &PurchasingState, event| {
            let PurchasingEvent::OrderPlaced { sku, quantity } = event;
            let mut next = state.clone();
            next.open_orders.push(PurchaseOrder {
                sku: sku.clone(),
                quantity: *quantity,
            });
            next
        })
        .build()
}
