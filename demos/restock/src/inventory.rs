//! Stock of a single SKU.
//!
//! The decider here knows nothing about suppliers or order books. It
//! tracks one number and raises [`InventoryEvent::StockLow`] when a
//! shipment drops it below the reorder point. The rest of the
//! workflow is wired up in the crate root.

use decider_core::error::BuildError;
use decider_core::{Decider, DeciderBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// On-hand quantity below which a shipment raises a low-stock event.
pub const REORDER_POINT: u32 = 5;

/// Commands against one SKU's stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InventoryCommand {
    /// Book delivered units into the warehouse.
    Receive {
        /// Units received.
        quantity: u32,
    },
    /// Ship units out of the warehouse.
    Ship {
        /// Units to ship.
        quantity: u32,
    },
}

/// Events recorded against one SKU's stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InventoryEvent {
    /// Units arrived.
    Received {
        /// Units received.
        quantity: u32,
    },
    /// Units left.
    Shipped {
        /// Units shipped.
        quantity: u32,
    },
    /// The last shipment left the stock below the reorder point.
    StockLow {
        /// Units still on hand.
        on_hand: u32,
    },
}

/// Stock level of one SKU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryState {
    /// Units on hand.
    pub on_hand: u32,
}

/// Rejection raised when a shipment asks for more than is on hand.
#[derive(Debug, Error)]
#[error("not enough stock on hand")]
pub struct OutOfStock;

/// Builds the single-SKU inventory decider.
///
/// Receiving always succeeds. Shipping more than is on hand is
/// rejected with [`OutOfStock`]; otherwise `Shipped` is emitted,
/// followed by `StockLow` when the new level sits below
/// [`REORDER_POINT`].
///
/// # Errors
///
/// Never fails in practice: the rules define exactly one initial state.
pub fn decider() -> Result<Decider<InventoryCommand, InventoryState, InventoryEvent>, BuildError> {
    DeciderBuilder::new()
        .initial_state(InventoryState::default())
        .decide_on(&InventoryCommand::Receive { quantity: 0 }, |command, _| {
            let InventoryCommand::Receive { quantity } = command else {
                return Ok(Vec::new());
            };
            Ok(vec![InventoryEvent::Received {
                quantity: *quantity,
            }])
        })
        .decide_on(
            &InventoryCommand::Ship { quantity: 0 },
            |command, state: &InventoryState| {
                let InventoryCommand::Ship { quantity } = command else {
                    return Ok(Vec::new());
                };
                let Some(remaining) = state.on_hand.checked_sub(*quantity) else {
                    return Err(OutOfStock.into());
                };
                let mut events = vec![InventoryEvent::Shipped {
                    quantity: *quantity,
                }];
                if remaining < REORDER_POINT {
                    events.push(InventoryEvent::StockLow { on_hand: remaining });
                }
                Ok(events)
            },
        )
        .evolve_any(|state: &InventoryState, event| match event {
            InventoryEvent::Received { quantity } => InventoryState {
                on_hand: state.on_hand + quantity,
            },
            InventoryEvent::Shipped { quantity } => InventoryState {
                on_hand: state.on_hand.saturating_sub(*quantity),
            },
            InventoryEvent::StockLow { .. } => state.clone(),
        })
        .build()
}
