//! # Bulb
//!
//! The light bulb decider: a small state machine with a terminal state.
//!
//! A socket starts empty. A bulb is fitted with a rated number of
//! switch-ons, lights up and goes dark on command, and blows the moment
//! it is switched on with no uses left. `Blown` is terminal: no rule
//! matches there, so further commands decide nothing.
//!
//! ## Example
//!
//! ```
//! use bulb::{decider, BulbCommand, BulbEvent};
//! use decider_core::InMemory;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let bulb = InMemory::new(decider()?);
//!
//! bulb.execute(&BulbCommand::Fit { max_uses: 5 })?;
//! let events = bulb.execute(&BulbCommand::SwitchOn)?;
//! assert_eq!(events, vec![BulbEvent::SwitchedOn]);
//! # Ok(())
//! # }
//! ```

use decider_core::error::BuildError;
use decider_core::{Decider, DeciderBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commands a bulb socket accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BulbCommand {
    /// Fit a bulb rated for this many switch-ons.
    Fit {
        /// Switch-ons before the bulb blows.
        max_uses: u32,
    },
    /// Switch the bulb on.
    SwitchOn,
    /// Switch the bulb off.
    SwitchOff,
}

/// Events a bulb socket records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BulbEvent {
    /// A bulb was fitted.
    Fitted {
        /// Switch-ons before the bulb blows.
        max_uses: u32,
    },
    /// The bulb lit up.
    SwitchedOn,
    /// The bulb went dark.
    SwitchedOff,
    /// The bulb burned out.
    Blew,
}

/// Whether a working bulb is currently lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Lit.
    On,
    /// Dark.
    Off,
}

/// The lifecycle of a bulb socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BulbState {
    /// The socket is empty.
    NotFitted,
    /// A live bulb sits in the socket.
    Working {
        /// Lit or dark.
        status: Status,
        /// Switch-ons left before the bulb blows.
        remaining_uses: u32,
    },
    /// The bulb burned out. Terminal.
    Blown,
}

/// Rejection for fitting a socket that already holds a bulb.
#[derive(Debug, Error)]
#[error("bulb has already been fitted")]
pub struct AlreadyFitted;

/// Builds the bulb decider.
///
/// # Errors
///
/// Never fails in practice: the rules define exactly one initial state.
pub fn decider() -> Result<Decider<BulbCommand, BulbState, BulbEvent>, BuildError> {
    DeciderBuilder::new()
        .initial_state(BulbState::NotFitted)
        .decide_on_pair(
            &BulbCommand::Fit { max_uses: 0 },
            &BulbState::NotFitted,
            |command, _| {
                let BulbCommand::Fit { max_uses } = command else {
                    return Ok(Vec::new());
                };
                Ok(vec![BulbEvent::Fitted {
                    max_uses: *max_uses,
                }])
            },
        )
        .decide_on(&BulbCommand::Fit { max_uses: 0 }, |_, _| {
            Err(AlreadyFitted.into())
        })
        .decide_when(
            |command, state| {
                matches!(command, BulbCommand::SwitchOn)
                    && matches!(
                        state,
                        BulbState::Working {
                            status: Status::Off,
                            remaining_uses: 0,
                        }
                    )
            },
            |_, _| Ok(vec![BulbEvent::Blew]),
        )
        .decide_when(
            |command, state| {
                matches!(command, BulbCommand::SwitchOn)
                    && matches!(
                        state,
                        BulbState::Working {
                            status: Status::Off,
                            ..
                        }
                    )
            },
            |_, _| Ok(vec![BulbEvent::SwitchedOn]),
        )
        .decide_when(
            |command, state| {
                matches!(command, BulbCommand::SwitchOff)
                    && matches!(
                        state,
                        BulbState::Working {
                            status: Status::On,
                            ..
                        }
                    )
            },
            |_, _| Ok(vec![BulbEvent::SwitchedOff]),
        )
        .evolve_on(&BulbEvent::Fitted { max_uses: 0 }, |state, event| {
            let BulbEvent::Fitted { max_uses } = event else {
                return state.clone();
            };
            BulbState::Working {
                status: Status::Off,
                remaining_uses: *max_uses,
            }
        })
        .evolve_on(&BulbEvent::SwitchedOn, |state, _| {
            let BulbState::Working { remaining_uses, .. } = state else {
                return state.clone();
            };
            BulbState::Working {
                status: Status::On,
                remaining_uses: remaining_uses.saturating_sub(1),
            }
        })
        .evolve_on(&BulbEvent::SwitchedOff, |state, _| {
            let BulbState::Working { remaining_uses, .. } = state else {
                return state.clone();
            };
            BulbState::Working {
                status: Status::Off,
                remaining_uses: *remaining_uses,
            }
        })
        .evolve_on(&BulbEvent::Blew, |_, _| BulbState::Blown)
        .terminal_when(|state| matches!(state, BulbState::Blown))
        .build()
}
