//! Bulb demo binary.
//!
//! Fits a bulb, burns through its rated uses, and shows the blow and
//! the terminal state that follows.

use bulb::{decider, BulbCommand};
use decider_core::InMemory;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulb=debug,decider_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bulb = InMemory::new(decider()?);

    println!("=== Bulb: a decider with a terminal state ===\n");

    println!(">>> Fit {{ max_uses: 2 }}");
    let events = bulb.execute(&BulbCommand::Fit { max_uses: 2 })?;
    println!("    events: {events:?}");

    for _ in 0..2 {
        println!(">>> SwitchOn");
        let events = bulb.execute(&BulbCommand::SwitchOn)?;
        println!("    events: {events:?}");

        println!(">>> SwitchOff");
        let events = bulb.execute(&BulbCommand::SwitchOff)?;
        println!("    events: {events:?}");
    }

    // Both rated uses are spent; the next switch-on blows the bulb.
    println!(">>> SwitchOn");
    let events = bulb.execute(&BulbCommand::SwitchOn)?;
    println!("    events: {events:?}");

    println!("\nfinal state: {:?}", bulb.state());
    tracing::info!(state = ?bulb.state(), "walkthrough complete");

    // Fitting a socket that held a bulb is a domain rejection.
    println!("\n>>> Fit {{ max_uses: 5 }}");
    match bulb.execute(&BulbCommand::Fit { max_uses: 5 }) {
        Ok(events) => println!("    events: {events:?}"),
        Err(error) => println!("    rejected: {error}"),
    }

    Ok(())
}
