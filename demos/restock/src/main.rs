//! Walkthrough of the restock workflow against the in-memory driver.

use decider_core::{InMemory, Sum};
use restock::inventory::InventoryCommand;
use restock::{on_hand_view, workflow, Sku};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restock=debug,decider_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let warehouse = InMemory::new(workflow()?);
    let beans = Sku::new("coffee-beans");
    let mut journal = Vec::new();

    println!(">>> Receiving 10 units of {beans}");
    let events = warehouse.execute(&Sum::Left((
        beans.clone(),
        InventoryCommand::Receive { quantity: 10 },
    )))?;
    for event in &events {
        println!("    {event:?}");
    }
    journal.extend(events);

    println!(">>> Shipping 6 units, dropping the stock below the reorder point");
    let events = warehouse.execute(&Sum::Left((
        beans.clone(),
        InventoryCommand::Ship { quantity: 6 },
    )))?;
    for event in &events {
        println!("    {event:?}");
    }
    journal.extend(events);

    println!(">>> Shipping 99 units");
    let oversized = warehouse.execute(&Sum::Left((
        beans.clone(),
        InventoryCommand::Ship { quantity: 99 },
    )));
    match oversized {
        Ok(events) => println!("    unexpectedly accepted: {events:?}"),
        Err(error) => println!("    rejected: {error}"),
    }

    let view = on_hand_view()?;
    let levels = view.fold(view.initial_state().clone(), &journal);
    println!(">>> On-hand view: {levels:?}");

    tracing::info!(state = ?warehouse.state(), "walkthrough complete");

    Ok(())
}
