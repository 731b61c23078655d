//! Gift Ledger demo binary.
//!
//! Loads config, wires the in-memory ledger and room broadcaster into a
//! coordinator, and runs one end-to-end gift transaction.

use std::sync::Arc;

use tracing::info;

use gift_ledger::{
    AppConfig, GiftCoordinator, Identity, MemoryLedger, RoomBroadcaster, RoomId,
    logging::init_logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "default".to_string());
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    let ledger = Arc::new(MemoryLedger::new(
        config.level.clone(),
        config.economy.starting_diamonds,
        config.economy.starting_coins,
    ));
    let gateway = Arc::new(RoomBroadcaster::new());
    let coordinator = GiftCoordinator::new(ledger.clone(), gateway.clone(), config.economy.clone());

    let sender = Identity::from("demo_sender");
    let receiver = Identity::from("demo_host");
    coordinator.register(&sender).await?;
    coordinator.register(&receiver).await?;

    let room = RoomId::from("room-101");
    let mut room_rx = gateway.subscribe(&room);

    let result = coordinator
        .send_gift_by_name(&sender, &receiver, "Teddy Bear", 2, &room)
        .await?;
    info!(
        sender_diamonds = result.sender_diamonds,
        receiver_coins = result.receiver_coins,
        receiver_level = result.receiver_level,
        leveled_up = result.leveled_up,
        "Demo gift delivered"
    );

    if let Ok(event) = room_rx.try_recv() {
        println!("room event: {}", serde_json::to_string_pretty(&event)?);
    }
    println!(
        "sender: {} diamonds | receiver: {} coins, level {} ({})",
        result.sender_diamonds,
        result.receiver_coins,
        result.receiver_level,
        result.receiver_theme.theme_name(),
    );

    for record in ledger.audit_records() {
        println!("audit: {}", record);
    }

    Ok(())
}
