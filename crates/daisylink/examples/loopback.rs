//! Two transports talking over an in-memory link.
//!
//! Run with:
//!   DAISYLINK_LOG=debug cargo run -p daisylink --example loopback --features logging

use std::sync::Arc;
use std::time::Duration;

use daisylink::logging;
use daisylink::{names, Address, MemoryChannel, Message, ProtocolConfig, Transport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_from_env();

    let protocol = Arc::new(ProtocolConfig::standard());
    let (core_end, sat_end) = MemoryChannel::pair();
    let core = Transport::new(core_end, Arc::clone(&protocol));
    let mut satellite = Transport::new(sat_end, protocol);

    let outbound = [
        Message::new(Address::Broadcast, names::ID_ASSIGN, "0100"),
        Message::new("0101".parse()?, names::LED, vec![255.0, 64.0, 0.0, 128.0]),
        Message::new(Address::SAT, names::SYNC_FRAME, vec![42.0, 1.75]),
        Message::new(Address::CORE, names::PING, ""),
    ];
    for message in &outbound {
        core.send(message).await?;
    }

    for _ in 0..outbound.len() {
        match tokio::time::timeout(Duration::from_secs(1), satellite.recv()).await {
            Ok(Some(message)) => {
                let scope = if message.destination.is_broadcast() {
                    "broadcast"
                } else {
                    "direct"
                };
                eprintln!("satellite received {scope} {message}");
                if message.command == names::ID_ASSIGN {
                    if let Some(id) = message.payload.as_text() {
                        eprintln!("satellite now answers to {id}");
                    }
                }
            }
            _ => {
                eprintln!("timed out waiting for a message");
                break;
            }
        }
    }

    core.shutdown().await;
    satellite.shutdown().await;
    Ok(())
}
