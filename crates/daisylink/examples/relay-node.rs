//! A middle node of a three-device chain.
//!
//! The tail device sends a status report; the middle node relays it
//! upstream untouched while sending its own heartbeat log lines on the same
//! link. The head prints everything it receives.
//!
//! Run with:
//!   cargo run -p daisylink --example relay-node --features logging

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use daisylink::logging::{self, LogFormat, LogLevel};
use daisylink::{names, Address, MemoryChannel, Message, ProtocolConfig, Transport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging(LogFormat::Text, LogLevel::Info);

    let protocol = Arc::new(ProtocolConfig::standard());
    let (head_end, middle_up) = MemoryChannel::pair();
    let (middle_down, tail_end) = MemoryChannel::pair();

    let mut head = Transport::new(head_end, Arc::clone(&protocol));
    let mut upstream = Transport::new(middle_up, Arc::clone(&protocol));
    let mut downstream = Transport::new(middle_down, Arc::clone(&protocol));
    let tail = Transport::new(tail_end, protocol);

    let beats = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&beats);
    upstream.attach_relay_with_heartbeat(&mut downstream, move || {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    let local = upstream.sender();
    let producer = tokio::spawn(async move {
        for i in 0..3 {
            let line = format!("middle node alive #{i}");
            if let Err(err) = local.send(&Message::new(Address::CORE, names::LOG, line)).await {
                eprintln!("send failed: {err}");
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    });

    tail.send(&Message::new(Address::CORE, names::STATUS, vec![1.0, 0.0, 200.0]))
        .await?;
    tail.send(&Message::new(Address::CORE, names::POWER, vec![5.0, 3.3, 0.25]))
        .await?;

    let mut received = 0;
    while received < 5 {
        match tokio::time::timeout(Duration::from_millis(500), head.recv()).await {
            Ok(Some(message)) => {
                eprintln!("head received {message}");
                if let (names::POWER, Some([v1, v2, amps])) =
                    (message.command.as_str(), message.payload.as_numbers())
                {
                    eprintln!("tail power: {v1} V / {v2} V at {amps} A");
                }
                received += 1;
            }
            _ => break,
        }
    }

    producer.await?;
    eprintln!("relay heartbeats: {}", beats.load(Ordering::Relaxed));

    upstream.shutdown().await;
    downstream.shutdown().await;
    head.shutdown().await;
    tail.shutdown().await;
    Ok(())
}
