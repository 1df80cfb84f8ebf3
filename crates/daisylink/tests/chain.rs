use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use daisylink::frame::{decode_frame, encode_frame, TERMINATOR};
use daisylink::{
    names, Address, Channel, MemoryChannel, Message, PayloadValue, ProtocolConfig, Transport,
    TransportConfig,
};

fn frame(body: &[u8]) -> Vec<u8> {
    let mut wire = BytesMut::new();
    encode_frame(body, &mut wire);
    wire.to_vec()
}

/// Collect bytes from `channel` until `done` accepts them or a second passes.
async fn collect_until(channel: &MemoryChannel, done: impl Fn(&[u8]) -> bool) -> Vec<u8> {
    let mut collected = Vec::new();
    for _ in 0..200 {
        let mut chunk = vec![0u8; channel.bytes_available()];
        let n = channel.read_into(&mut chunk).unwrap();
        collected.extend_from_slice(&chunk[..n]);
        if done(&collected) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    collected
}

fn segments(wire: &[u8]) -> Vec<&[u8]> {
    wire.split(|&b| b == TERMINATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}

#[tokio::test]
async fn concurrent_producers_keep_frames_whole() {
    let protocol = Arc::new(ProtocolConfig::standard());
    let (near, far) = MemoryChannel::pair();
    let transport = Transport::new(near, protocol);

    let mut producers = Vec::new();
    for producer in ["alpha", "bravo"] {
        let sender = transport.sender();
        producers.push(tokio::spawn(async move {
            for i in 0..20 {
                let text = format!("{producer}-{i:02}-{}", "x".repeat(40));
                sender
                    .send(&Message::new(Address::CORE, names::LOG, text))
                    .await
                    .unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }
    for producer in producers {
        producer.await.unwrap();
    }

    let wire = collect_until(&far, |wire| segments(wire).len() >= 40).await;
    let bodies: Vec<_> = segments(&wire)
        .into_iter()
        .map(|segment| decode_frame(segment).expect("every segment verifies"))
        .collect();
    assert_eq!(bodies.len(), 40);

    let protocol = ProtocolConfig::standard();
    for producer in ["alpha", "bravo"] {
        let texts: Vec<String> = bodies
            .iter()
            .map(|body| Message::decode_body(body, &protocol).unwrap())
            .filter_map(|message| match message.payload {
                PayloadValue::Text(text) if text.starts_with(producer) => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(texts.len(), 20);
        assert!(texts.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[tokio::test]
async fn relay_forwards_bytes_unchanged() {
    let protocol = Arc::new(ProtocolConfig::standard());
    let (up, head) = MemoryChannel::pair();
    let (down, tail) = MemoryChannel::pair();
    let mut upstream = Transport::new(up, Arc::clone(&protocol));
    let mut downstream = Transport::new(down, protocol);
    upstream.attach_relay(&mut downstream);

    let mut pushed = frame(b"\x01\x02\x06\x05");
    pushed.extend_from_slice(&[0x13, 0x37, 0x00, 0x00]);
    pushed.extend_from_slice(&frame(b"\xFE\x08tail says hi"));
    tail.write(&pushed).unwrap();

    let relayed = collect_until(&head, |wire| wire.len() >= pushed.len()).await;
    assert_eq!(relayed, pushed);
}

#[tokio::test]
async fn unaligned_relay_forwards_partial_frames() {
    let protocol = Arc::new(ProtocolConfig::standard());
    let config = TransportConfig {
        relay_frame_aligned: false,
        ..TransportConfig::default()
    };
    let (up, head) = MemoryChannel::pair();
    let (down, tail) = MemoryChannel::pair();
    let mut upstream = Transport::with_config(up, Arc::clone(&protocol), config.clone());
    let mut downstream = Transport::with_config(down, protocol, config);
    upstream.attach_relay(&mut downstream);

    let pushed: Vec<u8> = (1..=200u8).collect();
    tail.write(&pushed).unwrap();

    let relayed = collect_until(&head, |wire| wire.len() >= pushed.len()).await;
    assert_eq!(relayed, pushed);
}

#[tokio::test]
async fn relayed_and_local_frames_share_the_upstream_link() {
    let protocol = Arc::new(ProtocolConfig::standard());
    let (head_end, up) = MemoryChannel::pair();
    let (down, tail_end) = MemoryChannel::pair();
    let mut head = Transport::new(head_end, Arc::clone(&protocol));
    let mut upstream = Transport::new(up, Arc::clone(&protocol));
    let mut downstream = Transport::new(down, Arc::clone(&protocol));
    let tail = Transport::new(tail_end, protocol);

    upstream.attach_relay(&mut downstream);

    let remote = Message::new(Address::CORE, names::NEW_SAT, "02");
    let local = Message::new(Address::CORE, names::STATUS, vec![3.0, 1.0]);
    tail.send(&remote).await.unwrap();
    upstream.send(&local).await.unwrap();

    let mut received = Vec::new();
    for _ in 0..2 {
        let message = tokio::time::timeout(Duration::from_secs(1), head.recv())
            .await
            .expect("message arrives")
            .expect("transport running");
        received.push(message);
    }
    assert!(received.contains(&remote));
    assert!(received.contains(&local));
    assert!(downstream.receive().is_none());
}

#[tokio::test]
async fn buffered_bytes_follow_the_relay() {
    let protocol = Arc::new(ProtocolConfig::standard());
    let (up, head) = MemoryChannel::pair();
    let (down, tail) = MemoryChannel::pair();
    let mut upstream = Transport::new(up, Arc::clone(&protocol));
    let mut downstream = Transport::new(down, protocol);

    let wire = frame(b"\xFF\x08late");
    let (first, rest) = wire.split_at(3);
    tail.write(first).unwrap();
    assert!(downstream.receive().is_none());

    upstream.attach_relay(&mut downstream);
    tail.write(rest).unwrap();

    let relayed = collect_until(&head, |got| got.len() >= wire.len()).await;
    assert_eq!(relayed, wire);
}

#[tokio::test]
async fn heartbeat_reports_relay_liveness() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let protocol = Arc::new(ProtocolConfig::standard());
    let (up, _head) = MemoryChannel::pair();
    let (down, _tail) = MemoryChannel::pair();
    let mut upstream = Transport::new(up, Arc::clone(&protocol));
    let mut downstream = Transport::new(down, protocol);

    let beats = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&beats);
    upstream.attach_relay_with_heartbeat(&mut downstream, move || {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    tokio::time::sleep(Duration::from_millis(30)).await;
    let seen = beats.load(Ordering::Relaxed);
    assert!(seen > 0);

    upstream.shutdown().await;
    let after = beats.load(Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(beats.load(Ordering::Relaxed), after);
}
