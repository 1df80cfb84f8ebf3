use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use daisylink::frame::{decode_frame, encode_frame, FrameError};
use daisylink::protocol::{CommandTable, EncodingKind, Schema, SchemaTable};
use daisylink::transport::TransportError;
use daisylink::{
    names, Address, Channel, MemoryChannel, Message, PayloadValue, ProtocolConfig, Transport,
    TransportConfig,
};

fn led_protocol() -> Arc<ProtocolConfig> {
    let mut schemas = SchemaTable::standard();
    schemas.insert(
        names::LED,
        Schema::new(EncodingKind::NumericBytes, "R,G,B,brightness,mode").with_count(5),
    );
    Arc::new(ProtocolConfig::new(CommandTable::standard(), schemas).unwrap())
}

fn wire_for(message: &Message, protocol: &ProtocolConfig) -> Vec<u8> {
    let body = message.to_body(protocol).unwrap();
    let mut wire = BytesMut::new();
    encode_frame(&body, &mut wire);
    wire.to_vec()
}

fn read_all(channel: &MemoryChannel) -> Vec<u8> {
    let mut out = vec![0u8; channel.bytes_available()];
    let n = channel.read_into(&mut out).unwrap();
    out.truncate(n);
    out
}

async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
}

#[tokio::test]
async fn led_message_wire_bytes() {
    let protocol = led_protocol();
    let (near, far) = MemoryChannel::pair();
    let transport = Transport::new(near, Arc::clone(&protocol));

    let message = Message::new(
        "0101".parse().unwrap(),
        names::LED,
        vec![0.0, 11.0, 0.0, 100.0, 2.0],
    );
    transport.send(&message).await.unwrap();
    settle().await;

    let wire = read_all(&far);
    assert_eq!(
        wire,
        vec![0x04, 0x01, 0x01, 0x10, 0x02, 0x0B, 0x04, 0x64, 0x02, 0x77, 0x00]
    );

    let body = decode_frame(&wire[..wire.len() - 1]).unwrap();
    assert_eq!(
        body.as_ref(),
        &[0x01, 0x01, 0x10, 0x00, 0x0B, 0x00, 0x64, 0x02]
    );
    assert_eq!(Message::decode_body(&body, &protocol).unwrap(), message);
}

#[tokio::test]
async fn led_message_round_trips_between_transports() {
    let protocol = led_protocol();
    let (a, b) = MemoryChannel::pair();
    let sender = Transport::new(a, Arc::clone(&protocol));
    let mut receiver = Transport::new(b, protocol);

    let message = Message::new(Address::device(1, 1).unwrap(), names::LED, vec![0.0, 11.0, 0.0, 100.0, 2.0]);
    sender.send(&message).await.unwrap();
    settle().await;
    assert_eq!(receiver.receive(), Some(message));
}

#[test]
fn led_count_is_enforced() {
    let protocol = led_protocol();
    let message = Message::new(Address::device(1, 1).unwrap(), names::LED, vec![0.0, 11.0]);
    let err = message.to_body(&protocol).unwrap_err();
    assert!(err.to_string().contains("LED"));
}

#[tokio::test]
async fn identifier_payload_keeps_leading_zero() {
    let protocol = Arc::new(ProtocolConfig::standard());
    let (a, b) = MemoryChannel::pair();
    let sender = Transport::new(a, Arc::clone(&protocol));
    let mut receiver = Transport::new(b, protocol);

    let message = Message::new(Address::device(1, 0).unwrap(), names::ID_ASSIGN, "01");
    sender.send(&message).await.unwrap();
    settle().await;

    let received = receiver.receive().unwrap();
    assert_eq!(received.payload, PayloadValue::Text("01".to_owned()));
}

#[test]
fn schemaless_identifier_loses_its_leading_zero() {
    // PING has no schema, so the payload goes through the heuristic path.
    let protocol = ProtocolConfig::standard();
    let message = Message::new(Address::Broadcast, names::PING, "01");
    let body = message.to_body(&protocol).unwrap();
    assert_eq!(body.as_ref(), &[0xFF, 0x01, 0x01]);

    let decoded = Message::decode_body(&body, &protocol).unwrap();
    assert_eq!(decoded.payload, PayloadValue::Numbers(vec![1.0]));
}

#[test]
fn schemaless_payload_guesses() {
    let protocol = ProtocolConfig::standard();
    for (sent, expected) in [
        ("hello", PayloadValue::from("hello")),
        ("1,2,300", PayloadValue::from("1,2,300")),
        ("7,8", PayloadValue::Numbers(vec![7.0, 8.0])),
        ("", PayloadValue::from("")),
    ] {
        let body = Message::new(Address::Broadcast, names::ACK, sent)
            .to_body(&protocol)
            .unwrap();
        let decoded = Message::decode_body(&body, &protocol).unwrap();
        assert_eq!(decoded.payload, expected, "payload {sent:?}");
    }
}

#[test]
fn every_schema_kind_round_trips() {
    let protocol = ProtocolConfig::standard();
    let cases = [
        Message::new(Address::SAT, names::LOG, "motor 2 stalled"),
        Message::new(Address::SAT, names::STATUS, vec![0.0, 1.0, 254.0, 255.0]),
        Message::new(Address::DRIV, names::SETENC, vec![-32768.0, -1.0, 0.0, 32767.0]),
        Message::new(Address::CORE, names::POWER, vec![12.5, -0.25, 3.0]),
        Message::new(
            Address::device(2, 7).unwrap(),
            names::FILE_CHUNK,
            Bytes::from_static(&[0x00, 0x00, 0xFF, 0x00, 0x7E]),
        ),
    ];

    for message in cases {
        let wire = wire_for(&message, &protocol);
        let body = decode_frame(&wire[..wire.len() - 1]).unwrap();
        assert_eq!(
            Message::decode_body(&body, &protocol).unwrap(),
            message,
            "command {}",
            message.command
        );
    }
}

#[tokio::test]
async fn corrupted_frame_is_discarded() {
    let protocol = led_protocol();
    let (near, _far) = MemoryChannel::pair();
    let mut transport = Transport::new(near, Arc::clone(&protocol));

    let message = Message::new(Address::device(1, 1).unwrap(), names::LED, vec![0.0, 11.0, 0.0, 100.0, 2.0]);
    let mut wire = wire_for(&message, &protocol);
    assert_eq!(wire[7], 0x64);
    wire[7] ^= 0x01;

    transport.channel().inject(&wire);
    assert_eq!(transport.receive(), None);
    assert_eq!(transport.receive(), None);
}

#[tokio::test]
async fn corrupted_frame_does_not_hide_the_next_one() {
    let protocol = Arc::new(ProtocolConfig::standard());
    let (near, _far) = MemoryChannel::pair();
    let mut transport = Transport::new(near, Arc::clone(&protocol));

    let first = Message::new(Address::Broadcast, names::MODE, "ACTIVE");
    let second = Message::new(Address::Broadcast, names::MODE, "SLEEP");
    let mut bad = wire_for(&first, &protocol);
    bad[3] ^= 0x40;
    transport.channel().inject(&bad);
    transport.channel().inject(&wire_for(&second, &protocol));

    assert_eq!(transport.receive(), Some(second));
    assert_eq!(transport.receive(), None);
}

#[tokio::test]
async fn overflow_clears_buffer_and_recovers() {
    let protocol = Arc::new(ProtocolConfig::standard());
    let (near, _far) = MemoryChannel::pair();
    let mut config = TransportConfig::default();
    config.frame.buffer_capacity = 16;
    let mut transport = Transport::with_config(near, Arc::clone(&protocol), config);

    transport.channel().inject(&[0xAB; 16]);
    assert!(matches!(
        transport.try_receive(),
        Err(TransportError::Frame(FrameError::BufferOverflow { capacity: 16 }))
    ));

    let message = Message::new(Address::CORE, names::HELLO, "hi");
    transport.channel().inject(&wire_for(&message, &protocol));
    assert_eq!(transport.receive(), Some(message));
}

#[tokio::test]
async fn protocol_tables_load_from_json() {
    let protocol = Arc::new(
        ProtocolConfig::from_json(
            r#"{
                "commands": { "PING": 1, "SERVO": 96 },
                "schemas": { "SERVO": { "type": "words", "count": 2, "desc": "angle,speed" } }
            }"#,
        )
        .unwrap(),
    );
    let (a, b) = MemoryChannel::pair();
    let sender = Transport::new(a, Arc::clone(&protocol));
    let mut receiver = Transport::new(b, protocol);

    let message = Message::new(Address::device(5, 1).unwrap(), "SERVO", vec![-90.0, 400.0]);
    sender.send(&message).await.unwrap();
    settle().await;
    assert_eq!(receiver.receive(), Some(message));
}
