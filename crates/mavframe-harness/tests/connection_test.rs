//! Connection integration tests.
//!
//! Drives a full connection over in-memory streams:
//! - Send/receive of every frame flavor
//! - Sequence numbering, wrap-around and reset on reconnect
//! - Dropping and counting of unknown, corrupt and undecodable frames
//! - Incoming signature policy
//! - I/O failures on both sides

use std::io;

use mavframe_core::{
    Connection, ConnectionConfig, ConnectionError, ConnectionStats, Frame, FrameReader, SignatureVerification,
};
use mavframe_harness::{
    FailingWriter, Heartbeat, Ping, ProtocolVersion, ReadStep, ScriptedReader, SharedBuffer, TestMessage,
    init_tracing, sample_heartbeat, test_dialect,
};
use mavframe_proto::{MavHeader, MavMessage, RawFrame, SecretKey, SigningParams};

fn connection(config: ConnectionConfig) -> Connection<TestMessage> {
    init_tracing();
    Connection::new(test_dialect(), config)
}

/// Connection whose output is captured and whose input is empty
fn sender() -> (Connection<TestMessage>, SharedBuffer) {
    let out = SharedBuffer::new();
    let conn = connection(ConnectionConfig::default());
    conn.connect(io::empty(), out.clone());
    (conn, out)
}

/// Connection reading `stream`
fn receiver(stream: Vec<u8>, config: ConnectionConfig) -> Connection<TestMessage> {
    let conn = connection(config);
    conn.connect(io::Cursor::new(stream), io::sink());
    conn
}

fn sequences(stream: &[u8]) -> Vec<u8> {
    let mut reader = FrameReader::new(stream);
    let mut out = Vec::new();
    while let Ok(frame) = reader.next() {
        out.push(frame.sequence());
    }
    out
}

fn ping(seq: u32) -> Ping {
    Ping { time_usec: 1_000 + u64::from(seq), seq, target_system: 0, target_component: 0 }
}

#[test]
fn every_flavor_round_trips() {
    let key = SecretKey::new([0x5A; 32]);
    let signing = SigningParams { link_id: 2, timestamp: 1_000_000, secret_key: &key };
    let version = ProtocolVersion {
        version: 200,
        min_version: 100,
        max_version: 200,
        spec_version_hash: [1, 2, 3, 4, 5, 6, 7, 8],
        library_version_hash: [0; 8],
    };

    let (tx, out) = sender();
    tx.send_v1(1, 1, &sample_heartbeat()).expect("send v1");
    tx.send_unsigned_v2(1, 1, &ping(9)).expect("send v2");
    tx.send_signed_v2(1, 1, &version, &signing).expect("send signed v2");

    let rx = receiver(out.contents(), ConnectionConfig::default());

    let first = rx.next().expect("heartbeat");
    assert!(matches!(first, Frame::V1 { message: TestMessage::Heartbeat(hb), .. } if hb == sample_heartbeat()));

    let second = rx.next().expect("ping");
    assert!(matches!(second, Frame::V2 { .. }));
    assert_eq!(second.into_message(), TestMessage::Ping(ping(9)));

    let third = rx.next().expect("protocol version");
    let signature = third.raw().signature().expect("signed");
    assert_eq!(signature.link_id, 2);
    assert_eq!(signature.timestamp, 1_000_000);
    assert!(third.raw().validate_signature(&key));
    assert_eq!(third.message(), &TestMessage::ProtocolVersion(version));

    assert!(matches!(rx.next(), Err(ConnectionError::EndOfStream)));
}

#[test]
fn sequence_counts_from_zero_and_wraps() {
    let (tx, out) = sender();
    for i in 0..300 {
        tx.send_unsigned_v2(1, 1, &ping(i)).expect("send");
    }

    let expected: Vec<u8> = (0..300u32).map(|i| i as u8).collect();
    assert_eq!(sequences(&out.contents()), expected);
    assert_eq!(tx.stats().frames_sent, 300);
}

#[test]
fn reconnect_resets_sequence_and_stats() {
    let (tx, out) = sender();
    for i in 0..5 {
        tx.send_v1(1, 1, &ping(i)).expect("send");
    }
    assert_eq!(sequences(&out.take()), vec![0, 1, 2, 3, 4]);

    tx.connect(io::empty(), out.clone());
    assert_eq!(tx.stats(), ConnectionStats::default());

    tx.send_v1(1, 1, &ping(5)).expect("send after reconnect");
    assert_eq!(sequences(&out.contents()), vec![0]);
}

#[test]
fn not_connected_consumes_nothing() {
    let conn = connection(ConnectionConfig::default());
    assert!(matches!(conn.next(), Err(ConnectionError::NotConnected)));
    assert!(matches!(conn.send_unsigned_v2(1, 1, &ping(0)), Err(ConnectionError::NotConnected)));

    let out = SharedBuffer::new();
    conn.connect(io::empty(), out.clone());
    conn.send_unsigned_v2(1, 1, &ping(0)).expect("send");
    assert_eq!(sequences(&out.contents()), vec![0]);
}

#[test]
fn v1_rejects_wide_message_id() {
    let (tx, out) = sender();
    let version = ProtocolVersion {
        version: 200,
        min_version: 200,
        max_version: 200,
        spec_version_hash: [0; 8],
        library_version_hash: [0; 8],
    };

    assert!(matches!(tx.send_v1(1, 1, &version), Err(ConnectionError::Protocol(_))));
    assert!(out.contents().is_empty());
    assert_eq!(tx.stats().frames_sent, 0);
}

#[test]
fn write_failure_is_returned() {
    let conn = connection(ConnectionConfig::default());
    conn.connect(io::empty(), FailingWriter::new(io::ErrorKind::BrokenPipe));

    let result = conn.send_v1(1, 1, &sample_heartbeat());
    assert!(matches!(result, Err(ConnectionError::Io(ref e)) if e.kind() == io::ErrorKind::BrokenPipe));
    assert_eq!(conn.stats().frames_sent, 0);
}

#[test]
fn bad_frames_are_skipped_and_counted() {
    let header = MavHeader { sequence: 0, system_id: 1, component_id: 1 };
    let heartbeat = sample_heartbeat().encode();

    let unknown = RawFrame::encode_unsigned_v2(header, 77, &[1, 2, 3], 0).expect("encode");
    let bad_crc =
        RawFrame::encode_unsigned_v2(header, Heartbeat::ID, &heartbeat, Heartbeat::CRC_EXTRA ^ 0xFF)
            .expect("encode");
    let mut bad_status = heartbeat.clone();
    bad_status[7] = 42;
    let bad_payload =
        RawFrame::encode_unsigned_v2(header, Heartbeat::ID, &bad_status, Heartbeat::CRC_EXTRA).expect("encode");
    let good = RawFrame::encode_unsigned_v2(header, Heartbeat::ID, &heartbeat, Heartbeat::CRC_EXTRA)
        .expect("encode");

    let stream = [unknown, bad_crc, bad_payload, good].iter().flat_map(|f| f.raw_bytes().to_vec()).collect();
    let rx = receiver(stream, ConnectionConfig::default());

    assert_eq!(rx.next().expect("good frame").into_message(), TestMessage::Heartbeat(sample_heartbeat()));
    assert!(matches!(rx.next(), Err(ConnectionError::EndOfStream)));

    let stats = rx.stats();
    assert_eq!(stats.unknown_messages, 1);
    assert_eq!(stats.checksum_errors, 1);
    assert_eq!(stats.decode_errors, 1);
    assert_eq!(stats.frames_received, 1);
    assert!(stats.bytes_skipped > 0);
}

#[test]
fn signature_policy_filters_frames() {
    let key = SecretKey::new([1; 32]);
    let wrong = SecretKey::new([2; 32]);

    let (tx, out) = sender();
    tx.send_signed_v2(1, 1, &ping(1), &SigningParams { link_id: 0, timestamp: 10, secret_key: &wrong })
        .expect("send");
    tx.send_unsigned_v2(1, 1, &ping(2)).expect("send");
    tx.send_v1(1, 1, &ping(3)).expect("send");
    tx.send_signed_v2(1, 1, &ping(4), &SigningParams { link_id: 0, timestamp: 11, secret_key: &key })
        .expect("send");
    let stream = out.contents();

    let strict = ConnectionConfig {
        signature_verification: Some(SignatureVerification { secret_key: key.clone(), accept_unsigned: false }),
    };
    let rx = receiver(stream.clone(), strict);
    assert_eq!(rx.next().expect("signed").into_message(), TestMessage::Ping(ping(4)));
    assert_eq!(rx.stats().signature_errors, 3);

    let lenient = ConnectionConfig {
        signature_verification: Some(SignatureVerification { secret_key: key, accept_unsigned: true }),
    };
    let rx = receiver(stream, lenient);
    let seqs: Vec<_> = std::iter::from_fn(|| rx.next().ok())
        .filter_map(|frame| match frame.into_message() {
            TestMessage::Ping(p) => Some(p.seq),
            _ => None,
        })
        .collect();
    assert_eq!(seqs, vec![2, 3, 4]);
    assert_eq!(rx.stats().signature_errors, 1);
}

#[test]
fn read_error_rolls_back_and_resumes() {
    let (tx, out) = sender();
    tx.send_unsigned_v2(1, 1, &ping(1)).expect("send");
    let wire = out.contents();
    let (head, tail) = wire.split_at(wire.len() / 2);

    let rx = connection(ConnectionConfig::default());
    rx.connect(
        ScriptedReader::new([
            ReadStep::Data(head.to_vec()),
            ReadStep::Error(io::ErrorKind::TimedOut),
            ReadStep::Data(tail.to_vec()),
        ]),
        io::sink(),
    );

    assert!(matches!(rx.next(), Err(ConnectionError::Io(ref e)) if e.kind() == io::ErrorKind::TimedOut));
    assert_eq!(rx.next().expect("frame after retry").into_message(), TestMessage::Ping(ping(1)));
    assert_eq!(rx.stats().bytes_skipped, 0);
}
