//! Protocol Tests
//!
//! Wire-format round trips, frame classification, and the streaming
//! decoder's incremental-delivery contract.

use bytes::BytesMut;

use txlink::error::LinkError;
use txlink::protocol::{
    encode, FrameDecoder, Message, RequestHeader, ResponseHeader, Status, TransactionType,
    MAX_FRAME_LENGTH, REQUEST_HEADER_LENGTH,
};

fn sample_request(code: &str, payload: &[u8]) -> Message {
    let header = RequestHeader::new(
        "CLI001",
        "SERVER",
        TransactionType::Business,
        code,
        "00000000000000000042",
    );
    Message::request(header, payload.to_vec())
}

// =============================================================================
// Header Round Trips
// =============================================================================

#[test]
fn test_request_header_roundtrip() {
    let header = RequestHeader::new(
        "NODE-A",
        "NODE-B",
        TransactionType::Business,
        "UPDATE",
        "00000000000000000007",
    );
    let bytes = header.to_bytes();
    assert_eq!(bytes.len(), REQUEST_HEADER_LENGTH);

    let decoded = RequestHeader::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, header);
}

#[test]
fn test_request_header_pads_and_trims() {
    let header = RequestHeader::new("AB", "XY", TransactionType::Signin, "SIGNIN", "1");
    let bytes = header.to_bytes();

    // Short fields are NUL-padded on the wire...
    assert_eq!(&bytes[0..6], b"AB\0\0\0\0");
    assert_eq!(&bytes[13..20], b"SIGNIN\0");

    // ...and come back trimmed.
    let decoded = RequestHeader::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.sender_node_id, "AB");
    assert_eq!(decoded.transaction_code, "SIGNIN");
    assert_eq!(decoded.transaction_serial, "1");
}

#[test]
fn test_request_header_truncates_long_fields() {
    let header = RequestHeader::new(
        "ABCDEFGH",
        "SERVER",
        TransactionType::Business,
        "TOOLONGCODE",
        "1",
    );
    let decoded = RequestHeader::from_bytes(&header.to_bytes()).unwrap();

    assert_eq!(decoded.sender_node_id, "ABCDEF");
    assert_eq!(decoded.transaction_code, "TOOLONG");
}

#[test]
fn test_request_header_reserved_roundtrip() {
    let mut header = RequestHeader::new("A", "B", TransactionType::Business, "QUERY", "1");
    header.reserved = [0xAB, 0xCD];
    let decoded = RequestHeader::from_bytes(&header.to_bytes()).unwrap();
    assert_eq!(decoded.reserved, [0xAB, 0xCD]);
}

#[test]
fn test_response_header_roundtrip() {
    let header = ResponseHeader::new(Status::Failed);
    let bytes = header.to_bytes();
    assert_eq!(bytes, [0x01, 0x00]);

    let decoded = ResponseHeader::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.status, Status::Failed);
}

// =============================================================================
// Message Round Trips
// =============================================================================

#[test]
fn test_request_message_roundtrip() {
    let message = sample_request("QUERY", b"id=5");
    let bytes = message.to_bytes();
    assert_eq!(bytes.len(), message.total_length());

    let decoded = Message::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, message);
    assert!(decoded.is_request());
}

#[test]
fn test_response_message_roundtrip() {
    let message = Message::response(ResponseHeader::new(Status::Success), b"ok".to_vec());
    let decoded = Message::from_bytes(&message.to_bytes()).unwrap();
    assert_eq!(decoded, message);
    assert!(!decoded.is_request());
}

#[test]
fn test_empty_payload_response() {
    let message = Message::response(ResponseHeader::new(Status::Success), Vec::new());
    let bytes = message.to_bytes();
    assert_eq!(bytes.len(), 6);

    let decoded = Message::from_bytes(&bytes).unwrap();
    assert_eq!(decoded.payload(), b"");
}

#[test]
fn test_concrete_signin_frame_is_52_bytes() {
    let header = RequestHeader::new(
        "CLI001",
        "SERVER",
        TransactionType::Signin,
        "SIGNIN",
        "00000000000000000001",
    );
    let message = Message::request(header.clone(), b"user=a".to_vec());
    let bytes = message.to_bytes();

    assert_eq!(bytes.len(), 52);
    assert_eq!(&bytes[0..6], b"CLI001");
    assert_eq!(&bytes[6..12], b"SERVER");
    assert_eq!(bytes[12], 1);
    // Total length field sits after the 42-byte header.
    assert_eq!(&bytes[42..46], &52u32.to_be_bytes());
    assert_eq!(&bytes[46..52], b"user=a");

    match Message::from_bytes(&bytes).unwrap() {
        Message::Request {
            header: decoded,
            payload,
        } => {
            assert_eq!(decoded, header);
            assert_eq!(payload, b"user=a");
        }
        other => panic!("expected request, got {:?}", other),
    }
}

#[test]
fn test_stated_length_mismatch_rejected() {
    let mut bytes = sample_request("QUERY", b"id=5").to_bytes();
    // Corrupt the length field: stated 60, actual 50.
    bytes[42..46].copy_from_slice(&60u32.to_be_bytes());
    match Message::from_bytes(&bytes) {
        Err(LinkError::InvalidFrame(_)) => {}
        other => panic!("expected InvalidFrame, got {:?}", other),
    }
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_classification_recognizes_responses() {
    assert!(Message::classify(&[0x00, 0x00]));
    assert!(Message::classify(&[0x01, 0x00]));
}

#[test]
fn test_classification_recognizes_requests() {
    // Node-id bytes never match the response pattern.
    assert!(!Message::classify(b"CL"));
    assert!(!Message::classify(&[0x00, 0x01]));
    assert!(!Message::classify(&[0x02, 0x00]));
}

#[test]
fn test_decoder_classifies_both_shapes() {
    let decoder = FrameDecoder::default();

    let mut buf = BytesMut::from(&sample_request("QUERY", b"x").to_bytes()[..]);
    assert!(decoder.decode(&mut buf).unwrap().unwrap().is_request());

    let response = Message::response(ResponseHeader::new(Status::Failed), b"x".to_vec());
    let mut buf = BytesMut::from(&response.to_bytes()[..]);
    assert!(!decoder.decode(&mut buf).unwrap().unwrap().is_request());
}

// =============================================================================
// Streaming Decoder
// =============================================================================

#[test]
fn test_decode_waits_for_complete_frame() {
    let decoder = FrameDecoder::default();
    let bytes = sample_request("QUERY", b"id=5").to_bytes();

    // Everything but the last byte: no message, nothing consumed.
    let mut buf = BytesMut::from(&bytes[..bytes.len() - 1]);
    assert!(decoder.decode(&mut buf).unwrap().is_none());
    assert_eq!(buf.len(), bytes.len() - 1);
}

#[test]
fn test_decode_one_byte_at_a_time() {
    let decoder = FrameDecoder::default();
    let message = sample_request("UPDATE", b"name=bob");
    let bytes = message.to_bytes();

    let mut buf = BytesMut::new();
    let mut decoded = Vec::new();
    for byte in &bytes {
        buf.extend_from_slice(&[*byte]);
        if let Some(msg) = decoder.decode(&mut buf).unwrap() {
            decoded.push(msg);
        }
    }

    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0], message);
    assert!(buf.is_empty());
}

#[test]
fn test_decode_two_frames_in_one_buffer() {
    let decoder = FrameDecoder::default();
    let first = sample_request("QUERY", b"a");
    let second = Message::response(ResponseHeader::new(Status::Success), b"b".to_vec());

    let mut buf = BytesMut::new();
    buf.extend_from_slice(&first.to_bytes());
    buf.extend_from_slice(&second.to_bytes());

    assert_eq!(decoder.decode(&mut buf).unwrap().unwrap(), first);
    assert_eq!(decoder.decode(&mut buf).unwrap().unwrap(), second);
    assert!(decoder.decode(&mut buf).unwrap().is_none());
}

#[test]
fn test_decode_rejects_tiny_stated_length() {
    let decoder = FrameDecoder::default();
    // Response-shaped header declaring a 3-byte total frame.
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(&3u32.to_be_bytes());

    match decoder.decode(&mut buf) {
        Err(LinkError::InvalidFrame(_)) => {}
        other => panic!("expected InvalidFrame, got {:?}", other),
    }
}

#[test]
fn test_decode_rejects_oversized_stated_length() {
    let decoder = FrameDecoder::default();
    let mut buf = BytesMut::new();
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(&((MAX_FRAME_LENGTH as u32) + 1).to_be_bytes());

    match decoder.decode(&mut buf) {
        Err(LinkError::InvalidFrame(_)) => {}
        other => panic!("expected InvalidFrame, got {:?}", other),
    }
}

#[test]
fn test_decode_rejects_length_shorter_than_header() {
    let decoder = FrameDecoder::default();
    // Request-shaped bytes declaring a total length smaller than the
    // 42-byte header it must contain.
    let mut bytes = sample_request("QUERY", b"").to_bytes();
    bytes[42..46].copy_from_slice(&10u32.to_be_bytes());
    let mut buf = BytesMut::from(&bytes[..]);

    match decoder.decode(&mut buf) {
        Err(LinkError::InvalidFrame(_)) => {}
        other => panic!("expected InvalidFrame, got {:?}", other),
    }
}

#[test]
fn test_encode_is_to_bytes() {
    let message = sample_request("DELETE", b"id=9");
    assert_eq!(encode(&message), message.to_bytes());
}
