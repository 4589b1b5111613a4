// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol unit tests

use super::*;
use dg_engine::Input;

#[test]
fn execute_request_roundtrip() {
    let request = Request::Execute {
        request: ComputeRequest::new("add", vec![Input::tensor(1.0), Input::scalar(2.0)]),
    };

    let encoded = encode(&request).expect("encode failed");
    let decoded: Request = decode(&encoded).expect("decode failed");

    assert_eq!(request, decoded);
}

#[test]
fn requests_are_tagged_by_type() {
    let json = String::from_utf8(encode(&Request::DeviceReset).unwrap()).unwrap();
    assert_eq!(json, r#"{"type":"DeviceReset"}"#);

    let decoded: Request = decode(br#"{"type":"Stats"}"#).unwrap();
    assert_eq!(decoded, Request::Stats);
}

#[test]
fn stats_response_roundtrip() {
    let response = Response::Stats {
        total_requests: 3,
        currently_waiting: 0,
        max_wait_time_seconds: 0.398,
        close_failures: 1,
    };

    let encoded = encode(&response).expect("encode failed");
    let decoded: Response = decode(&encoded).expect("decode failed");

    assert_eq!(response, decoded);
}

#[test]
fn device_response_keeps_idle_holder() {
    let response = Response::Device {
        device: DeviceSummary {
            id: 0,
            name: "simulated".to_string(),
            backend: "simulated".to_string(),
            open: false,
            holder: None,
            queued: 0,
            opens: 4,
            closes: 4,
        },
    };

    let decoded: Response = decode(&encode(&response).unwrap()).unwrap();

    match decoded {
        Response::Device { device } => {
            assert_eq!(device.holder, None);
            assert_eq!((device.opens, device.closes), (4, 4));
        }
        other => panic!("Expected Device response, got {:?}", other),
    }
}

#[test]
fn unknown_request_type_is_rejected() {
    let result: Result<Request, _> = decode(br#"{"type":"Teleport"}"#);
    assert!(matches!(result, Err(ProtocolError::Json(_))));
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original)
        .await
        .expect("write failed");

    // write_message adds 4-byte length prefix
    assert_eq!(buffer.len(), 4 + original.len());
    assert_eq!(&buffer[..4], &(original.len() as u32).to_be_bytes());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");

    assert_eq!(read_back, original);
}

#[tokio::test]
async fn empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::new());
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::ConnectionClosed)
    ));
}

#[tokio::test]
async fn oversized_length_prefix_is_rejected() {
    let mut buffer = ((MAX_MESSAGE_SIZE + 1) as u32).to_be_bytes().to_vec();
    buffer.extend_from_slice(b"{}");

    let mut cursor = std::io::Cursor::new(buffer);
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::MessageTooLarge { .. })
    ));
}

#[tokio::test]
async fn truncated_body_is_an_io_error() {
    let mut buffer = 10u32.to_be_bytes().to_vec();
    buffer.extend_from_slice(b"{}");

    let mut cursor = std::io::Cursor::new(buffer);
    assert!(matches!(
        read_message(&mut cursor).await,
        Err(ProtocolError::Io(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn read_request_times_out_on_silent_peer() {
    let (_client, mut server) = tokio::io::duplex(64);

    let result = read_request(&mut server, Duration::from_millis(100)).await;

    assert!(matches!(result, Err(ProtocolError::Timeout)));
}

#[tokio::test]
async fn request_and_response_over_duplex() {
    let (mut client, mut server) = tokio::io::duplex(1024);

    write_message(&mut client, &encode(&Request::Ping).unwrap())
        .await
        .unwrap();
    assert_eq!(
        read_request(&mut server, DEFAULT_TIMEOUT).await.unwrap(),
        Request::Ping
    );

    write_response(&mut server, &Response::Pong, DEFAULT_TIMEOUT)
        .await
        .unwrap();
    let bytes = read_message(&mut client).await.unwrap();
    assert_eq!(decode::<Response>(&bytes).unwrap(), Response::Pong);
}
