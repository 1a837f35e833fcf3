//! Integration tests for transport dispatch
//!
//! These tests drive a scripted channel through the `AnyTransport` wrapper
//! the way the session driver does: one frame out, one bounded read back.

use std::time::Duration;

use rstest::rstest;
use devinfo_transport::{
    AnyTransport, MockReply, MockTransport, Transport, TransportError, TransportInfo,
};

const TIMEOUT: Duration = Duration::from_millis(50);

/// Exchange several frames and check the script is consumed in order
#[tokio::test]
async fn test_request_response_sequence() {
    let (port, handle) = MockTransport::new();
    let mut port = AnyTransport::Mock(port);

    handle.reply(vec![0x06, 0x00, 0x00, 0x00]).await.unwrap();
    handle.reply(vec![0x06, 0x00, 0x00, 0x00, 0x00]).await.unwrap();

    port.transmit(&[0x10, 0x01, 0x19, 0xD6]).await.unwrap();
    let first = port.receive(4, TIMEOUT).await.unwrap();

    port.transmit(&[0x10, 0x02, 0x02, 0xFF, 0xED]).await.unwrap();
    let second = port.receive(5, TIMEOUT).await.unwrap();

    assert_eq!(first.len(), 4);
    assert_eq!(second.len(), 5);

    let frames = handle.transmitted();
    assert_eq!(frames.len(), 2);
    assert_eq!(&frames[0][..], &[0x10, 0x01, 0x19, 0xD6]);
}

#[rstest]
#[case::shorter(vec![0x06, 0x0A], 12, 2)]
#[case::exact(vec![0u8; 12], 12, 12)]
#[case::longer(vec![0u8; 30], 23, 23)]
#[tokio::test]
async fn test_receive_bounded_by_max_len(
    #[case] reply: Vec<u8>,
    #[case] max_len: usize,
    #[case] expected: usize,
) {
    let (port, handle) = MockTransport::new();
    let mut port = AnyTransport::from(port);

    handle.reply(reply).await.unwrap();
    let response = port.receive(max_len, TIMEOUT).await.unwrap();

    assert_eq!(response.len(), expected);
}

/// Silence is a short read, not an error
#[tokio::test]
async fn test_silence_is_not_an_error() {
    let (port, handle) = MockTransport::new();
    let mut port = AnyTransport::from(port);

    handle.send(MockReply::Silence).await.unwrap();
    assert!(port.receive(4, TIMEOUT).await.unwrap().is_empty());
}

/// Faults surface as transport errors
#[tokio::test]
async fn test_faults_propagate() {
    let (port, handle) = MockTransport::new();
    let mut port = AnyTransport::from(port);

    handle.fail_next_transmit("line dropped");
    let err = port.transmit(&[0x10]).await.unwrap_err();
    assert!(matches!(err, TransportError::CommunicationError { .. }));

    handle.fault("framing error").await.unwrap();
    let err = port.receive(4, TIMEOUT).await.unwrap_err();
    assert_eq!(err.to_string(), "Communication error: framing error");
}

#[test]
fn test_transport_info_serializes() {
    let info = TransportInfo::new("/dev/ttyUSB0", "serial").with_baud_rate(19_200);
    let json = serde_json::to_value(&info).unwrap();

    assert_eq!(json["name"], "/dev/ttyUSB0");
    assert_eq!(json["kind"], "serial");
    assert_eq!(json["baud_rate"], 19_200);
}
