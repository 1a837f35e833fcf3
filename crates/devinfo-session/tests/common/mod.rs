//! Common test utilities for session integration tests.
//!
//! Builds the replies a healthy device gives for each protocol step and
//! scripts them into a mock transport.

#![allow(dead_code)]

use std::time::Duration;

use devinfo_core::constants::*;
use devinfo_session::{SessionConfig, SessionDriver};
use devinfo_transport::{MockTransport, MockTransportHandle};

pub const TIMEOUT: Duration = Duration::from_millis(10);

/// Driver over a fresh mock transport with a short receive timeout.
pub fn mock_driver() -> (SessionDriver<MockTransport>, MockTransportHandle) {
    let (port, handle) = MockTransport::with_name("Scripted Device".to_string());
    let driver = SessionDriver::builder(port)
        .with_config(SessionConfig::default().with_receive_timeout(TIMEOUT))
        .build();
    (driver, handle)
}

fn with_payload(header: &[u8], len: usize, payload: &[u8]) -> Vec<u8> {
    let mut response = vec![0x00; len];
    response[..header.len()].copy_from_slice(header);
    response[header.len()..header.len() + payload.len()].copy_from_slice(payload);
    response
}

pub fn vendor_ack(payload: &[u8]) -> Vec<u8> {
    with_payload(&VENDOR_ACK_HEADER, VENDOR_RESPONSE_LEN, payload)
}

pub fn component_ack(payload: &[u8]) -> Vec<u8> {
    with_payload(&COMPONENT_ACK_HEADER, COMPONENT_RESPONSE_LEN, payload)
}

pub fn component_nak() -> Vec<u8> {
    COMPONENT_NAK_HEADER.to_vec()
}

/// Replies for one successful pass, HaltStream through PartNumber.
pub fn happy_path() -> Vec<Vec<u8>> {
    vec![
        vec![0x00, 0x00, 0x00, 0x00],
        vec![ACK, 0x00, 0x00, 0x00, 0x00],
        vendor_ack(b"ACME"),
        component_ack(b"SN0042"),
        component_ack(b"HW-B"),
        component_ack(b"FW 2.1"),
        component_ack(b"Gauge"),
        component_ack(b"PN-77"),
    ]
}

/// Queue every reply in order.
pub async fn script(handle: &MockTransportHandle, replies: Vec<Vec<u8>>) {
    for reply in replies {
        handle.reply(reply).await.unwrap();
    }
}
