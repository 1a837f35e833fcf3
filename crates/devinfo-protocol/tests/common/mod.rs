//! Common test utilities for protocol integration tests.
//!
//! Response builders produce byte sequences the way the device answers:
//! a header followed by zero padding up to the length the state requests.

#![allow(dead_code)]

use devinfo_core::constants::*;
use devinfo_protocol::{ProtocolState, Transition};

/// Header bytes followed by `fill` up to `len` bytes.
pub fn response_with_header(header: &[u8], len: usize, fill: u8) -> Vec<u8> {
    let mut response = vec![fill; len.max(header.len())];
    response[..header.len()].copy_from_slice(header);
    response
}

/// Any single byte answer to the stop-stream command.
pub fn halt_stream_reply() -> Vec<u8> {
    vec![0x01]
}

/// Interval acknowledgement.
pub fn interval_ack() -> Vec<u8> {
    response_with_header(&[ACK], INTERVAL_RESPONSE_LEN, 0x00)
}

/// Vendor code acknowledgement carrying `payload` after the header.
pub fn vendor_ack(payload: &[u8]) -> Vec<u8> {
    let mut response = response_with_header(&VENDOR_ACK_HEADER, VENDOR_RESPONSE_LEN, 0x00);
    let start = VENDOR_ACK_HEADER.len();
    response[start..start + payload.len()].copy_from_slice(payload);
    response
}

/// Component acknowledgement carrying `payload` after the header.
pub fn component_ack(payload: &[u8]) -> Vec<u8> {
    let mut response =
        response_with_header(&COMPONENT_ACK_HEADER, COMPONENT_RESPONSE_LEN, 0x00);
    let start = COMPONENT_ACK_HEADER.len();
    response[start..start + payload.len()].copy_from_slice(payload);
    response
}

/// Bare component negative acknowledgement.
pub fn component_nak() -> Vec<u8> {
    COMPONENT_NAK_HEADER.to_vec()
}

/// Feed `responses` through the states starting at `start`, returning every
/// state visited (the start state included).
pub fn walk(start: ProtocolState, responses: &[Vec<u8>]) -> Vec<ProtocolState> {
    let mut visited = vec![start];
    let mut current = start;

    for response in responses {
        let transition: Transition = current.transition(current.classify(response));
        current = transition.target(current);
        visited.push(current);
    }

    visited
}
