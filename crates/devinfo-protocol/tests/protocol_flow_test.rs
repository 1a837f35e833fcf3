//! Integration tests for the identity query pipeline.
//!
//! These tests drive the protocol states directly with canned responses,
//! without a transport, and check the sequence of states visited.

mod common;

use devinfo_protocol::{Classification, ProtocolState, Transition};

use ProtocolState::*;

#[test]
fn test_full_pipeline_in_order() {
    let responses = vec![
        common::halt_stream_reply(),
        common::interval_ack(),
        common::vendor_ack(b"ACME"),
        common::component_ack(b"SN0042"),
        common::component_ack(b"HW2"),
        common::component_ack(b"SW1.4"),
        common::component_ack(b"GAUGE"),
    ];

    let visited = common::walk(HaltStream, &responses);

    assert_eq!(
        visited,
        vec![
            HaltStream,
            GetInterval,
            VendorCode,
            SerialNumber,
            HardwareRevision,
            SoftwareRevision,
            ProductName,
            PartNumber,
        ]
    );
}

#[test]
fn test_part_number_holds_after_completion() {
    let responses = vec![common::component_ack(b"PN-7"); 5];
    let visited = common::walk(PartNumber, &responses);

    assert!(visited.iter().all(|state| *state == PartNumber));
    assert_eq!(
        PartNumber.transition(PartNumber.classify(&responses[0])),
        Transition::Complete
    );
}

#[test]
fn test_nak_at_hardware_revision_resets_to_halt_stream() {
    let visited = common::walk(HardwareRevision, &[common::component_nak()]);
    assert_eq!(visited, vec![HardwareRevision, HaltStream]);
}

#[test]
fn test_reset_then_full_recovery() {
    let responses = vec![
        common::component_ack(b"SN"),
        common::component_nak(),
        common::halt_stream_reply(),
        common::interval_ack(),
        common::vendor_ack(b"ACME"),
        common::component_ack(b"SN"),
    ];

    let visited = common::walk(SerialNumber, &responses);

    assert_eq!(
        visited,
        vec![
            SerialNumber,
            HardwareRevision,
            HaltStream,
            GetInterval,
            VendorCode,
            SerialNumber,
            HardwareRevision,
        ]
    );
}

#[test]
fn test_get_interval_retries_until_ack() {
    let responses = vec![
        vec![0x15, 0x00, 0x00, 0x00, 0x00],
        vec![],
        vec![0x00; 5],
        common::interval_ack(),
    ];

    let visited = common::walk(GetInterval, &responses);
    assert_eq!(
        visited,
        vec![GetInterval, GetInterval, GetInterval, GetInterval, VendorCode]
    );
}

#[test]
fn test_vendor_code_retries_on_short_or_wrong_answer() {
    let responses = vec![
        common::component_ack(b"ACME"),
        common::response_with_header(&[0x5B, 0x06, 0x0A, 0x15], 23, 0x00),
        common::component_nak(),
        common::vendor_ack(b"ACME"),
    ];

    let visited = common::walk(VendorCode, &responses);
    assert_eq!(
        visited,
        vec![VendorCode, VendorCode, VendorCode, VendorCode, SerialNumber]
    );
}

#[test]
fn test_short_read_is_not_a_mismatch() {
    let partial = &common::component_ack(b"SN")[..6];

    assert_eq!(SerialNumber.classify(partial), Classification::Incomplete);
    assert_eq!(SerialNumber.transition(Classification::Incomplete), Transition::Retry);
}

#[test]
fn test_halt_stream_empty_read_remains() {
    let visited = common::walk(HaltStream, &[vec![], vec![], common::halt_stream_reply()]);
    assert_eq!(visited, vec![HaltStream, HaltStream, HaltStream, GetInterval]);
}

#[test]
fn test_every_command_frame_is_checksummed() {
    for state in ProtocolState::ALL {
        let frame = state.command();
        assert!(frame.is_valid(), "{} frame {} fails checksum", state, frame);
    }
}
