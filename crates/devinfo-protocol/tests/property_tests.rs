//! Property-based tests for frame and transition invariants.
//!
//! These tests use proptest to generate arbitrary opcodes and responses and
//! verify that the protocol invariants hold for all of them.

mod common;

use devinfo_protocol::{
    Classification, CommandFrame, ProtocolState, Transition, checksum, frame::byte_sum,
};
use proptest::prelude::*;

/// Strategy for the five states that reset on a negative acknowledgement.
fn component_query_state() -> impl Strategy<Value = ProtocolState> {
    prop_oneof![
        Just(ProtocolState::SerialNumber),
        Just(ProtocolState::HardwareRevision),
        Just(ProtocolState::SoftwareRevision),
        Just(ProtocolState::ProductName),
        Just(ProtocolState::PartNumber),
    ]
}

/// Strategy for any protocol state.
fn any_state() -> impl Strategy<Value = ProtocolState> {
    (0usize..ProtocolState::ALL.len()).prop_map(|index| ProtocolState::ALL[index])
}

proptest! {
    /// Property: every built frame sums to zero modulo 256.
    #[test]
    fn prop_built_frame_sums_to_zero(opcode in prop::collection::vec(any::<u8>(), 0..64)) {
        let frame = CommandFrame::build(&opcode);

        prop_assert_eq!(byte_sum(frame.as_bytes()), 0);
        prop_assert_eq!(frame.opcode(), &opcode[..]);
        prop_assert_eq!(frame.checksum(), checksum(&opcode));
        prop_assert!(CommandFrame::from_bytes(frame.as_bytes()).is_ok());
    }

    /// Property: HaltStream advances on any non-empty answer.
    #[test]
    fn prop_halt_stream_advances_on_non_empty(response in prop::collection::vec(any::<u8>(), 1..8)) {
        let state = ProtocolState::HaltStream;
        let transition = state.transition(state.classify(&response));

        prop_assert_eq!(transition, Transition::Advance(ProtocolState::GetInterval));
    }

    /// Property: GetInterval advances iff byte 0 is ACK.
    #[test]
    fn prop_get_interval_advances_iff_ack(response in prop::collection::vec(any::<u8>(), 1..8)) {
        let state = ProtocolState::GetInterval;
        let next = state.transition(state.classify(&response)).target(state);

        if response[0] == 0x06 {
            prop_assert_eq!(next, ProtocolState::VendorCode);
        } else {
            prop_assert_eq!(next, ProtocolState::GetInterval);
        }
    }

    /// Property: a NAK header resets every component query, whatever follows it.
    #[test]
    fn prop_nak_resets_component_queries(
        state in component_query_state(),
        tail in prop::collection::vec(any::<u8>(), 0..12),
    ) {
        let mut response = common::component_nak();
        response.extend_from_slice(&tail);

        prop_assert_eq!(state.classify(&response), Classification::Nak);
        prop_assert_eq!(
            state.transition(state.classify(&response)).target(state),
            ProtocolState::HaltStream
        );
    }

    /// Property: PartNumber stays put on every acknowledged answer.
    #[test]
    fn prop_part_number_terminal(payload in prop::collection::vec(any::<u8>(), 0..9)) {
        let state = ProtocolState::PartNumber;
        let response = common::component_ack(&payload);

        prop_assert_eq!(state.transition(state.classify(&response)), Transition::Complete);
    }

    /// Property: no state ever jumps forward more than one step.
    #[test]
    fn prop_never_skips_states(
        state in any_state(),
        response in prop::collection::vec(any::<u8>(), 0..24),
    ) {
        let next = state.transition(state.classify(&response)).target(state);

        prop_assert!(
            next.index() <= state.index() + 1,
            "{} jumped to {}", state, next
        );
        if next.index() < state.index() {
            prop_assert_eq!(next, ProtocolState::HaltStream);
        }
    }
}
