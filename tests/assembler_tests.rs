//! Tests for reassembly of vendor frames delivered over several reads.

use jkess_rs::jk::frame::split_into_reads;
use jkess_rs::{AssemblyEvent, FrameAssembler, FrameBuilder};
use proptest::prelude::*;

/// Tests that a frame announced with N=2 completes on the third read and
/// equals the concatenation of all three.
#[test]
fn test_three_reads_complete_one_frame() {
    let mut asm = FrameAssembler::new();
    let first = [0x55, 0xAA, 0xEB, 0x20, 0x02, 0x00];
    let mid = [0x10, 0x11, 0x12];
    let last = [0x20, 0x21];

    assert_eq!(
        asm.push(&first),
        AssemblyEvent::Started {
            expected: 2,
            abandoned: None
        }
    );
    assert_eq!(asm.push(&mid), AssemblyEvent::Fragment { remaining: 1 });
    match asm.push(&last) {
        AssemblyEvent::Complete { frame, abandoned } => {
            assert_eq!(frame.as_bytes(), [&first[..], &mid[..], &last[..]].concat());
            assert_eq!(abandoned, None);
        }
        other => panic!("expected Complete, got {other:?}"),
    }
    assert!(!asm.is_assembling());
    assert_eq!(asm.buffered_len(), 0);
    assert_eq!(asm.remaining_fragments(), 0);
}

/// Tests that a new magic prefix discards a partial assembly and that none
/// of its bytes leak into the next frame.
#[test]
fn test_new_magic_abandons_partial_assembly() {
    let mut asm = FrameAssembler::new();
    let stale_start = [0x55, 0xAA, 0xEB, 0x30, 0xDE, 0xAD];
    let stale_fragment = [0xBE, 0xEF];
    asm.push(&stale_start);
    asm.push(&stale_fragment);

    let fresh = [0x55, 0xAA, 0xEB, 0x10, 0x01, 0x00];
    match asm.push(&fresh) {
        AssemblyEvent::Started { expected, abandoned } => {
            assert_eq!(expected, 1);
            assert_eq!(
                abandoned.as_deref(),
                Some(&[0x55, 0xAA, 0xEB, 0x30, 0xDE, 0xAD, 0xBE, 0xEF][..])
            );
        }
        other => panic!("expected Started, got {other:?}"),
    }

    match asm.push(&[0x42]) {
        AssemblyEvent::Complete { frame, .. } => {
            assert_eq!(frame.as_bytes(), &[0x55, 0xAA, 0xEB, 0x10, 0x01, 0x00, 0x42]);
        }
        other => panic!("expected Complete, got {other:?}"),
    }
}

/// Tests that reads before any magic prefix are not buffered.
#[test]
fn test_idle_reads_do_not_contribute() {
    let mut asm = FrameAssembler::new();
    assert_eq!(asm.push(&[0x01, 0x10, 0x16]), AssemblyEvent::Ignored);
    asm.push(&[0x55, 0xAA, 0xEB, 0x10]);
    match asm.push(&[0x99]) {
        AssemblyEvent::Complete { frame, .. } => assert_eq!(frame.len(), 5),
        other => panic!("expected Complete, got {other:?}"),
    }
}

/// Tests that a built 300-byte frame reassembles from its default ten reads.
#[test]
fn test_builder_frame_reassembles() {
    let builder = FrameBuilder::new(2).put_u8(167, 87);
    let reads = builder.build_fragmented();
    assert_eq!(reads.len(), 10);

    let mut asm = FrameAssembler::new();
    let mut completed = Vec::new();
    for read in &reads {
        if let AssemblyEvent::Complete { frame, .. } = asm.push(read) {
            completed.push(frame);
        }
    }
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].as_bytes(), builder.build());
    assert!(completed[0].verify().is_ok());
}

proptest! {
    #[test]
    fn prop_any_split_reassembles(fragments in 0u8..16, extra in 0usize..200) {
        let frame = FrameBuilder::new(1)
            .fragments(fragments)
            .total_len(300 + extra)
            .build();
        let reads = split_into_reads(&frame, usize::from(fragments) + 1);

        let mut asm = FrameAssembler::new();
        let mut out = None;
        for read in &reads {
            if let AssemblyEvent::Complete { frame, .. } = asm.push(read) {
                prop_assert!(out.is_none());
                out = Some(frame);
            }
        }
        prop_assert_eq!(out.map(|f| f.as_bytes().to_vec()), Some(frame));
        prop_assert!(!asm.is_assembling());
    }
}
