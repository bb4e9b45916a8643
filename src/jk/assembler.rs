//! # Frame Reassembler
//!
//! The BMS pushes a ~300 byte frame over several physical reads. The first
//! read carries the magic prefix whose upper nibble in byte 3 announces how
//! many further reads belong to the frame; the reassembler counts them down
//! and emits the concatenation once the last one arrives.
//!
//! ```text
//!            magic(N>0)                 chunk (remaining > 1)
//!   Idle ──────────────────> Assembling ───────────────────┐
//!    ^  \                       │   ^ └─────────────────────┘
//!    │   \ magic(N=0)           │   │ magic: abandon partial, restart
//!    │    v                     │   └──────────────
//!    └── Complete <─────────────┘ chunk (remaining == 1)
//! ```
//!
//! There is no timeout: a frame that never completes stays buffered until
//! the next magic prefix supersedes it.

use crate::jk::frame::{announced_fragments, Frame};
use bytes::{Bytes, BytesMut};
use log::debug;

/// What a single `push` did to the assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyEvent {
    /// Idle and the chunk does not start a frame; nothing was consumed.
    Ignored,
    /// A magic prefix opened a new assembly.
    Started {
        expected: u8,
        /// Raw bytes of a superseded partial assembly that were thrown away.
        abandoned: Option<Bytes>,
    },
    /// A continuation chunk was appended.
    Fragment { remaining: u8 },
    /// The frame is complete; the assembler is idle again.
    Complete {
        frame: Frame,
        abandoned: Option<Bytes>,
    },
}

/// Single-owner reassembly state carried across reads.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: BytesMut,
    remaining: u8,
    in_progress: bool,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_assembling(&self) -> bool {
        self.in_progress
    }

    pub fn remaining_fragments(&self) -> u8 {
        self.remaining
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drops any partial assembly and returns the number of discarded bytes.
    pub fn reset(&mut self) -> usize {
        self.take_partial().len()
    }

    /// Detaches the partial assembly, leaving the assembler idle.
    fn take_partial(&mut self) -> Bytes {
        self.remaining = 0;
        self.in_progress = false;
        self.buffer.split().freeze()
    }

    /// Feeds one read into the state machine.
    pub fn push(&mut self, chunk: &[u8]) -> AssemblyEvent {
        if let Some(expected) = announced_fragments(chunk) {
            let abandoned = if self.in_progress {
                let outstanding = self.remaining;
                let discarded = self.take_partial();
                debug!(
                    "Partial frame superseded with {} fragment(s) outstanding",
                    outstanding
                );
                Some(discarded)
            } else {
                None
            };

            self.buffer.extend_from_slice(chunk);
            debug!("Frame start: {} further fragment(s) announced", expected);

            if expected == 0 {
                let frame = self.take_frame();
                return AssemblyEvent::Complete { frame, abandoned };
            }

            self.remaining = expected;
            self.in_progress = true;
            return AssemblyEvent::Started {
                expected,
                abandoned,
            };
        }

        if !self.in_progress || chunk.is_empty() {
            return AssemblyEvent::Ignored;
        }

        self.buffer.extend_from_slice(chunk);
        self.remaining -= 1;
        debug!(
            "Fragment of {} bytes appended, {} remaining",
            chunk.len(),
            self.remaining
        );

        if self.remaining == 0 {
            let frame = self.take_frame();
            debug!("Frame assembled: {} bytes", frame.len());
            AssemblyEvent::Complete {
                frame,
                abandoned: None,
            }
        } else {
            AssemblyEvent::Fragment {
                remaining: self.remaining,
            }
        }
    }

    fn take_frame(&mut self) -> Frame {
        let bytes = self.buffer.split().freeze();
        self.remaining = 0;
        self.in_progress = false;
        Frame::new(bytes)
    }
}
