//! Scripted byte source for testing
//!
//! Replays a queue of chunks exactly as queued, so tests control the read
//! boundaries the reassembler sees. An error can be injected at any point to
//! simulate losing the serial adapter.

use crate::error::JkError;
use crate::jk::serial::ByteSource;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;

enum Step {
    Chunk(Bytes),
    Fail(JkError),
}

/// Mock link that hands out pre-queued reads.
#[derive(Default)]
pub struct MockByteSource {
    steps: VecDeque<Step>,
    reads: usize,
}

impl MockByteSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a source from a list of reads.
    pub fn from_chunks<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let mut source = Self::new();
        for chunk in chunks {
            source.queue_chunk(chunk.as_ref());
        }
        source
    }

    /// Queue one read.
    pub fn queue_chunk(&mut self, data: &[u8]) {
        self.steps.push_back(Step::Chunk(Bytes::copy_from_slice(data)));
    }

    /// Queue a transport failure.
    pub fn queue_error(&mut self, error: JkError) {
        self.steps.push_back(Step::Fail(error));
    }

    /// Number of `read_chunk` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn is_exhausted(&self) -> bool {
        self.steps.is_empty()
    }
}

#[async_trait]
impl ByteSource for MockByteSource {
    async fn read_chunk(&mut self) -> Result<Option<Bytes>, JkError> {
        self.reads += 1;
        match self.steps.pop_front() {
            Some(Step::Chunk(bytes)) => Ok(Some(bytes)),
            Some(Step::Fail(error)) => Err(error),
            None => Ok(None),
        }
    }
}
