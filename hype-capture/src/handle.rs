//! Capture handle contract
//!
//! Anything that supplies raw frames to the codec engine, or accepts encoded
//! frames for transmission, implements [`CaptureHandle`]. The engine itself
//! never calls a handle; callers read a frame, pass it to `unpack_all` with
//! the handle's [`link_type`](CaptureHandle::link_type), and repeat.

use hype_core::{Error, Result, Type};
use std::collections::VecDeque;
use tracing::debug;

/// Source and sink of raw link-layer frames
pub trait CaptureHandle {
    /// Type of the outermost layer of every captured frame
    fn link_type(&self) -> Type;

    /// Start the source; configuration is frozen afterwards
    fn activate(&mut self) -> Result<()>;

    /// Only deliver frames matching the BPF expression `expr`
    fn apply_filter(&mut self, expr: &str) -> Result<()>;

    /// Block until the next frame arrives. `Ok(None)` means the source is
    /// exhausted.
    fn capture(&mut self) -> Result<Option<Vec<u8>>>;

    /// Transmit a fully encoded frame
    fn inject(&mut self, frame: &[u8]) -> Result<()>;

    /// Release the source; later calls fail
    fn close(&mut self);
}

/// In-memory handle replaying a fixed list of frames and recording every
/// injected one
#[derive(Debug, Clone)]
pub struct MemoryCapture {
    link_type: Type,
    frames: VecDeque<Vec<u8>>,
    injected: Vec<Vec<u8>>,
    filter: Option<String>,
    active: bool,
    closed: bool,
}

impl MemoryCapture {
    pub fn new(link_type: Type) -> Self {
        MemoryCapture {
            link_type,
            frames: VecDeque::new(),
            injected: Vec::new(),
            filter: None,
            active: false,
            closed: false,
        }
    }

    /// Queue a frame to be returned by `capture`
    pub fn push_frame(&mut self, frame: Vec<u8>) {
        self.frames.push_back(frame);
    }

    pub fn with_frames<I: IntoIterator<Item = Vec<u8>>>(mut self, frames: I) -> Self {
        self.frames.extend(frames);
        self
    }

    /// Frames passed to `inject`, oldest first
    pub fn injected(&self) -> &[Vec<u8>] {
        &self.injected
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::capture("handle is closed"));
        }
        Ok(())
    }
}

impl CaptureHandle for MemoryCapture {
    fn link_type(&self) -> Type {
        self.link_type
    }

    fn activate(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.active {
            return Err(Error::capture("handle already active"));
        }
        self.active = true;
        Ok(())
    }

    fn apply_filter(&mut self, expr: &str) -> Result<()> {
        self.ensure_open()?;
        debug!("memory capture filter: {}", expr);
        self.filter = Some(expr.to_string());
        Ok(())
    }

    fn capture(&mut self) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        if !self.active {
            return Err(Error::capture("handle not activated"));
        }
        Ok(self.frames.pop_front())
    }

    fn inject(&mut self, frame: &[u8]) -> Result<()> {
        self.ensure_open()?;
        if !self.active {
            return Err(Error::capture("handle not activated"));
        }
        self.injected.push(frame.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        self.active = false;
        self.closed = true;
    }
}
