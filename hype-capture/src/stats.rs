//! Frame counters for capture handles

use std::fmt;
use std::time::{Duration, Instant};

/// Totals for one activation of a capture handle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureStats {
    pub frames_captured: u64,
    pub bytes_captured: u64,
    pub frames_injected: u64,
    pub bytes_injected: u64,
    /// Frames the kernel dropped for lack of buffer space
    pub kernel_dropped: u64,
    /// Frames the interface or driver dropped
    pub interface_dropped: u64,
    /// Time since activation
    pub elapsed: Duration,
}

impl CaptureStats {
    /// Fill in the drop counters libpcap keeps
    pub fn with_pcap_stats(mut self, stat: pcap::Stat) -> Self {
        self.kernel_dropped = u64::from(stat.dropped);
        self.interface_dropped = u64::from(stat.if_dropped);
        self
    }

    /// Fraction of frames lost to the kernel, in `0.0..=1.0`
    pub fn loss_ratio(&self) -> f64 {
        let seen = self.frames_captured + self.kernel_dropped;
        if seen == 0 {
            0.0
        } else {
            self.kernel_dropped as f64 / seen as f64
        }
    }

    pub fn frames_per_second(&self) -> f64 {
        match self.elapsed.as_secs_f64() {
            secs if secs > 0.0 => self.frames_captured as f64 / secs,
            _ => 0.0,
        }
    }
}

impl fmt::Display for CaptureStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames captured ({} bytes), {} injected ({} bytes), {} dropped by kernel ({:.1}%), {} by interface in {:.2}s",
            self.frames_captured,
            self.bytes_captured,
            self.frames_injected,
            self.bytes_injected,
            self.kernel_dropped,
            self.loss_ratio() * 100.0,
            self.interface_dropped,
            self.elapsed.as_secs_f64(),
        )
    }
}

/// Running counters a handle updates as frames pass through it
#[derive(Debug, Clone)]
pub struct FrameCounters {
    captured: (u64, u64),
    injected: (u64, u64),
    since: Instant,
}

impl FrameCounters {
    pub fn new() -> Self {
        FrameCounters {
            captured: (0, 0),
            injected: (0, 0),
            since: Instant::now(),
        }
    }

    pub fn count_captured(&mut self, len: usize) {
        self.captured.0 += 1;
        self.captured.1 += len as u64;
    }

    pub fn count_injected(&mut self, len: usize) {
        self.injected.0 += 1;
        self.injected.1 += len as u64;
    }

    pub fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            frames_captured: self.captured.0,
            bytes_captured: self.captured.1,
            frames_injected: self.injected.0,
            bytes_injected: self.injected.1,
            elapsed: self.since.elapsed(),
            ..Default::default()
        }
    }

    /// Zero every counter and restart the clock
    pub fn restart(&mut self) {
        *self = Self::new();
    }
}

impl Default for FrameCounters {
    fn default() -> Self {
        Self::new()
    }
}
