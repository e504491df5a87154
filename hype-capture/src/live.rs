//! Live capture and injection on a network interface through libpcap

use pcap::{Active, Capture, Inactive};
use tracing::{debug, info, warn};

use hype_core::{Error, Result, Type};

use crate::handle::CaptureHandle;
use crate::stats::{CaptureStats, FrameCounters};

const DEFAULT_SNAPLEN: i32 = 65535;
const DEFAULT_TIMEOUT_MS: i32 = 1000;

/// libpcap options, applied when the handle is activated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Bytes kept per frame
    pub snaplen: i32,
    /// Read timeout; `capture` retries until a frame arrives
    pub timeout_ms: i32,
    pub promiscuous: bool,
    /// Deliver frames as they arrive instead of batching them
    pub immediate_mode: bool,
    /// 802.11 monitor mode
    pub monitor: bool,
    /// Kernel buffer size in bytes; 0 keeps libpcap's default
    pub buffer_size: i32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            snaplen: DEFAULT_SNAPLEN,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            promiscuous: true,
            immediate_mode: true,
            monitor: false,
            buffer_size: 0,
        }
    }
}

enum State {
    Inactive(Capture<Inactive>),
    Active(Capture<Active>),
    Closed,
}

/// Capture handle on a live interface. May require elevated privileges.
pub struct LiveCapture {
    device: String,
    config: CaptureConfig,
    state: State,
    pending_filter: Option<String>,
    counters: FrameCounters,
}

impl LiveCapture {
    /// Create an inactive handle on `device` with the default configuration
    pub fn open(device: &str) -> Result<Self> {
        Self::with_config(device, CaptureConfig::default())
    }

    /// Create an inactive handle on `device`
    pub fn with_config(device: &str, config: CaptureConfig) -> Result<Self> {
        let capture = Capture::from_device(device)
            .map_err(|e| Error::capture(format!("Could not open device {}: {}", device, e)))?;

        info!("Created packet capture on interface: {}", device);

        Ok(Self {
            device: device.to_string(),
            config,
            state: State::Inactive(capture),
            pending_filter: None,
            counters: FrameCounters::new(),
        })
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Change the configuration; fails once the handle is active
    pub fn set_config(&mut self, config: CaptureConfig) -> Result<()> {
        match self.state {
            State::Inactive(_) => {
                self.config = config;
                Ok(())
            }
            _ => Err(Error::capture("Handle already active")),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active(_))
    }

    /// Counters since activation, merged with libpcap's drop counters
    pub fn stats(&mut self) -> CaptureStats {
        let snapshot = self.counters.snapshot();
        match &mut self.state {
            State::Active(capture) => match capture.stats() {
                Ok(pcap_stats) => snapshot.with_pcap_stats(pcap_stats),
                Err(e) => {
                    debug!("Failed to get pcap stats: {}", e);
                    snapshot
                }
            },
            _ => snapshot,
        }
    }

    fn active(&mut self) -> Result<&mut Capture<Active>> {
        match &mut self.state {
            State::Active(capture) => Ok(capture),
            State::Inactive(_) => Err(Error::capture("Handle not activated")),
            State::Closed => Err(Error::capture("Handle is closed")),
        }
    }

    fn configure(&self, capture: Capture<Inactive>) -> Capture<Inactive> {
        let mut capture = capture
            .promisc(self.config.promiscuous)
            .snaplen(self.config.snaplen)
            .timeout(self.config.timeout_ms)
            .immediate_mode(self.config.immediate_mode)
            .rfmon(self.config.monitor);

        if self.config.buffer_size > 0 {
            capture = capture.buffer_size(self.config.buffer_size);
        }
        capture
    }

    fn open_active(&self, inactive: Capture<Inactive>) -> Result<Capture<Active>> {
        let mut capture = self
            .configure(inactive)
            .open()
            .map_err(|e| Error::capture(format!("Could not activate: {}", e)))?;

        if let Some(filter) = &self.pending_filter {
            capture
                .filter(filter, true)
                .map_err(|e| Error::capture(format!("Could not set filter: {}", e)))?;
            debug!("Applied filter: {}", filter);
        }
        Ok(capture)
    }

    /// Fresh inactive handle on the same device, after a failed activation
    fn reopen(&self) -> State {
        match Capture::from_device(self.device.as_str()) {
            Ok(capture) => State::Inactive(capture),
            Err(e) => {
                warn!("Could not reopen device {}: {}", self.device, e);
                State::Closed
            }
        }
    }
}

impl CaptureHandle for LiveCapture {
    fn link_type(&self) -> Type {
        match &self.state {
            State::Active(capture) => {
                let linktype = capture.get_datalink();
                Type::from_link_type(linktype.0 as u32)
            }
            _ => Type::None,
        }
    }

    fn activate(&mut self) -> Result<()> {
        let inactive = match std::mem::replace(&mut self.state, State::Closed) {
            State::Inactive(capture) => capture,
            other => {
                self.state = other;
                return Err(Error::capture("Handle already active or closed"));
            }
        };

        debug!("Activating pcap capture on {}", self.device);
        match self.open_active(inactive) {
            Ok(capture) => {
                self.state = State::Active(capture);
                self.pending_filter = None;
                self.counters.restart();
                info!("Capture activated on {}", self.device);
                Ok(())
            }
            Err(e) => {
                self.state = self.reopen();
                Err(e)
            }
        }
    }

    fn apply_filter(&mut self, expr: &str) -> Result<()> {
        match &mut self.state {
            State::Active(capture) => {
                capture
                    .filter(expr, true)
                    .map_err(|e| Error::capture(format!("Could not set filter: {}", e)))?;
                info!("BPF filter set: {}", expr);
            }
            State::Inactive(_) => {
                debug!("Deferring BPF filter until activation: {}", expr);
                self.pending_filter = Some(expr.to_string());
            }
            State::Closed => return Err(Error::capture("Handle is closed")),
        }
        Ok(())
    }

    fn capture(&mut self) -> Result<Option<Vec<u8>>> {
        let capture = self.active()?;

        let frame = loop {
            match capture.next_packet() {
                Ok(packet) => break packet.data.to_vec(),
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(pcap::Error::NoMorePackets) => return Ok(None),
                Err(e) => {
                    warn!("Packet capture error: {}", e);
                    return Err(Error::capture(format!("Could not read packet: {}", e)));
                }
            }
        };

        self.counters.count_captured(frame.len());
        Ok(Some(frame))
    }

    fn inject(&mut self, frame: &[u8]) -> Result<()> {
        self.active()?
            .sendpacket(frame)
            .map_err(|e| Error::capture(format!("Could not inject packet: {}", e)))?;
        self.counters.count_injected(frame.len());
        Ok(())
    }

    fn close(&mut self) {
        if !matches!(self.state, State::Closed) {
            info!("Closing packet capture on {}", self.device);
        }
        self.state = State::Closed;
    }
}
