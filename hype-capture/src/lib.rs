//! Packet capture library for hype
//!
//! This crate defines the [`CaptureHandle`] contract the codec engine's callers
//! read frames from and inject frames into, and provides a libpcap-backed
//! implementation for live interfaces.
//!
//! ## Features
//!
//! - **Capture handles**: [`LiveCapture`] on a real interface, [`MemoryCapture`]
//!   replaying frames held in memory
//! - **Interface Management**: List and query network interfaces
//! - **BPF Filters**: Expression builders for the protocols hype decodes
//! - **Statistics**: Captured, injected and dropped frame counters
//!
//! ## Example
//!
//! ```no_run
//! use hype_capture::{filters, CaptureHandle, LiveCapture};
//! use hype_core::Type;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut capture = LiveCapture::open("eth0")?;
//! capture.activate()?;
//! capture.apply_filter(&filters::protocol(Type::Arp))?;
//!
//! while let Some(frame) = capture.capture()? {
//!     println!("Got frame: {} bytes", frame.len());
//! }
//!
//! capture.close();
//! # Ok(())
//! # }
//! ```

pub mod filters;
pub mod handle;
pub mod interface;
pub mod live;
pub mod stats;

// Re-export main types
pub use handle::{CaptureHandle, MemoryCapture};
pub use interface::{default_interface, get_interface, list_interfaces, InterfaceInfo};
pub use live::{CaptureConfig, LiveCapture};
pub use stats::{CaptureStats, FrameCounters};
