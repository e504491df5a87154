//! Capture frames and print each one decoded

use std::io::Write;

use hype_capture::CaptureHandle;
use hype_core::Result;
use hype_packet::{render_layers, unpack_all_with, UnpackOptions};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    /// Stop after this many frames
    pub count: Option<u64>,
    /// BPF expression applied after activation
    pub filter: Option<String>,
    pub verify_checksums: bool,
}

/// Print every captured frame to `out`, one line each.
///
/// Returns the number of frames read. Frames that fail to decode are logged
/// and counted but not printed.
pub fn run<H: CaptureHandle, W: Write>(
    handle: &mut H,
    options: &DumpOptions,
    out: &mut W,
) -> Result<u64> {
    handle.activate()?;
    if let Some(expr) = &options.filter {
        handle.apply_filter(expr)?;
    }

    let link_type = handle.link_type();
    let unpack = UnpackOptions {
        verify_checksums: options.verify_checksums,
    };
    debug!("Dumping frames with link type {}", link_type);

    let mut seen = 0u64;
    while let Some(frame) = handle.capture()? {
        seen += 1;

        match unpack_all_with(&frame, link_type, unpack) {
            Ok(layers) => writeln!(out, "{}", render_layers(&layers))?,
            Err(e) => warn!("Could not decode frame {} ({} bytes): {}", seen, frame.len(), e),
        }

        if options.count.map_or(false, |count| seen >= count) {
            break;
        }
    }

    Ok(seen)
}
