//! Command implementations
//!
//! Every command drives a [`CaptureHandle`] so it can run against a live
//! interface or an in-memory handle alike.

pub mod arp;
pub mod dump;
pub mod ping;

use hype_capture::CaptureHandle;
use hype_core::Result;
use hype_packet::{unpack_all, Packet};
use tracing::{trace, warn};

/// Read frames until `matcher` accepts one, the source runs dry, or `limit`
/// frames have been inspected. Frames that fail to decode are skipped.
pub(crate) fn wait_for<H, T, F>(
    handle: &mut H,
    limit: Option<u64>,
    mut matcher: F,
) -> Result<Option<T>>
where
    H: CaptureHandle,
    F: FnMut(&[Packet]) -> Option<T>,
{
    let link_type = handle.link_type();
    let mut inspected = 0u64;

    while let Some(frame) = handle.capture()? {
        inspected += 1;

        match unpack_all(&frame, link_type) {
            Ok(layers) => {
                if let Some(found) = matcher(&layers) {
                    return Ok(Some(found));
                }
            }
            Err(e) => warn!("Skipping undecodable frame: {}", e),
        }

        if limit.map_or(false, |limit| inspected >= limit) {
            trace!("Gave up after {} frames", inspected);
            break;
        }
    }

    Ok(None)
}
