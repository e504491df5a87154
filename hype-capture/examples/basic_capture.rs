//! Example: Basic packet capture
//!
//! Captures 20 frames on the default interface and prints each one decoded.
//! Note: Requires root/administrator privileges to run.
//!
//! Run with: sudo cargo run --example basic_capture

use hype_capture::{default_interface, CaptureHandle, LiveCapture};
use hype_packet::{render_layers, unpack_all};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let iface = default_interface()?;
    println!("Capturing on: {} ({})", iface.name, iface.description);

    let mut capture = LiveCapture::open(&iface.name)?;
    capture.activate()?;
    let link_type = capture.link_type();

    for n in 1..=20 {
        let Some(frame) = capture.capture()? else {
            break;
        };

        match unpack_all(&frame, link_type) {
            Ok(layers) => println!("[{}] {}", n, render_layers(&layers)),
            Err(e) => println!("[{}] {} bytes, decode error: {}", n, frame.len(), e),
        }
    }

    println!();
    println!("{}", capture.stats());
    capture.close();
    Ok(())
}
