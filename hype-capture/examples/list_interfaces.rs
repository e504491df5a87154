//! Example: List all network interfaces
//!
//! Run with: cargo run --example list_interfaces

use hype_capture::{default_interface, list_interfaces};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== All Network Interfaces ===\n");

    for iface in &list_interfaces()? {
        println!("Interface: {} (index {})", iface.name, iface.index);
        println!("  Description: {}", iface.description);

        if let Some(mac) = iface.mac {
            println!("  MAC Address: {}", mac);
        }

        println!("  IP Addresses:");
        for ip in &iface.ips {
            println!("    - {}", ip);
        }

        println!("  Up: {}", iface.is_up);
        println!("  Loopback: {}", iface.is_loopback);
        println!("  Capture Capable: {}", iface.is_capture_capable());
        println!();
    }

    println!("=== Default Interface ===\n");

    match default_interface() {
        Ok(iface) => {
            println!("Default: {} ({})", iface.name, iface.description);
            if let Some(ipv4) = iface.primary_ipv4() {
                println!("Primary IPv4: {}", ipv4);
            }
        }
        Err(e) => {
            println!("No default interface found: {}", e);
        }
    }

    Ok(())
}
