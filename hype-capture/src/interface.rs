//! Interface lookup for the tools that inject frames
//!
//! Injecting a frame needs the sender's hardware and IPv4 addresses, which
//! are read from the interface rather than from the OS routing table.

use hype_core::{Error, MacAddr, Result};
use pnet_datalink::{self, NetworkInterface};
use std::net::{IpAddr, Ipv4Addr};

/// A network interface as seen by `pnet_datalink`
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceInfo {
    pub name: String,
    pub description: String,
    pub index: u32,
    /// Hardware address; `None` for interfaces without one (tunnels)
    pub mac: Option<MacAddr>,
    pub ips: Vec<IpAddr>,
    pub is_up: bool,
    pub is_loopback: bool,
}

impl From<&NetworkInterface> for InterfaceInfo {
    fn from(iface: &NetworkInterface) -> Self {
        let mac = iface
            .mac
            .map(|mac| MacAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]));
        InterfaceInfo {
            name: iface.name.clone(),
            description: iface.description.clone(),
            index: iface.index,
            mac,
            ips: iface.ips.iter().map(|network| network.ip()).collect(),
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
        }
    }
}

impl InterfaceInfo {
    /// Up and not loopback
    pub fn is_capture_capable(&self) -> bool {
        self.is_up && !self.is_loopback
    }

    /// First IPv4 address assigned to the interface
    pub fn primary_ipv4(&self) -> Option<Ipv4Addr> {
        self.ips.iter().find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(*v4),
            IpAddr::V6(_) => None,
        })
    }
}

pub fn list_interfaces() -> Result<Vec<InterfaceInfo>> {
    let found: Vec<InterfaceInfo> = pnet_datalink::interfaces()
        .iter()
        .map(InterfaceInfo::from)
        .collect();

    if found.is_empty() {
        return Err(Error::capture("no network interfaces found"));
    }
    Ok(found)
}

/// Look up an interface by name
pub fn get_interface(name: &str) -> Result<InterfaceInfo> {
    pnet_datalink::interfaces()
        .iter()
        .find(|iface| iface.name == name)
        .map(InterfaceInfo::from)
        .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
}

/// First interface that is up and not loopback
pub fn default_interface() -> Result<InterfaceInfo> {
    list_interfaces()?
        .into_iter()
        .find(|iface| iface.is_capture_capable())
        .ok_or_else(|| Error::capture("no interface is up"))
}
