//! CLI argument parsing

use clap::{Parser, Subcommand};
use hype_core::MacAddr;
use std::net::Ipv4Addr;

#[derive(Parser, Debug)]
#[command(name = "hype")]
#[command(version, about = "Build, inject and inspect network packets", long_about = None)]
pub struct Cli {
    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available network interfaces
    Interfaces,

    /// Capture frames and print them decoded
    Dump {
        /// Listen on interface (default: first capture-capable interface)
        #[arg(short, long)]
        interface: Option<String>,

        /// Exit after receiving COUNT frames
        #[arg(short, long, value_name = "COUNT")]
        count: Option<u64>,

        /// Reject frames with bad checksums
        #[arg(long)]
        verify: bool,

        /// BPF filter expression
        #[arg(value_name = "EXPRESSION")]
        expression: Option<String>,
    },

    /// Resolve an IPv4 address to a hardware address with ARP
    Arp {
        /// Network interface to send on
        #[arg(short, long)]
        interface: String,

        /// Source IPv4 address (default: the interface's first IPv4 address)
        #[arg(short, long)]
        source: Option<Ipv4Addr>,

        /// Give up after inspecting COUNT frames
        #[arg(short, long, value_name = "COUNT")]
        count: Option<u64>,

        /// Address to resolve
        #[arg(value_name = "ADDR")]
        addr: Ipv4Addr,
    },

    /// Send an ICMP echo request and wait for the reply
    Ping {
        /// Network interface to send on
        #[arg(short, long)]
        interface: String,

        /// Hardware address of the next hop
        #[arg(short, long, value_name = "MAC")]
        gateway_mac: MacAddr,

        /// Source IPv4 address (default: the interface's first IPv4 address)
        #[arg(short, long)]
        source: Option<Ipv4Addr>,

        /// ICMP echo identifier
        #[arg(long, default_value = "666")]
        id: u16,

        /// Give up after inspecting COUNT frames
        #[arg(short, long, value_name = "COUNT")]
        count: Option<u64>,

        /// Address to ping
        #[arg(value_name = "ADDR")]
        addr: Ipv4Addr,
    },
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
