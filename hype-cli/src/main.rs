use std::io;
use std::net::Ipv4Addr;
use std::process::ExitCode;

use hype_capture::{
    default_interface, get_interface, list_interfaces, CaptureHandle, InterfaceInfo, LiveCapture,
};
use hype_cli::commands::arp::{self, ArpRequest};
use hype_cli::commands::dump::{self, DumpOptions};
use hype_cli::commands::ping::{self, PingRequest};
use hype_cli::{log_level, Cli, Commands};
use hype_core::{Error, MacAddr, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose).to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Interfaces => {
            for iface in list_interfaces()? {
                print_interface(&iface);
            }
            Ok(())
        }

        Commands::Dump {
            interface,
            count,
            verify,
            expression,
        } => {
            let iface = match interface {
                Some(name) => get_interface(&name)?,
                None => default_interface()?,
            };
            info!("Listening on {}", iface.name);

            let mut handle = LiveCapture::open(&iface.name)?;
            let options = DumpOptions {
                count,
                filter: expression,
                verify_checksums: verify,
            };
            let result = dump::run(&mut handle, &options, &mut io::stdout().lock());
            report_stats(&mut handle);
            handle.close();
            result.map(|_| ())
        }

        Commands::Arp {
            interface,
            source,
            count,
            addr,
        } => {
            let iface = get_interface(&interface)?;
            let request = ArpRequest {
                source_mac: interface_mac(&iface)?,
                source_ip: source_ip(&iface, source)?,
                target: addr,
                limit: count,
            };

            let mut handle = LiveCapture::open(&iface.name)?;
            let result = arp::resolve(&mut handle, &request);
            handle.close();

            match result? {
                Some(mac) => {
                    println!("{} is at {}", addr, mac);
                    Ok(())
                }
                None => Err(Error::capture(format!("No ARP reply from {}", addr))),
            }
        }

        Commands::Ping {
            interface,
            gateway_mac,
            source,
            id,
            count,
            addr,
        } => {
            let iface = get_interface(&interface)?;
            let request = PingRequest {
                source_mac: interface_mac(&iface)?,
                gateway_mac,
                source_ip: source_ip(&iface, source)?,
                target: addr,
                id,
                seq: 1,
                limit: count,
            };

            let mut handle = LiveCapture::open(&iface.name)?;
            let result = ping::ping(&mut handle, &request);
            handle.close();

            match result? {
                Some(rtt) => {
                    println!(
                        "Reply from {}: id={} seq={} time={:.3}ms",
                        addr,
                        id,
                        request.seq,
                        rtt.as_secs_f64() * 1000.0
                    );
                    Ok(())
                }
                None => Err(Error::capture(format!("No echo reply from {}", addr))),
            }
        }
    }
}

fn print_interface(iface: &InterfaceInfo) {
    let mac = iface
        .mac
        .map(|mac| mac.to_string())
        .unwrap_or_else(|| "-".to_string());
    let state = if iface.is_up { "up" } else { "down" };

    println!("{:<16} {:<18} {:<5} {}", iface.name, mac, state, iface.description);
    for ip in &iface.ips {
        println!("{:<16} {}", "", ip);
    }
}

fn report_stats(handle: &mut LiveCapture) {
    if handle.is_active() {
        info!("{}", handle.stats());
    }
}

fn interface_mac(iface: &InterfaceInfo) -> Result<MacAddr> {
    iface.mac.ok_or_else(|| {
        Error::invalid_parameter(
            "interface".to_string(),
            format!("{} has no hardware address", iface.name),
        )
    })
}

fn source_ip(iface: &InterfaceInfo, explicit: Option<Ipv4Addr>) -> Result<Ipv4Addr> {
    explicit.or_else(|| iface.primary_ipv4()).ok_or_else(|| {
        Error::invalid_parameter(
            "source".to_string(),
            format!("{} has no IPv4 address", iface.name),
        )
    })
}
