//! Network interface probe.

use std::net::IpAddr;
use sysinfo::Networks;

use super::{InterfaceInfo, NetworkInfo};

/// Enumerate interfaces that carry at least one address.
///
/// Interfaces and addresses are sorted so repeated scans of an unchanged
/// machine produce identical reports.
pub fn scan_interfaces() -> NetworkInfo {
    let networks = Networks::new_with_refreshed_list();

    let mut interfaces: Vec<InterfaceInfo> = networks
        .iter()
        .map(|(name, data)| {
            let mut iface = InterfaceInfo {
                name: name.clone(),
                ipv4: Vec::new(),
                ipv6: Vec::new(),
            };
            for ip in data.ip_networks() {
                match ip.addr {
                    IpAddr::V4(addr) => iface.ipv4.push(addr.to_string()),
                    IpAddr::V6(addr) => iface.ipv6.push(addr.to_string()),
                }
            }
            iface.ipv4.sort();
            iface.ipv6.sort();
            iface
        })
        .filter(|iface| !iface.ipv4.is_empty() || !iface.ipv6.is_empty())
        .collect();

    interfaces.sort_by(|a, b| a.name.cmp(&b.name));
    NetworkInfo { interfaces }
}
