use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// A reverse proxy address or network whose forwarded headers are believed.
///
/// Written as a single address (`10.0.0.1`) or in CIDR notation
/// (`10.0.0.0/8`, `fd00::/8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrustedProxy {
    network: IpAddr,
    prefix_len: u8,
}

impl TrustedProxy {
    pub fn contains(&self, addr: IpAddr) -> bool {
        match (self.network, addr.to_canonical()) {
            (IpAddr::V4(network), IpAddr::V4(addr)) => {
                prefix_matches(u32::from(network).into(), u32::from(addr).into(), 32, self.prefix_len)
            }
            (IpAddr::V6(network), IpAddr::V6(addr)) => {
                prefix_matches(u128::from(network), u128::from(addr), 128, self.prefix_len)
            }
            _ => false,
        }
    }
}

fn prefix_matches(network: u128, addr: u128, bits: u8, prefix_len: u8) -> bool {
    if prefix_len == 0 {
        return true;
    }
    let shift = u32::from(bits - prefix_len);
    network >> shift == addr >> shift
}

impl FromStr for TrustedProxy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (s, None),
        };

        let network: IpAddr = addr
            .parse()
            .map_err(|e| format!("Invalid proxy address {s:?}: {e}"))?;
        let max_len = if network.is_ipv4() { 32 } else { 128 };
        let prefix_len = match prefix {
            None => max_len,
            Some(prefix) => prefix
                .parse::<u8>()
                .ok()
                .filter(|len| *len <= max_len)
                .ok_or_else(|| format!("Invalid prefix length in {s:?}"))?,
        };

        Ok(TrustedProxy {
            network,
            prefix_len,
        })
    }
}

impl TryFrom<String> for TrustedProxy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TrustedProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl From<TrustedProxy> for String {
    fn from(value: TrustedProxy) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(s: &str) -> TrustedProxy {
        s.parse().unwrap()
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_single_address() {
        let proxy = proxy("10.0.0.1");
        assert!(proxy.contains(ip("10.0.0.1")));
        assert!(!proxy.contains(ip("10.0.0.2")));
        assert_eq!(proxy.to_string(), "10.0.0.1/32");
    }

    #[test]
    fn test_networks() {
        assert!(proxy("10.0.0.0/8").contains(ip("10.200.3.4")));
        assert!(!proxy("10.0.0.0/8").contains(ip("11.0.0.1")));
        assert!(proxy("fd00::/8").contains(ip("fd12::1")));
        assert!(!proxy("fd00::/8").contains(ip("10.0.0.1")));
        assert!(proxy("0.0.0.0/0").contains(ip("198.51.100.7")));
    }

    #[test]
    fn test_ipv4_mapped_peer() {
        assert!(proxy("127.0.0.1").contains(ip("::ffff:127.0.0.1")));
    }

    #[test]
    fn test_invalid_values() {
        assert!("proxy.local".parse::<TrustedProxy>().is_err());
        assert!("10.0.0.0/33".parse::<TrustedProxy>().is_err());
        assert!("10.0.0.0/".parse::<TrustedProxy>().is_err());
    }
}
