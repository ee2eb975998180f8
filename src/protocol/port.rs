//! PORT parameter encoding
//!
//! An active-mode data address travels as six comma-separated decimal
//! octets: the four IPv4 octets, then the port split as `port / 256` and
//! `port % 256`.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use crate::error::CodecError;

/// Where the client is listening for the data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataChannelAddress {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl DataChannelAddress {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self { ip, port }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }
}

impl From<SocketAddrV4> for DataChannelAddress {
    fn from(addr: SocketAddrV4) -> Self {
        Self::new(*addr.ip(), addr.port())
    }
}

impl fmt::Display for DataChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.ip.octets();
        let [p1, p2] = self.port.to_be_bytes();
        write!(f, "{a},{b},{c},{d},{p1},{p2}")
    }
}

impl FromStr for DataChannelAddress {
    type Err = CodecError;

    fn from_str(param: &str) -> Result<Self, Self::Err> {
        let invalid = || CodecError::InvalidPortParameter(param.to_string());

        let octets = param
            .trim()
            .split(',')
            .map(|part| part.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|_| invalid())?;

        let [a, b, c, d, p1, p2] = octets[..] else {
            return Err(invalid());
        };

        Ok(Self::new(
            Ipv4Addr::new(a, b, c, d),
            u16::from_be_bytes([p1, p2]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_port_halves() {
        let addr = DataChannelAddress::new(Ipv4Addr::LOCALHOST, 51200);
        assert_eq!(addr.to_string(), "127,0,0,1,200,0");
    }

    #[test]
    fn decodes_example_from_the_wire() {
        let addr: DataChannelAddress = "127,0,0,1,200,0".parse().unwrap();
        assert_eq!(addr.ip, Ipv4Addr::LOCALHOST);
        assert_eq!(addr.port, 51200);
        assert_eq!(addr.socket_addr(), "127.0.0.1:51200".parse().unwrap());
    }

    #[test]
    fn round_trips_boundary_ports() {
        for port in [0, 1, 255, 256, 1023, 51200, 65534, 65535] {
            let addr = DataChannelAddress::new(Ipv4Addr::LOCALHOST, port);
            let decoded: DataChannelAddress = addr.to_string().parse().unwrap();
            assert_eq!(decoded, addr);
        }
    }

    #[test]
    fn rejects_malformed_parameters() {
        for bad in [
            "",
            "127,0,0,1,200",
            "127,0,0,1,200,0,1",
            "256,0,0,1,200,0",
            "127,0,0,1,200,-1",
            "a,b,c,d,e,f",
        ] {
            assert!(
                matches!(
                    bad.parse::<DataChannelAddress>(),
                    Err(CodecError::InvalidPortParameter(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }
}
