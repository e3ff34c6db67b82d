//! The decoded view of a remote service discovered over mDNS.

use std::fmt;
use std::net::Ipv4Addr;

/// Info about one remote service instance, filled in incrementally as its
/// answer records arrive.
///
/// A partially populated value is a valid intermediate state: the SRV
/// record contributes instance name, service name, protocol and port,
/// while the hostname and IPv4 address appear only once an address record
/// for the same match was seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteService {
    pub(crate) hostname: String,      // first label of the A record name
    pub(crate) ipv4: Option<Ipv4Addr>, // from the A record data
    pub(crate) instance_name: String, // from the SRV record name
    pub(crate) service_name: String,  // short service name, e.g. "_http"
    pub(crate) protocol: String,      // protocol tag, e.g. "_tcp"
    pub(crate) port: u16,             // from the SRV record data
}

impl RemoteService {
    /// Returns the hostname of the device offering the service.
    pub fn get_hostname(&self) -> &str {
        &self.hostname
    }

    /// Returns the IPv4 address, if an address record was received.
    pub fn get_ipv4(&self) -> Option<Ipv4Addr> {
        self.ipv4
    }

    /// Returns the service instance name.
    pub fn get_instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Returns the short service name, e.g. `_http`.
    pub fn get_service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the protocol tag, e.g. `_tcp`.
    pub fn get_protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns the port the service listens on.
    pub fn get_port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for RemoteService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{} on {}:{}",
            self.instance_name, self.service_name, self.protocol, self.hostname, self.port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::RemoteService;

    #[test]
    fn display_format() {
        let service = RemoteService {
            hostname: "dev1".to_string(),
            ipv4: None,
            instance_name: "MyDevice".to_string(),
            service_name: "_http".to_string(),
            protocol: "_tcp".to_string(),
            port: 80,
        };
        assert_eq!(service.to_string(), "MyDevice._http._tcp on dev1:80");
    }
}
