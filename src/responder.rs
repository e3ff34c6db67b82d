//! Contracts for the collaborators this engine drives.
//!
//! [`Responder`] is the resolver/responder library that owns the mDNS
//! wire protocol (multicast sockets, packet framing, name compression,
//! TTL handling), bound to one network interface. [`Platform`] provides
//! the host runtime's clock and interrupt check, and [`NetworkInterface`]
//! describes the interface a [`Server`](crate::Server) binds to.

use crate::dns_parser::{AnswerFlags, DnsAnswer};
use crate::error::Result;
use std::fmt;

/// Transport protocol of a service, per DNS-SD naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

impl Protocol {
    /// Maps a DNS-SD protocol label to the enum.
    ///
    /// `"_tcp"` maps to TCP; any other string, recognized or not, falls
    /// back to UDP. Long-standing callers rely on this fallback, so
    /// unknown labels are accepted rather than rejected.
    pub fn from_label(label: &str) -> Protocol {
        if label == "_tcp" {
            Protocol::Tcp
        } else {
            Protocol::Udp
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Udp => write!(f, "_udp"),
            Protocol::Tcp => write!(f, "_tcp"),
        }
    }
}

/// Identifier of an outstanding search, assigned by the responder backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchId(pub u32);

/// Whether a record sink wants more deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkAction {
    /// Keep delivering records.
    Continue,

    /// Stop the search. Records still in flight are dropped.
    Stop,
}

/// Visitor for answer records, invoked while draining network events.
pub trait RecordSink {
    /// Called once per answer record of the active search, with the raw
    /// record data and its FIRST/LAST flags.
    fn on_record(
        &mut self,
        answer: &DnsAnswer<'_>,
        payload: &[u8],
        flags: AnswerFlags,
    ) -> SinkAction;
}

/// The resolver/responder library, bound to one network interface.
///
/// All methods are called from the single cooperative task that owns the
/// [`Server`](crate::Server); implementations need no locking.
pub trait Responder {
    /// One-time setup of the responder, called during server construction.
    fn init(&mut self) -> Result<()>;

    /// Starts answering hostname queries for `hostname` on the interface.
    fn bind_identity(&mut self, hostname: &str) -> Result<()>;

    /// Renames an already-bound identity.
    fn rename_identity(&mut self, hostname: &str) -> Result<()>;

    /// Stops answering for the identity and withdraws its services.
    fn unbind_identity(&mut self) -> Result<()>;

    /// Adds an extra hostname alias. Backends support a limited number of
    /// aliases and fail once that capacity is reached.
    fn add_secondary_hostname(&mut self, name: &str) -> Result<()>;

    /// Advertises a service and returns the slot index assigned to it.
    /// Fails when the backend is out of service slots.
    fn add_service(
        &mut self,
        instance_name: &str,
        service_type: &str,
        protocol: Protocol,
        port: u16,
    ) -> Result<usize>;

    /// Withdraws the service in `slot`.
    fn remove_service(&mut self, slot: usize);

    /// Starts a search for `service_type` and returns its id.
    fn start_search(&mut self, service_type: &str, protocol: Protocol) -> Result<SearchId>;

    /// Stops the search `id`. Must be a no-op if already stopped.
    fn stop_search(&mut self, id: SearchId);

    /// Drains pending network events, invoking `sink` once per answer
    /// record addressed to the active search. Once `sink` returns
    /// [`SinkAction::Stop`], delivery stops for the rest of this drain
    /// and `Stop` is returned; otherwise [`SinkAction::Continue`].
    ///
    /// This doubles as the cooperative yield point of the search poll
    /// loop, so backends should do their non-blocking I/O work here.
    fn process_events(&mut self, sink: &mut dyn RecordSink) -> SinkAction;
}

/// Clock and cancellation primitives of the host runtime.
pub trait Platform {
    /// Monotonic milliseconds since an arbitrary epoch.
    fn now_millis(&self) -> u64;

    /// True when an external interrupt asks the current operation to stop.
    fn cancel_requested(&self) -> bool {
        false
    }
}

/// Which role a Wi-Fi interface is operating in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceRole {
    /// Station (client) mode. mDNS runs here.
    Station,

    /// Access-point mode, not supported for mDNS.
    AccessPoint,
}

/// The network interface a server binds to.
pub trait NetworkInterface {
    fn role(&self) -> InterfaceRole;

    /// The interface's hardware (MAC) address.
    fn hardware_address(&self) -> [u8; 6];

    /// Longest hostname the interface accepts, in bytes.
    fn max_hostname_len(&self) -> usize {
        63
    }
}

#[cfg(test)]
mod tests {
    use super::Protocol;

    #[test]
    fn protocol_label_fallback_is_udp() {
        assert_eq!(Protocol::from_label("_tcp"), Protocol::Tcp);
        assert_eq!(Protocol::from_label("_udp"), Protocol::Udp);
        // Unrecognized labels keep the legacy UDP fallback.
        assert_eq!(Protocol::from_label("_quic"), Protocol::Udp);
        assert_eq!(Protocol::from_label(""), Protocol::Udp);
    }
}
