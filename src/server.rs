//! The server façade: identity, advertisement and discovery.

#[cfg(feature = "logging")]
use crate::log::{debug, error};

use crate::error::{Error, Result};
use crate::registry::ServiceRegistry;
use crate::responder::{InterfaceRole, NetworkInterface, Platform, Protocol, Responder};
use crate::search::{run_query, BoundedCollector, GrowableCollector};
use crate::service_info::RemoteService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Tracks whether an identity is active anywhere in the process. This
/// forces a single active server at a time; deinited servers free the
/// slot for a new one.
static ACTIVE_IDENTITY: AtomicBool = AtomicBool::new(false);

/// Prefix of the default hostname derived from the MAC address.
pub const DEFAULT_HOSTNAME_PREFIX: &str = "mdns-";

/// An mDNS server identity bound to one network interface.
///
/// Owns the advertised hostname and services and runs discovery queries
/// through its [`Responder`] backend. Only one active server may exist
/// per process; [`deinit`](Server::deinit) (or dropping the server)
/// frees the slot.
pub struct Server<R: Responder, P: Platform> {
    responder: R,
    platform: P,
    hostname: String,
    instance_name: String,
    hostname_max: usize,
    bound: bool,
    active: bool,
    registry: ServiceRegistry,
}

impl<R: Responder, P: Platform> Server<R, P> {
    /// Creates the server: claims the process-wide identity slot, binds
    /// the interface and answers for a default hostname derived from the
    /// MAC address (`mdns-` plus its last three bytes in lowercase hex).
    /// The default instance name is the default hostname.
    ///
    /// Fails with [`Error::Config`] if `iface` is not a station-mode
    /// interface or another server is already active; a failed attempt
    /// leaves the already-active server untouched.
    pub fn new(responder: R, platform: P, iface: &dyn NetworkInterface) -> Result<Self> {
        if iface.role() != InterfaceRole::Station {
            return Err(Error::Config(
                "mDNS only works with a station-mode interface".to_string(),
            ));
        }

        // Single-writer claim of the process-wide slot; a losing
        // contender must not disturb the winner.
        if ACTIVE_IDENTITY
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Config("mDNS already initialized".to_string()));
        }

        let mac = iface.hardware_address();
        let default_hostname = format!(
            "{}{:02x}{:02x}{:02x}",
            DEFAULT_HOSTNAME_PREFIX, mac[3], mac[4], mac[5]
        );

        let mut server = Self {
            responder,
            platform,
            hostname: String::new(),
            instance_name: default_hostname.clone(),
            hostname_max: iface.max_hostname_len(),
            bound: false,
            active: true,
            registry: ServiceRegistry::new(),
        };

        let setup = server
            .responder
            .init()
            .and_then(|_| server.set_hostname(&default_hostname));
        if let Err(e) = setup {
            // Undo the claim so the next attempt can succeed.
            server.active = false;
            ACTIVE_IDENTITY.store(false, Ordering::Release);
            return Err(e);
        }

        debug!("mDNS server active as '{}'", server.hostname);
        Ok(server)
    }

    fn check_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(Error::Logic("mDNS server is deinited".to_string()))
        }
    }

    /// The hostname currently answered for on the bound interface.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Answers for a new hostname: renames the bound identity, or
    /// performs the initial bind if none exists yet.
    pub fn set_hostname(&mut self, hostname: &str) -> Result<()> {
        self.check_active()?;
        if hostname.len() > self.hostname_max {
            return Err(Error::Config(format!(
                "hostname '{}' exceeds the interface limit of {} bytes",
                hostname, self.hostname_max
            )));
        }

        if self.bound {
            self.responder.rename_identity(hostname)?;
        } else {
            self.responder.bind_identity(hostname)?;
            self.bound = true;
        }

        self.hostname.clear();
        self.hostname.push_str(hostname);
        Ok(())
    }

    /// The instance name used for services advertised from now on.
    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Sets the instance name. Services already advertised keep the name
    /// they were registered with.
    pub fn set_instance_name(&mut self, name: &str) -> Result<()> {
        self.check_active()?;
        self.instance_name.clear();
        self.instance_name.push_str(name);
        Ok(())
    }

    /// Answers for an extra hostname alias besides
    /// [`hostname`](Server::hostname). Backends support only a few
    /// aliases; exceeding that capacity fails.
    pub fn add_secondary_hostname(&mut self, name: &str) -> Result<()> {
        self.check_active()?;
        self.responder.add_secondary_hostname(name)
    }

    /// Advertises a service of `service_type` on `port`.
    ///
    /// Re-advertising an already-published type replaces the prior
    /// registration, so a changed protocol or port takes effect. The
    /// protocol label follows DNS-SD naming: `"_tcp"` selects TCP, any
    /// other label falls back to UDP (see [`Protocol::from_label`]).
    pub fn advertise_service(
        &mut self,
        service_type: &str,
        protocol: &str,
        port: u16,
    ) -> Result<()> {
        self.check_active()?;
        let proto = Protocol::from_label(protocol);
        let slot = self.registry.advertise(
            &mut self.responder,
            &self.instance_name,
            service_type,
            proto,
            port,
        )?;
        debug!(
            "advertising {}.{} port {} in slot {}",
            service_type, proto, port, slot
        );
        Ok(())
    }

    /// Searches for services of `service_type`, collecting all matches
    /// seen before `timeout` elapses or a pending cancel is observed.
    ///
    /// Finding nothing is not an error: the result is simply empty. A
    /// search the backend refuses to start fails with
    /// [`Error::StartFailure`]. Matches come back in encounter order,
    /// each one independently owned.
    pub fn find(
        &mut self,
        service_type: &str,
        protocol: &str,
        timeout: Duration,
    ) -> Result<Vec<RemoteService>> {
        self.check_active()?;
        let proto = Protocol::from_label(protocol);
        let mut collector = GrowableCollector::new();
        run_query(
            &mut self.responder,
            &self.platform,
            service_type,
            proto,
            timeout,
            &mut collector,
        )?;
        collector.into_services()
    }

    /// Like [`find`](Server::find), but fills the caller-provided buffer
    /// and returns the number of completed matches. The search stops
    /// early once the buffer is full.
    pub fn find_into(
        &mut self,
        service_type: &str,
        protocol: &str,
        timeout: Duration,
        out: &mut [RemoteService],
    ) -> Result<usize> {
        self.check_active()?;
        let proto = Protocol::from_label(protocol);
        let mut collector = BoundedCollector::new(out);
        run_query(
            &mut self.responder,
            &self.platform,
            service_type,
            proto,
            timeout,
            &mut collector,
        )?;
        Ok(collector.matched())
    }

    /// Shuts the identity down: unbinds the interface entry, withdrawing
    /// the advertised services with it, and frees the process-wide slot
    /// for a new server. Idempotent. Every other operation on a deinited
    /// server fails with [`Error::Logic`]; a deinited server cannot be
    /// reactivated.
    pub fn deinit(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.registry.clear();
        if self.bound {
            self.bound = false;
            if let Err(e) = self.responder.unbind_identity() {
                error!("failed to unbind mDNS identity: {}", e);
            }
        }
        ACTIVE_IDENTITY.store(false, Ordering::Release);
        debug!("mDNS server deinited");
    }

    /// True once [`deinit`](Server::deinit) has run.
    pub fn is_deinited(&self) -> bool {
        !self.active
    }
}

impl<R: Responder, P: Platform> Drop for Server<R, P> {
    fn drop(&mut self) {
        self.deinit();
    }
}
