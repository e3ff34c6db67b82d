//! Bookkeeping of locally advertised services.

#[cfg(feature = "logging")]
use crate::log::debug;

use crate::error::{Error, Result};
use crate::responder::{Protocol, Responder};

/// Max number of services advertised at once, matching the service slot
/// capacity of typical embedded responder backends.
pub const MAX_SERVICES: usize = 4;

/// Slot-indexed map of advertised service types. Indices mirror the slot
/// the responder backend assigned; `None` marks a vacant slot.
pub(crate) struct ServiceRegistry {
    slots: [Option<String>; MAX_SERVICES],
}

impl ServiceRegistry {
    pub(crate) fn new() -> Self {
        Self {
            slots: Default::default(),
        }
    }

    /// Advertises a service, replacing any prior registration of the same
    /// service type: the old slot is withdrawn from the responder before
    /// the new one is added, so protocol and port changes take effect
    /// instead of piling up duplicates.
    ///
    /// Fails with [`Error::Exhausted`] when no slot is free.
    pub(crate) fn advertise<R: Responder>(
        &mut self,
        responder: &mut R,
        instance_name: &str,
        service_type: &str,
        protocol: Protocol,
        port: u16,
    ) -> Result<usize> {
        let existing = self
            .slots
            .iter()
            .position(|slot| slot.as_deref() == Some(service_type));
        match existing {
            Some(slot) => {
                debug!("advertise: replacing {} in slot {}", service_type, slot);
                responder.remove_service(slot);
                self.slots[slot] = None;
            }
            None => {
                if self.slots.iter().all(|slot| slot.is_some()) {
                    return Err(Error::Exhausted(format!(
                        "no free service slot for {}",
                        service_type
                    )));
                }
            }
        }

        let slot = responder
            .add_service(instance_name, service_type, protocol, port)
            .map_err(|e| Error::Exhausted(format!("out of mDNS service slots: {}", e)))?;

        let entry = self
            .slots
            .get_mut(slot)
            .ok_or_else(|| e_fmt!("responder assigned out-of-range slot {}", slot))?;
        *entry = Some(service_type.to_string());

        Ok(slot)
    }

    /// Drops all bookkeeping. Used on deinit, after the responder
    /// identity is unbound (which withdraws the services themselves).
    pub(crate) fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }

    #[cfg(test)]
    fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::{RecordSink, SearchId, SinkAction};

    /// Records add/remove calls; slot assignment is first-free, like the
    /// backends this models.
    struct SlotResponder {
        services: Vec<Option<(String, Protocol, u16)>>,
        removed: Vec<usize>,
    }

    impl SlotResponder {
        fn new(capacity: usize) -> Self {
            Self {
                services: vec![None; capacity],
                removed: Vec::new(),
            }
        }
    }

    impl Responder for SlotResponder {
        fn init(&mut self) -> Result<()> {
            Ok(())
        }

        fn bind_identity(&mut self, _hostname: &str) -> Result<()> {
            Ok(())
        }

        fn rename_identity(&mut self, _hostname: &str) -> Result<()> {
            Ok(())
        }

        fn unbind_identity(&mut self) -> Result<()> {
            Ok(())
        }

        fn add_secondary_hostname(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }

        fn add_service(
            &mut self,
            _instance_name: &str,
            service_type: &str,
            protocol: Protocol,
            port: u16,
        ) -> Result<usize> {
            let slot = self
                .services
                .iter()
                .position(|s| s.is_none())
                .ok_or_else(|| Error::Msg("backend out of slots".to_string()))?;
            self.services[slot] = Some((service_type.to_string(), protocol, port));
            Ok(slot)
        }

        fn remove_service(&mut self, slot: usize) {
            self.services[slot] = None;
            self.removed.push(slot);
        }

        fn start_search(&mut self, _service_type: &str, _protocol: Protocol) -> Result<SearchId> {
            Err(Error::Msg("not a querier".to_string()))
        }

        fn stop_search(&mut self, _id: SearchId) {}

        fn process_events(&mut self, _sink: &mut dyn RecordSink) -> SinkAction {
            SinkAction::Continue
        }
    }

    #[test]
    fn advertise_twice_replaces_not_duplicates() {
        let mut responder = SlotResponder::new(MAX_SERVICES);
        let mut registry = ServiceRegistry::new();

        registry
            .advertise(&mut responder, "inst", "_http", Protocol::Tcp, 80)
            .unwrap();
        registry
            .advertise(&mut responder, "inst", "_http", Protocol::Tcp, 8080)
            .unwrap();

        assert_eq!(registry.occupied(), 1);
        assert_eq!(responder.removed, vec![0]);
        let advertised: Vec<_> = responder.services.iter().flatten().collect();
        assert_eq!(advertised.len(), 1);
        assert_eq!(advertised[0].2, 8080);
    }

    #[test]
    fn distinct_types_get_distinct_slots() {
        let mut responder = SlotResponder::new(MAX_SERVICES);
        let mut registry = ServiceRegistry::new();

        let a = registry
            .advertise(&mut responder, "inst", "_http", Protocol::Tcp, 80)
            .unwrap();
        let b = registry
            .advertise(&mut responder, "inst", "_osc", Protocol::Udp, 9000)
            .unwrap();

        assert_ne!(a, b);
        assert_eq!(registry.occupied(), 2);
        assert!(responder.removed.is_empty());
    }

    #[test]
    fn full_registry_is_exhausted() {
        let mut responder = SlotResponder::new(MAX_SERVICES);
        let mut registry = ServiceRegistry::new();

        for i in 0..MAX_SERVICES {
            registry
                .advertise(&mut responder, "inst", &format!("_svc{}", i), Protocol::Udp, 7000)
                .unwrap();
        }

        let result = registry.advertise(&mut responder, "inst", "_late", Protocol::Udp, 7001);
        assert!(matches!(result, Err(Error::Exhausted(_))));

        // Replacing an existing type still works at capacity.
        registry
            .advertise(&mut responder, "inst", "_svc0", Protocol::Udp, 7100)
            .unwrap();
        assert_eq!(registry.occupied(), MAX_SERVICES);
    }

    #[test]
    fn out_of_range_backend_slot_is_rejected() {
        // A backend with more slots than the registry tracks, with the
        // in-range ones already taken so the next assignment lands past
        // the registry's bookkeeping.
        let mut responder = SlotResponder::new(MAX_SERVICES + 1);
        for slot in 0..MAX_SERVICES {
            responder.services[slot] = Some(("_taken".to_string(), Protocol::Udp, 7000));
        }
        let mut registry = ServiceRegistry::new();

        let result = registry.advertise(&mut responder, "inst", "_http", Protocol::Tcp, 80);
        assert!(matches!(result, Err(Error::Msg(_))));
        assert_eq!(registry.occupied(), 0);
    }

    #[test]
    fn backend_refusal_maps_to_exhausted() {
        // A backend with fewer slots than the registry itself.
        let mut responder = SlotResponder::new(1);
        let mut registry = ServiceRegistry::new();

        registry
            .advertise(&mut responder, "inst", "_http", Protocol::Tcp, 80)
            .unwrap();
        let result = registry.advertise(&mut responder, "inst", "_osc", Protocol::Udp, 9000);
        assert!(matches!(result, Err(Error::Exhausted(_))));
    }

    #[test]
    fn clear_vacates_everything() {
        let mut responder = SlotResponder::new(MAX_SERVICES);
        let mut registry = ServiceRegistry::new();
        registry
            .advertise(&mut responder, "inst", "_http", Protocol::Tcp, 80)
            .unwrap();

        registry.clear();
        assert_eq!(registry.occupied(), 0);
    }
}
