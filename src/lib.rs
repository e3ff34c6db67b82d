//! A small and safe engine for mDNS Service Discovery on one network
//! interface of a resource-constrained device.
//!
//! This crate owns the service-discovery logic: the advertised identity
//! (hostname and instance name), the bookkeeping of locally advertised
//! services, the search lifecycle with its timeout and cancellation
//! handling, and the decoding of answer records into typed results. The
//! mDNS wire protocol itself (multicast sockets, packet framing, name
//! compression) is driven through a pluggable [`Responder`] backend,
//! typically a thin binding over the platform's resolver/responder
//! library. There is no socket I/O, no thread and no async runtime in
//! here: everything runs cooperatively on the caller's task.
//!
//! # Usage
//!
//! Bring a [`Responder`] and a [`Platform`] implementation for your
//! target, then create a [`Server`]:
//!
//! ```rust,ignore
//! use mdns_lite::Server;
//! use std::time::Duration;
//!
//! let mut server = Server::new(responder, platform, &wifi_station)?;
//!
//! // Advertise a local service.
//! server.advertise_service("_http", "_tcp", 80)?;
//!
//! // Discover remote services, waiting up to two seconds.
//! let found = server.find("_http", "_tcp", Duration::from_secs(2))?;
//! for service in &found {
//!     println!("found {}", service);
//! }
//! ```
//!
//! All record delivery happens inside [`Responder::process_events`],
//! which the search loop polls cooperatively until the timeout elapses,
//! a cancel is requested or the result buffer fills up. A search that
//! finds nothing returns an empty result, not an error.

#![forbid(unsafe_code)]

// log for logging (optional).
#[cfg(feature = "logging")]
pub(crate) mod log {
    pub(crate) use ::log::{debug, error, trace};
}

#[cfg(not(feature = "logging"))]
#[macro_use]
pub(crate) mod log {
    macro_rules! debug {
        ($($arg:expr),*) => {
            {
                let _ = ($($arg),*); // avoid warnings about unused variables.
            }
        };
    }
    macro_rules! error {
        ($($arg:expr),*) => {
            {
                let _ = ($($arg),*);
            }
        };
    }
    macro_rules! trace {
        ($($arg:expr),*) => {
            {
                let _ = ($($arg),*);
            }
        };
    }
}

/// A simple macro to report all kinds of errors.
macro_rules! e_fmt {
    ($($arg:tt)+) => {
        crate::error::Error::Msg(format!($($arg)+))
    };
}

mod dns_parser;
mod error;
mod registry;
mod responder;
mod search;
mod server;
mod service_info;

pub use crate::dns_parser::{
    AnswerFlags, DnsAnswer, RRType, MAX_NAME_LEN, MAX_PROTO_LEN, MAX_SERVICE_NAME_LEN,
};
pub use crate::error::{Error, Result};
pub use crate::registry::MAX_SERVICES;
pub use crate::responder::{
    InterfaceRole, NetworkInterface, Platform, Protocol, RecordSink, Responder, SearchId,
    SinkAction,
};
pub use crate::server::{Server, DEFAULT_HOSTNAME_PREFIX};
pub use crate::service_info::RemoteService;
