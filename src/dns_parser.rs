//! Decoding of answer records delivered by the responder backend.
//!
//! The backend hands over each answer as a record type tag, the record's
//! domain name as raw length-prefixed labels (no compression pointers and
//! no terminating zero label) and the record's variable-length data.
//! [`decode_answer`] merges one such answer into a [`RemoteService`],
//! treating the input as untrusted: declared label lengths are clamped to
//! both the destination limit and the bytes actually present.

#[cfg(feature = "logging")]
use crate::log::trace;
use crate::service_info::RemoteService;
use std::fmt;
use std::net::Ipv4Addr;

/// DNS resource record types, stored as `u16`. Can do `as u16` when needed.
///
/// See [RFC 1035 section 3.2.2](https://datatracker.ietf.org/doc/html/rfc1035#section-3.2.2)
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
#[repr(u16)]
pub enum RRType {
    /// DNS record type for IPv4 address
    A = 1,

    /// DNS record type for Pointer
    PTR = 12,

    /// DNS record type for Text (properties)
    TXT = 16,

    /// DNS record type for IPv6 address
    AAAA = 28,

    /// DNS record type for Service
    SRV = 33,

    /// DNS record type for any records (wildcard)
    ANY = 255,
}

impl RRType {
    /// Converts `u16` into `RRType` if possible.
    pub const fn from_u16(value: u16) -> Option<RRType> {
        match value {
            1 => Some(RRType::A),
            12 => Some(RRType::PTR),
            16 => Some(RRType::TXT),
            28 => Some(RRType::AAAA),
            33 => Some(RRType::SRV),
            255 => Some(RRType::ANY),
            _ => None,
        }
    }
}

impl fmt::Display for RRType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RRType::A => write!(f, "TYPE_A"),
            RRType::PTR => write!(f, "TYPE_PTR"),
            RRType::TXT => write!(f, "TYPE_TXT"),
            RRType::AAAA => write!(f, "TYPE_AAAA"),
            RRType::SRV => write!(f, "TYPE_SRV"),
            RRType::ANY => write!(f, "TYPE_ANY"),
        }
    }
}

/// Max bytes copied into a hostname or instance name, one DNS label.
pub const MAX_NAME_LEN: usize = 63;

/// Max bytes copied into the short service name, e.g. `_http`.
pub const MAX_SERVICE_NAME_LEN: usize = 16;

/// Max bytes copied into the protocol tag, e.g. `_tcp`.
pub const MAX_PROTO_LEN: usize = 4;

/// FIRST / LAST bits attached to a delivered answer record.
///
/// The records of one logical match arrive as a FIRST delivery, zero or
/// more continuations and a LAST delivery, in that relative order.
/// Matches for different names have no ordering relative to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnswerFlags(u8);

impl AnswerFlags {
    /// First record of a newly distinguished match.
    pub const FIRST: AnswerFlags = AnswerFlags(0x01);

    /// Final record of a match; the match is complete after this delivery.
    pub const LAST: AnswerFlags = AnswerFlags(0x02);

    /// Returns true if all bits of `other` are set in `self`.
    pub const fn contains(self, other: AnswerFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_first(self) -> bool {
        self.contains(AnswerFlags::FIRST)
    }

    pub const fn is_last(self) -> bool {
        self.contains(AnswerFlags::LAST)
    }
}

impl std::ops::BitOr for AnswerFlags {
    type Output = AnswerFlags;

    fn bitor(self, rhs: AnswerFlags) -> AnswerFlags {
        AnswerFlags(self.0 | rhs.0)
    }
}

/// One answer record as handed over by the responder backend.
#[derive(Debug, Clone, Copy)]
pub struct DnsAnswer<'a> {
    /// Resource record type of this answer.
    pub ty: RRType,

    /// The record's domain name as length-prefixed labels. This is not a
    /// NUL-terminated string.
    pub name: &'a [u8],
}

/// Reads the length-prefixed label at `*offset`, clamped to `max` bytes
/// and to the bytes actually present. The offset advances by the full
/// `1 + declared_len` so an over-declared label still skips its extent;
/// a walk past the end of `name` returns `None`.
fn take_label<'a>(name: &'a [u8], offset: &mut usize, max: usize) -> Option<&'a [u8]> {
    let declared = *name.get(*offset)? as usize;
    let start = *offset + 1;
    let avail = name.len().saturating_sub(start);
    let copy_len = declared.min(max).min(avail);
    *offset = start + declared;
    Some(&name[start..start + copy_len])
}

fn set_field(field: &mut String, bytes: &[u8]) {
    field.clear();
    field.push_str(&String::from_utf8_lossy(bytes));
}

/// Merges one answer record into `out`.
///
/// Only A and SRV records carry data for a [`RemoteService`]. Any other
/// record type, and any record with an empty payload, leaves `out`
/// untouched, so fields decoded from earlier records survive. Safe to
/// call repeatedly for the same match as more of its records arrive.
///
/// - A record: the first label of the name becomes the hostname; the
///   first four payload bytes become the IPv4 address.
/// - SRV record: the name encodes instance name, short service name and
///   protocol tag as three consecutive labels; the port sits big-endian
///   at payload bytes 4..6, after priority and weight.
pub fn decode_answer(answer: &DnsAnswer<'_>, payload: &[u8], out: &mut RemoteService) {
    if payload.is_empty() {
        return;
    }

    match answer.ty {
        RRType::A => {
            let mut offset = 0;
            if let Some(label) = take_label(answer.name, &mut offset, MAX_NAME_LEN) {
                set_field(&mut out.hostname, label);
            }
            if payload.len() >= 4 {
                out.ipv4 = Some(Ipv4Addr::new(payload[0], payload[1], payload[2], payload[3]));
            }
        }
        RRType::SRV => {
            let mut offset = 0;
            if let Some(label) = take_label(answer.name, &mut offset, MAX_NAME_LEN) {
                set_field(&mut out.instance_name, label);
            }
            if let Some(label) = take_label(answer.name, &mut offset, MAX_SERVICE_NAME_LEN) {
                set_field(&mut out.service_name, label);
            }
            if let Some(label) = take_label(answer.name, &mut offset, MAX_PROTO_LEN) {
                set_field(&mut out.protocol, label);
            }
            if payload.len() >= 6 {
                out.port = u16::from_be_bytes([payload[4], payload[5]]);
            }
        }
        other => {
            trace!("decode_answer: ignoring record type {}", other);
        }
    }
}
