//! Search lifecycle: start, cooperative poll, timeout, guaranteed stop.
//!
//! [`run_query`] drives one search against the responder backend and
//! feeds every delivered record to a [`RecordSink`]. Two sinks exist:
//! [`BoundedCollector`] fills a caller-owned buffer and stops the search
//! once it is full, [`GrowableCollector`] accumulates as many matches as
//! memory allows. Both decode records the same way.

#[cfg(feature = "logging")]
use crate::log::{debug, trace};

use crate::dns_parser::{decode_answer, AnswerFlags, DnsAnswer};
use crate::error::{Error, Result};
use crate::responder::{Platform, Protocol, RecordSink, Responder, SearchId, SinkAction};
use crate::service_info::RemoteService;
use std::time::Duration;

/// The one outstanding search of a query. `None` means stopped; the
/// handle is cleared exactly when `stop_search` is issued.
struct SearchSession {
    request: Option<SearchId>,
}

impl SearchSession {
    const fn new(id: SearchId) -> Self {
        Self { request: Some(id) }
    }

    const fn is_active(&self) -> bool {
        self.request.is_some()
    }

    fn take(&mut self) -> Option<SearchId> {
        self.request.take()
    }
}

/// Runs one search to completion.
///
/// Starts the search, then cooperatively polls
/// [`process_events`](Responder::process_events), where all record
/// delivery happens, until the sink asks to stop, the platform reports a
/// pending cancel, or `timeout` elapses. Whatever the exit cause, no
/// search is left outstanding: a still-active session is stopped before
/// returning (stop is idempotent on the backend).
///
/// Timing out or getting cancelled with few or zero results is not an
/// error; only a refused start is, reported as [`Error::StartFailure`].
pub(crate) fn run_query<R, P>(
    responder: &mut R,
    platform: &P,
    service_type: &str,
    protocol: Protocol,
    timeout: Duration,
    sink: &mut dyn RecordSink,
) -> Result<()>
where
    R: Responder,
    P: Platform,
{
    let id = responder
        .start_search(service_type, protocol)
        .map_err(|e| Error::StartFailure(format!("unable to start mDNS query: {}", e)))?;

    debug!("search {:?} started for {}.{}", id, service_type, protocol);

    let mut session = SearchSession::new(id);
    let started = platform.now_millis();
    let timeout_ms = timeout.as_millis() as u64;

    while session.is_active()
        && !platform.cancel_requested()
        && platform.now_millis().saturating_sub(started) < timeout_ms
    {
        // Record delivery happens inside this drain, which also serves
        // as the cooperative yield point.
        if responder.process_events(sink) == SinkAction::Stop {
            if let Some(id) = session.take() {
                responder.stop_search(id);
                trace!("search {:?} stopped by its sink", id);
            }
        }
    }

    // The loop can exit with the search still outstanding, on timeout or
    // cancellation. Never leak it.
    if let Some(id) = session.take() {
        responder.stop_search(id);
        trace!("search {:?} stopped on exit", id);
    }

    Ok(())
}

/// Fills a caller-owned buffer, one entry per completed match.
pub(crate) struct BoundedCollector<'a> {
    out: &'a mut [RemoteService],
    matched: usize,
}

impl<'a> BoundedCollector<'a> {
    pub(crate) fn new(out: &'a mut [RemoteService]) -> Self {
        Self { out, matched: 0 }
    }

    /// Number of fully populated entries.
    pub(crate) const fn matched(&self) -> usize {
        self.matched
    }
}

impl RecordSink for BoundedCollector<'_> {
    fn on_record(
        &mut self,
        answer: &DnsAnswer<'_>,
        payload: &[u8],
        flags: AnswerFlags,
    ) -> SinkAction {
        // Records still in flight after capacity was reached are dropped.
        if self.matched == self.out.len() {
            return SinkAction::Stop;
        }

        decode_answer(answer, payload, &mut self.out[self.matched]);

        if flags.is_last() {
            self.matched += 1;
        }

        if self.matched == self.out.len() {
            SinkAction::Stop
        } else {
            SinkAction::Continue
        }
    }
}

/// Accumulates matches in a growable list, newest last.
pub(crate) struct GrowableCollector {
    services: Vec<RemoteService>,
    alloc_failed: bool,
}

impl GrowableCollector {
    pub(crate) const fn new() -> Self {
        Self {
            services: Vec::new(),
            alloc_failed: false,
        }
    }

    /// Hands the collected services to the caller, in encounter order
    /// (oldest first), each one independently owned.
    ///
    /// An allocation failure that prevented even the first match reports
    /// [`Error::Exhausted`]; one that happened later returns the matches
    /// collected up to that point.
    pub(crate) fn into_services(self) -> Result<Vec<RemoteService>> {
        if self.alloc_failed && self.services.is_empty() {
            return Err(Error::Exhausted(
                "out of memory for the first search result".to_string(),
            ));
        }
        Ok(self.services)
    }
}

impl RecordSink for GrowableCollector {
    fn on_record(
        &mut self,
        answer: &DnsAnswer<'_>,
        payload: &[u8],
        flags: AnswerFlags,
    ) -> SinkAction {
        if flags.is_first() {
            if self.services.try_reserve(1).is_err() {
                self.alloc_failed = true;
                return SinkAction::Stop;
            }
            self.services.push(RemoteService::default());
        }

        // Continuations merge into the newest record.
        if let Some(current) = self.services.last_mut() {
            decode_answer(answer, payload, current);
        }

        SinkAction::Continue
    }
}
