//! Event transcript cleaning.
//!
//! Event names get underscores instead of spaces, and the variable payload is
//! merged once into a [`Payload`] before the event is classified into an
//! [`EventKind`].
//!
//! The payload has carried the offer reference under two spellings over
//! time, `"offer id"` and `"offer_id"`. A record is expected to use at most one
//! of them; seeing both aborts the run.

use std::collections::BTreeMap;

use crate::error::{CleanError, CleanResult};
use crate::logs::TableLog;
use crate::models::{EntityId, Event, EventKind, Payload, RawEvent, RawPayload};

const LOG: TableLog = TableLog::new("transcript");

/// `"offer received"` → `"offer_received"`.
pub fn normalize_event_name(raw: &str) -> String {
    raw.replace(' ', "_")
}

/// Merge the legacy offer id spellings and keep the known payload fields.
pub fn merge_payload(row: usize, raw: RawPayload) -> CleanResult<Payload> {
    let offer_id = match (raw.offer_id, raw.offer_id_spaced) {
        (Some(underscored), Some(spaced)) => {
            return Err(CleanError::ConflictingOfferId { row, spaced, underscored });
        }
        (underscored, spaced) => underscored.or(spaced),
    };

    Ok(Payload {
        amount: raw.amount,
        reward: raw.reward,
        offer_id: offer_id.map(EntityId::Source),
    })
}

/// Clean one raw event. `row` is the 0-based position used in errors.
pub fn clean_event(row: usize, raw: RawEvent) -> CleanResult<Event> {
    let payload = merge_payload(row, raw.value.unwrap_or_default())?;

    Ok(Event {
        customer_id: Some(EntityId::Source(raw.person)),
        time: raw.time,
        kind: EventKind::from_parts(normalize_event_name(&raw.event), payload),
    })
}

/// Clean the event transcript, preserving row order.
pub fn clean_transcript(raw: Vec<RawEvent>) -> CleanResult<Vec<Event>> {
    let events = raw
        .into_iter()
        .enumerate()
        .map(|(row, e)| clean_event(row, e))
        .collect::<CleanResult<Vec<_>>>()?;

    LOG.done(format!("{} cleaned", events.len()));
    for (name, count) in count_by_kind(&events) {
        LOG.detail(format!("{}: {}", name, count));
    }
    Ok(events)
}

/// Number of events per normalized name.
pub fn count_by_kind(events: &[Event]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(event.kind.name()).or_insert(0) += 1;
    }
    counts
}
