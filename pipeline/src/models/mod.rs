//! Domain models for the Promoclean pipeline.
//!
//! Two families of types live here:
//!
//! - Raw records ([`RawOffer`], [`RawCustomer`], [`RawEvent`]) mirror the
//!   NDJSON input, legacy spellings included.
//! - Clean records ([`Offer`], [`Customer`], [`Event`]) are what the cleaners
//!   produce and the writer persists.
//!
//! Missing values are always `Option::None`; no sentinel survives cleaning.

use chrono::NaiveDate;
use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

/// Dense sequential key assigned by reconciliation, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DenseId(u32);

impl DenseId {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An entity identifier, either as shipped upstream or after reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityId {
    /// Dense integer key.
    Dense(DenseId),
    /// Opaque (usually hashed) source identifier.
    Source(String),
}

impl EntityId {
    /// The lookup key used when building an id mapping.
    ///
    /// Dense ids are keyed by their decimal form, so a table that was already
    /// reconciled re-keys the same way it would after a CSV round trip.
    pub fn key(&self) -> Cow<'_, str> {
        match self {
            EntityId::Source(s) => Cow::Borrowed(s),
            EntityId::Dense(d) => Cow::Owned(d.to_string()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Source(s) => f.write_str(s),
            EntityId::Dense(d) => write!(f, "{}", d),
        }
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId::Source(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Source(value.to_string())
    }
}

impl From<DenseId> for EntityId {
    fn from(value: DenseId) -> Self {
        EntityId::Dense(value)
    }
}

// =============================================================================
// Raw input records
// =============================================================================

/// One line of the offer catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOffer {
    pub id: String,
    #[serde(default)]
    pub channels: Vec<String>,
    pub offer_type: String,
    /// Validity window in days.
    pub duration: f64,
    pub difficulty: f64,
    pub reward: f64,
}

/// `became_member_on` as shipped: the roster has it as an integer, older
/// exports as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MemberSince {
    Number(u64),
    Text(String),
}

impl MemberSince {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            MemberSince::Number(n) => Cow::Owned(n.to_string()),
            MemberSince::Text(s) => Cow::Borrowed(s),
        }
    }
}

/// One line of the customer roster.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCustomer {
    pub id: String,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub income: Option<f64>,
    pub became_member_on: MemberSince,
}

/// Event payload as a partial record over every key the cleaner knows.
///
/// Keys outside this set are ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPayload {
    #[serde(rename = "offer id")]
    pub offer_id_spaced: Option<String>,
    pub offer_id: Option<String>,
    pub amount: Option<f64>,
    pub reward: Option<f64>,
}

/// One line of the event transcript.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub person: String,
    pub event: String,
    pub time: i64,
    #[serde(default)]
    pub value: Option<RawPayload>,
}

// =============================================================================
// Clean records
// =============================================================================

/// A cleaned offer.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub offer_id: EntityId,
    /// One flag per recognized channel, in [`crate::config::ChannelSet`] order.
    pub channels: Vec<bool>,
    pub offer_type: String,
    pub duration_hours: i64,
    pub difficulty: f64,
    pub reward: f64,
}

/// A cleaned customer.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub customer_id: EntityId,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub income: Option<f64>,
    pub became_member_on: NaiveDate,
}

/// Payload fields after the legacy offer id spellings were merged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub amount: Option<f64>,
    pub reward: Option<f64>,
    pub offer_id: Option<EntityId>,
}

pub const OFFER_RECEIVED: &str = "offer_received";
pub const OFFER_VIEWED: &str = "offer_viewed";
pub const OFFER_COMPLETED: &str = "offer_completed";
pub const TRANSACTION: &str = "transaction";

/// What happened in an event, carrying only the fields that kind uses.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    OfferReceived { offer_id: Option<EntityId> },
    OfferViewed { offer_id: Option<EntityId> },
    OfferCompleted { offer_id: Option<EntityId>, reward: Option<f64> },
    Transaction { amount: Option<f64> },
    /// Unknown event names, or a known name whose payload has fields that
    /// kind never carries.
    Other { name: String, payload: Payload },
}

impl EventKind {
    /// Classify a normalized event name and its merged payload.
    pub fn from_parts(name: String, payload: Payload) -> Self {
        let Payload { amount, reward, offer_id } = payload;
        match (name.as_str(), amount, reward) {
            (OFFER_RECEIVED, None, None) => EventKind::OfferReceived { offer_id },
            (OFFER_VIEWED, None, None) => EventKind::OfferViewed { offer_id },
            (OFFER_COMPLETED, None, reward) => EventKind::OfferCompleted { offer_id, reward },
            (TRANSACTION, amount, None) if offer_id.is_none() => EventKind::Transaction { amount },
            _ => EventKind::Other {
                name,
                payload: Payload { amount, reward, offer_id },
            },
        }
    }

    /// Normalized event name.
    pub fn name(&self) -> &str {
        match self {
            EventKind::OfferReceived { .. } => OFFER_RECEIVED,
            EventKind::OfferViewed { .. } => OFFER_VIEWED,
            EventKind::OfferCompleted { .. } => OFFER_COMPLETED,
            EventKind::Transaction { .. } => TRANSACTION,
            EventKind::Other { name, .. } => name,
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            EventKind::Transaction { amount } => *amount,
            EventKind::Other { payload, .. } => payload.amount,
            _ => None,
        }
    }

    pub fn reward(&self) -> Option<f64> {
        match self {
            EventKind::OfferCompleted { reward, .. } => *reward,
            EventKind::Other { payload, .. } => payload.reward,
            _ => None,
        }
    }

    pub fn offer_id(&self) -> Option<&EntityId> {
        self.offer_slot().and_then(|slot| slot.as_ref())
    }

    /// The offer reference slot, if this kind has one.
    pub fn offer_id_mut(&mut self) -> Option<&mut Option<EntityId>> {
        match self {
            EventKind::OfferReceived { offer_id }
            | EventKind::OfferViewed { offer_id }
            | EventKind::OfferCompleted { offer_id, .. } => Some(offer_id),
            EventKind::Other { payload, .. } => Some(&mut payload.offer_id),
            EventKind::Transaction { .. } => None,
        }
    }

    fn offer_slot(&self) -> Option<&Option<EntityId>> {
        match self {
            EventKind::OfferReceived { offer_id }
            | EventKind::OfferViewed { offer_id }
            | EventKind::OfferCompleted { offer_id, .. } => Some(offer_id),
            EventKind::Other { payload, .. } => Some(&payload.offer_id),
            EventKind::Transaction { .. } => None,
        }
    }
}

/// A cleaned transcript event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// `None` once reconciled against a roster that lacks the person.
    pub customer_id: Option<EntityId>,
    pub time: i64,
    pub kind: EventKind,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_key() {
        assert_eq!(EntityId::from("ae264e").key(), "ae264e");
        assert_eq!(EntityId::Dense(DenseId::new(42)).key(), "42");
    }

    #[test]
    fn test_member_since_accepts_both_forms() {
        let n: MemberSince = serde_json::from_str("20170212").unwrap();
        let s: MemberSince = serde_json::from_str("\"20170212\"").unwrap();
        assert_eq!(n.as_text(), "20170212");
        assert_eq!(s.as_text(), "20170212");
    }

    #[test]
    fn test_raw_payload_ignores_unknown_keys() {
        let p: RawPayload =
            serde_json::from_str(r#"{"offer id": "x1", "amount": null, "promo": 3}"#).unwrap();
        assert_eq!(p.offer_id_spaced.as_deref(), Some("x1"));
        assert_eq!(p.offer_id, None);
        assert_eq!(p.amount, None);
    }

    #[test]
    fn test_event_kind_classification() {
        let received = EventKind::from_parts(
            OFFER_RECEIVED.into(),
            Payload { offer_id: Some("o1".into()), ..Default::default() },
        );
        assert!(matches!(received, EventKind::OfferReceived { .. }));
        assert_eq!(received.offer_id(), Some(&EntityId::from("o1")));

        let completed = EventKind::from_parts(
            OFFER_COMPLETED.into(),
            Payload { offer_id: Some("o1".into()), reward: Some(5.0), ..Default::default() },
        );
        assert_eq!(completed.reward(), Some(5.0));

        let tx = EventKind::from_parts(
            TRANSACTION.into(),
            Payload { amount: Some(12.5), ..Default::default() },
        );
        assert_eq!(tx.amount(), Some(12.5));
        assert_eq!(tx.offer_id(), None);
    }

    #[test]
    fn test_unexpected_payload_falls_back_to_other() {
        let kind = EventKind::from_parts(
            OFFER_RECEIVED.into(),
            Payload { amount: Some(1.0), offer_id: Some("o1".into()), ..Default::default() },
        );
        match &kind {
            EventKind::Other { name, payload } => {
                assert_eq!(name, OFFER_RECEIVED);
                assert_eq!(payload.amount, Some(1.0));
            }
            other => panic!("expected Other, got {:?}", other),
        }
        assert_eq!(kind.name(), OFFER_RECEIVED);
        assert_eq!(kind.amount(), Some(1.0));
    }

    #[test]
    fn test_transaction_has_no_offer_slot() {
        let mut tx = EventKind::Transaction { amount: None };
        assert!(tx.offer_id_mut().is_none());
    }
}
