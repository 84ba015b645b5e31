//! Offer catalog cleaning.
//!
//! The raw `channels` list is exploded into one 0/1 flag per recognized
//! channel and the validity window is converted from days to hours.

use std::collections::BTreeSet;

use crate::config::ChannelSet;
use crate::logs::TableLog;
use crate::models::{EntityId, Offer, RawOffer};

const LOG: TableLog = TableLog::new("offers");

/// Flag each recognized channel present in `raw`, in declared order.
///
/// `raw` is treated as a set: duplicates don't matter and names outside
/// `channels` are ignored.
pub fn channel_flags(raw: &[String], channels: &ChannelSet) -> Vec<bool> {
    channels
        .names()
        .iter()
        .map(|name| raw.iter().any(|r| r == name))
        .collect()
}

/// Days to whole hours, truncated.
pub fn duration_hours(days: f64) -> i64 {
    (days * 24.0).trunc() as i64
}

/// Clean one raw offer.
pub fn clean_offer(raw: RawOffer, channels: &ChannelSet) -> Offer {
    Offer {
        channels: channel_flags(&raw.channels, channels),
        duration_hours: duration_hours(raw.duration),
        offer_id: EntityId::Source(raw.id),
        offer_type: raw.offer_type,
        difficulty: raw.difficulty,
        reward: raw.reward,
    }
}

/// Distinct channel names in `raw` that have no column.
pub fn unknown_channels(raw: &[RawOffer], channels: &ChannelSet) -> BTreeSet<String> {
    raw.iter()
        .flat_map(|offer| offer.channels.iter())
        .filter(|name| !channels.contains(name.as_str()))
        .cloned()
        .collect()
}

/// Clean the offer catalog.
///
/// Never fails. Unrecognized channel names are dropped and reported once per
/// distinct name.
pub fn clean_offers(raw: Vec<RawOffer>, channels: &ChannelSet) -> Vec<Offer> {
    for name in unknown_channels(&raw, channels) {
        LOG.warning(format!("dropping unrecognized channel '{}'", name));
    }

    let offers: Vec<Offer> = raw.into_iter().map(|o| clean_offer(o, channels)).collect();
    LOG.done(format!("{} cleaned", offers.len()));
    offers
}
