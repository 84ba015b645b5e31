//! Identifier reconciliation.
//!
//! Replaces opaque ids with dense integer keys shared by a primary table and a
//! secondary table that references it.
//!
//! # Key assignment
//!
//! ```text
//! primary column    b17  a92  b17  c44        mapping   b17 → 1
//!                    1    2    1    3                   a92 → 2
//! secondary column  a92  z00  b17                       c44 → 3
//!                    2    -    1
//! ```
//!
//! Keys are assigned `1..=N` to the distinct primary values in order of first
//! appearance. The mapping is therefore a function of the primary table's row
//! order, not of the id values: reordering the primary rows changes the keys.
//! Secondary values with no primary counterpart become missing.
//!
//! Which column is re-keyed is chosen at compile time through an
//! [`IdNamespace`] marker, so the same table can take part in several
//! reconciliations (the transcript references both offers and customers).

use std::collections::HashMap;

use crate::logs::TableLog;
use crate::models::{Customer, DenseId, EntityId, Event, Offer};

/// An identifier column shared by a primary and a secondary table.
pub trait IdNamespace {
    /// Column name in the cleaned tables.
    const COLUMN: &'static str;
}

/// Offer ids: portfolio ↔ transcript.
pub enum OfferIds {}

/// Customer ids: profile ↔ transcript.
pub enum CustomerIds {}

impl IdNamespace for OfferIds {
    const COLUMN: &'static str = "offer_id";
}

impl IdNamespace for CustomerIds {
    const COLUMN: &'static str = "customer_id";
}

/// A row of the table that defines the keyspace for `N`.
pub trait PrimaryKey<N: IdNamespace> {
    fn primary_key(&self) -> &EntityId;
    fn set_primary_key(&mut self, id: EntityId);
}

/// A row that references the keyspace for `N`, possibly not at all.
pub trait ForeignKey<N: IdNamespace> {
    fn foreign_key(&self) -> Option<&EntityId>;
    fn set_foreign_key(&mut self, id: Option<EntityId>);
}

/// Dense keys for the distinct values of a primary column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdMapping {
    index: HashMap<String, DenseId>,
    /// Source ids by key; `sources[k - 1]` maps to key `k`.
    sources: Vec<String>,
}

impl IdMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from source ids in row order.
    pub fn from_sources<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = Self::new();
        for id in ids {
            mapping.insert(id.as_ref());
        }
        mapping
    }

    /// Build a mapping from a primary column in row order.
    pub fn from_primary<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a EntityId>,
    {
        Self::from_sources(ids.into_iter().map(|id| id.key()))
    }

    /// Key for `source`, assigning the next one on first sight.
    pub fn insert(&mut self, source: &str) -> DenseId {
        if let Some(&dense) = self.index.get(source) {
            return dense;
        }
        let dense = DenseId::new(self.sources.len() as u32 + 1);
        self.index.insert(source.to_string(), dense);
        self.sources.push(source.to_string());
        dense
    }

    pub fn get(&self, source: &str) -> Option<DenseId> {
        self.index.get(source).copied()
    }

    pub fn lookup(&self, id: &EntityId) -> Option<DenseId> {
        self.get(&id.key())
    }

    /// Source id a dense key was assigned to.
    pub fn original(&self, dense: DenseId) -> Option<&str> {
        let position = (dense.get() as usize).checked_sub(1)?;
        self.sources.get(position).map(String::as_str)
    }

    /// Number of distinct primary values (N).
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// `(key, source id)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (DenseId, &str)> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, source)| (DenseId::new(i as u32 + 1), source.as_str()))
    }

    /// Re-key the primary column in place.
    pub fn apply_primary<N, P>(&self, rows: &mut [P])
    where
        N: IdNamespace,
        P: PrimaryKey<N>,
    {
        for row in rows {
            if let Some(dense) = self.lookup(row.primary_key()) {
                row.set_primary_key(EntityId::Dense(dense));
            }
        }
    }

    /// Re-key a secondary column in place. Returns how many present ids had
    /// no mapping and were cleared.
    pub fn apply_secondary<N, S>(&self, rows: &mut [S]) -> usize
    where
        N: IdNamespace,
        S: ForeignKey<N>,
    {
        let mut unmapped = 0;
        for row in rows {
            let Some(current) = row.foreign_key() else {
                continue;
            };
            let dense = self.lookup(current);
            if dense.is_none() {
                unmapped += 1;
            }
            row.set_foreign_key(dense.map(EntityId::Dense));
        }
        unmapped
    }
}

/// Both tables after reconciliation.
#[derive(Debug, Clone)]
pub struct Reconciled<P, S> {
    pub primary: Vec<P>,
    pub secondary: Vec<S>,
    pub mapping: IdMapping,
    /// Secondary rows whose id had no primary counterpart
    pub unmapped: usize,
}

impl<P, S> Reconciled<P, S> {
    pub fn into_parts(self) -> (Vec<P>, Vec<S>, IdMapping) {
        (self.primary, self.secondary, self.mapping)
    }
}

/// Replace the `N` column of both tables with dense keys `1..=N`.
///
/// Keys follow the first appearance of each value in `primary`; all other
/// columns and the row order of both tables are untouched.
///
/// # Example
///
/// ```rust,ignore
/// use promoclean::transform::reconcile::{reconcile_ids, OfferIds};
///
/// let result = reconcile_ids::<OfferIds, _, _>(offers, events);
/// println!("{} offers, {} unmatched references", result.mapping.len(), result.unmapped);
/// ```
pub fn reconcile_ids<N, P, S>(mut primary: Vec<P>, mut secondary: Vec<S>) -> Reconciled<P, S>
where
    N: IdNamespace,
    P: PrimaryKey<N>,
    S: ForeignKey<N>,
{
    let mapping = IdMapping::from_primary(primary.iter().map(|row| row.primary_key()));
    mapping.apply_primary::<N, _>(&mut primary);
    let unmapped = mapping.apply_secondary::<N, _>(&mut secondary);

    let log = TableLog::new(N::COLUMN);
    log.done(format!("{} distinct ids", mapping.len()));
    if unmapped > 0 {
        log.warning(format!("{} references have no match and were left empty", unmapped));
    }

    Reconciled {
        primary,
        secondary,
        mapping,
        unmapped,
    }
}

// =============================================================================
// Table bindings
// =============================================================================

impl PrimaryKey<OfferIds> for Offer {
    fn primary_key(&self) -> &EntityId {
        &self.offer_id
    }

    fn set_primary_key(&mut self, id: EntityId) {
        self.offer_id = id;
    }
}

impl PrimaryKey<CustomerIds> for Customer {
    fn primary_key(&self) -> &EntityId {
        &self.customer_id
    }

    fn set_primary_key(&mut self, id: EntityId) {
        self.customer_id = id;
    }
}

impl ForeignKey<OfferIds> for Event {
    fn foreign_key(&self) -> Option<&EntityId> {
        self.kind.offer_id()
    }

    fn set_foreign_key(&mut self, id: Option<EntityId>) {
        if let Some(slot) = self.kind.offer_id_mut() {
            *slot = id;
        }
    }
}

impl ForeignKey<CustomerIds> for Event {
    fn foreign_key(&self) -> Option<&EntityId> {
        self.customer_id.as_ref()
    }

    fn set_foreign_key(&mut self, id: Option<EntityId>) {
        self.customer_id = id;
    }
}
