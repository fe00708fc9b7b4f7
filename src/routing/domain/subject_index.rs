//! Derived lookup from subject to capable specialists.

use super::{Specialist, SpecialistId, Subject};
use std::collections::HashMap;

/// Subject to specialist lookup kept in registration order.
///
/// The index is a cache over the registry: for every subject it holds exactly
/// the specialists whose capability set contains that subject, ordered by
/// registration sequence. [`SubjectIndex::rebuild`] and the incremental
/// [`SubjectIndex::insert`]/[`SubjectIndex::remove`] pair always agree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectIndex {
    entries: HashMap<Subject, Vec<IndexEntry>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexEntry {
    registration_seq: u64,
    id: SpecialistId,
}

impl SubjectIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from scratch.
    pub fn rebuild<'a>(specialists: impl IntoIterator<Item = &'a Specialist>) -> Self {
        let mut index = Self::new();
        for specialist in specialists {
            for subject in specialist.capabilities().iter() {
                index.insert(subject, specialist.id(), specialist.registration_seq());
            }
        }
        index
    }

    /// Adds `id` under `subject` at its registration-order position.
    ///
    /// Does nothing when the specialist is already listed.
    pub fn insert(&mut self, subject: Subject, id: SpecialistId, registration_seq: u64) {
        let bucket = self.entries.entry(subject).or_default();
        if bucket.iter().any(|entry| entry.id == id) {
            return;
        }
        let position = bucket.partition_point(|entry| entry.registration_seq < registration_seq);
        bucket.insert(position, IndexEntry { registration_seq, id });
    }

    /// Strikes `id` from the `subject` entry.
    pub fn remove(&mut self, subject: Subject, id: SpecialistId) {
        if let Some(bucket) = self.entries.get_mut(&subject) {
            bucket.retain(|entry| entry.id != id);
            if bucket.is_empty() {
                self.entries.remove(&subject);
            }
        }
    }

    /// Returns every specialist capable of `subject`, in registration order.
    pub fn capable(&self, subject: Subject) -> impl Iterator<Item = SpecialistId> + '_ {
        self.entries
            .get(&subject)
            .into_iter()
            .flatten()
            .map(|entry| entry.id)
    }
}
