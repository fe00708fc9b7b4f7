//! Specialist registry with its subject index.

use super::{RoutingError, Specialist, SpecialistId, Subject, SubjectIndex, SubjectSet};
use mockable::Clock;
use std::collections::{HashMap, HashSet};

/// Outcome of [`SpecialistRegistry::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The specialist was not known and has been registered idle.
    Registered,
    /// An existing specialist's capabilities were replaced.
    Updated,
}

/// Authoritative set of known specialists.
///
/// Every mutation keeps the embedded [`SubjectIndex`] consistent with the
/// specialists' capability sets.
#[derive(Debug, Clone, Default)]
pub struct SpecialistRegistry {
    specialists: HashMap<SpecialistId, Specialist>,
    index: SubjectIndex,
    next_seq: u64,
}

impl SpecialistRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstructs a registry from persisted specialists.
    ///
    /// The subject index is rebuilt rather than trusted from storage.
    pub fn from_specialists(specialists: impl IntoIterator<Item = Specialist>) -> Self {
        let specialists: HashMap<SpecialistId, Specialist> = specialists
            .into_iter()
            .map(|specialist| (specialist.id(), specialist))
            .collect();
        let next_seq = specialists
            .values()
            .map(|specialist| specialist.registration_seq().saturating_add(1))
            .max()
            .unwrap_or(0);
        let index = SubjectIndex::rebuild(specialists.values());
        Self {
            specialists,
            index,
            next_seq,
        }
    }

    /// Registers a specialist or replaces its capability set.
    ///
    /// Capabilities are replaced wholesale: a subject missing from
    /// `capabilities` is removed. Busy/idle state of an existing specialist is
    /// left untouched; new specialists start idle.
    pub fn upsert(&mut self, id: SpecialistId, capabilities: SubjectSet) -> UpsertOutcome {
        if let Some(existing) = self.specialists.get_mut(&id) {
            let seq = existing.registration_seq();
            let previous = existing.replace_capabilities(capabilities);
            for removed in previous.difference(existing.capabilities()) {
                self.index.remove(removed, id);
            }
            for added in existing.capabilities().difference(&previous) {
                self.index.insert(added, id, seq);
            }
            return UpsertOutcome::Updated;
        }

        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        for subject in capabilities.iter() {
            self.index.insert(subject, id, seq);
        }
        self.specialists
            .insert(id, Specialist::new(id, capabilities, seq));
        UpsertOutcome::Registered
    }

    /// Removes a specialist and strikes it from the index.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::SpecialistNotFound`] for unknown identifiers.
    pub fn remove(&mut self, id: SpecialistId) -> Result<Specialist, RoutingError> {
        let specialist = self
            .specialists
            .remove(&id)
            .ok_or(RoutingError::SpecialistNotFound(id))?;
        for subject in specialist.capabilities().iter() {
            self.index.remove(subject, id);
        }
        Ok(specialist)
    }

    /// Returns the specialist, if registered.
    #[must_use]
    pub fn get(&self, id: SpecialistId) -> Option<&Specialist> {
        self.specialists.get(&id)
    }

    /// Returns whether the specialist is busy.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::SpecialistNotFound`] for unknown identifiers.
    pub fn is_busy(&self, id: SpecialistId) -> Result<bool, RoutingError> {
        self.get(id)
            .map(Specialist::is_busy)
            .ok_or(RoutingError::SpecialistNotFound(id))
    }

    /// Marks a specialist busy. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::SpecialistNotFound`] for unknown identifiers.
    pub fn mark_busy(&mut self, id: SpecialistId) -> Result<(), RoutingError> {
        self.get_mut(id)?.mark_busy();
        Ok(())
    }

    /// Marks a specialist idle, stamping the release time on transition.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::SpecialistNotFound`] for unknown identifiers.
    pub fn mark_idle(&mut self, id: SpecialistId, clock: &impl Clock) -> Result<(), RoutingError> {
        self.get_mut(id)?.mark_idle(clock);
        Ok(())
    }

    /// Idle specialists capable of `subject`, in registration order.
    pub fn capable_idle_candidates(
        &self,
        subject: Subject,
    ) -> impl Iterator<Item = &Specialist> + '_ {
        self.index
            .capable(subject)
            .filter_map(|id| self.specialists.get(&id))
            .filter(|specialist| !specialist.is_busy())
    }

    /// Picks the longest-idle capable specialist for `subject`.
    ///
    /// Never-released specialists rank first; equal release stamps fall back
    /// to registration order.
    #[must_use]
    pub fn longest_idle(&self, subject: Subject) -> Option<SpecialistId> {
        self.capable_idle_candidates(subject)
            .min_by_key(|specialist| specialist.last_released_at())
            .map(Specialist::id)
    }

    /// Aligns busy flags with the set of specialists actually engaged.
    ///
    /// Returns how many stale busy flags were cleared.
    pub fn reconcile_reservations(&mut self, engaged: &HashSet<SpecialistId>) -> usize {
        let mut cleared = 0;
        for specialist in self.specialists.values_mut() {
            if engaged.contains(&specialist.id()) {
                specialist.mark_busy();
            } else if specialist.is_busy() {
                specialist.clear_stale_reservation();
                cleared += 1;
            }
        }
        cleared
    }

    /// Returns the subject index.
    #[must_use]
    pub const fn index(&self) -> &SubjectIndex {
        &self.index
    }

    /// Iterates specialists in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Specialist> + '_ {
        let mut ordered: Vec<&Specialist> = self.specialists.values().collect();
        ordered.sort_by_key(|specialist| specialist.registration_seq());
        ordered.into_iter()
    }

    /// Returns the number of registered specialists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specialists.len()
    }

    /// Returns whether no specialists are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specialists.is_empty()
    }

    fn get_mut(&mut self, id: SpecialistId) -> Result<&mut Specialist, RoutingError> {
        self.specialists
            .get_mut(&id)
            .ok_or(RoutingError::SpecialistNotFound(id))
    }
}
