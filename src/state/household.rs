//! Household-membership state for the current user.
//!
//! TRADE-OFFS
//! ==========
//! Membership is re-fetched on every protected navigation instead of cached.
//! Each fetch takes a [`FetchTicket`]; only the newest ticket may write, so a
//! slow response from an abandoned navigation cannot overwrite a newer one.

use crate::net::types::Household;

/// Generation token handed out by [`HouseholdStore::begin_fetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Default)]
pub struct HouseholdStore {
    current: Option<Household>,
    generation: u64,
}

impl HouseholdStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch, superseding every ticket issued before.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket(self.generation)
    }

    /// Store a fetch result. Returns `false` and keeps the current value when
    /// `ticket` has been superseded.
    pub fn apply(&mut self, ticket: FetchTicket, household: Option<Household>) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, newest = self.generation, "dropping stale household result");
            return false;
        }
        self.current = household;
        true
    }

    /// Forget membership and invalidate outstanding tickets.
    pub fn clear(&mut self) {
        self.current = None;
        self.generation += 1;
    }

    #[must_use]
    pub fn current(&self) -> Option<&Household> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn has_household(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
#[path = "household_test.rs"]
mod tests;
