//! Pre-navigation guard: authentication, role gating and household
//! resolution.
//!
//! ARCHITECTURE
//! ============
//! [`NavigationGuard::check`] runs once per navigation attempt and walks a
//! fixed precedence:
//!
//! 1. public route names always pass, with no state or network access;
//! 2. an unauthenticated session gets one rehydration attempt, then is
//!    cleared and sent to Login;
//! 3. a route demanding ADMIN or SUPERADMIN that the session's role does not
//!    satisfy goes to NotFound (the route's existence is not revealed);
//! 4. `requires_auth` without a session goes to Login;
//! 5. USER sessions must belong to a household; elevated roles skip the
//!    lookup entirely.
//!
//! ERROR HANDLING
//! ==============
//! A 401 from the household lookup is stronger evidence than a role mismatch
//! and forces logout. Any other lookup failure is resolved by
//! [`TransientErrorPolicy`]: `Allow` keeps a backend hiccup from locking the
//! user out of the whole application.

use crate::config::TransientErrorPolicy;
use crate::net::api::HouseholdLookup;
use crate::net::types::Household;
use crate::role::Role;
use crate::state::session::SessionStore;
use crate::storage::TokenStorage;

use super::routes::{ResolvedRoute, RouteName};

/// What the router should do with the attempted navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(RouteName),
    /// Abort and stay on the current route.
    Block,
}

/// States a navigation attempt passes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    PublicAllowed,
    NeedsRehydration,
    UnauthenticatedBlocked,
    InsufficientRole,
    HouseholdCheck,
    NoHouseholdRedirect,
    /// The household lookup returned 401.
    SessionInvalid,
    /// The household lookup failed some other way.
    TransientFailure,
    Allowed,
}

/// Why a navigation did not simply proceed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    InsufficientRole,
    SessionInvalid,
    TransientServiceError,
}

/// Result of the household lookup, if one was issued.
#[derive(Clone, Debug, PartialEq)]
pub enum HouseholdOutcome {
    Found(Household),
    Missing,
    Unauthorized,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Verdict {
    pub decision: Decision,
    /// Terminal state.
    pub state: GuardState,
    /// Every state entered, in order, ending with `state`.
    pub trail: Vec<GuardState>,
    pub household: Option<HouseholdOutcome>,
}

impl Verdict {
    #[must_use]
    pub fn denial(&self) -> Option<Denial> {
        match self.state {
            GuardState::UnauthenticatedBlocked => Some(Denial::Unauthenticated),
            GuardState::InsufficientRole => Some(Denial::InsufficientRole),
            GuardState::SessionInvalid => Some(Denial::SessionInvalid),
            GuardState::TransientFailure => Some(Denial::TransientServiceError),
            _ => None,
        }
    }

    /// Whether the household lookup was issued.
    #[must_use]
    pub fn checked_household(&self) -> bool {
        self.household.is_some()
    }
}

struct Trail(Vec<GuardState>);

impl Trail {
    fn enter(&mut self, state: GuardState) {
        self.0.push(state);
    }

    fn finish(mut self, state: GuardState, decision: Decision, household: Option<HouseholdOutcome>) -> Verdict {
        self.0.push(state);
        Verdict { decision, state, trail: self.0, household }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NavigationGuard {
    on_transient_error: TransientErrorPolicy,
}

impl NavigationGuard {
    #[must_use]
    pub fn new(on_transient_error: TransientErrorPolicy) -> Self {
        Self { on_transient_error }
    }

    /// Decide whether navigating from `from` to `to` proceeds.
    ///
    /// May rehydrate or log out `session`; never mutates anything else.
    pub async fn check<S: TokenStorage>(
        &self,
        to: &ResolvedRoute,
        from: Option<&ResolvedRoute>,
        session: &mut SessionStore<S>,
        households: &dyn HouseholdLookup,
    ) -> Verdict {
        let mut trail = Trail(Vec::new());

        if to.name.is_public() {
            return trail.finish(GuardState::PublicAllowed, Decision::Allow, None);
        }

        if !session.is_authenticated() {
            trail.enter(GuardState::NeedsRehydration);
            if !session.initialize_from_storage() {
                tracing::debug!(route = %to.name, "no session; redirecting to login");
                session.logout();
                return trail.finish(GuardState::UnauthenticatedBlocked, Decision::Redirect(RouteName::Login), None);
            }
        }

        let role = session.role();
        if let Some(required) = to.meta.required_role()
            && required.is_elevated()
            && !role.is_some_and(|r| r.satisfies(required))
        {
            tracing::debug!(route = %to.name, %required, ?role, "insufficient role");
            return trail.finish(GuardState::InsufficientRole, Decision::Redirect(RouteName::NotFound), None);
        }

        if to.meta.requires_auth && !session.is_authenticated() {
            return trail.finish(GuardState::UnauthenticatedBlocked, Decision::Redirect(RouteName::Login), None);
        }

        if role.is_some_and(Role::is_elevated) {
            return trail.finish(GuardState::Allowed, Decision::Allow, None);
        }

        trail.enter(GuardState::HouseholdCheck);
        let Some(token) = session.token().map(str::to_owned) else {
            session.logout();
            return trail.finish(GuardState::UnauthenticatedBlocked, Decision::Redirect(RouteName::Login), None);
        };

        match households.current_household(&token).await {
            Ok(Some(household)) => {
                trail.finish(GuardState::Allowed, Decision::Allow, Some(HouseholdOutcome::Found(household)))
            }
            Ok(None) => {
                let decision = if from.is_some_and(|f| f.name == RouteName::CreateHousehold) {
                    Decision::Block
                } else {
                    Decision::Redirect(RouteName::CreateHousehold)
                };
                tracing::debug!(route = %to.name, ?decision, "user has no household");
                trail.finish(GuardState::NoHouseholdRedirect, decision, Some(HouseholdOutcome::Missing))
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!(route = %to.name, "household check rejected session; logging out");
                session.logout();
                trail.finish(
                    GuardState::SessionInvalid,
                    Decision::Redirect(RouteName::Login),
                    Some(HouseholdOutcome::Unauthorized),
                )
            }
            Err(e) => {
                let decision = match self.on_transient_error {
                    TransientErrorPolicy::Allow => Decision::Allow,
                    TransientErrorPolicy::Block => Decision::Block,
                };
                tracing::warn!(route = %to.name, error = %e, ?decision, "household check failed");
                trail.finish(GuardState::TransientFailure, decision, Some(HouseholdOutcome::Failed(e.to_string())))
            }
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
