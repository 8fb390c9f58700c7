//! Client router: resolves paths, runs the navigation guard and follows its
//! redirects.
//!
//! SYSTEM CONTEXT
//! ==============
//! The router owns the session and household stores and hands them to the
//! guard explicitly. Navigations take `&mut self`, so they run one at a time;
//! a newer navigation cannot start while an older household check is in
//! flight.

pub mod guard;
pub mod routes;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::net::api::{ApiError, HouseholdLookup};
use crate::net::types::Household;
use crate::state::household::HouseholdStore;
use crate::state::session::{SessionError, SessionStore};
use crate::storage::TokenStorage;

use guard::{Decision, HouseholdOutcome, NavigationGuard, Verdict};
use routes::{ResolvedRoute, RouteName, RouteTable};

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("redirect limit of {limit} exceeded navigating to {path}")]
    TooManyRedirects { path: String, limit: usize },
}

/// How a navigation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Landed on the requested route.
    Completed,
    /// Landed on a route the guard redirected to.
    Redirected,
    /// The guard kept the router on its current route.
    Blocked,
}

/// One guard evaluation within a navigation.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub route: ResolvedRoute,
    pub verdict: Verdict,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Navigation {
    pub requested: ResolvedRoute,
    /// Route the router is on afterwards; `None` if blocked before any route
    /// was ever entered.
    pub landed: Option<ResolvedRoute>,
    pub outcome: NavigationOutcome,
    pub steps: Vec<Step>,
}

impl Navigation {
    /// Total household lookups issued during this navigation.
    #[must_use]
    pub fn household_checks(&self) -> usize {
        self.steps.iter().filter(|s| s.verdict.checked_household()).count()
    }
}

pub struct Router<S> {
    table: RouteTable,
    guard: NavigationGuard,
    session: SessionStore<S>,
    households: HouseholdStore,
    lookup: Arc<dyn HouseholdLookup>,
    current: Option<ResolvedRoute>,
    max_redirects: usize,
}

impl<S: TokenStorage> Router<S> {
    pub fn new(
        table: RouteTable,
        guard: NavigationGuard,
        session: SessionStore<S>,
        lookup: Arc<dyn HouseholdLookup>,
        max_redirects: usize,
    ) -> Self {
        Self { table, guard, session, households: HouseholdStore::new(), lookup, current: None, max_redirects }
    }

    /// Router over the standard route table with policy and limits from `config`.
    pub fn from_config(config: &ClientConfig, session: SessionStore<S>, lookup: Arc<dyn HouseholdLookup>) -> Self {
        Self::new(
            RouteTable::standard(),
            NavigationGuard::new(config.on_transient_error),
            session,
            lookup,
            config.max_redirects,
        )
    }

    /// Rehydrate the session from storage. Returns whether it is authenticated.
    pub fn start(&mut self) -> bool {
        self.session.initialize_from_storage()
    }

    /// Adopt a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the token cannot be decoded or persisted.
    pub fn login(&mut self, token: &str) -> Result<(), SessionError> {
        self.session.login(token)?;
        self.households.clear();
        Ok(())
    }

    /// Clear session and household state. Does not navigate.
    pub fn logout(&mut self) {
        self.session.logout();
        self.households.clear();
    }

    /// Navigate to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::TooManyRedirects`] if the guard keeps
    /// redirecting past the configured limit.
    pub async fn push(&mut self, path: &str) -> Result<Navigation, NavigationError> {
        let target = self.table.resolve(path);
        self.navigate(target).await
    }

    /// Navigate to a parameterless named route.
    ///
    /// # Errors
    ///
    /// See [`Router::push`].
    pub async fn push_named(&mut self, name: RouteName) -> Result<Navigation, NavigationError> {
        let target = self.table.resolve_name(name);
        self.navigate(target).await
    }

    async fn navigate(&mut self, requested: ResolvedRoute) -> Result<Navigation, NavigationError> {
        tracing::debug!(path = %requested.path, route = %requested.name, "navigation started");
        let mut target = requested.clone();
        let mut steps = Vec::new();
        let mut redirects = 0;

        loop {
            let verdict =
                self.guard.check(&target, self.current.as_ref(), &mut self.session, self.lookup.as_ref()).await;

            match &verdict.household {
                Some(HouseholdOutcome::Found(household)) => {
                    let ticket = self.households.begin_fetch();
                    self.households.apply(ticket, Some(household.clone()));
                }
                Some(HouseholdOutcome::Missing) => {
                    let ticket = self.households.begin_fetch();
                    self.households.apply(ticket, None);
                }
                Some(HouseholdOutcome::Unauthorized) => self.households.clear(),
                Some(HouseholdOutcome::Failed(_)) | None => {}
            }

            let decision = verdict.decision;
            steps.push(Step { route: target.clone(), verdict });

            match decision {
                Decision::Allow => {
                    let outcome =
                        if redirects == 0 { NavigationOutcome::Completed } else { NavigationOutcome::Redirected };
                    tracing::info!(requested = %requested.path, landed = %target.path, ?outcome, "navigation finished");
                    self.current = Some(target.clone());
                    return Ok(Navigation { requested, landed: Some(target), outcome, steps });
                }
                Decision::Block => {
                    tracing::info!(requested = %requested.path, "navigation blocked");
                    return Ok(Navigation {
                        requested,
                        landed: self.current.clone(),
                        outcome: NavigationOutcome::Blocked,
                        steps,
                    });
                }
                Decision::Redirect(name) => {
                    redirects += 1;
                    if redirects > self.max_redirects {
                        tracing::warn!(path = %requested.path, limit = self.max_redirects, "redirect limit exceeded");
                        return Err(NavigationError::TooManyRedirects {
                            path: requested.path,
                            limit: self.max_redirects,
                        });
                    }
                    tracing::debug!(from = %target.name, to = %name, "guard redirect");
                    target = self.table.resolve_name(name);
                }
            }
        }
    }

    /// Re-fetch household membership outside of navigation.
    ///
    /// Returns `Ok(None)` without a request when no session token is present.
    ///
    /// # Errors
    ///
    /// Propagates lookup errors. A 401 also logs the session out.
    pub async fn refresh_household(&mut self) -> Result<Option<Household>, ApiError> {
        let Some(token) = self.session.token().map(str::to_owned) else {
            return Ok(None);
        };
        let ticket = self.households.begin_fetch();
        match self.lookup.current_household(&token).await {
            Ok(household) => {
                self.households.apply(ticket, household.clone());
                Ok(household)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.logout();
                }
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&ResolvedRoute> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    #[must_use]
    pub fn households(&self) -> &HouseholdStore {
        &self.households
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
