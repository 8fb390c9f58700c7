use std::cell::Cell;

use super::*;
use crate::router::routes::{PUBLIC_ROUTES, RouteTable};
use crate::router::test_helpers::{Backend, MockLookup, empty_session, live_session, stored_session};
use crate::storage::{MemoryStorage, StorageError, TOKEN_KEY};

/// Storage that counts every access.
#[derive(Default)]
struct CountingStorage {
    inner: MemoryStorage,
    touches: Cell<usize>,
}

impl CountingStorage {
    fn touch(&self) {
        self.touches.set(self.touches.get() + 1);
    }
}

impl TokenStorage for CountingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.touch();
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.touch();
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.touch();
        self.inner.remove(key)
    }
}

fn route(path: &str) -> ResolvedRoute {
    RouteTable::standard().resolve(path)
}

fn named(name: RouteName) -> ResolvedRoute {
    RouteTable::standard().resolve_name(name)
}

// =============================================================================
// public routes
// =============================================================================

#[tokio::test]
async fn public_routes_touch_nothing() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::HasHousehold);
    let mut session = SessionStore::new(CountingStorage::default());

    for name in PUBLIC_ROUTES {
        let verdict = guard.check(&named(name), None, &mut session, &lookup).await;
        assert_eq!(verdict.decision, Decision::Allow, "{name}");
        assert_eq!(verdict.state, GuardState::PublicAllowed);
        assert!(verdict.denial().is_none());
    }
    assert_eq!(session.storage().touches.get(), 0);
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn unknown_path_is_public_not_found() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::HasHousehold);
    let mut session = empty_session();

    let verdict = guard.check(&route("/nowhere"), None, &mut session, &lookup).await;
    assert_eq!(verdict.state, GuardState::PublicAllowed);
}

// =============================================================================
// unauthenticated
// =============================================================================

#[tokio::test]
async fn empty_storage_settings_redirects_to_login() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::HasHousehold);
    let mut session = empty_session();

    let verdict = guard.check(&route("/settings"), None, &mut session, &lookup).await;
    assert_eq!(verdict.decision, Decision::Redirect(RouteName::Login));
    assert_eq!(verdict.trail, vec![GuardState::NeedsRehydration, GuardState::UnauthenticatedBlocked]);
    assert_eq!(verdict.denial(), Some(Denial::Unauthenticated));
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn unreadable_token_is_cleared_before_login_redirect() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::HasHousehold);
    let mut session = SessionStore::new(MemoryStorage::with_token("corrupt"));

    for path in ["/settings", "/admin-panel", "/super-admin", "/quizzes/4"] {
        let verdict = guard.check(&route(path), None, &mut session, &lookup).await;
        assert_eq!(verdict.decision, Decision::Redirect(RouteName::Login), "{path}");
        assert!(!session.is_authenticated());
        assert_eq!(session.storage().get(TOKEN_KEY).unwrap(), None);
    }
}

#[tokio::test]
async fn stored_token_is_rehydrated_once() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::HasHousehold);
    let mut session = stored_session("USER");

    let verdict = guard.check(&route("/household"), None, &mut session, &lookup).await;
    assert_eq!(verdict.decision, Decision::Allow);
    assert_eq!(
        verdict.trail,
        vec![GuardState::NeedsRehydration, GuardState::HouseholdCheck, GuardState::Allowed]
    );
    assert!(session.is_authenticated());

    let again = guard.check(&route("/household"), None, &mut session, &lookup).await;
    assert_eq!(again.trail, vec![GuardState::HouseholdCheck, GuardState::Allowed]);
}

// =============================================================================
// roles
// =============================================================================

#[tokio::test]
async fn user_on_elevated_routes_gets_not_found() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::HasHousehold);
    let mut session = live_session("USER");

    for path in ["/admin-panel", "/admin-panel/crisis-events", "/admin-panel/quizzes/3", "/super-admin"] {
        let verdict = guard.check(&route(path), None, &mut session, &lookup).await;
        assert_eq!(verdict.decision, Decision::Redirect(RouteName::NotFound), "{path}");
        assert_eq!(verdict.denial(), Some(Denial::InsufficientRole));
    }
    assert_eq!(lookup.calls(), 0);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn admin_cannot_open_super_admin_route() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::HasHousehold);
    let mut session = live_session("ADMIN");

    let verdict = guard.check(&route("/super-admin"), None, &mut session, &lookup).await;
    assert_eq!(verdict.decision, Decision::Redirect(RouteName::NotFound));
}

#[tokio::test]
async fn admin_panel_allowed_without_household_check() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::NoHousehold);
    let mut session = live_session("ADMIN");

    let verdict = guard.check(&route("/admin-panel"), None, &mut session, &lookup).await;
    assert_eq!(verdict.decision, Decision::Allow);
    assert_eq!(verdict.state, GuardState::Allowed);
    assert!(!verdict.checked_household());
    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn super_admin_satisfies_admin_routes() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::NoHousehold);
    let mut session = live_session("SUPERADMIN");

    for path in ["/admin-panel", "/admin-panel/scenario-themes", "/super-admin", "/settings"] {
        let verdict = guard.check(&route(path), None, &mut session, &lookup).await;
        assert_eq!(verdict.decision, Decision::Allow, "{path}");
    }
    assert_eq!(lookup.calls(), 0);
}

// =============================================================================
// household check
// =============================================================================

#[tokio::test]
async fn user_with_household_is_allowed() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::HasHousehold);
    let mut session = live_session("USER");

    let verdict = guard.check(&route("/food-and-drinks"), None, &mut session, &lookup).await;
    assert_eq!(verdict.decision, Decision::Allow);
    assert!(matches!(verdict.household, Some(HouseholdOutcome::Found(ref h)) if h.name == "Nordby"));
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn user_without_household_redirects_to_create() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::NoHousehold);
    let mut session = live_session("USER");

    let verdict = guard.check(&route("/food-and-drinks"), Some(&route("/")), &mut session, &lookup).await;
    assert_eq!(verdict.decision, Decision::Redirect(RouteName::CreateHousehold));
    assert_eq!(verdict.state, GuardState::NoHouseholdRedirect);
    assert_eq!(verdict.household, Some(HouseholdOutcome::Missing));
    assert!(verdict.denial().is_none());
}

#[tokio::test]
async fn user_without_household_on_create_page_is_blocked() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::NoHousehold);
    let mut session = live_session("USER");
    let from = named(RouteName::CreateHousehold);

    let verdict = guard.check(&route("/settings"), Some(&from), &mut session, &lookup).await;
    assert_eq!(verdict.decision, Decision::Block);
    assert_eq!(verdict.state, GuardState::NoHouseholdRedirect);
}

#[tokio::test]
async fn unauthorized_household_check_logs_out() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::Unauthorized);
    let mut session = live_session("USER");

    let verdict = guard.check(&route("/household"), None, &mut session, &lookup).await;
    assert_eq!(verdict.decision, Decision::Redirect(RouteName::Login));
    assert_eq!(verdict.state, GuardState::SessionInvalid);
    assert_eq!(verdict.denial(), Some(Denial::SessionInvalid));
    assert!(!session.is_authenticated());
    assert_eq!(session.storage().get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn transient_failure_fails_open_by_default() {
    let guard = NavigationGuard::default();
    let lookup = MockLookup::new(Backend::ServerError);
    let mut session = live_session("USER");

    let verdict = guard.check(&route("/quizzes"), None, &mut session, &lookup).await;
    assert_eq!(verdict.decision, Decision::Allow);
    assert_eq!(verdict.state, GuardState::TransientFailure);
    assert_eq!(verdict.denial(), Some(Denial::TransientServiceError));
    assert!(matches!(verdict.household, Some(HouseholdOutcome::Failed(ref msg)) if msg.contains("503")));
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn transient_failure_blocks_when_configured() {
    let guard = NavigationGuard::new(TransientErrorPolicy::Block);
    let lookup = MockLookup::new(Backend::ServerError);
    let mut session = live_session("USER");

    let verdict = guard.check(&route("/quizzes"), None, &mut session, &lookup).await;
    assert_eq!(verdict.decision, Decision::Block);
    assert!(session.is_authenticated());
}
