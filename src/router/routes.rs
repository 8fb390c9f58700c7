//! Route table, route names and per-route access metadata.
//!
//! DESIGN
//! ======
//! Routes are matched segment by segment; `:name` segments capture a value.
//! Paths that match nothing resolve to [`RouteName::NotFound`] while keeping
//! the requested path, mirroring a catch-all route.

use std::collections::BTreeMap;
use std::fmt;

use crate::role::Role;

/// Every named route in the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home,
    Login,
    Register,
    Information,
    News,
    Notifications,
    CreateHousehold,
    Household,
    FoodAndDrinks,
    Settings,
    Quizzes,
    QuizAttempt,
    AdminPanel,
    AdminCrisisEvents,
    AdminPointsOfInterest,
    AdminScenarioThemes,
    AdminQuizzes,
    AdminQuizEdit,
    SuperAdminPanel,
    NotFound,
}

/// Routes reachable without a session. The guard never consults state for
/// these.
pub const PUBLIC_ROUTES: [RouteName; 8] = [
    RouteName::Login,
    RouteName::Register,
    RouteName::Home,
    RouteName::CreateHousehold,
    RouteName::Information,
    RouteName::NotFound,
    RouteName::News,
    RouteName::Notifications,
];

impl RouteName {
    #[must_use]
    pub fn is_public(self) -> bool {
        PUBLIC_ROUTES.contains(&self)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Information => "Information",
            Self::News => "News",
            Self::Notifications => "Notifications",
            Self::CreateHousehold => "CreateHousehold",
            Self::Household => "Household",
            Self::FoodAndDrinks => "FoodAndDrinks",
            Self::Settings => "Settings",
            Self::Quizzes => "Quizzes",
            Self::QuizAttempt => "QuizAttempt",
            Self::AdminPanel => "AdminPanel",
            Self::AdminCrisisEvents => "AdminCrisisEvents",
            Self::AdminPointsOfInterest => "AdminPointsOfInterest",
            Self::AdminScenarioThemes => "AdminScenarioThemes",
            Self::AdminQuizzes => "AdminQuizzes",
            Self::AdminQuizEdit => "AdminQuizEdit",
            Self::SuperAdminPanel => "SuperAdminPanel",
            Self::NotFound => "NotFound",
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access flags attached to a route definition.
///
/// The flags are independent; [`RouteMeta::required_role`] folds them into
/// the single strongest requirement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
    pub requires_super_admin: bool,
}

impl RouteMeta {
    pub const PUBLIC: Self = Self { requires_auth: false, requires_admin: false, requires_super_admin: false };
    pub const AUTH: Self = Self { requires_auth: true, requires_admin: false, requires_super_admin: false };
    pub const ADMIN: Self = Self { requires_auth: true, requires_admin: true, requires_super_admin: false };
    pub const SUPER_ADMIN: Self = Self { requires_auth: true, requires_admin: false, requires_super_admin: true };

    /// Strongest role any flag demands, or `None` for an open route.
    #[must_use]
    pub fn required_role(self) -> Option<Role> {
        if self.requires_super_admin {
            Some(Role::SuperAdmin)
        } else if self.requires_admin {
            Some(Role::Admin)
        } else if self.requires_auth {
            Some(Role::User)
        } else {
            None
        }
    }
}

/// A static route definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDef {
    pub name: RouteName,
    pub pattern: &'static str,
    pub meta: RouteMeta,
}

/// A concrete navigation target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: RouteName,
    /// Normalized requested path.
    pub path: String,
    pub params: BTreeMap<String, String>,
    pub meta: RouteMeta,
}

#[derive(Clone, Debug)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<RouteDef>) -> Self {
        Self { routes }
    }

    /// The application's route table.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            def(RouteName::Home, "/", RouteMeta::PUBLIC),
            def(RouteName::Login, "/login", RouteMeta::PUBLIC),
            def(RouteName::Register, "/register", RouteMeta::PUBLIC),
            def(RouteName::Information, "/information", RouteMeta::PUBLIC),
            def(RouteName::News, "/news", RouteMeta::PUBLIC),
            def(RouteName::Notifications, "/notifications", RouteMeta::PUBLIC),
            def(RouteName::CreateHousehold, "/household/create", RouteMeta::PUBLIC),
            def(RouteName::Household, "/household", RouteMeta::AUTH),
            def(RouteName::FoodAndDrinks, "/food-and-drinks", RouteMeta::AUTH),
            def(RouteName::Settings, "/settings", RouteMeta::AUTH),
            def(RouteName::Quizzes, "/quizzes", RouteMeta::AUTH),
            def(RouteName::QuizAttempt, "/quizzes/:id", RouteMeta::AUTH),
            def(RouteName::AdminPanel, "/admin-panel", RouteMeta::ADMIN),
            def(RouteName::AdminCrisisEvents, "/admin-panel/crisis-events", RouteMeta::ADMIN),
            def(RouteName::AdminPointsOfInterest, "/admin-panel/points-of-interest", RouteMeta::ADMIN),
            def(RouteName::AdminScenarioThemes, "/admin-panel/scenario-themes", RouteMeta::ADMIN),
            def(RouteName::AdminQuizzes, "/admin-panel/quizzes", RouteMeta::ADMIN),
            def(RouteName::AdminQuizEdit, "/admin-panel/quizzes/:id", RouteMeta::ADMIN),
            def(RouteName::SuperAdminPanel, "/super-admin", RouteMeta::SUPER_ADMIN),
            def(RouteName::NotFound, "/not-found", RouteMeta::PUBLIC),
        ])
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    #[must_use]
    pub fn by_name(&self, name: RouteName) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// Match `path` against the table. First match wins; no match resolves to
    /// `NotFound` with the requested path preserved.
    #[must_use]
    pub fn resolve(&self, path: &str) -> ResolvedRoute {
        let path = normalize_path(path);
        for route in &self.routes {
            if let Some(params) = match_pattern(route.pattern, &path) {
                return ResolvedRoute { name: route.name, path, params, meta: route.meta };
            }
        }
        let meta = self.by_name(RouteName::NotFound).map_or(RouteMeta::PUBLIC, |r| r.meta);
        ResolvedRoute { name: RouteName::NotFound, path, params: BTreeMap::new(), meta }
    }

    /// Resolve a named route without parameters, as used for redirects.
    #[must_use]
    pub fn resolve_name(&self, name: RouteName) -> ResolvedRoute {
        match self.by_name(name) {
            Some(route) => ResolvedRoute {
                name,
                path: route.pattern.to_owned(),
                params: BTreeMap::new(),
                meta: route.meta,
            },
            None => ResolvedRoute {
                name,
                path: String::from("/"),
                params: BTreeMap::new(),
                meta: RouteMeta::PUBLIC,
            },
        }
    }
}

fn def(name: RouteName, pattern: &'static str, meta: RouteMeta) -> RouteDef {
    RouteDef { name, pattern, meta }
}

/// Strip query and fragment, force a leading slash, drop a trailing slash.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::from("/");
    }
    if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let mut pattern_segments = pattern.split('/').filter(|s| !s.is_empty());
    let mut path_segments = path.split('/').filter(|s| !s.is_empty());
    let mut params = BTreeMap::new();

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(params),
            (Some(expected), Some(actual)) => {
                if let Some(param) = expected.strip_prefix(':') {
                    params.insert(param.to_owned(), actual.to_owned());
                } else if expected != actual {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
