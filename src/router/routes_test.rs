use super::*;

// =============================================================================
// RouteMeta
// =============================================================================

#[test]
fn required_role_takes_strongest_flag() {
    assert_eq!(RouteMeta::PUBLIC.required_role(), None);
    assert_eq!(RouteMeta::AUTH.required_role(), Some(Role::User));
    assert_eq!(RouteMeta::ADMIN.required_role(), Some(Role::Admin));
    assert_eq!(RouteMeta::SUPER_ADMIN.required_role(), Some(Role::SuperAdmin));

    let odd = RouteMeta { requires_auth: false, requires_admin: true, requires_super_admin: true };
    assert_eq!(odd.required_role(), Some(Role::SuperAdmin));
}

#[test]
fn public_list_is_fixed() {
    for name in [
        RouteName::Login,
        RouteName::Register,
        RouteName::Home,
        RouteName::CreateHousehold,
        RouteName::Information,
        RouteName::NotFound,
        RouteName::News,
        RouteName::Notifications,
    ] {
        assert!(name.is_public(), "{name} should be public");
    }
    assert!(!RouteName::Settings.is_public());
    assert!(!RouteName::Household.is_public());
    assert!(!RouteName::AdminPanel.is_public());
}

// =============================================================================
// normalize_path
// =============================================================================

#[test]
fn normalize_strips_query_fragment_and_trailing_slash() {
    assert_eq!(normalize_path("/settings/?tab=profile"), "/settings");
    assert_eq!(normalize_path("/news#top"), "/news");
    assert_eq!(normalize_path("food-and-drinks"), "/food-and-drinks");
    assert_eq!(normalize_path(""), "/");
    assert_eq!(normalize_path("/"), "/");
}

// =============================================================================
// resolve
// =============================================================================

#[test]
fn resolves_static_routes() {
    let table = RouteTable::standard();
    let route = table.resolve("/settings");
    assert_eq!(route.name, RouteName::Settings);
    assert_eq!(route.meta, RouteMeta::AUTH);

    assert_eq!(table.resolve("/").name, RouteName::Home);
    assert_eq!(table.resolve("/household/create").name, RouteName::CreateHousehold);
    assert_eq!(table.resolve("/household").name, RouteName::Household);
}

#[test]
fn resolves_params() {
    let table = RouteTable::standard();
    let route = table.resolve("/admin-panel/quizzes/12?draft=1");
    assert_eq!(route.name, RouteName::AdminQuizEdit);
    assert_eq!(route.params.get("id").map(String::as_str), Some("12"));
    assert_eq!(route.path, "/admin-panel/quizzes/12");
}

#[test]
fn unknown_path_is_not_found_with_path_kept() {
    let table = RouteTable::standard();
    let route = table.resolve("/does/not/exist");
    assert_eq!(route.name, RouteName::NotFound);
    assert_eq!(route.path, "/does/not/exist");
    assert!(route.meta.required_role().is_none());
}

#[test]
fn extra_segments_do_not_match() {
    let table = RouteTable::standard();
    assert_eq!(table.resolve("/settings/extra").name, RouteName::NotFound);
}

#[test]
fn resolve_name_uses_pattern_as_path() {
    let table = RouteTable::standard();
    let login = table.resolve_name(RouteName::Login);
    assert_eq!(login.path, "/login");
    assert_eq!(table.resolve_name(RouteName::CreateHousehold).path, "/household/create");
}

#[test]
fn every_name_has_exactly_one_definition() {
    let table = RouteTable::standard();
    for route in table.routes() {
        let count = table.routes().iter().filter(|r| r.name == route.name).count();
        assert_eq!(count, 1, "{} defined {count} times", route.name);
    }
}
