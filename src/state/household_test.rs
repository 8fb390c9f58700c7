use super::*;

fn household(id: i64) -> Household {
    Household { id, name: format!("H{id}"), address: None, population_count: Some(2), members: Vec::new() }
}

#[test]
fn starts_empty() {
    let store = HouseholdStore::new();
    assert!(!store.has_household());
}

#[test]
fn apply_with_current_ticket_stores_value() {
    let mut store = HouseholdStore::new();
    let ticket = store.begin_fetch();
    assert!(store.apply(ticket, Some(household(1))));
    assert_eq!(store.current().map(|h| h.id), Some(1));
}

#[test]
fn apply_none_replaces_previous_household() {
    let mut store = HouseholdStore::new();
    let first = store.begin_fetch();
    store.apply(first, Some(household(1)));

    let second = store.begin_fetch();
    assert!(store.apply(second, None));
    assert!(!store.has_household());
}

#[test]
fn stale_ticket_is_dropped() {
    let mut store = HouseholdStore::new();
    let old = store.begin_fetch();
    let new = store.begin_fetch();

    assert!(store.apply(new, Some(household(2))));
    assert!(!store.apply(old, None));
    assert_eq!(store.current().map(|h| h.id), Some(2));
}

#[test]
fn clear_invalidates_outstanding_tickets() {
    let mut store = HouseholdStore::new();
    let ticket = store.begin_fetch();
    store.clear();

    assert!(!store.apply(ticket, Some(household(3))));
    assert!(!store.has_household());
}
