use super::*;

fn path(name: &str) -> DocPath {
    DocPath::file(format!("/w/{name}"))
}

fn pane_with(names: &[&str]) -> Pane {
    let mut pane = Pane::default();
    for (i, name) in names.iter().enumerate() {
        pane.push(Tab::new(TabId::new(i as u64 + 1), path(name)));
    }
    pane
}

#[test]
fn test_push_activates_new_tab() {
    let pane = pane_with(&["a", "b", "c"]);
    assert_eq!(pane.active_index(), Some(2));
    assert_eq!(pane.active_tab().unwrap().title, "c");
    assert!(!pane.active_tab().unwrap().dirty);
}

#[test]
fn test_close_active_prefers_next_then_previous() {
    let mut pane = pane_with(&["a", "b", "c"]);
    pane.set_active(1);

    pane.remove(1);
    assert_eq!(pane.active_tab().unwrap().title, "c");

    pane.remove(1);
    assert_eq!(pane.active_tab().unwrap().title, "a");

    pane.remove(0);
    assert_eq!(pane.active_index(), None);
    assert!(pane.is_empty());
}

#[test]
fn test_close_inactive_keeps_active_tab() {
    let mut pane = pane_with(&["a", "b", "c"]);
    pane.set_active(2);
    pane.remove(0);
    assert_eq!(pane.active_tab().unwrap().title, "c");
    assert_eq!(pane.active_index(), Some(1));

    pane.remove(1);
    assert_eq!(pane.active_tab().unwrap().title, "b");
    let titles: Vec<_> = pane.tabs().iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["b"]);
}

#[test]
fn test_set_dirty_is_idempotent() {
    let mut pane = pane_with(&["a"]);
    assert_eq!(pane.set_dirty(&path("a"), true), Some(true));
    assert_eq!(pane.set_dirty(&path("a"), true), Some(false));
    assert_eq!(pane.set_dirty(&path("missing"), true), None);
    assert_eq!(pane.tab(&path("a")).unwrap().display_title(), "\u{25cf} a");
}

#[test]
fn test_cycle_wraps() {
    let mut pane = pane_with(&["a", "b", "c"]);
    assert!(pane.cycle(true));
    assert_eq!(pane.active_index(), Some(0));
    assert!(pane.cycle(false));
    assert_eq!(pane.active_index(), Some(2));

    let mut single = pane_with(&["a"]);
    assert!(!single.cycle(true));
}

#[test]
fn test_panes_track_active_pane_and_shared_paths() {
    let mut panes = Panes::new();
    assert_eq!(panes.active(), PaneId::Primary);
    assert!(panes.set_active(PaneId::Secondary));
    assert!(!panes.set_active(PaneId::Secondary));

    let id = panes.alloc_tab_id();
    panes.pane_mut(PaneId::Primary).push(Tab::new(id, path("x")));
    let id = panes.alloc_tab_id();
    panes.pane_mut(PaneId::Secondary).push(Tab::new(id, path("x")));

    let owners: Vec<_> = panes.panes_with(&path("x")).collect();
    assert_eq!(owners, vec![PaneId::Primary, PaneId::Secondary]);
    assert!(!panes.is_dirty(&path("x")));

    panes.pane_mut(PaneId::Secondary).set_dirty(&path("x"), true);
    assert!(panes.is_dirty(&path("x")));
}

#[test]
fn test_pane_id_helpers() {
    assert_eq!(PaneId::Primary.other(), PaneId::Secondary);
    assert_eq!(PaneId::Secondary.index(), 1);
}
