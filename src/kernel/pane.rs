//! Tab registry and pane manager.
//!
//! Both panes are the same `Pane` type held in a fixed array; every tab
//! operation is written once and parametrized by `PaneId`.

use std::fmt;

use super::buffer::DocPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaneId {
    Primary,
    Secondary,
}

impl PaneId {
    pub const ALL: [PaneId; 2] = [PaneId::Primary, PaneId::Secondary];

    pub const fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(u64);

impl TabId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub path: DocPath,
    pub title: String,
    pub dirty: bool,
}

impl Tab {
    pub fn new(id: TabId, path: DocPath) -> Self {
        let title = path.title();
        Self {
            id,
            path,
            title,
            dirty: false,
        }
    }

    pub fn display_title(&self) -> String {
        if self.dirty {
            format!("\u{25cf} {}", self.title)
        } else {
            self.title.clone()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pane {
    tabs: Vec<Tab>,
    active: Option<usize>,
}

impl Pane {
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.and_then(|i| self.tabs.get(i))
    }

    pub fn position(&self, path: &DocPath) -> Option<usize> {
        self.tabs.iter().position(|tab| &tab.path == path)
    }

    pub fn tab(&self, path: &DocPath) -> Option<&Tab> {
        self.tabs.iter().find(|tab| &tab.path == path)
    }

    pub(crate) fn tab_mut(&mut self, path: &DocPath) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| &tab.path == path)
    }

    pub fn contains(&self, path: &DocPath) -> bool {
        self.position(path).is_some()
    }

    /// Appends a tab and makes it active.
    pub(crate) fn push(&mut self, tab: Tab) -> usize {
        self.tabs.push(tab);
        let index = self.tabs.len() - 1;
        self.active = Some(index);
        index
    }

    /// Returns `true` if the active tab changed.
    pub(crate) fn set_active(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() || self.active == Some(index) {
            return false;
        }
        self.active = Some(index);
        true
    }

    /// Removes the tab at `index`.
    ///
    /// Closing the active tab activates the tab that slides into its index,
    /// or the previous one when it was last.
    pub(crate) fn remove(&mut self, index: usize) -> Option<Tab> {
        if index >= self.tabs.len() {
            return None;
        }
        let tab = self.tabs.remove(index);
        self.active = match self.active {
            _ if self.tabs.is_empty() => None,
            Some(active) if active == index => Some(index.min(self.tabs.len() - 1)),
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        Some(tab)
    }

    pub(crate) fn set_dirty(&mut self, path: &DocPath, dirty: bool) -> Option<bool> {
        let tab = self.tab_mut(path)?;
        if tab.dirty == dirty {
            return Some(false);
        }
        tab.dirty = dirty;
        Some(true)
    }

    pub(crate) fn cycle(&mut self, forward: bool) -> bool {
        let len = self.tabs.len();
        let Some(active) = self.active else {
            return false;
        };
        if len <= 1 {
            return false;
        }
        let next = if forward {
            (active + 1) % len
        } else {
            (active + len - 1) % len
        };
        self.set_active(next)
    }
}

pub struct Panes {
    panes: [Pane; 2],
    active: PaneId,
    next_tab_id: u64,
}

impl fmt::Debug for Panes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panes")
            .field("active", &self.active)
            .field("primary", &self.panes[0].len())
            .field("secondary", &self.panes[1].len())
            .finish()
    }
}

impl Default for Panes {
    fn default() -> Self {
        Self::new()
    }
}

impl Panes {
    pub fn new() -> Self {
        Self {
            panes: [Pane::default(), Pane::default()],
            active: PaneId::Primary,
            next_tab_id: 1,
        }
    }

    pub(crate) fn alloc_tab_id(&mut self) -> TabId {
        let id = TabId::new(self.next_tab_id);
        self.next_tab_id = self.next_tab_id.saturating_add(1);
        id
    }

    pub fn pane(&self, pane: PaneId) -> &Pane {
        &self.panes[pane.index()]
    }

    pub(crate) fn pane_mut(&mut self, pane: PaneId) -> &mut Pane {
        &mut self.panes[pane.index()]
    }

    pub fn active(&self) -> PaneId {
        self.active
    }

    /// Switches the globally focused pane. Tab order is untouched.
    pub(crate) fn set_active(&mut self, pane: PaneId) -> bool {
        if self.active == pane {
            return false;
        }
        self.active = pane;
        true
    }

    /// Panes that currently show `path`.
    pub fn panes_with<'a>(&'a self, path: &'a DocPath) -> impl Iterator<Item = PaneId> + 'a {
        PaneId::ALL
            .into_iter()
            .filter(move |pane| self.pane(*pane).contains(path))
    }

    pub fn is_open(&self, path: &DocPath) -> bool {
        self.panes_with(path).next().is_some()
    }

    pub fn is_dirty(&self, path: &DocPath) -> bool {
        self.panes
            .iter()
            .filter_map(|pane| pane.tab(path))
            .any(|tab| tab.dirty)
    }

    pub(crate) fn retitle(&mut self, from: &DocPath, to: &DocPath) {
        for pane in &mut self.panes {
            if let Some(tab) = pane.tab_mut(from) {
                tab.path = to.clone();
                tab.title = to.title();
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/pane.rs"]
mod tests;
