//! Point-in-time view of the terminal's windows, tabs and panes.
//!
//! A [`Topology`] is built from the controller's `list` reply and never
//! mutated afterwards. Positions are assigned from the native ordering,
//! 1-based and contiguous, so they match the numbers shown in the host UI.

use crate::address::PaneAddress;
use crate::controller::{ListReply, SessionWire};
use serde::Serialize;

/// A single terminal surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pane {
    /// Where this pane sits in the snapshot.
    pub address: PaneAddress,
    /// Opaque native session id.
    pub id: String,
    pub name: String,
    pub tty: String,
    pub cwd: String,
    /// Foreground job name.
    pub job: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub position: usize,
    pub id: String,
    pub panes: Vec<Pane>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    pub position: usize,
    pub id: String,
    pub tabs: Vec<Tab>,
}

/// Consistent enumeration of every window at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Topology {
    pub windows: Vec<Window>,
    /// Session id the controller considers current, if it reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_session_id: Option<String>,
}

impl Topology {
    /// Build a snapshot from the controller's `list` reply.
    ///
    /// Any index fields the controller sends are ignored; positions come
    /// from the order of the arrays.
    pub fn from_list(reply: ListReply) -> Self {
        let current_session_id = reply.current_session_id.filter(|id| !id.is_empty());

        let windows = reply
            .windows
            .into_iter()
            .enumerate()
            .map(|(w, window)| Window {
                position: w + 1,
                id: window.id,
                tabs: window
                    .tabs
                    .into_iter()
                    .enumerate()
                    .map(|(t, tab)| Tab {
                        position: t + 1,
                        id: tab.id,
                        panes: tab
                            .sessions
                            .into_iter()
                            .enumerate()
                            .map(|(p, session)| {
                                let address = PaneAddress::new(w + 1, t + 1, p + 1);
                                Pane::from_wire(address, session, current_session_id.as_deref())
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            windows,
            current_session_id,
        }
    }

    /// Iterate over every pane in window, tab, pane order.
    pub fn panes(&self) -> impl Iterator<Item = &Pane> {
        self.windows
            .iter()
            .flat_map(|w| w.tabs.iter())
            .flat_map(|t| t.panes.iter())
    }

    pub fn pane_count(&self) -> usize {
        self.panes().count()
    }

    /// Look up a window by 1-based position.
    pub fn window(&self, position: usize) -> Option<&Window> {
        position.checked_sub(1).and_then(|i| self.windows.get(i))
    }

    /// The tab that owns the pane at `address`.
    pub fn tab_of(&self, address: &PaneAddress) -> Option<&Tab> {
        self.window(address.window)?.tab(address.tab)
    }
}

impl Window {
    pub fn tab(&self, position: usize) -> Option<&Tab> {
        position.checked_sub(1).and_then(|i| self.tabs.get(i))
    }
}

impl Tab {
    pub fn pane(&self, position: usize) -> Option<&Pane> {
        position.checked_sub(1).and_then(|i| self.panes.get(i))
    }
}

impl Pane {
    fn from_wire(address: PaneAddress, session: SessionWire, current_id: Option<&str>) -> Self {
        // A controller may flag the pane itself, or only report the current
        // session id at the top level; accept either.
        let is_current = session.is_current || current_id.is_some_and(|id| id == session.id);
        Self {
            address,
            id: session.id,
            name: session.name.unwrap_or_default(),
            tty: session.tty.unwrap_or_default(),
            cwd: session.cwd.unwrap_or_default(),
            job: session.job.unwrap_or_default(),
            is_current,
        }
    }
}
