//! Shorthand pane addresses and their resolution against a [`Topology`].
//!
//! Addresses use the host UI's 1-based numbering: `t2p1` is the first pane
//! of the second tab in the first window, `w2t1p3` qualifies the window.
//! The keyword `current` names the pane the server was launched from.

use crate::error::{Level, ResolutionError};
use crate::topology::{Pane, Topology};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// `[w<window>]t<tab>p<pane>`, decimal digits only.
static SHORTHAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:w([0-9]+))?t([0-9]+)p([0-9]+)$")
        .expect("shorthand address regex is a compile-time constant and must be valid")
});

/// Keyword accepted wherever an address is, resolving to the current pane.
pub const CURRENT_KEYWORD: &str = "current";

// ---------------------------------------------------------------------------
// Address types
// ---------------------------------------------------------------------------

/// Fully qualified position of a pane in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PaneAddress {
    pub window: usize,
    pub tab: usize,
    pub pane: usize,
}

impl PaneAddress {
    pub const fn new(window: usize, tab: usize, pane: usize) -> Self {
        Self { window, tab, pane }
    }
}

impl fmt::Display for PaneAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}t{}p{}", self.window, self.tab, self.pane)
    }
}

/// A parsed shorthand address; the window defaults to 1 when omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shorthand {
    pub window: Option<usize>,
    pub tab: usize,
    pub pane: usize,
}

impl Shorthand {
    pub fn qualified(&self) -> PaneAddress {
        PaneAddress::new(self.window.unwrap_or(1), self.tab, self.pane)
    }
}

impl FromStr for Shorthand {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ResolutionError::Malformed(s.to_string());
        let caps = SHORTHAND_PATTERN.captures(s.trim()).ok_or_else(malformed)?;

        let number = |idx: usize| -> Result<Option<usize>, ResolutionError> {
            match caps.get(idx) {
                None => Ok(None),
                Some(m) => match m.as_str().parse::<usize>() {
                    Ok(0) | Err(_) => Err(malformed()),
                    Ok(n) => Ok(Some(n)),
                },
            }
        };

        let window = number(1)?;
        let tab = number(2)?.ok_or_else(malformed)?;
        let pane = number(3)?.ok_or_else(malformed)?;
        Ok(Self { window, tab, pane })
    }
}

/// What an address string refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Current,
    Address(Shorthand),
}

impl FromStr for Target {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(CURRENT_KEYWORD) {
            Ok(Target::Current)
        } else {
            s.parse().map(Target::Address)
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve an address string (or `current`) to a pane.
pub fn resolve<'a>(topology: &'a Topology, address: &str) -> Result<&'a Pane, ResolutionError> {
    match address.parse::<Target>()? {
        Target::Current => resolve_current(topology),
        Target::Address(shorthand) => resolve_shorthand(topology, &shorthand),
    }
}

/// Walk window → tab → pane by 1-based position.
pub fn resolve_shorthand<'a>(
    topology: &'a Topology,
    shorthand: &Shorthand,
) -> Result<&'a Pane, ResolutionError> {
    let address = shorthand.qualified();

    let window = topology
        .window(address.window)
        .ok_or(ResolutionError::NotFound {
            level: Level::Window,
            position: address.window,
            available: topology.windows.len(),
        })?;
    let tab = window.tab(address.tab).ok_or(ResolutionError::NotFound {
        level: Level::Tab,
        position: address.tab,
        available: window.tabs.len(),
    })?;
    tab.pane(address.pane).ok_or(ResolutionError::NotFound {
        level: Level::Pane,
        position: address.pane,
        available: tab.panes.len(),
    })
}

/// The single pane flagged as current.
pub fn resolve_current(topology: &Topology) -> Result<&Pane, ResolutionError> {
    let mut current = topology.panes().filter(|p| p.is_current);
    let first = current.next().ok_or(ResolutionError::NoCurrentSession)?;
    let extra = current.count();
    if extra > 0 {
        log::error!(
            "Topology reports {} current panes; refusing to pick one",
            extra + 1
        );
        return Err(ResolutionError::MultipleCurrentSessions(extra + 1));
    }
    Ok(first)
}

/// Which neighbour of the current pane was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SidePosition {
    Next,
    Previous,
}

impl fmt::Display for SidePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SidePosition::Next => "next",
            SidePosition::Previous => "previous",
        })
    }
}

/// A pane adjacent to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidePane<'a> {
    pub pane: &'a Pane,
    pub position: SidePosition,
}

/// The pane after the current one in its tab, or the one before it when
/// the current pane is last.
pub fn resolve_side(topology: &Topology) -> Result<SidePane<'_>, ResolutionError> {
    let current = resolve_current(topology)?;
    let tab = topology
        .tab_of(&current.address)
        .ok_or(ResolutionError::NoCurrentSession)?;
    let index = current.address.pane - 1;

    if let Some(pane) = tab.panes.get(index + 1) {
        return Ok(SidePane {
            pane,
            position: SidePosition::Next,
        });
    }
    if let Some(pane) = index.checked_sub(1).and_then(|i| tab.panes.get(i)) {
        return Ok(SidePane {
            pane,
            position: SidePosition::Previous,
        });
    }
    Err(ResolutionError::NoSidePane)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ListReply;

    /// Build a snapshot from pane-id layouts; ids ending in `*` are current.
    fn topology(windows: &[&[&[&str]]]) -> Topology {
        let windows: Vec<_> = windows
            .iter()
            .enumerate()
            .map(|(w, tabs)| {
                serde_json::json!({
                    "id": format!("win{w}"),
                    "tabs": tabs.iter().enumerate().map(|(t, panes)| serde_json::json!({
                        "id": format!("tab{w}.{t}"),
                        "sessions": panes.iter().map(|id| serde_json::json!({
                            "id": id.trim_end_matches('*'),
                            "is_current": id.ends_with('*'),
                        })).collect::<Vec<_>>()
                    })).collect::<Vec<_>>()
                })
            })
            .collect();
        let reply: ListReply =
            serde_json::from_value(serde_json::json!({ "windows": windows })).unwrap();
        Topology::from_list(reply)
    }

    #[test]
    fn parses_both_forms() {
        assert_eq!(
            "t3p1".parse::<Shorthand>().unwrap(),
            Shorthand {
                window: None,
                tab: 3,
                pane: 1
            }
        );
        assert_eq!(
            " w2t1p10 ".parse::<Shorthand>().unwrap().qualified(),
            PaneAddress::new(2, 1, 10)
        );
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "", "t1", "p1", "t0p1", "t1p0", "w0t1p1", "T1P1", "t-1p1", "t+1p1", "t1p1x",
            "w1p1", "tp1", "t1 p1", "t99999999999999999999999p1",
        ] {
            assert!(
                matches!(bad.parse::<Shorthand>(), Err(ResolutionError::Malformed(_))),
                "expected '{bad}' to be malformed"
            );
        }
    }

    #[test]
    fn window_defaults_to_first() {
        let topo = topology(&[&[&["a"], &["b"], &["c", "d"]], &[&["e"], &["f"], &["g"]]]);
        let short = resolve(&topo, "t3p1").unwrap();
        let long = resolve(&topo, "w1t3p1").unwrap();
        assert_eq!(short, long);
        assert_eq!(short.id, "c");
        assert_eq!(resolve(&topo, "w2t3p1").unwrap().id, "g");
    }

    #[test]
    fn in_range_iff_all_levels_exist() {
        let topo = topology(&[&[&["a", "b"], &["c"]], &[&["d", "e", "f"]]]);
        for k in 1..=3usize {
            for i in 1..=3usize {
                for j in 1..=4usize {
                    let addr = format!("w{k}t{i}p{j}");
                    let exists = topo
                        .window(k)
                        .and_then(|w| w.tab(i))
                        .and_then(|t| t.pane(j))
                        .is_some();
                    match resolve(&topo, &addr) {
                        Ok(pane) => {
                            assert!(exists, "{addr} resolved but should not exist");
                            assert_eq!(pane.address, PaneAddress::new(k, i, j));
                        }
                        Err(ResolutionError::NotFound { .. }) => {
                            assert!(!exists, "{addr} should have resolved");
                        }
                        Err(other) => panic!("{addr}: unexpected {other:?}"),
                    }
                }
            }
        }
    }

    #[test]
    fn not_found_reports_failing_level() {
        let topo = topology(&[&[&["a"], &["b", "c"]]]);
        assert_eq!(
            resolve(&topo, "w2t1p1").unwrap_err(),
            ResolutionError::NotFound {
                level: Level::Window,
                position: 2,
                available: 1
            }
        );
        assert_eq!(
            resolve(&topo, "t3p1").unwrap_err(),
            ResolutionError::NotFound {
                level: Level::Tab,
                position: 3,
                available: 2
            }
        );
        let err = resolve(&topo, "t2p5").unwrap_err();
        assert!(err.to_string().contains("pane"));
    }

    #[test]
    fn current_keyword_resolves_flagged_pane() {
        let topo = topology(&[&[&["a"], &["b", "c*"]]]);
        assert_eq!(resolve(&topo, "current").unwrap().id, "c");
        assert_eq!(resolve(&topo, "CURRENT").unwrap().id, "c");
    }

    #[test]
    fn current_requires_exactly_one_flag() {
        let none = topology(&[&[&["a", "b"]]]);
        assert_eq!(
            resolve_current(&none).unwrap_err(),
            ResolutionError::NoCurrentSession
        );

        let two = topology(&[&[&["a*"]], &[&["b*"]]]);
        assert_eq!(
            resolve_current(&two).unwrap_err(),
            ResolutionError::MultipleCurrentSessions(2)
        );
    }

    #[test]
    fn side_pane_prefers_next() {
        let topo = topology(&[&[&["p1", "p2*", "p3"]]]);
        let side = resolve_side(&topo).unwrap();
        assert_eq!(side.pane.id, "p3");
        assert_eq!(side.position, SidePosition::Next);
    }

    #[test]
    fn side_pane_falls_back_to_previous() {
        let topo = topology(&[&[&["p1", "p2", "p3*"]]]);
        let side = resolve_side(&topo).unwrap();
        assert_eq!(side.pane.id, "p2");
        assert_eq!(side.position, SidePosition::Previous);
    }

    #[test]
    fn side_pane_stays_within_tab() {
        let topo = topology(&[&[&["solo*"], &["other", "another"]]]);
        assert_eq!(
            resolve_side(&topo).unwrap_err(),
            ResolutionError::NoSidePane
        );
    }

    #[test]
    fn side_pane_without_current() {
        let topo = topology(&[&[&["a", "b"]]]);
        assert_eq!(
            resolve_side(&topo).unwrap_err(),
            ResolutionError::NoCurrentSession
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let topo = topology(&[&[&["a", "b*"], &["c"]]]);
        for addr in ["t1p2", "w1t2p1", "current"] {
            assert_eq!(resolve(&topo, addr), resolve(&topo, addr));
        }
    }
}
