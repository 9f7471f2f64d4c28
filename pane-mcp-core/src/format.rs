//! Text rendering of result envelopes for the assistant.
//!
//! Pure presentation: nothing here validates, resolves or calls out.

use crate::envelope::{
    EnableReport, PaneReport, Payload, ReadReport, ResultEnvelope, SendControlReport,
    SendTextReport, SideReport, SplitReport, StatusReport,
};
use crate::topology::{Pane, Topology};
use std::fmt::Write;

/// Width of the `=` / `-` separator lines.
pub const SEPARATOR_WIDTH: usize = 60;

/// Marker placed before the current pane in listings.
pub const CURRENT_MARKER: &str = "*";

/// Render any envelope.
pub fn render(envelope: &ResultEnvelope) -> String {
    match envelope {
        ResultEnvelope::Success(payload) => render_payload(payload),
        ResultEnvelope::Failure(failure) => format!("Error: {}", failure.message),
    }
}

pub fn render_payload(payload: &Payload) -> String {
    match payload {
        Payload::Status(report) => render_status(report),
        Payload::ListPanes(topology) => render_list(topology),
        Payload::ReadPane(report) => render_read(report),
        Payload::CurrentPane(report) => render_current(report),
        Payload::SidePane(report) => render_side(report),
        Payload::EnableApi(report) => render_enable(report),
        Payload::SendText(report) => render_send_text(report),
        Payload::SendControlCharacter(report) => render_send_control(report),
        Payload::SplitPane(report) => render_split(report),
    }
}

fn heavy_rule() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

fn check(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}

/// Append `label: value` unless the value is empty.
fn field(out: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(out, "{label}: {value}");
    }
}

fn render_status(report: &StatusReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Terminal API status");
    let _ = writeln!(out, "{}", heavy_rule());
    let _ = writeln!(out, "Python module installed: {}", check(report.module_installed));
    let _ = writeln!(out, "API enabled:             {}", check(report.api_enabled));
    let _ = writeln!(out, "Inside terminal session: {}", check(report.in_session));
    if let Some(id) = &report.current_session_id {
        let _ = writeln!(out, "Current session id:      {id}");
    }
    let _ = writeln!(out, "{}", light_rule());
    let _ = write!(out, "Ready: {}", check(report.ready));
    if !report.ready {
        let mut hints = Vec::new();
        if !report.module_installed {
            hints.push("install the terminal control module");
        }
        if !report.api_enabled {
            hints.push("run enable_api and restart the terminal");
        }
        if !report.in_session {
            hints.push("launch the server from inside a terminal pane");
        }
        let _ = write!(out, " ({})", hints.join("; "));
    }
    out
}

fn pane_line(pane: &Pane) -> String {
    let marker = if pane.is_current { CURRENT_MARKER } else { " " };
    let mut line = format!("  {marker} {}", pane.address);
    if !pane.name.is_empty() {
        let _ = write!(line, "  {}", pane.name);
    }
    if !pane.job.is_empty() {
        let _ = write!(line, "  [{}]", pane.job);
    }
    if !pane.cwd.is_empty() {
        let _ = write!(line, "  {}", pane.cwd);
    }
    line
}

fn render_list(topology: &Topology) -> String {
    if topology.windows.is_empty() {
        return "No terminal windows found.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Terminal panes ({} window(s), {} pane(s))",
        topology.windows.len(),
        topology.pane_count()
    );
    let _ = writeln!(out, "{}", heavy_rule());
    for window in &topology.windows {
        let _ = writeln!(out, "Window {}", window.position);
        for tab in &window.tabs {
            let _ = writeln!(out, " Tab {}", tab.position);
            for pane in &tab.panes {
                let _ = writeln!(out, "{}", pane_line(pane));
            }
        }
    }
    let _ = writeln!(out, "{}", light_rule());
    let _ = write!(
        out,
        "{CURRENT_MARKER} = current pane. Address panes as t<tab>p<pane> or w<window>t<tab>p<pane>."
    );
    out
}

fn render_read(report: &ReadReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Pane {}", report.address);
    field(&mut out, "Name", &report.name);
    field(&mut out, "Directory", &report.cwd);
    let _ = writeln!(out, "{}", heavy_rule());
    if report.contents.is_empty() {
        out.push_str("(pane is empty)");
    } else {
        out.push_str(&report.contents);
    }
    out
}

fn pane_details(out: &mut String, report: &PaneReport) {
    field(out, "Name", &report.name);
    field(out, "Directory", &report.cwd);
    field(out, "Job", &report.job);
    field(out, "TTY", &report.tty);
    let _ = write!(
        out,
        "Window {}, tab {}, pane {} (session {})",
        report.address.window, report.address.tab, report.address.pane, report.session_id
    );
}

fn render_current(report: &PaneReport) -> String {
    let mut out = format!("Current pane: {}\n", report.address);
    let _ = writeln!(out, "{}", light_rule());
    pane_details(&mut out, report);
    out
}

fn render_side(report: &SideReport) -> String {
    let mut out = format!("Side pane: {} ({})\n", report.pane.address, report.position);
    let _ = writeln!(out, "{}", light_rule());
    pane_details(&mut out, &report.pane);
    out
}

fn render_enable(report: &EnableReport) -> String {
    if report.message.is_empty() {
        format!("API enabled: {}", check(report.enabled))
    } else {
        report.message.clone()
    }
}

fn render_send_text(report: &SendTextReport) -> String {
    let enter = if report.newline {
        "Enter pressed"
    } else {
        "no Enter"
    };
    format!("Sent to {} ({enter}):\n{}", report.address, report.text)
}

fn render_send_control(report: &SendControlReport) -> String {
    format!("Sent {} to {}", report.description(), report.address)
}

fn render_split(report: &SplitReport) -> String {
    format!(
        "Split {} {}. New pane session id: {}",
        report.address,
        report.direction.adverb(),
        report.new_session_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{PaneAddress, SidePosition};
    use crate::controller::{ControlChar, ListReply};
    use crate::envelope::{FailureKind, SplitDirection};

    fn scenario_topology() -> Topology {
        let reply: ListReply = serde_json::from_value(serde_json::json!({
            "windows": [{"id": "w", "tabs": [
                {"id": "t1", "sessions": [
                    {"id": "CUR", "name": "zsh", "cwd": "/home/me", "is_current": true}
                ]},
                {"id": "t2", "sessions": [
                    {"id": "P1", "name": "vim", "job": "vim"},
                    {"id": "P2"}
                ]}
            ]}]
        }))
        .unwrap();
        Topology::from_list(reply)
    }

    #[test]
    fn list_marks_only_current_pane() {
        let text = render_list(&scenario_topology());
        let marked: Vec<_> = text
            .lines()
            .filter(|l| l.starts_with(&format!("  {CURRENT_MARKER} ")))
            .collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("w1t1p1"));

        let tab1 = text.find(" Tab 1").unwrap();
        let tab2 = text.find(" Tab 2").unwrap();
        assert!(tab1 < tab2);
        assert!(text.contains("w1t2p1  vim  [vim]"));
        assert!(text.contains("w1t2p2"));
    }

    #[test]
    fn list_uses_fixed_width_separators() {
        let text = render_list(&scenario_topology());
        assert!(text.lines().any(|l| l == "=".repeat(SEPARATOR_WIDTH)));
        assert!(text.lines().any(|l| l == "-".repeat(SEPARATOR_WIDTH)));
    }

    #[test]
    fn empty_fields_are_omitted() {
        let report = ReadReport {
            address: PaneAddress::new(1, 2, 2),
            session_id: "P2".into(),
            name: String::new(),
            cwd: "/tmp".into(),
            contents: "hello".into(),
        };
        let text = render_read(&report);
        assert!(!text.contains("Name:"));
        assert!(text.contains("Directory: /tmp"));
        assert!(text.ends_with("hello"));
    }

    #[test]
    fn side_pane_shows_position() {
        let report = SideReport {
            position: SidePosition::Previous,
            pane: PaneReport {
                address: PaneAddress::new(1, 1, 2),
                session_id: "S".into(),
                name: "build".into(),
                tty: String::new(),
                cwd: String::new(),
                job: "cargo".into(),
            },
        };
        let text = render_side(&report);
        assert!(text.starts_with("Side pane: w1t1p2 (previous)"));
        assert!(text.contains("Job: cargo"));
        assert!(!text.contains("TTY"));
    }

    #[test]
    fn status_explains_not_ready() {
        let text = render_status(&StatusReport::new(true, false, true, None));
        assert!(text.contains("Ready: no"));
        assert!(text.contains("enable_api"));
    }

    #[test]
    fn failure_rendering() {
        let env = ResultEnvelope::failure(FailureKind::Transport, "timed out");
        assert_eq!(render(&env), "Error: timed out");
    }

    #[test]
    fn control_and_split_messages() {
        let ctrl = render_send_control(&SendControlReport {
            address: PaneAddress::new(1, 1, 1),
            control: ControlChar::Interrupt,
        });
        assert_eq!(ctrl, "Sent Ctrl+C (interrupt) to w1t1p1");

        let split = render_split(&SplitReport {
            address: PaneAddress::new(1, 1, 1),
            source_session_id: "A".into(),
            new_session_id: "B".into(),
            direction: SplitDirection::Vertical,
        });
        assert_eq!(split, "Split w1t1p1 vertically. New pane session id: B");
    }
}
