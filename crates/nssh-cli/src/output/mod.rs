//! Output formatting utilities for the CLI
//!
//! Narration goes to stdout with a coloured marker; warnings and errors go
//! to stderr. Tables use tabled's rounded style.

use std::io::Write;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use tabled::{settings::Style, Table, Tabled};

use nssh_core::{Device, DeviceRecord, PortMapping};

/// Separator printed between narration and the remote session
pub const SESSION_SEPARATOR_WIDTH: usize = 40;

/// Format resolved port mappings as a table
///
/// Returns "No port mappings" when `entries` is empty.
pub fn format_port_mappings(entries: &[(Device, PortMapping)]) -> String {
    if entries.is_empty() {
        return "No port mappings".to_string();
    }

    #[derive(Tabled)]
    struct MappingRow {
        #[tabled(rename = "DEVICE")]
        device: String,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "ENDPOINT")]
        endpoint: String,
        #[tabled(rename = "PORT")]
        port: u16,
        #[tabled(rename = "DURATION")]
        duration: String,
        #[tabled(rename = "SOURCE")]
        source: String,
        #[tabled(rename = "TLS")]
        tls: bool,
    }

    let rows: Vec<MappingRow> = entries
        .iter()
        .map(|(device, mapping)| MappingRow {
            device: device.identifier().to_string(),
            name: truncate(device.name_or_unknown(), 24),
            endpoint: format!("{}:{}", mapping.hostname, mapping.port),
            port: mapping.destination.port,
            duration: format_hours(mapping.duration),
            source: if mapping.source.ip_ranges.is_empty() {
                "-".to_string()
            } else {
                mapping.source.ip_ranges.join(",")
            },
            tls: mapping.tls_required,
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn format_hours(secs: u64) -> String {
    let hours = secs as f32 / 3600.0;
    format!("{}h", hours)
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Horizontal rule shown right before the session starts
pub fn session_separator() -> String {
    "-".repeat(SESSION_SEPARATOR_WIDTH)
}

fn print_marked(mut out: impl Write, color: Color, marker: &str, msg: &str) {
    let _ = crossterm::execute!(
        out,
        SetForegroundColor(color),
        Print(marker),
        Print(" "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    print_marked(std::io::stdout(), Color::Green, "✓", msg);
}

/// Print an error message in red with an X prefix, to stderr
pub fn print_error(msg: &str) {
    print_marked(std::io::stderr(), Color::Red, "✗", msg);
}

/// Print a warning message in yellow, to stderr
pub fn print_warning(msg: &str) {
    print_marked(std::io::stderr(), Color::Yellow, "⚠", msg);
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    print_marked(std::io::stdout(), Color::Cyan, "ℹ", msg);
}
