//! Terminal output utilities: ANSI formatting, notes and table rendering.

use tandem_agent::{EvaluationReport, ScoreBreakdown};
use tandem_core::TranscriptEntry;

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Wrap `text` in a style when color is enabled.
pub fn paint(text: &str, style: &str) -> String {
    if supports_color() {
        format!("{style}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm'
            for next in chars.by_ref() {
                if next == 'm' { break; }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------
//
// Notes go to stderr; stdout carries only the transcript and reports.

pub fn note_info(msg: &str) {
    if supports_color() {
        eprintln!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        eprintln!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        eprintln!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        eprintln!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        eprintln!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        eprintln!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Column alignment.
pub enum Align { Left, Right }

/// A table column definition.
pub struct Column {
    pub header: String,
    pub align: Align,
    pub max_width: Option<usize>,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Left, max_width: None }
    }
    pub fn right(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Right, max_width: None }
    }
    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

/// Render a table with given columns and rows.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let num_cols = columns.len();
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|c| strip_ansi(&c.header).chars().count())
        .collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(num_cols) {
            let w = strip_ansi(cell).chars().count();
            let w = columns[i].max_width.map_or(w, |max| w.min(max));
            widths[i] = widths[i].max(w);
        }
    }

    let mut out = String::new();

    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i], &col.align))
        .collect();
    out.push_str(&paint(&format!("  {}  ", header_cells.join("  ")), BOLD));
    out.push('\n');

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                pad_cell(&truncate(cell, widths[i]), widths[i], &columns[i].align)
            })
            .collect();
        out.push_str(&format!("  {}  \n", cells.join("  ")));
    }

    out
}

fn truncate(s: &str, width: usize) -> String {
    if strip_ansi(s).chars().count() <= width {
        return s.to_string();
    }
    let plain = strip_ansi(s);
    let kept: String = plain.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn pad_cell(s: &str, width: usize, align: &Align) -> String {
    let visible_len = strip_ansi(s).chars().count();
    let pad = width.saturating_sub(visible_len);
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}

// ---------------------------------------------------------------------------
// Dialogue rendering
// ---------------------------------------------------------------------------

/// One transcript line, speaker colored by seat (A or B).
pub fn render_entry(turn: u32, entry: &TranscriptEntry, first_seat: bool) -> String {
    let color = if first_seat { MAGENTA } else { BLUE };
    let tag = paint(&format!("[{turn}]"), DIM);
    let speaker = paint(&entry.speaker, &format!("{BOLD}{color}"));
    format!("{tag} {speaker}: {}", entry.content)
}

pub fn render_breakdown(rows: &[(String, ScoreBreakdown)]) -> String {
    let columns = [
        Column::left("Direction"),
        Column::right("Age"),
        Column::right("Height"),
        Column::right("Interests"),
        Column::right("Personality"),
        Column::right("Score"),
    ];
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|(label, b)| {
            vec![
                label.clone(),
                format!("{:+}", b.age),
                format!("{:+}", b.height),
                format!("{:+}", b.interests),
                format!("{:+}", b.personality),
                format!("{}/10", b.total()),
            ]
        })
        .collect();
    render_table(&columns, &rows)
}

fn score_color(score: u8) -> &'static str {
    match score {
        75.. => GREEN,
        50..=74 => YELLOW,
        _ => RED,
    }
}

pub fn render_report(report: &EvaluationReport) -> String {
    let columns = [
        Column::left("Dimension"),
        Column::right("Score"),
        Column::left("Comment").max_width(72),
    ];
    let score = |s: u8| paint(&s.to_string(), score_color(s));
    let rows = vec![
        vec!["Interaction".to_string(), score(report.interaction_score), report.interaction_comment.clone()],
        vec!["Values".to_string(), score(report.values_score), report.values_comment.clone()],
        vec!["Chemistry".to_string(), score(report.chemistry_score), report.chemistry_comment.clone()],
    ];

    let mut out = render_table(&columns, &rows);
    out.push('\n');
    out.push_str(&format!(
        "  {} {}\n",
        paint("Total:", BOLD),
        paint(&format!("{}/100", report.total_score), score_color(report.total_score))
    ));
    out.push_str(&format!("  {} {}\n", paint("Verdict:", BOLD), report.final_verdict));
    out.push_str(&format!("  {} {}\n", paint("Suggestion:", BOLD), report.suggestion));
    out
}
