//! Match report and ticker formatting.
//!
//! Pure text layout over the engine state: the fixed-width report box, the
//! deterministic export filename, and the single-line news ticker. The only
//! fallible operation here is writing the exported file to disk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::Result;
use crate::state::{Match, PlayerSlot};

const BOX_TOP: &str = "╔════════════════════════════════════════════════════╗";
const BOX_TITLE: &str = "║               CUESCORE MATCH REPORT                ║";
const BOX_HEADER_RULE: &str = "╠════════════════════════════════════════════════════╣";
const BOX_BOTTOM: &str = "╚════════════════════════════════════════════════════╝";
const RULE: &str = "------------------------------------------------------";
const NO_FRAMES_PLACEHOLDER: &str = "  > No frames recorded yet.";
const FOOTER: &str = "              GENERATED BY CUESCORE";

/// Render the full match report as of `now`.
///
/// `now` is passed in rather than read from the clock so the layout is a pure
/// function of its inputs.
pub fn format_report(m: &Match, now: DateTime<Local>) -> String {
    let p1 = m.player(PlayerSlot::One);
    let p2 = m.player(PlayerSlot::Two);

    let mut report = String::new();
    report.push_str(BOX_TOP);
    report.push('\n');
    report.push_str(BOX_TITLE);
    report.push('\n');
    report.push_str(BOX_HEADER_RULE);
    report.push('\n');
    report.push_str(&format!("  DATE:     {}\n", now.format("%Y-%m-%d %H:%M:%S")));
    report.push_str(&format!("  DURATION: {} (HH:MM:SS)\n", duration_text(m, now)));
    report.push_str(&format!("  RACE TO:  {}\n", m.race_to()));
    report.push_str(RULE);
    report.push('\n');
    report.push_str(&format!(
        "  LIVE SCORE: {} ({}) - {} ({})\n",
        p1.name, p1.score, p2.name, p2.score
    ));
    report.push_str(&format!(
        "  RACES WON:  {} [{}] | {} [{}]\n",
        p1.name, p1.races_won, p2.name, p2.races_won
    ));
    report.push_str(RULE);
    report.push('\n');
    report.push_str("  PLAYER STATISTICS:\n");
    report.push_str(&format!(
        "  {:<15} [DISHES: {} | REV: {}]\n",
        p1.name, p1.break_dishes, p1.reverse_dishes
    ));
    report.push_str(&format!(
        "  {:<15} [DISHES: {} | REV: {}]\n",
        p2.name, p2.break_dishes, p2.reverse_dishes
    ));
    report.push_str(RULE);
    report.push_str("\n\n");
    report.push_str("  MATCH PROGRESS LOG:\n");
    if m.ledger().is_empty() {
        report.push_str(NO_FRAMES_PLACEHOLDER);
        report.push('\n');
    } else {
        for record in m.ledger() {
            report.push_str(&format!(
                "  [✔] {:<10} | WINNER: {:<15} | TYPE: {}\n",
                format!("FRAME {}", record.frame),
                record.winner,
                record.frame_type.label()
            ));
        }
    }
    report.push('\n');
    report.push_str(BOX_BOTTOM);
    report.push('\n');
    report.push_str(FOOTER);
    report
}

/// Elapsed time since the match started, as HH:MM:SS.
///
/// Zero when the match has never been configured; absolute value guards
/// against a clock that moved backwards.
fn duration_text(m: &Match, now: DateTime<Local>) -> String {
    match m.start_time() {
        None => "00:00:00".to_string(),
        Some(start) => {
            let total = (now - start).num_seconds().unsigned_abs();
            format!(
                "{:02}:{:02}:{:02}",
                total / 3600,
                (total % 3600) / 60,
                total % 60
            )
        }
    }
}

/// Export filename derived from both player names.
pub fn report_filename(m: &Match) -> String {
    format!(
        "Match_Report_{}_vs_{}.txt",
        m.player(PlayerSlot::One).name,
        m.player(PlayerSlot::Two).name
    )
}

/// Write the report into `dir` and return the written path.
pub fn export_report(m: &Match, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(report_filename(m));
    std::fs::write(&path, format_report(m, Local::now()))?;
    log::info!("match report exported to {}", path.display());
    Ok(path)
}

/// Single-line status ticker: the news flash plus the standing score summary.
pub fn ticker_line(m: &Match, news: &str) -> String {
    let p1 = m.player(PlayerSlot::One);
    let p2 = m.player(PlayerSlot::Two);
    let segments = [
        format!("NEWS FLASH: {}", news.to_uppercase()),
        format!("RACE TO: {}", m.race_to()),
        format!(
            "LIVE SCORE: {} ({}) - {} ({})",
            p1.name, p1.score, p2.name, p2.score
        ),
        format!(
            "{} [D: {} | R: {}] | {} [D: {} | R: {}]",
            p1.name, p1.break_dishes, p1.reverse_dishes, p2.name, p2.break_dishes, p2.reverse_dishes
        ),
        format!(
            "RACES WON: {} ({}) - {} ({})",
            p1.name, p1.races_won, p2.name, p2.races_won
        ),
    ];
    segments.join(" • ")
}
