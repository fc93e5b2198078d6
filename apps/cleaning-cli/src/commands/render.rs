//! Plain-text rendering of API rows.

use chrono::{DateTime, Utc};

use crate::model::*;

pub(super) fn when(t: &DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

pub(super) fn record_line(r: &CleaningRecord) -> String {
    format!(
        "{}  {:<8} bus {:<5} {:<15} {:<19} {}",
        when(&r.created_at),
        r.ppu,
        r.bus_number,
        r.terminal,
        r.cleaning_type,
        r.id
    )
}

pub(super) fn record_detail(r: &CleaningRecord) -> Vec<String> {
    vec![
        format!("Record       {}", r.id),
        format!("Cleaner      {}", r.user_id),
        format!("Created      {}", when(&r.created_at)),
        format!("PPU          {}", r.ppu),
        format!("Bus number   {}", r.bus_number),
        format!("Terminal     {}", r.terminal),
        format!("Type         {}", r.cleaning_type),
        format!("Stickers     {}", yes_no(r.stickers_removed)),
        format!("Graffiti     {}", yes_no(r.graffiti_removed)),
        format!("Front photo  {}", r.image_front_url.as_deref().unwrap_or("-")),
        format!("Back photo   {}", r.image_back_url.as_deref().unwrap_or("-")),
    ]
}

pub(super) fn task_line(t: &Task) -> String {
    let title = t.title.as_deref().unwrap_or("(untitled)");
    match t.completed_at {
        Some(done) => format!("{}  {}: {}  [done {}]", t.id, title, t.content, when(&done)),
        None => format!("{}  {}: {}  [{}]", t.id, title, t.content, t.status),
    }
}

pub(super) fn inspection_line(i: &InspectionView) -> String {
    let verdict = if i.passed { "PASSED" } else { "FAILED" };
    let mut line = format!(
        "{}  {:<6} {:<8} {:<15} by {}",
        when(&i.created_at),
        verdict,
        i.ppu,
        i.terminal,
        i.supervisor_name.as_deref().unwrap_or("?")
    );
    if let Some(c) = i.comments.as_deref().filter(|c| !c.is_empty()) {
        line.push_str(&format!("  \"{c}\""));
    }
    line
}

pub(super) fn break_line(b: &BreakView) -> String {
    format!(
        "{:<20} {:<10} {}",
        b.name,
        b.role,
        b.break_time.as_deref().unwrap_or("not assigned")
    )
}

pub(super) fn summary(s: &DashboardSummary) -> Vec<String> {
    let mut out = vec![
        format!(
            "Today {}   This week {}   This month {}",
            s.totals.today, s.totals.week, s.totals.month
        ),
        String::new(),
        "Top cleaners".to_string(),
    ];
    out.extend(
        s.top_cleaners
            .iter()
            .map(|c| format!("  {:<20} {:>5}  {}", c.name, c.total, c.user_id)),
    );
    out.push("By terminal".to_string());
    out.extend(
        s.by_terminal
            .iter()
            .map(|t| format!("  {:<20} {:>5}", t.terminal, t.total)),
    );
    out.push("By type".to_string());
    out.extend(
        s.by_type
            .iter()
            .map(|t| format!("  {:<20} {:>5}", t.cleaning_type, t.total)),
    );
    out
}

pub(super) fn report(r: &CleanerReport) -> Vec<String> {
    let mut out = vec![format!("Total cleanings {}", r.total)];
    out.extend(
        r.by_type
            .iter()
            .map(|t| format!("  {:<20} {:>5}", t.cleaning_type, t.total)),
    );
    out.push(format!(
        "Stickers removed {} / not removed {}",
        r.stickers.stickers_true, r.stickers.stickers_false
    ));
    out.push(format!(
        "Graffiti removed {} / not removed {}",
        r.graffiti.graffiti_true, r.graffiti.graffiti_false
    ));
    out
}
