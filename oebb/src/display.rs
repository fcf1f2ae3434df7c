//! Terminal rendering of connections.
//!
//! Every function returns a new string. Colours are 24-bit ANSI escapes,
//! matching the provider's own hex colour strings for line badges.

use crate::domain::{ApiTime, ConnectionRecord, Section, StationRef, Stop};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const STRIKE: &str = "\x1b[9m";

const DURATION_COLOR: &str = "#ffff00";
const DELAY_COLOR: &str = "#ff0000";
const STATION_COLOR: &str = "#cc6666";
const MUTED_COLOR: &str = "#555555";
const BADGE_TEXT_COLOR: &str = "#ffffff";

/// Parse `#rrggbb`.
fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Colour `text` with a foreground and optional background.
///
/// Unparseable colours are ignored rather than emitted.
fn paint(text: &str, fg: &str, bg: Option<&str>) -> String {
    let mut out = String::new();
    if let Some((r, g, b)) = rgb(fg) {
        out.push_str(&format!("\x1b[38;2;{r};{g};{b}m"));
    }
    if let Some((r, g, b)) = bg.and_then(rgb) {
        out.push_str(&format!("\x1b[48;2;{r};{g};{b}m"));
    }
    if out.is_empty() {
        return text.to_string();
    }
    out.push_str(text);
    out.push_str(RESET);
    out
}

fn bold(text: &str) -> String {
    format!("{BOLD}{text}{RESET}")
}

/// Time of day as "HH:MM".
pub fn clock(time: ApiTime) -> String {
    time.clock()
}

/// Travel time as yellow "HH:MM".
pub fn duration(ms: i64) -> String {
    let minutes = ms / 1000 / 60;
    paint(
        &format!("{:02}:{:02}", minutes / 60, minutes % 60),
        DURATION_COLOR,
        None,
    )
}

/// Cross `text` out.
pub fn strikethrough(text: &str) -> String {
    format!("{STRIKE}{text}{RESET}")
}

/// Realtime estimate in red, if the stop is delayed.
fn delay_clock(stop: &Stop) -> Option<String> {
    stop.delayed
        .filter(|_| stop.is_delayed())
        .map(|t| paint(&clock(t), DELAY_COLOR, None))
}

/// Build the line of realtime estimates shown above a timetable line.
///
/// Returns the delay line together with the scheduled `dep` and `arr`
/// strings, struck through where a delay replaces them. Without a departure
/// delay the line is padded so the arrival delay sits above the arrival time.
pub fn delay_line(
    dep_delay: Option<&str>,
    arr_delay: Option<&str>,
    dep: &str,
    arr: &str,
) -> (String, String, String) {
    let mut line = String::new();

    let dep = match dep_delay {
        Some(delay) => {
            line.push_str(delay);
            line.push(' ');
            strikethrough(dep)
        }
        None => {
            line.push_str(&" ".repeat(dep.chars().count() + 1));
            dep.to_string()
        }
    };

    let arr = match arr_delay {
        Some(delay) => {
            line.push_str(delay);
            strikethrough(arr)
        }
        None => arr.to_string(),
    };

    (line, dep, arr)
}

/// Scheduled clock strings, plus a delay line when either end is delayed.
fn times(departure: &Stop, arrival: &Stop) -> (Option<String>, String, String) {
    let dep = clock(departure.scheduled);
    let arr = clock(arrival.scheduled);
    let dep_delay = delay_clock(departure);
    let arr_delay = delay_clock(arrival);

    if dep_delay.is_none() && arr_delay.is_none() {
        return (None, dep, arr);
    }

    let (line, dep, arr) = delay_line(dep_delay.as_deref(), arr_delay.as_deref(), &dep, &arr);
    (Some(line), dep, arr)
}

fn render_section(section: &Section) -> String {
    let mut out = String::new();
    let (delays, dep, arr) = times(&section.departure, &section.arrival);

    if let Some(line) = delays {
        out.push_str(&format!("\t{line}\n"));
    }

    let badge = match &section.category {
        Some(category) => {
            let label = format!("{:<3}", category.label().to_uppercase());
            bold(&paint(&label, BADGE_TEXT_COLOR, Some(&category.bar_color)))
        }
        None => format!("{:<3}", section.kind.to_uppercase()),
    };

    let times = format!(
        "{}{}{}",
        paint(&dep, MUTED_COLOR, None),
        paint("-", MUTED_COLOR, None),
        paint(&arr, MUTED_COLOR, None)
    );

    out.push_str(&format!(
        "\t{times} {badge} {} -> {}\n",
        section.departure.name, section.arrival.name
    ));
    out
}

/// Render a connection: an optional delay line, a summary line, one
/// indented line per section and a trailing blank line.
pub fn render_connection(conn: &ConnectionRecord) -> String {
    let mut out = String::new();
    let (delays, dep, arr) = times(&conn.departure, &conn.arrival);

    if let Some(line) = delays {
        out.push_str(&line);
        out.push('\n');
    }

    let from = bold(&paint(&conn.departure.name, STATION_COLOR, None));
    let to = bold(&paint(&conn.arrival.name, STATION_COLOR, None));
    out.push_str(&format!(
        "{dep}-{arr} ({}) {from} -> {to}\n",
        duration(conn.duration_ms)
    ));

    for section in &conn.sections {
        out.push_str(&render_section(section));
    }

    out.push('\n');
    out
}

/// Message for an empty result.
pub fn no_connections(from: &StationRef, to: &StationRef) -> String {
    format!(
        "No connections found from {} to {}",
        paint(from.display_name(), STATION_COLOR, None),
        paint(to.display_name(), STATION_COLOR, None)
    )
}
