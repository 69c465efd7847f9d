//! Schedule formatting
//!
//! The backend returns either per-day entries (`dayOfWeek` 0 = Sunday) or a
//! combined string written by this client. Both end up as display lines.

use serde::Serialize;
use serde_json::Value;

/// Day names indexed by day-of-week (0 = Sunday)
pub const DAY_NAMES: [&str; 7] = [
    "Domingo",
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
];

pub const UNKNOWN_DAY: &str = "Día desconocido";
pub const CLOSED: &str = "Cerrado";

/// Label of the Monday-Friday half in the combined string
pub const WEEKDAY_LABEL: &str = "Lunes a Viernes";
/// Label of the Saturday-Sunday half in the combined string
pub const WEEKEND_LABEL: &str = "Sábado y Domingo";

const WEEKDAYS: &[usize] = &[1, 2, 3, 4, 5];
const WEEKEND: &[usize] = &[6, 0];

/// One display line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleLine {
    pub day: String,
    pub hours: String,
}

impl ScheduleLine {
    fn new(day: impl Into<String>, hours: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            hours: hours.into(),
        }
    }
}

/// Format a schedule set for display. Never fails.
pub fn format_schedule(schedule_set: &Value) -> Vec<ScheduleLine> {
    match schedule_set {
        Value::Array(entries) => entries.iter().flat_map(format_entry).collect(),
        Value::String(combined) => format_combined(combined),
        Value::Null => Vec::new(),
        other => {
            tracing::debug!(?other, "Unrecognized schedule shape");
            Vec::new()
        }
    }
}

/// Name for a day index, or the sentinel label
pub fn day_name(index: Option<i64>) -> &'static str {
    index
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| DAY_NAMES.get(i).copied())
        .unwrap_or(UNKNOWN_DAY)
}

fn format_entry(entry: &Value) -> Vec<ScheduleLine> {
    if let Some(text) = entry.as_str() {
        return format_combined(text);
    }
    if !entry.is_object() {
        return vec![ScheduleLine::new(UNKNOWN_DAY, " - ")];
    }

    let day = day_name(field(entry, &["dayOfWeek", "day"]).and_then(as_index));
    let closed = field(entry, &["isClosed", "closed"])
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let hours = if closed {
        CLOSED.to_string()
    } else {
        let open = field(entry, &["openTime", "open"]).and_then(Value::as_str).unwrap_or("");
        let close = field(entry, &["closeTime", "close"]).and_then(Value::as_str).unwrap_or("");
        format!("{open} - {close}")
    };
    vec![ScheduleLine::new(day, hours)]
}

fn field<'a>(entry: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| entry.get(*name).filter(|v| !v.is_null()))
}

fn as_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Expand a combined string (`"Lunes a Viernes: 08:00 - 18:00 | Sábado y Domingo: Cerrado"`)
/// into one line per day, Sunday first.
fn format_combined(combined: &str) -> Vec<ScheduleLine> {
    let combined = combined.trim();
    if combined.is_empty() {
        return Vec::new();
    }

    let mut by_day: [Option<String>; 7] = Default::default();
    let mut recognized = false;
    for segment in combined.split('|') {
        let Some((label, hours)) = segment.split_once(':') else {
            continue;
        };
        if let Some(days) = days_for_label(label.trim()) {
            recognized = true;
            for &day in days {
                by_day[day] = Some(hours.trim().to_string());
            }
        }
    }

    if !recognized {
        return vec![ScheduleLine::new(UNKNOWN_DAY, combined)];
    }

    by_day
        .iter()
        .enumerate()
        .filter_map(|(day, hours)| {
            hours
                .as_ref()
                .map(|h| ScheduleLine::new(DAY_NAMES[day], h.clone()))
        })
        .collect()
}

fn days_for_label(label: &str) -> Option<&'static [usize]> {
    const SINGLE: [&[usize]; 7] = [&[0], &[1], &[2], &[3], &[4], &[5], &[6]];

    if label.eq_ignore_ascii_case(WEEKDAY_LABEL) {
        return Some(WEEKDAYS);
    }
    if label.to_lowercase() == WEEKEND_LABEL.to_lowercase() {
        return Some(WEEKEND);
    }
    DAY_NAMES
        .iter()
        .position(|name| name.to_lowercase() == label.to_lowercase())
        .map(|i| SINGLE[i])
}

/// Whether a half-week value is `HH:MM - HH:MM` or `Cerrado`
pub fn is_valid_hours(value: &str) -> bool {
    normalize_hours(value).is_some()
}

/// Canonical form of a half-week value, if valid
pub fn normalize_hours(value: &str) -> Option<String> {
    let value = value.trim();
    if value.eq_ignore_ascii_case(CLOSED) {
        return Some(CLOSED.to_string());
    }
    let (open, close) = value.split_once('-')?;
    let open = parse_clock(open.trim())?;
    let close = parse_clock(close.trim())?;
    Some(format!("{open} - {close}"))
}

fn parse_clock(text: &str) -> Option<&str> {
    let (h, m) = text.split_once(':')?;
    let two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(h) || !two_digits(m) {
        return None;
    }
    let hour: u8 = h.parse().ok()?;
    let minute: u8 = m.parse().ok()?;
    (hour < 24 && minute < 60).then_some(text)
}

/// Join two valid halves into the combined string stored by the backend
pub fn combine_halves(weekday: &str, weekend: &str) -> String {
    format!("{WEEKDAY_LABEL}: {weekday} | {WEEKEND_LABEL}: {weekend}")
}

/// Split a combined string back into its halves (for pre-filling a form)
pub fn split_halves(combined: &str) -> Option<(String, String)> {
    let mut weekday = None;
    let mut weekend = None;
    for segment in combined.split('|') {
        let (label, hours) = segment.split_once(':')?;
        let label = label.trim();
        if label.eq_ignore_ascii_case(WEEKDAY_LABEL) {
            weekday = Some(hours.trim().to_string());
        } else if label.to_lowercase() == WEEKEND_LABEL.to_lowercase() {
            weekend = Some(hours.trim().to_string());
        }
    }
    Some((weekday?, weekend?))
}
