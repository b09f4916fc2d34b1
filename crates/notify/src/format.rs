//! Presentation helpers shared by the channels. Nothing here does I/O.

use common::{Observation, Priority};

/// Discord embed color for a priority.
pub fn color(priority: Priority) -> u32 {
    match priority {
        Priority::Critical => 0xFF0000,
        Priority::High => 0xFF6600,
        Priority::Medium => 0xFFFF00,
        Priority::Low => 0x00FF00,
        Priority::Info => 0x3498DB,
    }
}

/// Emoji prefix for text channels.
pub fn emoji(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "🚨",
        Priority::High => "⚠️",
        Priority::Medium => "🟡",
        Priority::Low => "🟢",
        Priority::Info => "ℹ️",
    }
}

/// `+1.5%`, `-0.8%`, `+0%`.
pub fn signed_percent(value: f64) -> String {
    // avoid rendering negative zero as "+-0%"
    let value = if value == 0.0 { 0.0 } else { value };
    if value >= 0.0 {
        format!("+{value}%")
    } else {
        format!("{value}%")
    }
}

/// The snapshot as `(label, value)` pairs, always in the same order.
pub fn snapshot_fields(obs: &Observation) -> Vec<(&'static str, String)> {
    vec![
        ("Primary Move", signed_percent(obs.primary_move)),
        ("Secondary Move", signed_percent(obs.secondary_move)),
        ("Volatility Streak", format!("{} cycles", obs.volatility_streak)),
        ("Activity Count", obs.activity_count.to_string()),
        ("Participation Count", obs.participation_count.to_string()),
    ]
}
