use chrono::{DateTime, Utc};

use common::{Alert, AlertKind, Observation, Priority, Recommendation, WeeklyReport};

pub const REPORT_PERIOD: &str = "7 days";

/// Summarize a window of observations, newest first.
/// Returns `None` when there is nothing to report on.
pub fn summarize(observations: &[Observation], now: DateTime<Utc>) -> Option<WeeklyReport> {
    let latest = observations.first()?;

    let ready_count = observations.iter().filter(|o| o.ready).count();
    let streak_sum: f64 = observations.iter().map(|o| f64::from(o.volatility_streak)).sum();
    let avg = streak_sum / observations.len() as f64;

    Some(WeeklyReport {
        timestamp: now,
        period: REPORT_PERIOD.to_string(),
        samples: observations.len(),
        ready_now: latest.ready,
        ready_count,
        // one decimal, as shown in the report
        avg_volatility_streak: (avg * 10.0).round() / 10.0,
        current_streak: latest.volatility_streak,
        activity_count: latest.activity_count,
        recommendation: if latest.ready {
            Recommendation::ExecuteFramework
        } else {
            Recommendation::ContinueMonitoring
        },
    })
}

/// Wrap a report as an informational alert; `latest` becomes the snapshot.
pub fn report_alert(report: &WeeklyReport, latest: &Observation) -> Alert {
    Alert {
        kind: AlertKind::WeeklyReport,
        priority: Priority::Info,
        title: "📊 Weekly Report".to_string(),
        message: format!(
            "Period: {}. Framework ready in {}/{} checks (ready now: {}). \
             Average volatility streak: {:.1}, current streak: {}. \
             Recommendation: {}.",
            report.period,
            report.ready_count,
            report.samples,
            if report.ready_now { "yes" } else { "no" },
            report.avg_volatility_streak,
            report.current_streak,
            report.recommendation
        ),
        snapshot: latest.clone(),
    }
}
