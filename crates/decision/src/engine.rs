use chrono::{DateTime, Utc};
use tracing::debug;

use common::{Alert, AlertKind, Conditions, Observation, Priority, RawSample};

use crate::Thresholds;

/// Result of one evaluation: the new observation and the alerts it raises.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub observation: Observation,
    pub alerts: Vec<Alert>,
}

/// Scores raw samples against fixed thresholds.
///
/// Holds no connections and no mutable state; the only history it sees is
/// the `previous` observation passed in by the caller.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    thresholds: Thresholds,
}

impl DecisionEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Evaluate a sample and derive its alerts in one step.
    pub fn decide(&self, sample: &RawSample, previous: Option<&Observation>) -> Decision {
        let observation = self.evaluate(sample, previous);
        let alerts = self.alerts(&observation, previous);
        Decision { observation, alerts }
    }

    /// Build the observation for `sample`, stamped with the current time.
    pub fn evaluate(&self, sample: &RawSample, previous: Option<&Observation>) -> Observation {
        self.evaluate_at(sample, previous, Utc::now())
    }

    pub fn evaluate_at(
        &self,
        sample: &RawSample,
        previous: Option<&Observation>,
        timestamp: DateTime<Utc>,
    ) -> Observation {
        let t = &self.thresholds;

        // NaN compares false, so it counts as out of band.
        let low_volatility = sample.primary_move.abs() < t.volatility_limit
            && sample.secondary_move.abs() < t.volatility_limit;

        let volatility_streak = if low_volatility {
            previous
                .map(|p| p.volatility_streak)
                .unwrap_or(0)
                .saturating_add(1)
        } else {
            0
        };

        let conditions = Conditions {
            volatility_met: volatility_streak >= t.streak_required,
            maturity_met: sample.activity_count <= t.maturity_limit,
            participation_met: sample.participation_count >= t.participation_minimum,
        };

        debug!(
            low_volatility,
            volatility_streak,
            volatility_met = conditions.volatility_met,
            maturity_met = conditions.maturity_met,
            participation_met = conditions.participation_met,
            "Sample evaluated"
        );

        Observation {
            timestamp,
            primary_move: sample.primary_move,
            secondary_move: sample.secondary_move,
            activity_count: sample.activity_count,
            participation_count: sample.participation_count,
            volatility_streak,
            conditions,
            ready: conditions.all(),
        }
    }

    /// Alerts for `current`, in order: readiness or streak-building, then cooling.
    pub fn alerts(&self, current: &Observation, previous: Option<&Observation>) -> Vec<Alert> {
        let t = &self.thresholds;
        let mut alerts = Vec::new();

        let streak = current.volatility_streak;
        let warning_from = t.streak_required.saturating_sub(t.streak_warning_window);

        if current.ready {
            alerts.push(Alert {
                kind: AlertKind::Ready,
                priority: Priority::Critical,
                title: "🚨 FRAMEWORK CONDITIONS MET!".to_string(),
                message: format!(
                    "All conditions satisfied! Volatility streak: {streak} cycles, \
                     activity count: {}, participation count: {}. \
                     Execute phase 2 immediately!",
                    current.activity_count, current.participation_count
                ),
                snapshot: current.clone(),
            });
        } else if streak < t.streak_required && streak >= warning_from {
            let remaining = t.streak_required - streak;
            alerts.push(Alert {
                kind: AlertKind::StreakBuilding,
                priority: Priority::Medium,
                title: "📈 Low Volatility Streak Building".to_string(),
                message: format!(
                    "Volatility streak: {streak}/{} cycles. \
                     {remaining} more cycles needed for framework activation.",
                    t.streak_required
                ),
                snapshot: current.clone(),
            });
        }

        if let Some(prev) = previous {
            let delta = i64::from(current.activity_count) - i64::from(prev.activity_count);
            if delta <= -i64::from(t.cooling_drop) {
                alerts.push(Alert {
                    kind: AlertKind::Cooling,
                    priority: Priority::Medium,
                    title: "❄️ Market Cooling Detected".to_string(),
                    message: format!(
                        "Activity count decreased from {} to {} ({delta}). \
                         Market is cooling down!",
                        prev.activity_count, current.activity_count
                    ),
                    snapshot: current.clone(),
                });
            }
        }

        alerts
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(primary: f64, secondary: f64, activity: u32, participation: u32) -> RawSample {
        RawSample {
            primary_move: primary,
            secondary_move: secondary,
            activity_count: activity,
            participation_count: participation,
        }
    }

    fn prior(streak: u32, activity: u32) -> Observation {
        Observation {
            timestamp: Utc::now(),
            primary_move: 0.5,
            secondary_move: 0.5,
            activity_count: activity,
            participation_count: 25,
            volatility_streak: streak,
            conditions: Conditions::default(),
            ready: false,
        }
    }

    fn kinds(alerts: &[Alert]) -> Vec<AlertKind> {
        alerts.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn streak_starts_at_one_without_history() {
        let engine = DecisionEngine::default();
        let obs = engine.evaluate(&sample(1.0, -1.0, 50, 10), None);
        assert_eq!(obs.volatility_streak, 1);
    }

    #[test]
    fn streak_resets_when_either_move_leaves_band() {
        let engine = DecisionEngine::default();
        let prev = prior(8, 50);
        assert_eq!(engine.evaluate(&sample(3.0, 0.0, 50, 10), Some(&prev)).volatility_streak, 0);
        assert_eq!(engine.evaluate(&sample(0.0, -3.5, 50, 10), Some(&prev)).volatility_streak, 0);
        assert_eq!(engine.evaluate(&sample(2.99, -2.99, 50, 10), Some(&prev)).volatility_streak, 9);
    }

    #[test]
    fn maturity_and_participation_bounds_are_inclusive() {
        let engine = DecisionEngine::default();
        let obs = engine.evaluate(&sample(5.0, 5.0, 15, 20), None);
        assert!(obs.conditions.maturity_met);
        assert!(obs.conditions.participation_met);

        let obs = engine.evaluate(&sample(5.0, 5.0, 16, 19), None);
        assert!(!obs.conditions.maturity_met);
        assert!(!obs.conditions.participation_met);
    }

    #[test]
    fn ready_requires_all_three_conditions() {
        let engine = DecisionEngine::default();
        for volatility in [false, true] {
            for maturity in [false, true] {
                for participation in [false, true] {
                    let prev = prior(if volatility { 9 } else { 0 }, 30);
                    let s = sample(
                        0.5,
                        0.5,
                        if maturity { 10 } else { 40 },
                        if participation { 30 } else { 5 },
                    );
                    let obs = engine.evaluate(&s, Some(&prev));
                    assert_eq!(obs.conditions.volatility_met, volatility);
                    assert_eq!(obs.conditions.maturity_met, maturity);
                    assert_eq!(obs.conditions.participation_met, participation);
                    assert_eq!(
                        obs.ready,
                        volatility && maturity && participation,
                        "combination ({volatility}, {maturity}, {participation})"
                    );
                }
            }
        }
    }

    #[test]
    fn identical_inputs_give_identical_observations() {
        let engine = DecisionEngine::default();
        let at = Utc::now();
        let s = sample(1.2, -0.4, 12, 33);
        assert_eq!(engine.evaluate_at(&s, None, at), engine.evaluate_at(&s, None, at));
    }

    #[test]
    fn ready_cycle_with_cooling_emits_critical_then_cooling() {
        let engine = DecisionEngine::default();
        let prev = prior(9, 25);

        let decision = engine.decide(&sample(1.0, -1.0, 10, 25), Some(&prev));

        let obs = &decision.observation;
        assert_eq!(obs.volatility_streak, 10);
        assert!(obs.conditions.all());
        assert!(obs.ready);
        assert_eq!(kinds(&decision.alerts), vec![AlertKind::Ready, AlertKind::Cooling]);
        assert_eq!(decision.alerts[0].priority, Priority::Critical);
        assert_eq!(decision.alerts[1].priority, Priority::Medium);
        assert!(decision.alerts[1].message.contains("(-15)"), "{}", decision.alerts[1].message);
    }

    #[test]
    fn streak_building_reports_cycles_remaining() {
        let engine = DecisionEngine::default();
        let prev = prior(6, 40);

        let decision = engine.decide(&sample(1.0, -1.0, 40, 25), Some(&prev));

        assert_eq!(decision.observation.volatility_streak, 7);
        assert_eq!(kinds(&decision.alerts), vec![AlertKind::StreakBuilding]);
        assert_eq!(decision.alerts[0].priority, Priority::Medium);
        assert!(
            decision.alerts[0].message.contains("3 more cycles needed"),
            "{}",
            decision.alerts[0].message
        );
    }

    #[test]
    fn no_streak_alert_below_window() {
        let engine = DecisionEngine::default();
        let decision = engine.decide(&sample(1.0, 1.0, 40, 25), Some(&prior(5, 40)));
        assert_eq!(decision.observation.volatility_streak, 6);
        assert!(decision.alerts.is_empty());
    }

    #[test]
    fn no_streak_alert_once_requirement_met() {
        let engine = DecisionEngine::default();
        let decision = engine.decide(&sample(1.0, 1.0, 40, 25), Some(&prior(12, 40)));
        assert!(!decision.observation.ready);
        assert!(decision.alerts.is_empty());
    }

    #[test]
    fn cooling_threshold_is_inclusive() {
        let engine = DecisionEngine::default();
        let exactly = engine.decide(&sample(9.0, 9.0, 80, 25), Some(&prior(0, 90)));
        assert_eq!(kinds(&exactly.alerts), vec![AlertKind::Cooling]);

        let short = engine.decide(&sample(9.0, 9.0, 81, 25), Some(&prior(0, 90)));
        assert!(short.alerts.is_empty());
    }

    #[test]
    fn no_cooling_without_previous() {
        let engine = DecisionEngine::default();
        let decision = engine.decide(&sample(9.0, 9.0, 0, 0), None);
        assert!(decision.alerts.is_empty());
    }

    #[test]
    fn ready_alert_refires_every_ready_cycle() {
        let engine = DecisionEngine::default();
        let first = engine.decide(&sample(0.1, 0.1, 5, 30), Some(&prior(9, 5)));
        let second = engine.decide(&sample(0.1, 0.1, 5, 30), Some(&first.observation));
        assert_eq!(kinds(&first.alerts), vec![AlertKind::Ready]);
        assert_eq!(kinds(&second.alerts), vec![AlertKind::Ready]);
        assert_eq!(second.observation.volatility_streak, 11);
    }

    #[test]
    fn small_streak_requirement_does_not_underflow() {
        let engine = DecisionEngine::new(Thresholds {
            streak_required: 1,
            ..Thresholds::default()
        });
        let decision = engine.decide(&sample(9.0, 0.0, 40, 25), None);
        assert_eq!(decision.observation.volatility_streak, 0);
        assert_eq!(kinds(&decision.alerts), vec![AlertKind::StreakBuilding]);
        assert!(decision.alerts[0].message.contains("1 more cycles needed"));
    }

    #[test]
    fn saturated_streak_does_not_overflow() {
        let engine = DecisionEngine::default();
        let obs = engine.evaluate(&sample(0.0, 0.0, 0, 0), Some(&prior(u32::MAX, 0)));
        assert_eq!(obs.volatility_streak, u32::MAX);
    }
}
