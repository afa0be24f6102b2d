use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{AnalysisResult, ExerciseKind, ExerciseSet, SessionAggregate, WorkoutSummary};

const MS_PER_MINUTE: f64 = 60_000.0;

/// Running totals for one workout, plus the results grouped into sets.
///
/// A set is a run of consecutive results for the same exercise; switching
/// away and back opens a new set.
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    aggregate: SessionAggregate,
    closed_sets: Vec<ExerciseSet>,
    current_set: Option<ExerciseSet>,
}

impl SessionAggregator {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            aggregate: SessionAggregate::new(started_at),
            closed_sets: Vec::new(),
            current_set: None,
        }
    }

    pub fn accumulate(&mut self, result: &AnalysisResult) -> &SessionAggregate {
        // SessionAggregate::accumulate is by value; swap it out to fold in place.
        let started_at = self.aggregate.started_at;
        let previous = std::mem::replace(&mut self.aggregate, SessionAggregate::new(started_at));
        self.aggregate = previous.accumulate(result);

        match &mut self.current_set {
            Some(set) if set.exercise == result.exercise => set.extend(result),
            _ => {
                if let Some(set) = self.current_set.take() {
                    self.closed_sets.push(set);
                }
                self.current_set = Some(ExerciseSet::start(result));
            }
        }

        &self.aggregate
    }

    pub fn aggregate(&self) -> &SessionAggregate {
        &self.aggregate
    }

    /// Every set so far, the open one last.
    pub fn sets(&self) -> Vec<ExerciseSet> {
        let mut sets = self.closed_sets.clone();
        if let Some(set) = &self.current_set {
            sets.push(set.clone());
        }
        sets
    }

    /// Builds the end-of-workout record. `calories_per_minute` maps each
    /// exercise to its burn rate; unknown kinds contribute nothing.
    pub fn summarize<F>(&self, ended_at: DateTime<Utc>, calories_per_minute: F) -> WorkoutSummary
    where
        F: Fn(ExerciseKind) -> Option<f64>,
    {
        let sets = self.sets();
        let estimated_calories = sets
            .iter()
            .map(|set| {
                let minutes = set.duration_ms() as f64 / MS_PER_MINUTE;
                minutes * calories_per_minute(set.exercise).unwrap_or(0.0)
            })
            .sum();

        let started_at = self.aggregate.started_at;
        WorkoutSummary {
            id: Uuid::new_v4().to_string(),
            started_at,
            ended_at,
            duration_secs: (ended_at - started_at).num_seconds().max(0),
            total_reps: self.aggregate.total_reps,
            average_form: self.aggregate.average_form(),
            low_confidence_frames: self.aggregate.low_confidence_frames,
            sets,
            estimated_calories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FormGrade, PhaseState};
    use chrono::Duration;

    fn result(exercise: ExerciseKind, ts: u64, score: f64, rep_completed: bool) -> AnalysisResult {
        AnalysisResult {
            exercise,
            timestamp_ms: ts,
            rep_count: 0,
            rep_completed,
            form_score: score,
            grade: FormGrade::from_score(score),
            feedback: Vec::new(),
            phase: PhaseState::Up,
            low_confidence: false,
            hold_ms: 0,
        }
    }

    #[test]
    fn test_empty_session_has_no_sets() {
        let aggregator = SessionAggregator::new(Utc::now());
        assert!(aggregator.sets().is_empty());
        assert_eq!(aggregator.aggregate().frame_count, 0);
        assert_eq!(aggregator.aggregate().average_form(), 0.0);
    }

    #[test]
    fn test_consecutive_results_group_into_sets() {
        let mut aggregator = SessionAggregator::new(Utc::now());
        aggregator.accumulate(&result(ExerciseKind::Squats, 0, 90.0, false));
        aggregator.accumulate(&result(ExerciseKind::Squats, 1_000, 90.0, true));
        aggregator.accumulate(&result(ExerciseKind::Pushups, 2_000, 80.0, true));
        let aggregate = aggregator.accumulate(&result(ExerciseKind::Squats, 3_000, 70.0, true));

        assert_eq!(aggregate.total_reps, 3);
        assert_eq!(aggregate.frame_count, 4);

        let sets = aggregator.sets();
        let kinds: Vec<_> = sets.iter().map(|s| s.exercise).collect();
        assert_eq!(
            kinds,
            vec![ExerciseKind::Squats, ExerciseKind::Pushups, ExerciseKind::Squats]
        );
        assert_eq!(sets[0].reps, 1);
        assert_eq!(sets[0].duration_ms(), 1_000);
    }

    #[test]
    fn test_summary_estimates_calories_per_set() {
        let started = Utc::now();
        let mut aggregator = SessionAggregator::new(started);
        aggregator.accumulate(&result(ExerciseKind::Squats, 0, 90.0, false));
        aggregator.accumulate(&result(ExerciseKind::Squats, 60_000, 90.0, true));
        aggregator.accumulate(&result(ExerciseKind::Planks, 61_000, 96.0, false));
        aggregator.accumulate(&result(ExerciseKind::Planks, 91_000, 96.0, false));

        let summary = aggregator.summarize(started + Duration::seconds(95), |kind| match kind {
            ExerciseKind::Squats => Some(8.0),
            ExerciseKind::Planks => Some(4.0),
            _ => None,
        });

        // one minute of squats plus half a minute of plank
        assert!((summary.estimated_calories - 10.0).abs() < 1e-9);
        assert_eq!(summary.duration_secs, 95);
        assert_eq!(summary.total_reps, 1);
        assert_eq!(summary.sets.len(), 2);
        assert!((summary.average_form - 93.0).abs() < 1e-9);
        assert!(Uuid::parse_str(&summary.id).is_ok());
    }
}
