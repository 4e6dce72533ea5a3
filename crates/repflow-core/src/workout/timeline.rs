//! Flattening of a workout tree into an ordered list of timed work items.

use serde::Serialize;
use std::sync::Arc;

use super::{Exercise, Workout};

/// One timed unit of work derived from a single exercise occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatWorkItem {
    pub exercise: Arc<Exercise>,
    /// The set's budget divided equally among its exercises, floored.
    pub duration_secs: u64,
    pub phase_index: usize,
    /// Index of the owning set within its phase.
    pub set_index: usize,
    /// Position in the flattened sequence.
    pub total_index: usize,
}

/// The immutable, flattened sequence a session plays through.
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    #[serde(skip)]
    workout: Arc<Workout>,
    items: Vec<FlatWorkItem>,
}

impl Timeline {
    pub fn workout(&self) -> &Workout {
        &self.workout
    }

    pub fn items(&self) -> &[FlatWorkItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&FlatWorkItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.items.len().checked_sub(1)
    }

    /// Sum of all work durations, excluding get-ready and rest time.
    pub fn total_work_secs(&self) -> u64 {
        self.items.iter().map(|i| i.duration_secs).sum()
    }
}

/// Flatten phases -> sets -> exercises into timed work items.
///
/// Sets without exercises contribute nothing. An empty result means the
/// workout cannot be played.
pub fn flatten(workout: Arc<Workout>) -> Timeline {
    let mut items = Vec::with_capacity(workout.exercise_count());

    for (phase_index, phase) in workout.phases.iter().enumerate() {
        for (set_index, set) in phase.sets.iter().enumerate() {
            let count = set.exercises.len() as u64;
            if count == 0 {
                continue;
            }
            let duration_secs = u64::from(set.duration_min).saturating_mul(60) / count;
            for exercise in &set.exercises {
                items.push(FlatWorkItem {
                    exercise: Arc::clone(exercise),
                    duration_secs,
                    phase_index,
                    set_index,
                    total_index: items.len(),
                });
            }
        }
    }

    Timeline { workout, items }
}
