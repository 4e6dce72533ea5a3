//! Workout definitions supplied by the host.
//!
//! A workout is a read-only tree: phases own sets, sets own exercises.
//! Exercises are shared behind `Arc` so the flattened timeline can point at
//! them without copying.

mod timeline;

pub use timeline::{flatten, FlatWorkItem, Timeline};

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::WorkoutError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    /// Display image reference.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub video: Option<String>,
    /// Ordered instructional steps.
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

impl Exercise {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: String::new(),
            video: None,
            steps: Vec::new(),
            benefits: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseSet {
    /// Target repetitions per exercise.
    #[serde(default)]
    pub reps: u32,
    /// Time budget in minutes shared by every exercise of the set.
    pub duration_min: u32,
    #[serde(default)]
    pub exercises: Vec<Arc<Exercise>>,
}

impl ExerciseSet {
    pub fn new(reps: u32, duration_min: u32, exercises: Vec<Exercise>) -> Self {
        Self {
            reps,
            duration_min,
            exercises: exercises.into_iter().map(Arc::new).collect(),
        }
    }
}

/// A named grouping of sets ("Warmup", "Main", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPhase {
    pub name: String,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Advertised total duration in minutes.
    #[serde(default)]
    pub duration_min: u32,
    #[serde(default)]
    pub phases: Vec<WorkoutPhase>,
}

impl Workout {
    /// Parse a workout from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON for a workout or
    /// if an exercise has a blank name.
    pub fn from_json_str(json: &str) -> Result<Self, WorkoutError> {
        let workout: Workout = serde_json::from_str(json)?;
        workout.validate()?;
        Ok(workout)
    }

    /// Read and parse a workout JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, WorkoutError> {
        let content = std::fs::read_to_string(path).map_err(|source| WorkoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), WorkoutError> {
        if self.name.trim().is_empty() {
            return Err(WorkoutError::Invalid("workout name is empty".into()));
        }
        for phase in &self.phases {
            for (set_index, set) in phase.sets.iter().enumerate() {
                if let Some(blank) = set.exercises.iter().position(|e| e.name.trim().is_empty()) {
                    return Err(WorkoutError::Invalid(format!(
                        "exercise {blank} of set {set_index} in phase '{}' has no name",
                        phase.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Total number of exercise occurrences across all phases and sets.
    pub fn exercise_count(&self) -> usize {
        self.phases
            .iter()
            .flat_map(|p| p.sets.iter())
            .map(|s| s.exercises.len())
            .sum()
    }

    /// A small built-in full-body workout.
    pub fn sample() -> Self {
        fn exercise(name: &str, steps: &[&str], benefits: &[&str]) -> Exercise {
            Exercise {
                name: name.into(),
                image: format!("images/{}.png", name.to_lowercase().replace(' ', "-")),
                video: None,
                steps: steps.iter().map(|s| s.to_string()).collect(),
                benefits: benefits.iter().map(|s| s.to_string()).collect(),
            }
        }

        Self {
            id: "full-body-burn".into(),
            name: "Full Body Burn".into(),
            duration_min: 15,
            phases: vec![
                WorkoutPhase {
                    name: "Warmup".into(),
                    sets: vec![ExerciseSet::new(
                        20,
                        2,
                        vec![
                            exercise(
                                "Jumping Jacks",
                                &["Stand with feet together", "Jump while raising arms overhead"],
                                &["Raises heart rate"],
                            ),
                            exercise(
                                "Arm Circles",
                                &["Extend arms to the sides", "Draw small circles forward, then back"],
                                &["Loosens shoulders"],
                            ),
                        ],
                    )],
                },
                WorkoutPhase {
                    name: "Main".into(),
                    sets: vec![
                        ExerciseSet::new(
                            12,
                            4,
                            vec![
                                exercise(
                                    "Push-ups",
                                    &["Hands under shoulders", "Lower chest to the floor", "Press back up"],
                                    &["Chest and triceps strength"],
                                ),
                                exercise(
                                    "Squats",
                                    &["Feet shoulder-width apart", "Sit back until thighs are parallel"],
                                    &["Leg strength", "Hip mobility"],
                                ),
                                exercise(
                                    "Lunges",
                                    &["Step forward", "Lower the back knee", "Push back to standing"],
                                    &["Balance", "Glute strength"],
                                ),
                                exercise(
                                    "Plank",
                                    &["Forearms on the floor", "Keep a straight line from head to heels"],
                                    &["Core stability"],
                                ),
                            ],
                        ),
                        ExerciseSet::new(
                            10,
                            3,
                            vec![
                                exercise(
                                    "Burpees",
                                    &["Drop to a squat", "Kick feet back", "Return and jump"],
                                    &["Conditioning"],
                                ),
                                exercise(
                                    "Mountain Climbers",
                                    &["Start in a high plank", "Drive knees toward the chest"],
                                    &["Core endurance"],
                                ),
                                exercise(
                                    "Glute Bridges",
                                    &["Lie on your back", "Lift hips until knees, hips and shoulders align"],
                                    &["Posterior chain activation"],
                                ),
                            ],
                        ),
                    ],
                },
                WorkoutPhase {
                    name: "Cooldown".into(),
                    sets: vec![ExerciseSet::new(
                        1,
                        2,
                        vec![
                            exercise("Child's Pose", &["Kneel and fold forward"], &["Back release"]),
                            exercise(
                                "Hamstring Stretch",
                                &["Sit with legs extended", "Reach toward your toes"],
                                &["Hamstring flexibility"],
                            ),
                        ],
                    )],
                },
            ],
        }
    }
}
