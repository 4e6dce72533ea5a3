use clap::Args;
use repflow_core::{flatten, Workout};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct WorkoutArgs {
    /// Workout JSON file (defaults to the built-in sample)
    #[arg(long)]
    pub workout: Option<PathBuf>,
}

impl WorkoutArgs {
    pub fn load(&self) -> Result<Workout, Box<dyn std::error::Error>> {
        match &self.workout {
            Some(path) => Ok(Workout::load(path)?),
            None => Ok(Workout::sample()),
        }
    }
}

pub fn timeline(args: WorkoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let timeline = flatten(Arc::new(args.load()?));
    let json = serde_json::json!({
        "workout": timeline.workout().name,
        "declared_duration_min": timeline.workout().duration_min,
        "total_work_secs": timeline.total_work_secs(),
        "items": timeline.items(),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

pub fn sample() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&Workout::sample())?);
    Ok(())
}
