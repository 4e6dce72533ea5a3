use clap::Args;
use repflow_core::{
    run_session, CastProvider, Config, SessionCommand, SessionEngine, SessionEvent, SessionOutcome,
    DEFAULT_CAST_DEVICE,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::workout::WorkoutArgs;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub workout: WorkoutArgs,
    /// Run the clock N times faster than real time
    #[arg(long, default_value_t = 1)]
    pub speed: u32,
}

const HELP: &str = "commands: p=pause/resume n=skip b=back q=exit y=confirm exit c=keep going cast [DEVICE] uncast";

/// Map one line of terminal input to a session command.
fn parse_command(line: &str, default_device: &str) -> Option<SessionCommand> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word.to_lowercase().as_str() {
        "p" | "pause" | "resume" => Some(SessionCommand::TogglePause),
        "n" | "next" | "skip" => Some(SessionCommand::SkipForward),
        "b" | "back" => Some(SessionCommand::SkipBackward),
        "q" | "quit" | "exit" => Some(SessionCommand::RequestExit),
        "y" | "yes" => Some(SessionCommand::ConfirmExit),
        "c" | "continue" | "no" => Some(SessionCommand::CancelExit),
        "cast" => {
            let device = if rest.is_empty() { default_device } else { rest };
            Some(SessionCommand::ConnectCast(device.to_string()))
        }
        "uncast" => Some(SessionCommand::DisconnectCast),
        _ => None,
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let workout = Arc::new(args.workout.load()?);

    let mut session_config = config.session_config();
    session_config.tick_interval /= args.speed.max(1);

    let provider: Arc<dyn CastProvider> = Arc::new(config.cast_provider());

    let mut engine = SessionEngine::new(workout, session_config);
    engine.subscribe(Box::new(|event: &SessionEvent| match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "failed to serialize event"),
    }));

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async move {
        let default_device = provider
            .discover()
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_CAST_DEVICE.to_string());
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line, &default_device) {
                    Some(command) => {
                        if tx.send(command).await.is_err() {
                            return;
                        }
                    }
                    None => eprintln!("{HELP}"),
                }
            }
            // Input closed: keep the sender alive so the session plays out.
            tx.closed().await;
        });

        run_session(engine, rx, provider).await
    });
    // Stdin may still be blocked on a read; don't wait for it.
    runtime.shutdown_background();

    let (outcome, engine) = result?;
    let snapshot = engine.snapshot();
    match outcome {
        SessionOutcome::Completed(summary) => {
            info!(total_exercises = summary.total_exercises, "workout complete")
        }
        SessionOutcome::Cancelled => info!(
            progress_pct = snapshot.progress_pct,
            exercise = snapshot.exercise_name.as_deref().unwrap_or("-"),
            time_left_secs = snapshot.time_left_secs,
            "workout cancelled"
        ),
    }
    Ok(())
}
