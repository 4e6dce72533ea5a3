//! Session engine.
//!
//! Owns the flattened timeline, the single countdown, the exit guard and
//! the cast state of one session. It has no internal thread: the host (or
//! `driver::run_session`) calls `tick()` once per second and invokes the
//! navigation commands in between. Every command returns the events it
//! produced and also hands them to subscribers.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(Arc::new(workout), SessionConfig::default());
//! engine.subscribe(Box::new(|event: &SessionEvent| println!("{event:?}")));
//! engine.start()?;
//! // Once per second:
//! engine.tick();
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::clock::{ClockTick, SessionClock};
use super::exit_guard::ExitGuard;
use super::state::{
    SessionAction, SessionConfig, SessionOutcome, SessionPhase, SessionState, SessionSummary,
};
use super::transition;
use crate::cast::{CastProvider, CastSidecar, CastState};
use crate::error::{CastError, SessionError};
use crate::events::SessionEvent;
use crate::workout::{flatten, Timeline, Workout};

/// Callback receiving every event a session emits.
pub type Subscriber = Box<dyn FnMut(&SessionEvent) + Send>;

/// Full view of a session for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub workout_name: String,
    pub phase: SessionPhase,
    pub current_index: usize,
    pub total_items: usize,
    pub time_left_secs: u64,
    /// Full length of the current phase's countdown.
    pub phase_duration_secs: u64,
    pub is_paused: bool,
    /// True while the exit prompt holds the clock.
    pub exit_prompt_open: bool,
    pub exercise_name: Option<String>,
    /// "Up next" preview during get-ready, exercise and rest.
    pub next_exercise_name: Option<String>,
    /// 0.0 .. 100.0 share of work items finished.
    pub progress_pct: f64,
    pub cast: CastState,
    pub at: DateTime<Utc>,
}

pub struct SessionEngine {
    id: Uuid,
    timeline: Timeline,
    config: SessionConfig,
    state: SessionState,
    clock: SessionClock,
    exit_guard: ExitGuard,
    cast: CastSidecar,
    started: bool,
    outcome: Option<SessionOutcome>,
    subscribers: Vec<Subscriber>,
}

impl SessionEngine {
    /// Flatten `workout` and prepare an unstarted session.
    pub fn new(workout: Arc<Workout>, config: SessionConfig) -> Self {
        Self::with_timeline(flatten(workout), config)
    }

    pub fn with_timeline(timeline: Timeline, config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            timeline,
            state: SessionState::get_ready(config.get_ready_secs),
            config,
            clock: SessionClock::new(),
            exit_guard: ExitGuard::new(),
            cast: CastSidecar::new(),
            started: false,
            outcome: None,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.subscribers.push(subscriber);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cast_state(&self) -> &CastState {
        self.cast.state()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Completed or cancelled.
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn exit_prompt_open(&self) -> bool {
        self.exit_guard.is_prompting()
    }

    /// Changes whenever the running countdown is replaced.
    pub fn clock_epoch(&self) -> u64 {
        self.clock.epoch()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            total_exercises: self.timeline.len(),
            declared_duration_min: self.timeline.workout().duration_min,
        }
    }

    pub fn phase_duration_secs(&self) -> u64 {
        match self.state.phase {
            SessionPhase::GetReady => self.config.get_ready_secs,
            SessionPhase::Exercise => self
                .timeline
                .get(self.state.current_index)
                .map(|i| i.duration_secs)
                .unwrap_or(0),
            SessionPhase::Rest => self.config.rest_secs,
            SessionPhase::Completed => 0,
        }
    }

    /// 0.0 .. 100.0 share of work items already finished.
    pub fn progress_pct(&self) -> f64 {
        let total = self.timeline.len();
        if total == 0 {
            return 0.0;
        }
        let done = match self.state.phase {
            SessionPhase::GetReady => 0,
            SessionPhase::Exercise => self.state.current_index,
            SessionPhase::Rest => self.state.current_index + 1,
            SessionPhase::Completed => total,
        };
        (done as f64 / total as f64 * 100.0).min(100.0)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let name_at = |index: usize| self.timeline.get(index).map(|i| i.exercise.name.clone());
        let (exercise_name, next_exercise_name) = match self.state.phase {
            SessionPhase::GetReady => (None, name_at(0)),
            SessionPhase::Exercise => (
                name_at(self.state.current_index),
                name_at(self.state.current_index + 1),
            ),
            SessionPhase::Rest => (None, name_at(self.state.current_index + 1)),
            SessionPhase::Completed => (None, None),
        };
        SessionSnapshot {
            session_id: self.id,
            workout_name: self.timeline.workout().name.clone(),
            phase: self.state.phase,
            current_index: self.state.current_index,
            total_items: self.timeline.len(),
            time_left_secs: self.state.time_left_secs,
            phase_duration_secs: self.phase_duration_secs(),
            is_paused: self.state.is_paused,
            exit_prompt_open: self.exit_guard.is_prompting(),
            exercise_name,
            next_exercise_name,
            progress_pct: self.progress_pct(),
            cast: self.cast.state().clone(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Enter get-ready and arm the warm-up countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyWorkout` if the workout has no exercises;
    /// the session then stays unstarted and emits nothing.
    pub fn start(&mut self) -> Result<Vec<SessionEvent>, SessionError> {
        if self.started {
            debug!(session = %self.id, "start ignored: already started");
            return Ok(Vec::new());
        }
        if self.timeline.is_empty() {
            let workout = self.timeline.workout().name.clone();
            warn!(session = %self.id, %workout, "refusing to start an empty workout");
            return Err(SessionError::EmptyWorkout { workout });
        }
        self.started = true;
        info!(
            session = %self.id,
            workout = %self.timeline.workout().name,
            items = self.timeline.len(),
            "session started"
        );
        Ok(self.enter(SessionState::get_ready(self.config.get_ready_secs)))
    }

    /// Deliver one elapsed second.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        if !self.is_running() {
            return Vec::new();
        }
        match self.clock.tick() {
            ClockTick::Idle => Vec::new(),
            ClockTick::Running { remaining_secs } => {
                self.state.time_left_secs = remaining_secs;
                let events = vec![SessionEvent::StateChanged { state: self.state }];
                self.publish(&events);
                events
            }
            ClockTick::Expired => {
                self.state.time_left_secs = 0;
                let next = transition::advance(&self.state, &self.timeline, &self.config);
                self.enter(next)
            }
        }
    }

    pub fn toggle_pause(&mut self) -> Vec<SessionEvent> {
        if !self.accepts_navigation("toggle_pause") {
            return Vec::new();
        }
        self.state.is_paused = !self.state.is_paused;
        if self.state.is_paused {
            self.clock.pause();
        } else {
            self.clock.resume();
        }
        debug!(session = %self.id, paused = self.state.is_paused, "pause toggled");
        let events = vec![SessionEvent::StateChanged { state: self.state }];
        self.publish(&events);
        events
    }

    /// End the current phase now, exactly as if its countdown expired.
    pub fn skip_forward(&mut self) -> Vec<SessionEvent> {
        if !self.accepts_navigation("skip_forward") {
            return Vec::new();
        }
        let next = transition::advance(&self.state, &self.timeline, &self.config);
        self.enter(next)
    }

    /// Restart the previous exercise. No-op outside the exercise phase.
    pub fn skip_backward(&mut self) -> Vec<SessionEvent> {
        if !self.accepts_navigation("skip_backward") {
            return Vec::new();
        }
        match transition::step_back(&self.state, &self.timeline) {
            Some(next) => self.enter(next),
            None => {
                debug!(session = %self.id, phase = ?self.state.phase, "skip_backward ignored");
                Vec::new()
            }
        }
    }

    /// Open the exit confirmation prompt and freeze the clock.
    pub fn request_exit(&mut self) -> Vec<SessionEvent> {
        if !self.is_running() || !self.exit_guard.request(&mut self.clock) {
            debug!(session = %self.id, "request_exit ignored");
            return Vec::new();
        }
        debug!(session = %self.id, "exit prompt opened");
        let events = vec![SessionEvent::ExitRequested];
        self.publish(&events);
        events
    }

    /// Close the prompt; the session resumes exactly where it was.
    pub fn cancel_exit_request(&mut self) -> Vec<SessionEvent> {
        if !self.is_running() || !self.exit_guard.dismiss(&mut self.clock) {
            debug!(session = %self.id, "cancel_exit_request ignored");
            return Vec::new();
        }
        debug!(session = %self.id, "exit prompt dismissed");
        let events = vec![SessionEvent::ExitDismissed];
        self.publish(&events);
        events
    }

    /// Cancel the session from an open exit prompt. Halts the clock
    /// immediately and emits `Cancelled` once. Ignored when no prompt is
    /// open.
    pub fn confirm_exit(&mut self) -> Vec<SessionEvent> {
        if !self.is_running() || !self.exit_guard.confirm(&mut self.clock) {
            debug!(session = %self.id, "confirm_exit ignored");
            return Vec::new();
        }
        self.cancelled()
    }

    /// Cancel without a prompt. Used when the host goes away.
    pub fn abandon(&mut self) -> Vec<SessionEvent> {
        if !self.is_running() || !self.exit_guard.abandon(&mut self.clock) {
            return Vec::new();
        }
        self.cancelled()
    }

    pub fn dispatch(&mut self, action: SessionAction) -> Vec<SessionEvent> {
        match action {
            SessionAction::Tick => self.tick(),
            SessionAction::TogglePause => self.toggle_pause(),
            SessionAction::SkipForward => self.skip_forward(),
            SessionAction::SkipBackward => self.skip_backward(),
            SessionAction::RequestExit => self.request_exit(),
            SessionAction::ConfirmExit => self.confirm_exit(),
            SessionAction::CancelExit => self.cancel_exit_request(),
        }
    }

    // ── Cast ─────────────────────────────────────────────────────────

    /// Mark a cast connection attempt as in flight.
    pub fn begin_cast(&mut self, device: &str) -> bool {
        if self.is_finished() {
            return false;
        }
        self.cast.begin_connect(device);
        true
    }

    /// Apply the outcome of an attempt started with `begin_cast`.
    pub fn finish_cast(
        &mut self,
        device: &str,
        result: Result<String, CastError>,
    ) -> Vec<SessionEvent> {
        if self.is_finished() {
            return Vec::new();
        }
        let events = match self.cast.finish_connect(device, result) {
            Ok(true) => vec![SessionEvent::CastStateChanged {
                cast: self.cast.state().clone(),
            }],
            Ok(false) => Vec::new(),
            Err(err) => {
                warn!(session = %self.id, device, error = %err, "cast connection failed");
                vec![SessionEvent::CastFailed {
                    device: device.to_string(),
                    message: err.to_string(),
                }]
            }
        };
        self.publish(&events);
        events
    }

    /// Connect through `provider`, holding the engine for the whole delay.
    /// Hosts that must keep ticking meanwhile use `begin_cast` and
    /// `finish_cast` around their own task instead.
    pub async fn connect_cast(
        &mut self,
        provider: &dyn CastProvider,
        device: &str,
    ) -> Vec<SessionEvent> {
        if !self.begin_cast(device) {
            return Vec::new();
        }
        let result = provider.connect(device).await;
        self.finish_cast(device, result)
    }

    pub fn disconnect_cast(&mut self) -> Vec<SessionEvent> {
        if self.is_finished() || !self.cast.disconnect() {
            return Vec::new();
        }
        info!(session = %self.id, "cast disconnected");
        let events = vec![SessionEvent::CastStateChanged {
            cast: self.cast.state().clone(),
        }];
        self.publish(&events);
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn is_running(&self) -> bool {
        self.started && self.outcome.is_none()
    }

    /// Tear down after a confirmed exit: cast first, then `Cancelled`.
    fn cancelled(&mut self) -> Vec<SessionEvent> {
        self.outcome = Some(SessionOutcome::Cancelled);
        info!(
            session = %self.id,
            phase = ?self.state.phase,
            index = self.state.current_index,
            "session cancelled"
        );
        let mut events = Vec::new();
        if self.cast.disconnect() {
            events.push(SessionEvent::CastStateChanged {
                cast: self.cast.state().clone(),
            });
        }
        events.push(SessionEvent::Cancelled);
        self.publish(&events);
        events
    }

    fn accepts_navigation(&self, action: &str) -> bool {
        if !self.is_running() || !self.state.is_active() {
            debug!(session = %self.id, action, "ignored: session not running");
            return false;
        }
        if self.exit_guard.is_prompting() {
            debug!(session = %self.id, action, "ignored: exit prompt open");
            return false;
        }
        true
    }

    /// Install `next` and re-arm (or halt) the clock to match.
    fn enter(&mut self, next: SessionState) -> Vec<SessionEvent> {
        debug!(
            session = %self.id,
            from = ?self.state.phase,
            to = ?next.phase,
            index = next.current_index,
            secs = next.time_left_secs,
            "transition"
        );
        self.state = next;
        let mut events = vec![SessionEvent::StateChanged { state: self.state }];

        if next.is_completed() {
            self.clock.disarm();
            let summary = self.summary();
            self.outcome = Some(SessionOutcome::Completed(summary));
            info!(
                session = %self.id,
                total_exercises = summary.total_exercises,
                "session completed"
            );
            events.push(SessionEvent::Completed { summary });
        } else {
            self.clock.arm(next.time_left_secs);
        }

        self.publish(&events);
        events
    }

    fn publish(&mut self, events: &[SessionEvent]) {
        for subscriber in &mut self.subscribers {
            for event in events {
                subscriber(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{Exercise, ExerciseSet, WorkoutPhase};
    use std::sync::Mutex;

    fn workout(sets: Vec<ExerciseSet>) -> Arc<Workout> {
        Arc::new(Workout {
            id: "w1".into(),
            name: "Test Workout".into(),
            duration_min: 7,
            phases: vec![WorkoutPhase {
                name: "Main".into(),
                sets,
            }],
        })
    }

    fn set(minutes: u32, n: usize) -> ExerciseSet {
        ExerciseSet::new(
            10,
            minutes,
            (0..n).map(|i| Exercise::new(format!("Move {i}"))).collect(),
        )
    }

    fn started(sets: Vec<ExerciseSet>) -> SessionEngine {
        let mut engine = SessionEngine::new(workout(sets), SessionConfig::default());
        engine.start().unwrap();
        engine
    }

    fn tick_n(engine: &mut SessionEngine, n: u64) {
        for _ in 0..n {
            engine.tick();
        }
    }

    #[test]
    fn start_enters_get_ready() {
        let engine = started(vec![set(1, 2)]);
        assert_eq!(*engine.state(), SessionState::get_ready(10));
        assert!(engine.is_started());
    }

    #[test]
    fn start_rejects_empty_workout() {
        let mut engine = SessionEngine::new(workout(vec![set(3, 0)]), SessionConfig::default());
        let err = engine.start().unwrap_err();
        assert_eq!(
            err,
            SessionError::EmptyWorkout {
                workout: "Test Workout".into()
            }
        );
        assert!(!engine.is_started());
        assert!(engine.tick().is_empty());
        assert!(engine.skip_forward().is_empty());
    }

    #[test]
    fn second_start_is_noop() {
        let mut engine = started(vec![set(1, 2)]);
        engine.tick();
        assert!(engine.start().unwrap().is_empty());
        assert_eq!(engine.state().time_left_secs, 9);
    }

    #[test]
    fn tick_emits_state_every_second() {
        let mut engine = started(vec![set(1, 2)]);
        let events = engine.tick();
        assert_eq!(
            events,
            vec![SessionEvent::StateChanged {
                state: SessionState::get_ready(9)
            }]
        );
    }

    #[test]
    fn full_scenario_by_ticks() {
        let mut engine = started(vec![set(1, 2)]);
        tick_n(&mut engine, 10);
        assert_eq!(*engine.state(), SessionState::exercise(0, 30));
        tick_n(&mut engine, 30);
        assert_eq!(*engine.state(), SessionState::rest(0, 30));
        tick_n(&mut engine, 30);
        assert_eq!(*engine.state(), SessionState::exercise(1, 30));
        tick_n(&mut engine, 29);
        let events = engine.tick();
        assert_eq!(
            events.last(),
            Some(&SessionEvent::Completed {
                summary: SessionSummary {
                    total_exercises: 2,
                    declared_duration_min: 7
                }
            })
        );
        assert_eq!(engine.outcome(), Some(SessionOutcome::Completed(engine.summary())));
        assert!(engine.tick().is_empty());
    }

    #[test]
    fn toggle_pause_twice_is_identity() {
        let mut engine = started(vec![set(1, 2)]);
        engine.skip_forward();
        tick_n(&mut engine, 4);
        let before = *engine.state();

        engine.toggle_pause();
        assert!(engine.state().is_paused);
        engine.toggle_pause();
        assert_eq!(*engine.state(), before);
    }

    #[test]
    fn paused_session_does_not_count() {
        let mut engine = started(vec![set(1, 2)]);
        engine.toggle_pause();
        tick_n(&mut engine, 20);
        assert_eq!(engine.state().phase, SessionPhase::GetReady);
        assert_eq!(engine.state().time_left_secs, 10);
    }

    #[test]
    fn skip_clears_pause_and_rearms() {
        let mut engine = started(vec![set(1, 2)]);
        engine.toggle_pause();
        let epoch = engine.clock_epoch();
        engine.skip_forward();
        assert!(!engine.state().is_paused);
        assert_ne!(engine.clock_epoch(), epoch);
        engine.tick();
        assert_eq!(engine.state().time_left_secs, 29);
    }

    #[test]
    fn skip_discards_pending_expiry() {
        let mut engine = started(vec![set(1, 2)]);
        tick_n(&mut engine, 9);
        assert_eq!(engine.state().time_left_secs, 1);
        engine.skip_forward();
        // The get-ready countdown would have expired here; the new one runs.
        engine.tick();
        assert_eq!(*engine.state(), SessionState::exercise(0, 29));
    }

    #[test]
    fn skip_forward_len_plus_one_times_completes() {
        for sizes in [vec![1usize], vec![2, 0, 3], vec![5]] {
            let sets = sizes.iter().map(|&n| set(2, n)).collect();
            let mut engine = started(sets);
            let len = engine.timeline().len();
            for _ in 0..len + 1 {
                engine.skip_forward();
                if engine.state().phase == SessionPhase::Rest {
                    engine.skip_forward();
                }
            }
            assert_eq!(engine.state().phase, SessionPhase::Completed);
            assert_eq!(engine.state().current_index, len - 1);
        }
    }

    #[test]
    fn skip_backward_clamps_at_first_item() {
        let mut engine = started(vec![set(1, 2)]);
        engine.skip_forward();
        tick_n(&mut engine, 5);
        engine.skip_backward();
        assert_eq!(*engine.state(), SessionState::exercise(0, 30));
    }

    #[test]
    fn skip_backward_restarts_previous_exercise_unpaused() {
        let mut engine = started(vec![set(2, 4)]);
        engine.skip_forward(); // exercise 0
        engine.skip_forward(); // rest 0
        engine.skip_forward(); // exercise 1
        engine.toggle_pause();
        engine.skip_backward();
        assert_eq!(*engine.state(), SessionState::exercise(0, 30));
    }

    #[test]
    fn skip_backward_is_noop_outside_exercise() {
        let mut engine = started(vec![set(1, 2)]);
        assert!(engine.skip_backward().is_empty());
        engine.skip_forward();
        engine.skip_forward();
        assert_eq!(engine.state().phase, SessionPhase::Rest);
        let before = *engine.state();
        assert!(engine.skip_backward().is_empty());
        assert_eq!(*engine.state(), before);
    }

    #[test]
    fn exit_prompt_freezes_time_and_restores_it() {
        let mut engine = started(vec![set(1, 2)]);
        tick_n(&mut engine, 3);
        engine.request_exit();
        tick_n(&mut engine, 15);
        assert_eq!(engine.state().time_left_secs, 7);
        assert!(!engine.state().is_paused);

        engine.cancel_exit_request();
        engine.tick();
        assert_eq!(engine.state().time_left_secs, 6);
    }

    #[test]
    fn exit_prompt_preserves_user_pause() {
        let mut engine = started(vec![set(1, 2)]);
        engine.toggle_pause();
        engine.request_exit();
        engine.cancel_exit_request();
        assert!(engine.state().is_paused);
        tick_n(&mut engine, 3);
        assert_eq!(engine.state().time_left_secs, 10);
    }

    #[test]
    fn navigation_ignored_while_prompt_open() {
        let mut engine = started(vec![set(1, 2)]);
        engine.request_exit();
        assert!(engine.skip_forward().is_empty());
        assert!(engine.toggle_pause().is_empty());
        assert_eq!(*engine.state(), SessionState::get_ready(10));
    }

    #[test]
    fn confirm_exit_cancels_once_and_stops_ticks() {
        let mut engine = started(vec![set(1, 2)]);
        engine.request_exit();
        assert_eq!(engine.confirm_exit(), vec![SessionEvent::Cancelled]);
        assert!(engine.confirm_exit().is_empty());
        assert!(engine.tick().is_empty());
        assert!(engine.skip_forward().is_empty());
        assert_eq!(engine.outcome(), Some(SessionOutcome::Cancelled));
    }

    #[test]
    fn stray_confirm_without_prompt_is_ignored() {
        let mut engine = started(vec![set(1, 2)]);
        engine.skip_forward();
        assert!(engine.confirm_exit().is_empty());
        assert!(!engine.is_finished());
        assert_eq!(engine.tick().len(), 1);
        assert_eq!(engine.state().time_left_secs, 29);
    }

    #[test]
    fn abandon_cancels_without_prompt() {
        let mut engine = started(vec![set(1, 2)]);
        assert_eq!(engine.abandon(), vec![SessionEvent::Cancelled]);
        assert!(engine.abandon().is_empty());
        assert_eq!(engine.outcome(), Some(SessionOutcome::Cancelled));
        assert!(engine.tick().is_empty());
    }

    #[test]
    fn cancelling_while_casting_reports_cast_end_first() {
        let mut engine = started(vec![set(1, 2)]);
        engine.begin_cast("Living Room TV");
        engine.finish_cast("Living Room TV", Ok("Living Room TV".into()));
        assert!(engine.cast_state().is_casting);

        engine.request_exit();
        let events = engine.confirm_exit();
        assert_eq!(
            events,
            vec![
                SessionEvent::CastStateChanged {
                    cast: CastState::default()
                },
                SessionEvent::Cancelled,
            ]
        );
        assert_eq!(*engine.cast_state(), CastState::default());
    }

    #[test]
    fn exit_not_available_after_completion() {
        let mut engine = started(vec![set(1, 1)]);
        engine.skip_forward();
        engine.skip_forward();
        assert!(engine.state().is_completed());
        assert!(engine.request_exit().is_empty());
        assert!(engine.confirm_exit().is_empty());
        assert!(engine.toggle_pause().is_empty());
        assert!(engine.skip_backward().is_empty());
        assert_eq!(engine.outcome(), Some(SessionOutcome::Completed(engine.summary())));
    }

    #[test]
    fn subscribers_see_every_event() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut engine = SessionEngine::new(workout(vec![set(1, 1)]), SessionConfig::default());
        engine.subscribe(Box::new(move |event: &SessionEvent| sink.lock().unwrap().push(event.clone())));

        engine.start().unwrap();
        engine.skip_forward();
        engine.skip_forward();

        let seen = seen.lock().unwrap();
        let completed = seen.iter().filter(|e| matches!(e, SessionEvent::Completed { .. })).count();
        assert_eq!(completed, 1);
        assert_eq!(seen.len(), 4);
        assert!(!seen.iter().any(|e| *e == SessionEvent::Cancelled));
    }

    #[test]
    fn dispatch_routes_actions() {
        let mut engine = started(vec![set(1, 2)]);
        engine.dispatch(SessionAction::SkipForward);
        assert_eq!(engine.state().phase, SessionPhase::Exercise);
        engine.dispatch(SessionAction::Tick);
        assert_eq!(engine.state().time_left_secs, 29);
        engine.dispatch(SessionAction::TogglePause);
        assert!(engine.state().is_paused);
        engine.dispatch(SessionAction::RequestExit);
        assert!(engine.exit_prompt_open());
        engine.dispatch(SessionAction::CancelExit);
        assert!(!engine.exit_prompt_open());
        engine.dispatch(SessionAction::ConfirmExit);
        assert!(!engine.is_finished());
        engine.dispatch(SessionAction::RequestExit);
        engine.dispatch(SessionAction::ConfirmExit);
        assert!(engine.is_finished());
    }

    #[test]
    fn cast_changes_never_touch_the_clock() {
        let mut engine = started(vec![set(1, 2)]);
        tick_n(&mut engine, 2);
        let before = *engine.state();
        let epoch = engine.clock_epoch();

        assert!(engine.begin_cast("Living Room TV"));
        let events = engine.finish_cast("Living Room TV", Ok("Living Room TV".into()));
        assert!(matches!(events.as_slice(), [SessionEvent::CastStateChanged { cast }] if cast.is_casting));
        assert_eq!(engine.disconnect_cast().len(), 1);

        assert_eq!(*engine.state(), before);
        assert_eq!(engine.clock_epoch(), epoch);
    }

    #[test]
    fn cast_failure_is_reported_not_applied() {
        let mut engine = started(vec![set(1, 2)]);
        engine.begin_cast("Attic");
        let events = engine.finish_cast("Attic", Err(CastError::DeviceNotFound("Attic".into())));
        assert!(matches!(events.as_slice(), [SessionEvent::CastFailed { device, .. }] if device == "Attic"));
        assert_eq!(*engine.cast_state(), CastState::default());
    }

    #[test]
    fn snapshot_previews_next_exercise() {
        let mut engine = started(vec![set(1, 2)]);
        let snap = engine.snapshot();
        assert_eq!(snap.next_exercise_name.as_deref(), Some("Move 0"));
        assert_eq!(snap.phase_duration_secs, 10);

        engine.skip_forward();
        let snap = engine.snapshot();
        assert_eq!(snap.exercise_name.as_deref(), Some("Move 0"));
        assert_eq!(snap.next_exercise_name.as_deref(), Some("Move 1"));
        assert_eq!(snap.progress_pct, 0.0);

        engine.skip_forward();
        let snap = engine.snapshot();
        assert_eq!(snap.phase, SessionPhase::Rest);
        assert_eq!(snap.phase_duration_secs, 30);
        assert_eq!(snap.progress_pct, 50.0);
    }
}
