/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Runs a script through a coordinator wired to simulated collaborators.

use crate::script::Step;
use headset_sync::{
    AggregateState, AudioBackend, Callback, EventReceiver, PeerId, StuckSuspension,
    SuspendRequester, SuspensionReason, SyncConfig, SyncCoordinator, SyncEvent, VoiceActivity,
    WaitPolicy,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};
use web_time::Instant;

#[derive(Debug, Clone, Copy, Default)]
struct VoiceFlags {
    in_call: bool,
    ringing: bool,
    audio_path_open: bool,
}

/// Voice state toggled by `voice` steps.
#[derive(Debug, Clone, Default)]
pub struct SimulatedVoice {
    flags: Arc<Mutex<VoiceFlags>>,
}

impl SimulatedVoice {
    pub fn set(&self, in_call: bool, ringing: bool, audio_path_open: bool) {
        if let Ok(mut flags) = self.flags.lock() {
            *flags = VoiceFlags {
                in_call,
                ringing,
                audio_path_open,
            };
        }
    }

    fn flags(&self) -> VoiceFlags {
        self.flags.lock().map(|f| *f).unwrap_or_default()
    }
}

impl VoiceActivity for SimulatedVoice {
    fn is_call_in_progress(&self) -> bool {
        self.flags().in_call
    }

    fn is_ringing(&self) -> bool {
        self.flags().ringing
    }

    fn is_voice_audio_path_open(&self) -> bool {
        self.flags().audio_path_open
    }
}

/// Backend that logs and keeps every command it receives.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    commands: Arc<Mutex<Vec<bool>>>,
}

impl SimulatedBackend {
    /// Commands received since the last call.
    fn drain(&self) -> Vec<bool> {
        self.commands
            .lock()
            .map(|mut c| std::mem::take(&mut *c))
            .unwrap_or_default()
    }
}

impl AudioBackend for SimulatedBackend {
    fn set_suspended(&mut self, suspended: bool) {
        info!("backend: set_suspended({suspended})");
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(suspended);
        }
    }
}

/// What the coordinator answered to one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Suspend { wait: WaitPolicy },
    Release { ok: bool },
    Stuck { report: Option<StuckSuspension> },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: Step,
    pub outcome: Outcome,
    /// `set_suspended` commands issued while handling the step.
    pub backend_commands: Vec<bool>,
    /// Notifications delivered to the call state machine during the step.
    pub notified: Vec<AggregateState>,
    pub aggregate: AggregateState,
    pub reason: SuspensionReason,
    pub events: Vec<SyncEvent>,
}

pub struct Replayer {
    coordinator: SyncCoordinator,
    voice: SimulatedVoice,
    backend: SimulatedBackend,
    notified: Arc<Mutex<Vec<AggregateState>>>,
    events: EventReceiver,
}

impl Replayer {
    pub fn new(config: SyncConfig) -> Self {
        let voice = SimulatedVoice::default();
        let backend = SimulatedBackend::default();
        let notified = Arc::new(Mutex::new(Vec::new()));

        let mut coordinator = SyncCoordinator::with_config(config, voice.clone(), backend.clone());
        let sink = notified.clone();
        coordinator.on_stream_state_changed = Callback::from(move |state: AggregateState| {
            info!("call state machine notified: streaming {state}");
            if let Ok(mut notified) = sink.lock() {
                notified.push(state);
            }
        });
        let events = coordinator.subscribe();

        Self {
            coordinator,
            voice,
            backend,
            notified,
            events,
        }
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    pub fn run(&mut self, steps: &[Step]) -> Vec<StepReport> {
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| self.apply(index, step))
            .collect()
    }

    pub fn apply(&mut self, index: usize, step: &Step) -> StepReport {
        debug!("step {index}: {step}");
        let outcome = match step {
            Step::Connection {
                peer,
                state,
                previous,
            } => {
                self.coordinator
                    .on_connection_transition(peer, *previous, *state);
                Outcome::Applied
            }
            Step::Playback { peer, state } => {
                self.coordinator.on_playback_event(peer, *state);
                Outcome::Applied
            }
            Step::Voice {
                in_call,
                ringing,
                audio_path_open,
            } => {
                self.voice.set(*in_call, *ringing, *audio_path_open);
                Outcome::Applied
            }
            Step::Suspend { reason, peer } => {
                let wait = self
                    .coordinator
                    .request_suspend(*reason, requester(peer.clone()));
                Outcome::Suspend { wait }
            }
            Step::Release { peer } => {
                let ok = self.coordinator.release(requester(peer.clone()));
                Outcome::Release { ok }
            }
            Step::CheckStuck { after_ms } => {
                let now = Instant::now() + Duration::from_millis(after_ms.unwrap_or(0));
                Outcome::Stuck {
                    report: self.coordinator.check_stuck_suspension_at(now),
                }
            }
        };

        let notified = self
            .notified
            .lock()
            .map(|mut n| std::mem::take(&mut *n))
            .unwrap_or_default();
        let events = std::iter::from_fn(|| self.events.try_recv().ok()).collect();

        StepReport {
            index,
            step: step.clone(),
            outcome,
            backend_commands: self.backend.drain(),
            notified,
            aggregate: self.coordinator.aggregate_state(),
            reason: self.coordinator.suspension_reason(),
            events,
        }
    }
}

fn requester(peer: Option<PeerId>) -> SuspendRequester {
    peer.map_or(SuspendRequester::SelfTriggered, SuspendRequester::Peer)
}

/// One human-readable line per step.
pub fn format_report(report: &StepReport) -> String {
    let mut line = format!("[{:>3}] {:<48}", report.index, report.step.to_string());
    match &report.outcome {
        Outcome::Applied => {}
        Outcome::Suspend { wait } => line.push_str(&format!(" -> {wait}")),
        Outcome::Release { ok } => line.push_str(&format!(" -> released={ok}")),
        Outcome::Stuck { report: Some(stuck) } => line.push_str(&format!(
            " -> STUCK ({} for {} ms)",
            stuck.reason, stuck.elapsed_ms
        )),
        Outcome::Stuck { report: None } => line.push_str(" -> ok"),
    }
    line.push_str(&format!(
        " | aggregate={} reason={}",
        report.aggregate, report.reason
    ));
    for command in &report.backend_commands {
        line.push_str(&format!(" | backend suspended={command}"));
    }
    for state in &report.notified {
        line.push_str(&format!(" | notified {state}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;

    #[test]
    fn test_replay_call_preempts_streaming() {
        let steps = parse_script(
            r#"[
                {"step": "connection", "peer": "P1", "state": "connected"},
                {"step": "voice", "in_call": true},
                {"step": "playback", "peer": "P1", "state": "playing"},
                {"step": "suspend", "reason": "voice_call", "peer": "P1"},
                {"step": "playback", "peer": "P1", "state": "not_playing"},
                {"step": "release", "peer": "P1"},
                {"step": "voice"},
                {"step": "release", "peer": "P1"}
            ]"#,
        )
        .unwrap();

        let mut replayer = Replayer::new(SyncConfig::default());
        let reports = replayer.run(&steps);

        assert!(reports[0].backend_commands.is_empty());
        assert_eq!(reports[0].aggregate, AggregateState::Connected);
        assert_eq!(reports[2].backend_commands, vec![true]);
        assert_eq!(reports[2].reason, SuspensionReason::VoiceCall);
        assert_eq!(
            reports[3].outcome,
            Outcome::Suspend {
                wait: WaitPolicy::MustWait
            }
        );
        assert!(reports[3].backend_commands.is_empty());
        assert_eq!(reports[4].notified, vec![AggregateState::Connected]);
        // Call still active: release is accepted but nothing changes.
        assert_eq!(reports[5].outcome, Outcome::Release { ok: true });
        assert!(reports[5].backend_commands.is_empty());
        assert_eq!(reports[7].backend_commands, vec![false]);
        assert_eq!(reports[7].reason, SuspensionReason::None);
    }

    #[test]
    fn test_replay_reports_stuck_suspension() {
        let steps = parse_script(
            r#"[
                {"step": "connection", "peer": "P1", "state": "connected"},
                {"step": "suspend", "reason": "voip_call"},
                {"step": "check_stuck"},
                {"step": "check_stuck", "after_ms": 120000}
            ]"#,
        )
        .unwrap();

        let mut replayer = Replayer::new(SyncConfig::default());
        let reports = replayer.run(&steps);
        assert_eq!(reports[2].outcome, Outcome::Stuck { report: None });
        match &reports[3].outcome {
            Outcome::Stuck { report: Some(stuck) } => {
                assert_eq!(stuck.reason, SuspensionReason::VoipCall);
                assert!(stuck.elapsed_ms >= 120_000);
            }
            other => panic!("expected stuck report, got {other:?}"),
        }
        assert!(reports[3]
            .events
            .iter()
            .any(|e| matches!(e, SyncEvent::StuckSuspension(_))));
    }

    #[test]
    fn test_format_report_mentions_backend_commands() {
        let steps = parse_script(
            r#"[
                {"step": "connection", "peer": "P1", "state": "connected"},
                {"step": "suspend", "reason": "voice_recognition", "peer": "P1"}
            ]"#,
        )
        .unwrap();
        let mut replayer = Replayer::new(SyncConfig::default());
        let reports = replayer.run(&steps);
        let line = format_report(&reports[1]);
        assert!(line.contains("-> no_wait"));
        assert!(line.contains("backend suspended=true"));
        assert!(line.contains("reason=voice_recognition"));
    }
}
