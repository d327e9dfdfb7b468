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

//! Entry point for streaming-peer events and voice-side suspend/release requests.
//!
//! The coordinator is not internally synchronised. Every call must come from
//! one serialised context; a multi-threaded host wraps the whole coordinator
//! in a single mutex or drives it from a single task.

use crate::arbiter::{ReleaseOutcome, SuspendDecision, SuspensionArbiter};
use crate::callback::Callback;
use crate::collaborators::{AudioBackend, VoiceActivity};
use crate::config::SyncConfig;
use crate::event_bus::{EventBus, EventReceiver};
use crate::events::{StuckSuspension, SyncEvent};
use crate::registry::{PeerStreamRegistry, Transition};
use crate::types::{
    AggregateState, ConnectionState, PeerId, PeerStreamState, PlaybackState, SuspendRequester,
    SuspensionReason, WaitPolicy,
};
use headset_sync_diagnostics::{metric, DiagEvent, Metric};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use web_time::Instant;

/// Point-in-time view of the coordinator's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    pub aggregate: AggregateState,
    pub reason: SuspensionReason,
    /// Registered peers ordered by id.
    pub peers: Vec<(PeerId, PeerStreamState)>,
}

pub struct SyncCoordinator {
    registry: PeerStreamRegistry,
    arbiter: SuspensionArbiter,
    voice: Box<dyn VoiceActivity>,
    backend: Box<dyn AudioBackend>,
    bus: EventBus,
    config: SyncConfig,
    /// Invoked after a playback update leaves no peer playing, so a voice state
    /// machine waiting on a suspend can proceed.
    pub on_stream_state_changed: Callback<AggregateState>,
}

impl fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("registry", &self.registry)
            .field("arbiter", &self.arbiter)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SyncCoordinator {
    pub fn new(
        voice: impl VoiceActivity + 'static,
        backend: impl AudioBackend + 'static,
    ) -> Self {
        Self::with_config(SyncConfig::default(), voice, backend)
    }

    /// An invalid `config` is logged and replaced by [`SyncConfig::default`].
    pub fn with_config(
        config: SyncConfig,
        voice: impl VoiceActivity + 'static,
        backend: impl AudioBackend + 'static,
    ) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("{e}, falling back to the default configuration");
                SyncConfig::default()
            }
        };
        Self {
            registry: PeerStreamRegistry::new(),
            arbiter: SuspensionArbiter::new(),
            voice: Box::new(voice),
            backend: Box::new(backend),
            bus: EventBus::new(config.event_bus_capacity),
            config,
            on_stream_state_changed: Callback::noop(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Subscribe to every [`SyncEvent`] emitted from now on.
    pub fn subscribe(&self) -> EventReceiver {
        self.bus.subscribe()
    }

    // === Streaming transport events ===

    pub fn on_connection_event(&mut self, peer: &PeerId, new_state: ConnectionState) {
        self.on_connection_transition(peer, None, new_state);
    }

    /// Like [`Self::on_connection_event`], with the transport's previous state
    /// for the logs.
    pub fn on_connection_transition(
        &mut self,
        peer: &PeerId,
        previous: Option<ConnectionState>,
        new_state: ConnectionState,
    ) {
        let transition = self.registry.on_connection_event(peer, new_state, previous);
        self.record_transition(peer, &transition);
        self.bus.emit(SyncEvent::ConnectionChanged {
            peer_id: peer.clone(),
            reported: new_state,
            state: transition.current,
        });

        if new_state == ConnectionState::Connected && self.voice.is_call_or_ringing() {
            debug!("call active or ringing and {peer} connected, suspending");
            self.suspend_self_triggered();
        }
    }

    pub fn on_playback_event(&mut self, peer: &PeerId, new_state: PlaybackState) {
        let transition = self.registry.on_playback_event(peer, new_state);
        self.record_transition(peer, &transition);
        self.bus.emit(SyncEvent::PlaybackChanged {
            peer_id: peer.clone(),
            reported: new_state,
            state: transition.current,
        });

        if new_state == PlaybackState::Playing && self.voice.is_call_or_ringing() {
            debug!("call active or ringing and {peer} started playing, suspending");
            self.suspend_self_triggered();
        }

        let aggregate = self.registry.aggregate_state();
        if aggregate != AggregateState::Playing {
            debug!("no peer playing any more ({aggregate}), notifying call state machine");
            self.on_stream_state_changed.emit(aggregate);
            self.bus.emit(SyncEvent::StreamStateNotified(aggregate));
        }
    }

    // === Voice-side requests ===

    /// Ask for the streaming path to be suspended.
    ///
    /// [`WaitPolicy::MustWait`] means a peer is still playing: hold voice audio
    /// until the coordinator reports a non-playing aggregate state.
    pub fn request_suspend(
        &mut self,
        reason: SuspensionReason,
        requester: impl Into<SuspendRequester>,
    ) -> WaitPolicy {
        let requester = requester.into();
        let active = self.arbiter.reason();
        let aggregate = self.registry.aggregate_state();
        let SuspendDecision { wait, issued } =
            self.arbiter
                .request_suspend(reason, &requester, aggregate, self.backend.as_mut());

        if issued {
            self.publish_diag(
                "arbiter",
                requester.peer_id(),
                vec![
                    metric!("suspended", true),
                    metric!("reason", reason.to_string()),
                    metric!("wait", wait.to_string()),
                ],
            );
            self.bus.emit(SyncEvent::SuspendIssued {
                reason,
                requester,
                wait,
            });
        } else {
            self.bus.emit(SyncEvent::SuspendSkipped {
                requested: reason,
                active,
                requester,
                wait,
            });
        }
        wait
    }

    /// Ask for the suspension to be lifted. Always succeeds; the suspension
    /// stays in place while a call, ring or voice audio link is still active.
    pub fn release(&mut self, requester: impl Into<SuspendRequester>) -> bool {
        let requester = requester.into();
        let voice_active = self.voice.is_voice_active();
        let held_for = self.arbiter.suspended_for(Instant::now());

        match self
            .arbiter
            .release(&requester, voice_active, self.backend.as_mut())
        {
            ReleaseOutcome::NotSuspended => {}
            ReleaseOutcome::Deferred(reason) => {
                self.bus
                    .emit(SyncEvent::ReleaseDeferred { reason, requester });
            }
            ReleaseOutcome::Released(reason) => {
                let held_ms = held_for.map_or(0, |d| d.as_millis() as u64);
                self.publish_diag(
                    "arbiter",
                    requester.peer_id(),
                    vec![
                        metric!("suspended", false),
                        metric!("reason", reason.to_string()),
                        metric!("held_ms", held_ms),
                    ],
                );
                self.bus
                    .emit(SyncEvent::SuspendReleased { reason, requester });
            }
        }
        true
    }

    // === Queries ===

    pub fn aggregate_state(&self) -> AggregateState {
        self.registry.aggregate_state()
    }

    pub fn suspension_reason(&self) -> SuspensionReason {
        self.arbiter.reason()
    }

    pub fn peer_state(&self, peer: &PeerId) -> PeerStreamState {
        self.registry.state_of(peer)
    }

    pub fn peers(&self) -> impl Iterator<Item = (&PeerId, PeerStreamState)> {
        self.registry.iter()
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        let mut peers: Vec<(PeerId, PeerStreamState)> = self
            .registry
            .iter()
            .map(|(peer, state)| (peer.clone(), state))
            .collect();
        peers.sort_by(|a, b| a.0.cmp(&b.0));
        SyncSnapshot {
            aggregate: self.registry.aggregate_state(),
            reason: self.arbiter.reason(),
            peers,
        }
    }

    // === Stuck-suspension diagnostic ===

    /// How long the current suspension has been held, if any.
    pub fn suspended_for(&self) -> Option<Duration> {
        self.arbiter.suspended_for(Instant::now())
    }

    pub fn check_stuck_suspension(&self) -> Option<StuckSuspension> {
        self.check_stuck_suspension_at(Instant::now())
    }

    /// Reports a suspension held past the configured threshold as of `now`.
    /// Never changes state; releasing stays the requester's job.
    pub fn check_stuck_suspension_at(&self, now: Instant) -> Option<StuckSuspension> {
        let elapsed = self.arbiter.suspended_for(now)?;
        if elapsed < self.config.stuck_suspension_threshold() {
            return None;
        }

        let stuck = StuckSuspension {
            reason: self.arbiter.reason(),
            elapsed_ms: elapsed.as_millis() as u64,
        };
        warn!(
            "streaming suspended for {} ms by {} without release",
            stuck.elapsed_ms, stuck.reason
        );
        self.publish_diag(
            "arbiter",
            None,
            vec![
                metric!("stuck", true),
                metric!("reason", stuck.reason.to_string()),
                metric!("held_ms", stuck.elapsed_ms),
            ],
        );
        self.bus.emit(SyncEvent::StuckSuspension(stuck));
        Some(stuck)
    }

    // === Internals ===

    fn suspend_self_triggered(&mut self) {
        self.request_suspend(SuspensionReason::VoiceCall, SuspendRequester::SelfTriggered);
    }

    fn record_transition(&self, peer: &PeerId, transition: &Transition) {
        if let Some(anomaly) = &transition.anomaly {
            self.publish_diag(
                "registry",
                Some(peer),
                vec![metric!("anomaly", anomaly.to_string())],
            );
            self.bus.emit(SyncEvent::Anomaly(anomaly.clone()));
        }
    }

    fn publish_diag(&self, subsystem: &'static str, peer: Option<&PeerId>, metrics: Vec<Metric>) {
        if !self.config.publish_diagnostics {
            return;
        }
        let event = DiagEvent::new(subsystem, peer.map(|p| p.to_string()), metrics);
        if !headset_sync_diagnostics::publish(event) {
            debug!("diagnostics bus full, event dropped");
        }
    }
}
