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

//! Single-reason suspend/release arbitration.
//!
//! At most one [`SuspensionReason`] is active. While it is, further suspend
//! requests only report whether the caller has to wait; the backend is told
//! `set_suspended(true)` once per activation and `set_suspended(false)` once
//! on release.

use crate::collaborators::AudioBackend;
use crate::types::{AggregateState, SuspendRequester, SuspensionReason, WaitPolicy};
use log::{debug, info, warn};
use std::time::Duration;
use web_time::Instant;

/// What a suspend request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuspendDecision {
    pub wait: WaitPolicy,
    /// The backend was told to suspend by this request.
    pub issued: bool,
}

/// What a release request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// No reason was active.
    NotSuspended,
    /// Voice activity still needs the path; the reason stays active.
    Deferred(SuspensionReason),
    /// The reason was cleared and the backend told to resume.
    Released(SuspensionReason),
}

#[derive(Debug, Default)]
pub struct SuspensionArbiter {
    reason: SuspensionReason,
    suspended_at: Option<Instant>,
}

impl SuspensionArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reason(&self) -> SuspensionReason {
        self.reason
    }

    pub fn is_suspended(&self) -> bool {
        self.reason.is_active()
    }

    pub fn request_suspend(
        &mut self,
        reason: SuspensionReason,
        requester: &SuspendRequester,
        aggregate: AggregateState,
        backend: &mut dyn AudioBackend,
    ) -> SuspendDecision {
        debug!(
            "suspend request: reason={reason} requester={requester} aggregate={aggregate} active={}",
            self.reason
        );

        if self.reason.is_active() {
            // Re-entrant: the backend already has the command.
            return SuspendDecision {
                wait: wait_for(aggregate),
                issued: false,
            };
        }

        if !reason.is_active() {
            warn!("suspend requested by {requester} without a reason, ignoring");
            return SuspendDecision {
                wait: WaitPolicy::NoWait,
                issued: false,
            };
        }

        match aggregate {
            AggregateState::Disconnected => {
                debug!("no streaming peer connected, nothing to suspend");
                SuspendDecision {
                    wait: WaitPolicy::NoWait,
                    issued: false,
                }
            }
            AggregateState::Connected | AggregateState::Playing => {
                self.reason = reason;
                self.suspended_at = Some(Instant::now());
                backend.set_suspended(true);
                let wait = wait_for(aggregate);
                info!("streaming suspended for {reason} by {requester}, {wait}");
                SuspendDecision { wait, issued: true }
            }
        }
    }

    /// Clears the active reason unless `voice_active` says another holder still
    /// needs the path.
    pub fn release(
        &mut self,
        requester: &SuspendRequester,
        voice_active: bool,
        backend: &mut dyn AudioBackend,
    ) -> ReleaseOutcome {
        debug!("release request by {requester}, active={}", self.reason);

        if !self.reason.is_active() {
            return ReleaseOutcome::NotSuspended;
        }
        if voice_active {
            warn!(
                "release by {requester} deferred: call, ring or voice audio still active ({})",
                self.reason
            );
            return ReleaseOutcome::Deferred(self.reason);
        }

        let reason = std::mem::take(&mut self.reason);
        self.suspended_at = None;
        backend.set_suspended(false);
        info!("streaming resumed, {reason} released by {requester}");
        ReleaseOutcome::Released(reason)
    }

    /// How long the active reason has been held as of `now`.
    pub fn suspended_for(&self, now: Instant) -> Option<Duration> {
        self.suspended_at
            .map(|since| now.saturating_duration_since(since))
    }
}

fn wait_for(aggregate: AggregateState) -> WaitPolicy {
    if aggregate == AggregateState::Playing {
        WaitPolicy::MustWait
    } else {
        WaitPolicy::NoWait
    }
}
