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

//! Events published by a [`crate::SyncCoordinator`] on its event bus.

use crate::types::{
    AggregateState, ConnectionState, PeerId, PeerStreamState, PlaybackState, SuspendRequester,
    SuspensionReason, WaitPolicy,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// An inbound event that does not match the registry's bookkeeping.
///
/// Anomalies are logged and handled in place; they never fail the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolAnomaly {
    /// A playback update arrived before any connection update. The peer is
    /// registered on the spot.
    PlaybackWithoutConnection(PeerId),
    /// A disconnect arrived for a peer that was never registered. Ignored.
    DisconnectOfUnknownPeer(PeerId),
}

impl ProtocolAnomaly {
    pub fn peer_id(&self) -> &PeerId {
        match self {
            ProtocolAnomaly::PlaybackWithoutConnection(peer)
            | ProtocolAnomaly::DisconnectOfUnknownPeer(peer) => peer,
        }
    }
}

impl fmt::Display for ProtocolAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolAnomaly::PlaybackWithoutConnection(peer) => {
                write!(f, "playback update without connection update for {peer}")
            }
            ProtocolAnomaly::DisconnectOfUnknownPeer(peer) => {
                write!(f, "disconnect for unregistered peer {peer}")
            }
        }
    }
}

/// A suspension that has been held longer than the configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckSuspension {
    pub reason: SuspensionReason,
    pub elapsed_ms: u64,
}

impl StuckSuspension {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Everything observable the coordinator does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A connection event was applied to the registry.
    ConnectionChanged {
        peer_id: PeerId,
        reported: ConnectionState,
        state: PeerStreamState,
    },

    /// A playback event was applied to the registry.
    PlaybackChanged {
        peer_id: PeerId,
        reported: PlaybackState,
        state: PeerStreamState,
    },

    Anomaly(ProtocolAnomaly),

    /// The backend was told to suspend streaming.
    SuspendIssued {
        reason: SuspensionReason,
        requester: SuspendRequester,
        wait: WaitPolicy,
    },

    /// A suspend request did not issue a backend command, either because a
    /// reason is already active or because no peer is connected.
    SuspendSkipped {
        requested: SuspensionReason,
        active: SuspensionReason,
        requester: SuspendRequester,
        wait: WaitPolicy,
    },

    /// The backend was told to resume streaming.
    SuspendReleased {
        reason: SuspensionReason,
        requester: SuspendRequester,
    },

    /// A release was refused because voice activity still holds the path.
    ReleaseDeferred {
        reason: SuspensionReason,
        requester: SuspendRequester,
    },

    /// The call state machine was told that nobody is playing any more.
    StreamStateNotified(AggregateState),

    StuckSuspension(StuckSuspension),
}
