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

//! Domain vocabulary shared by the registry, the arbiter and the coordinator.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a remote streaming device, e.g. `"00:11:22:33:44:55"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for PeerId {
    fn from(address: String) -> Self {
        Self(address)
    }
}

/// Transport-level connection state reported for a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Disconnecting => write!(f, "disconnecting"),
        }
    }
}

/// Playback state reported for a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Playing,
    NotPlaying,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::NotPlaying => write!(f, "not_playing"),
        }
    }
}

/// Streaming state of a single peer.
///
/// The registry only ever stores `Connected` or `Playing`. `Connecting` and
/// `Disconnecting` are folded into `Connected`, and a peer that is not stored
/// reads as `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerStreamState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
    Playing,
}

impl fmt::Display for PeerStreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerStreamState::Disconnected => write!(f, "disconnected"),
            PeerStreamState::Connecting => write!(f, "connecting"),
            PeerStreamState::Connected => write!(f, "connected"),
            PeerStreamState::Disconnecting => write!(f, "disconnecting"),
            PeerStreamState::Playing => write!(f, "playing"),
        }
    }
}

/// Streaming condition summarised over every registered peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateState {
    /// No peer is registered.
    Disconnected,
    /// At least one peer occupies the audio path, none is playing.
    Connected,
    /// At least one peer is playing.
    Playing,
}

impl fmt::Display for AggregateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateState::Disconnected => write!(f, "disconnected"),
            AggregateState::Connected => write!(f, "connected"),
            AggregateState::Playing => write!(f, "playing"),
        }
    }
}

/// Why the streaming path is currently held suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspensionReason {
    #[default]
    None,
    VoiceCall,
    VoipCall,
    VoiceRecognition,
}

impl SuspensionReason {
    pub fn is_active(&self) -> bool {
        !matches!(self, SuspensionReason::None)
    }
}

impl fmt::Display for SuspensionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuspensionReason::None => write!(f, "none"),
            SuspensionReason::VoiceCall => write!(f, "voice_call"),
            SuspensionReason::VoipCall => write!(f, "voip_call"),
            SuspensionReason::VoiceRecognition => write!(f, "voice_recognition"),
        }
    }
}

/// Whether a suspend requester has to wait for a "playback stopped"
/// confirmation before routing voice audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitPolicy {
    MustWait,
    NoWait,
}

impl WaitPolicy {
    pub fn must_wait(&self) -> bool {
        matches!(self, WaitPolicy::MustWait)
    }
}

impl fmt::Display for WaitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitPolicy::MustWait => write!(f, "must_wait"),
            WaitPolicy::NoWait => write!(f, "no_wait"),
        }
    }
}

/// Who asked for a suspend or a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendRequester {
    /// A voice state machine acting for the given peer.
    Peer(PeerId),
    /// The coordinator itself, reacting to a streaming event during a call.
    SelfTriggered,
}

impl SuspendRequester {
    pub fn peer_id(&self) -> Option<&PeerId> {
        match self {
            SuspendRequester::Peer(peer) => Some(peer),
            SuspendRequester::SelfTriggered => None,
        }
    }
}

impl From<PeerId> for SuspendRequester {
    fn from(peer: PeerId) -> Self {
        SuspendRequester::Peer(peer)
    }
}

impl fmt::Display for SuspendRequester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuspendRequester::Peer(peer) => write!(f, "peer {peer}"),
            SuspendRequester::SelfTriggered => write!(f, "self"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peer_stream_state_has_no_suspended_value() {
        let parsed: Vec<PeerStreamState> = serde_json::from_str(
            r#"["disconnected", "connecting", "connected", "disconnecting", "playing"]"#,
        )
        .unwrap();
        assert_eq!(parsed.len(), 5);
        assert!(serde_json::from_str::<PeerStreamState>(r#""suspended""#).is_err());
    }
}
