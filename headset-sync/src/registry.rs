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

//! Bookkeeping of per-peer streaming state.
//!
//! A peer missing from the map is disconnected; no entry ever holds
//! [`PeerStreamState::Disconnected`].

use crate::events::ProtocolAnomaly;
use crate::types::{AggregateState, ConnectionState, PeerId, PeerStreamState, PlaybackState};
use log::{debug, error};
use std::collections::HashMap;

/// Result of applying one event to the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub previous: PeerStreamState,
    pub current: PeerStreamState,
    pub anomaly: Option<ProtocolAnomaly>,
}

impl Transition {
    fn clean(previous: PeerStreamState, current: PeerStreamState) -> Self {
        Self {
            previous,
            current,
            anomaly: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct PeerStreamRegistry {
    peers: HashMap<PeerId, PeerStreamState>,
}

impl PeerStreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a transport connection transition for `peer`.
    ///
    /// `Disconnected` drops the entry; every other state stores `Connected`.
    /// `previous` is what the transport reported as the old state and is only
    /// used for logging.
    pub fn on_connection_event(
        &mut self,
        peer: &PeerId,
        new_state: ConnectionState,
        previous: Option<ConnectionState>,
    ) -> Transition {
        debug!(
            "connection event for {peer}: {} -> {new_state}",
            previous.map_or_else(|| "?".to_string(), |s| s.to_string())
        );
        let before = self.state_of(peer);

        let transition = match new_state {
            ConnectionState::Disconnected => {
                if self.peers.remove(peer).is_some() {
                    Transition::clean(before, PeerStreamState::Disconnected)
                } else {
                    let anomaly = ProtocolAnomaly::DisconnectOfUnknownPeer(peer.clone());
                    error!("{anomaly}");
                    Transition {
                        previous: before,
                        current: PeerStreamState::Disconnected,
                        anomaly: Some(anomaly),
                    }
                }
            }
            ConnectionState::Connecting
            | ConnectionState::Connected
            | ConnectionState::Disconnecting => {
                self.peers.insert(peer.clone(), PeerStreamState::Connected);
                Transition::clean(before, PeerStreamState::Connected)
            }
        };

        debug!("peer {peer} state = {}", transition.current);
        transition
    }

    /// Applies a playback transition for `peer`.
    ///
    /// A playback event never removes a peer. An event for an unknown peer is
    /// reported as an anomaly and the entry is created anyway.
    pub fn on_playback_event(&mut self, peer: &PeerId, new_state: PlaybackState) -> Transition {
        let before = self.state_of(peer);
        debug!("playback event for {peer}: {before} -> {new_state}");

        let anomaly = if self.peers.contains_key(peer) {
            None
        } else {
            let anomaly = ProtocolAnomaly::PlaybackWithoutConnection(peer.clone());
            error!("{anomaly}");
            Some(anomaly)
        };

        let current = match new_state {
            PlaybackState::Playing => PeerStreamState::Playing,
            PlaybackState::NotPlaying => PeerStreamState::Connected,
        };
        self.peers.insert(peer.clone(), current);

        debug!("peer {peer} state = {current}");
        Transition {
            previous: before,
            current,
            anomaly,
        }
    }

    /// Summarises all peers. Returns as soon as a playing peer is found.
    pub fn aggregate_state(&self) -> AggregateState {
        let mut aggregate = AggregateState::Disconnected;
        for state in self.peers.values() {
            match state {
                PeerStreamState::Playing => return AggregateState::Playing,
                PeerStreamState::Connecting
                | PeerStreamState::Connected
                | PeerStreamState::Disconnecting => aggregate = AggregateState::Connected,
                PeerStreamState::Disconnected => {}
            }
        }
        aggregate
    }

    pub fn state_of(&self, peer: &PeerId) -> PeerStreamState {
        self.peers
            .get(peer)
            .copied()
            .unwrap_or(PeerStreamState::Disconnected)
    }

    pub fn contains(&self, peer: &PeerId) -> bool {
        self.peers.contains_key(peer)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PeerId, PeerStreamState)> {
        self.peers.iter().map(|(peer, state)| (peer, *state))
    }
}
