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

//! This crate decides when stereo streaming to headset peers has to give way to
//! voice audio, and when it may resume.
//!
//! The streaming transport reports connection and playback changes per peer;
//! the voice side asks for suspensions while calls, rings or voice recognition
//! need the audio path. [`SyncCoordinator`] keeps the per-peer bookkeeping,
//! tells the [`AudioBackend`] to suspend or resume, and tells the caller whether
//! it has to wait for playback to actually stop.
//!
//! # Outline of usage
//!
//! ```ignore
//! let mut coordinator = SyncCoordinator::new(voice_state, audio_backend);
//! coordinator.on_stream_state_changed = Callback::from(|state| {
//!     // resume deferred voice audio
//! });
//!
//! coordinator.on_connection_event(&peer, ConnectionState::Connected);
//! coordinator.on_playback_event(&peer, PlaybackState::Playing);
//!
//! if coordinator.request_suspend(SuspensionReason::VoipCall, peer.clone()).must_wait() {
//!     // wait for on_stream_state_changed
//! }
//!
//! // once the call is over
//! coordinator.release(peer);
//! ```

mod arbiter;
mod callback;
mod collaborators;
mod config;
mod coordinator;
mod error;
mod event_bus;
mod events;
mod registry;
mod types;

pub use arbiter::{ReleaseOutcome, SuspendDecision, SuspensionArbiter};
pub use callback::Callback;
pub use collaborators::{AudioBackend, VoiceActivity};
pub use config::SyncConfig;
pub use coordinator::{SyncCoordinator, SyncSnapshot};
pub use error::{Result, SyncError};
pub use event_bus::{EventBus, EventReceiver};
pub use events::{ProtocolAnomaly, StuckSuspension, SyncEvent};
pub use registry::{PeerStreamRegistry, Transition};
pub use types::{
    AggregateState, ConnectionState, PeerId, PeerStreamState, PlaybackState, SuspendRequester,
    SuspensionReason, WaitPolicy,
};
