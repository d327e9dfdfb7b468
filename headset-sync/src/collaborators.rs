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

//! Narrow interfaces to the systems the coordinator observes and drives.

/// Live view of the voice/call subsystem.
pub trait VoiceActivity: Send {
    fn is_call_in_progress(&self) -> bool;

    fn is_ringing(&self) -> bool;

    /// The voice audio link to the headset is open.
    fn is_voice_audio_path_open(&self) -> bool;

    /// Condition checked when streaming starts or a peer connects.
    fn is_call_or_ringing(&self) -> bool {
        self.is_call_in_progress() || self.is_ringing()
    }

    /// Condition checked before a suspension is released.
    fn is_voice_active(&self) -> bool {
        self.is_call_in_progress() || self.is_ringing() || self.is_voice_audio_path_open()
    }
}

/// Audio routing backend that physically pauses the streaming path.
///
/// Commands are fire-and-forget. The actual stop is confirmed later by a
/// `NotPlaying` playback event.
pub trait AudioBackend: Send {
    fn set_suspended(&mut self, suspended: bool);
}
