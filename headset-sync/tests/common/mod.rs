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

//! Shared fakes for the collaborator traits.

#![allow(dead_code)]

use headset_sync::{AudioBackend, PeerId, VoiceActivity};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Voice state whose flags the test flips from outside the coordinator.
#[derive(Clone, Default)]
pub struct FakeVoice {
    in_call: Arc<AtomicBool>,
    ringing: Arc<AtomicBool>,
    audio_on: Arc<AtomicBool>,
}

impl FakeVoice {
    pub fn set_in_call(&self, value: bool) {
        self.in_call.store(value, Ordering::SeqCst);
    }

    pub fn set_ringing(&self, value: bool) {
        self.ringing.store(value, Ordering::SeqCst);
    }

    pub fn set_audio_on(&self, value: bool) {
        self.audio_on.store(value, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.set_in_call(false);
        self.set_ringing(false);
        self.set_audio_on(false);
    }
}

impl VoiceActivity for FakeVoice {
    fn is_call_in_progress(&self) -> bool {
        self.in_call.load(Ordering::SeqCst)
    }

    fn is_ringing(&self) -> bool {
        self.ringing.load(Ordering::SeqCst)
    }

    fn is_voice_audio_path_open(&self) -> bool {
        self.audio_on.load(Ordering::SeqCst)
    }
}

/// Backend that records every `set_suspended` command.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    commands: Arc<Mutex<Vec<bool>>>,
}

impl RecordingBackend {
    pub fn commands(&self) -> Vec<bool> {
        self.commands.lock().unwrap().clone()
    }

    pub fn count(&self, suspended: bool) -> usize {
        self.commands().iter().filter(|c| **c == suspended).count()
    }
}

impl AudioBackend for RecordingBackend {
    fn set_suspended(&mut self, suspended: bool) {
        self.commands.lock().unwrap().push(suspended);
    }
}

pub fn peer(n: u8) -> PeerId {
    PeerId::new(format!("00:11:22:33:44:{n:02X}"))
}
