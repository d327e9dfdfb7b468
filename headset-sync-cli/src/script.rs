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

//! Event scripts replayed by the simulator.

use headset_sync::{ConnectionState, PeerId, PlaybackState, SuspensionReason};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to read script {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Script has no steps")]
    Empty,
}

/// One scripted input to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Connection {
        peer: PeerId,
        state: ConnectionState,
        #[serde(default)]
        previous: Option<ConnectionState>,
    },
    Playback {
        peer: PeerId,
        state: PlaybackState,
    },
    /// Replace the simulated voice state. Omitted flags are false.
    Voice {
        #[serde(default)]
        in_call: bool,
        #[serde(default)]
        ringing: bool,
        #[serde(default)]
        audio_path_open: bool,
    },
    /// Without a peer the request is attributed to the coordinator itself.
    Suspend {
        reason: SuspensionReason,
        #[serde(default)]
        peer: Option<PeerId>,
    },
    Release {
        #[serde(default)]
        peer: Option<PeerId>,
    },
    /// Run the stuck-suspension diagnostic, optionally pretending `after_ms`
    /// have passed.
    CheckStuck {
        #[serde(default)]
        after_ms: Option<u64>,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Connection { peer, state, .. } => write!(f, "connection {peer} {state}"),
            Step::Playback { peer, state } => write!(f, "playback {peer} {state}"),
            Step::Voice {
                in_call,
                ringing,
                audio_path_open,
            } => write!(
                f,
                "voice in_call={in_call} ringing={ringing} audio_path_open={audio_path_open}"
            ),
            Step::Suspend { reason, peer } => match peer {
                Some(peer) => write!(f, "suspend {reason} for {peer}"),
                None => write!(f, "suspend {reason}"),
            },
            Step::Release { peer } => match peer {
                Some(peer) => write!(f, "release for {peer}"),
                None => write!(f, "release"),
            },
            Step::CheckStuck { after_ms } => match after_ms {
                Some(ms) => write!(f, "check stuck after {ms} ms"),
                None => write!(f, "check stuck"),
            },
        }
    }
}

pub fn parse_script(json: &str) -> Result<Vec<Step>, ScriptError> {
    let steps: Vec<Step> = serde_json::from_str(json)?;
    if steps.is_empty() {
        return Err(ScriptError::Empty);
    }
    Ok(steps)
}

pub fn load_script(path: &Path) -> Result<Vec<Step>, ScriptError> {
    let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_step_kinds() {
        let steps = parse_script(
            r#"[
                {"step": "connection", "peer": "AA:BB", "state": "connecting", "previous": "disconnected"},
                {"step": "playback", "peer": "AA:BB", "state": "not_playing"},
                {"step": "voice", "ringing": true},
                {"step": "suspend", "reason": "voice_recognition"},
                {"step": "release", "peer": "AA:BB"},
                {"step": "check_stuck", "after_ms": 60000}
            ]"#,
        )
        .unwrap();

        assert_eq!(steps.len(), 6);
        assert_eq!(
            steps[0],
            Step::Connection {
                peer: PeerId::from("AA:BB"),
                state: ConnectionState::Connecting,
                previous: Some(ConnectionState::Disconnected),
            }
        );
        assert_eq!(
            steps[2],
            Step::Voice {
                in_call: false,
                ringing: true,
                audio_path_open: false,
            }
        );
        assert_eq!(
            steps[3],
            Step::Suspend {
                reason: SuspensionReason::VoiceRecognition,
                peer: None,
            }
        );
        assert_eq!(steps[5], Step::CheckStuck { after_ms: Some(60000) });
    }

    #[test]
    fn test_empty_script_rejected() {
        assert!(matches!(parse_script("[]"), Err(ScriptError::Empty)));
    }

    #[test]
    fn test_unknown_step_rejected() {
        let err = parse_script(r#"[{"step": "reboot"}]"#).unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }

    #[test]
    fn test_unknown_state_rejected() {
        let err =
            parse_script(r#"[{"step": "playback", "peer": "AA", "state": "paused"}]"#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid script"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_script(Path::new("/nonexistent/script.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/script.json"));
    }

    #[test]
    fn test_step_display() {
        let step = Step::Suspend {
            reason: SuspensionReason::VoipCall,
            peer: Some(PeerId::from("AA:BB")),
        };
        assert_eq!(step.to_string(), "suspend voip_call for AA:BB");
    }
}
