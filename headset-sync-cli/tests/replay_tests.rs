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

//! Integration tests for the replay simulator.

use headset_sync::{AggregateState, SuspensionReason, SyncConfig, WaitPolicy};
use headset_sync_cli::load_config;
use headset_sync_cli::replay::{Outcome, Replayer};
use headset_sync_cli::script::load_script;
use std::path::PathBuf;

fn bundled_script(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scripts")
        .join(name)
}

#[test]
fn test_bundled_script_replays_full_call() {
    let steps = load_script(&bundled_script("call_interrupts_music.json")).unwrap();
    let mut replayer = Replayer::new(SyncConfig::default());
    let reports = replayer.run(&steps);

    // Ringing while music plays: the voice side must wait.
    assert_eq!(
        reports[4].outcome,
        Outcome::Suspend {
            wait: WaitPolicy::MustWait
        }
    );
    assert_eq!(reports[4].backend_commands, vec![true]);
    assert_eq!(reports[5].notified, vec![AggregateState::Connected]);

    // Release during the call is refused, the stuck check fires.
    assert!(reports[7].backend_commands.is_empty());
    assert!(matches!(
        reports[8].outcome,
        Outcome::Stuck { report: Some(_) }
    ));

    // After hang-up the release goes through.
    assert_eq!(reports[10].backend_commands, vec![false]);
    assert_eq!(reports[10].reason, SuspensionReason::None);

    // Music again, no call: no new suspend.
    assert!(reports[11].backend_commands.is_empty());
    assert_eq!(reports[12].aggregate, AggregateState::Disconnected);
}

#[test]
fn test_load_config_from_file() {
    let path = std::env::temp_dir().join(format!(
        "headset-sync-config-{}.json",
        std::process::id()
    ));
    std::fs::write(&path, r#"{"stuck_suspension_threshold_ms": 1500}"#).unwrap();

    let config = load_config(Some(&path)).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.stuck_suspension_threshold_ms, 1500);
    assert_eq!(config.event_bus_capacity, 256);
}

#[test]
fn test_load_config_missing_file_fails() {
    let path = PathBuf::from("/nonexistent/headset-sync.json");
    assert!(load_config(Some(&path)).is_err());
}
