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

use anyhow::Context;
use headset_sync_cli::cli_args::Replay;
use headset_sync_cli::load_config;
use headset_sync_cli::replay::{format_report, Replayer};
use headset_sync_cli::script::load_script;
use tracing::{debug, info, warn};

pub fn replay(args: Replay) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref()).context("loading configuration")?;
    let steps = load_script(&args.script)?;
    info!(
        "replaying {} steps from {}",
        steps.len(),
        args.script.display()
    );

    let diagnostics = headset_sync_diagnostics::subscribe();
    let mut replayer = Replayer::new(config);

    for (index, step) in steps.iter().enumerate() {
        let report = replayer.apply(index, step);
        if args.json {
            for event in &report.events {
                println!("{}", serde_json::to_string(event)?);
            }
        } else {
            println!("{}", format_report(&report));
        }
    }

    for event in diagnostics.try_iter() {
        debug!(
            "diag {} peer={:?} metrics={}",
            event.subsystem,
            event.peer_id,
            serde_json::to_string(&event.metrics)?
        );
    }

    let snapshot = replayer.coordinator().snapshot();
    if snapshot.reason.is_active() {
        warn!(
            "script ended with streaming still suspended ({})",
            snapshot.reason
        );
    }
    if !args.json {
        println!("final: {}", serde_json::to_string(&snapshot)?);
    }
    Ok(())
}
