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

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Headset sync simulator
///
/// Drives the audio arbitration core with a scripted sequence of streaming and
/// voice events and prints what it decides at every step.
#[derive(Parser, Debug)]
#[clap(name = "headset-sync")]
pub struct Opt {
    #[clap(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Replay an event script.
    Replay(Replay),

    /// Print the effective configuration (defaults, file, then environment).
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct Replay {
    /// JSON file holding an array of steps.
    ///
    /// Example:
    ///   [{"step": "connection", "peer": "00:11:22:33:44:55", "state": "connected"},
    ///    {"step": "voice", "in_call": true},
    ///    {"step": "playback", "peer": "00:11:22:33:44:55", "state": "playing"}]
    #[clap(long = "script", short = 's')]
    pub script: PathBuf,

    /// Coordinator configuration file (JSON). Missing keys keep their defaults.
    #[clap(long = "config", short = 'c')]
    pub config: Option<PathBuf>,

    /// Print every coordinator event as a JSON line instead of a summary.
    #[clap(long = "json")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[clap(long = "config", short = 'c')]
    pub config: Option<PathBuf>,
}
