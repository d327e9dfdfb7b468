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

pub mod cli_args;
pub mod replay;
pub mod script;

use headset_sync::SyncConfig;
use std::path::Path;

/// Defaults, then the optional JSON file, then `HEADSET_SYNC_*` environment
/// overrides.
pub fn load_config(path: Option<&Path>) -> headset_sync::Result<SyncConfig> {
    let config = match path {
        Some(path) => SyncConfig::from_json_file(path)?,
        None => SyncConfig::default(),
    };
    config.with_env_overrides()
}
