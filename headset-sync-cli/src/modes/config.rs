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
use headset_sync_cli::cli_args::ConfigArgs;
use headset_sync_cli::load_config;

pub fn show_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref()).context("loading configuration")?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
