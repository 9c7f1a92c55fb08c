// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::io::{self, Write};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use survey_server::{
    config::ViewerConfig,
    viewer::{load_all, render},
};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = match ViewerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let listing = match load_all(&config) {
        Ok(listing) => listing,
        Err(e) => {
            tracing::error!(error = %e, data_dir = %config.data_dir.display(), "Failed to load responses");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(e) = render(&listing, &mut stdout).and_then(|()| stdout.flush()) {
        tracing::error!(error = %e, "Failed to write report");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
