// Copyright (C) 2026 The logpipe developers
//
// This file is part of logpipe.
//
// logpipe is free software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// logpipe is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even
// the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General
// Public License for more details.
//
// You should have received a copy of the GNU General Public License along with logpipe.  If not,
// see <http://www.gnu.org/licenses/>.

//! The `logpipe` daemon.
//!
//! Reads the configuration, starts a worker per pipe & waits. Its own diagnostics go to stderr;
//! they never pass through the pipes it watches.

use logpipe::{
    config::{explain, Config, DEFAULT_CONFIG_PATH},
    supervisor::{Policy, Supervisor},
};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use std::{path::PathBuf, process::ExitCode};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "LOGPIPE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Exit as soon as any one pipe fails, rather than leaving the others running
    #[arg(long)]
    fail_fast: bool,

    /// Diagnostic verbosity (overridden by `RUST_LOG`)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let specs = match Config::from_file(&cli.config).and_then(|cfg| cfg.pipe_specs()) {
        Ok(specs) => specs,
        Err(err) if err.is_configuration() => {
            print!("{}", explain(&err, &cli.config));
            return ExitCode::from(1);
        }
        Err(err) => {
            error!("couldn't set up pipes: {}", err);
            return ExitCode::from(1);
        }
    };
    info!(config = %cli.config.display(), pipes = specs.len(), "logpipe starting");

    let policy = if cli.fail_fast {
        Policy::FailFast
    } else {
        Policy::Isolate
    };
    match Supervisor::new(specs).policy(policy).run() {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            error!(
                failed = report.failures().count(),
                "every worker has exited, not all cleanly"
            );
            ExitCode::from(1)
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::from(1)
        }
    }
}
