// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Switchyard CLI - manage and evaluate feature flags
//!
//! Syncs the `[features]` manifest from configuration into the database and
//! reads or changes individual flag states.

mod commands;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use switchyard_config::{load_config, load_config_with_file, LogFormat, LoggingConfig};
use switchyard_flags::{EvaluationContext, FlagState};

use crate::commands::App;

#[derive(Parser, Debug)]
#[command(name = "switchyard", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Create declared features and delete undeclared ones
	Sync {
		/// Print the report as JSON
		#[arg(long)]
		json: bool,
	},
	/// List every stored feature and its state
	List {
		#[arg(long)]
		json: bool,
	},
	/// Evaluate a feature and print on or off
	Check {
		name: String,
		/// User id passed to dynamic handlers
		#[arg(long)]
		user: Option<String>,
		/// Treat an undefined feature as off instead of failing
		#[arg(long)]
		ignore_missing: bool,
	},
	/// Print the persisted state of a feature
	State { name: String },
	/// Turn a feature on
	On { name: String },
	/// Turn a feature off
	Off { name: String },
	/// Hand a feature's decision to its dynamic handler
	Dynamic { name: String },
}

fn init_tracing(logging: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(io::stderr))
				.init();
		}
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let mut config = match &args.config {
		Some(path) => load_config_with_file(path),
		None => load_config(),
	}
	.context("failed to load configuration")?;

	if let Some(level) = &args.log_level {
		config.logging.level = level.clone();
	}
	if args.json_logs {
		config.logging.format = LogFormat::Json;
	}
	init_tracing(&config.logging);

	debug!(command = ?args.command, "starting switchyard");

	let app = App::connect(&config).await?;
	let mut out = io::stdout().lock();

	match args.command {
		Command::Sync { json } => app.sync(&mut out, json).await,
		Command::List { json } => app.list(&mut out, json).await,
		Command::Check {
			name,
			user,
			ignore_missing,
		} => {
			let mut context =
				EvaluationContext::new().with_environment(config.environment.name.clone());
			if let Some(user) = user {
				context = context.with_user_id(user);
			}
			app.check(&mut out, &name, &context, ignore_missing).await
		}
		Command::State { name } => app.state(&mut out, &name).await,
		Command::On { name } => app.set_state(&mut out, &name, FlagState::On).await,
		Command::Off { name } => app.set_state(&mut out, &name, FlagState::Off).await,
		Command::Dynamic { name } => app.set_state(&mut out, &name, FlagState::Dynamic).await,
	}
}
