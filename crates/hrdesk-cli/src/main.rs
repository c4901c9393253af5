// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow, bail};
use config::Config;
use hrdesk_api::HttpGateway;
use hrdesk_app::AppState;
use hrdesk_testkit::{MemoryGateway, StaffFaker};
use runtime::{GatewayRuntime, SharedGateway};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_SEED: u64 = 2024;
const DEMO_EMPLOYEES: usize = 12;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    match options.action {
        Action::Help => {
            print_help();
            return Ok(());
        }
        Action::PrintConfigPath => {
            println!("{}", options.config_path.display());
            return Ok(());
        }
        Action::PrintExampleConfig => {
            print!("{}", Config::example_config(&options.config_path));
            return Ok(());
        }
        Action::Check | Action::Launch => {}
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `hrdesk --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let gateway: SharedGateway = if options.demo {
        let tables = StaffFaker::new(DEMO_SEED).organization(DEMO_EMPLOYEES);
        Arc::new(MemoryGateway::with_tables(tables))
    } else {
        let base_url = config.api_base_url();
        let client = HttpGateway::new(&base_url, config.api_timeout()?).with_context(|| {
            format!(
                "invalid [api] config in {}; fix base_url/timeout or set HRDESK_API_URL",
                options.config_path.display()
            )
        })?;
        Arc::new(client)
    };
    if options.action == Action::Check {
        return Ok(());
    }

    let log_path = config.log_path()?;
    init_logging(&log_path, &config.log_level())?;
    info!(
        demo = options.demo,
        api = %config.api_base_url(),
        "starting hrdesk"
    );

    let mut state = AppState {
        active_tab: config.start_tab(),
        ..AppState::default()
    };
    let mut runtime = GatewayRuntime::new(gateway);
    hrdesk_tui::run_app(&mut state, &mut runtime)
}

/// The terminal belongs to the UI, so log lines go to a file. `HRDESK_LOG`
/// takes precedence over the configured level.
fn init_logging(path: &Path, level: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("HRDESK_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))?;
    Ok(())
}

/// What one invocation does. Later flags win over earlier ones, except that
/// `--help` always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Launch,
    Check,
    PrintConfigPath,
    PrintExampleConfig,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    demo: bool,
    action: Action,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        demo: false,
        action: Action::Launch,
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let action = match arg.as_ref() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(path.as_ref());
                continue;
            }
            "--demo" => {
                options.demo = true;
                continue;
            }
            "--check" => Action::Check,
            "--print-config-path" => Action::PrintConfigPath,
            "--print-example-config" => Action::PrintExampleConfig,
            "--help" | "-h" => Action::Help,
            other => bail!("unknown argument {other:?}; run with --help to see supported options"),
        };
        if options.action != Action::Help {
            options.action = action;
        }
    }

    Ok(options)
}

fn print_help() {
    println!("hrdesk: terminal client for the HR records service");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch against seeded fake records (in-memory)");
    println!("  --check                  Validate config and the API client, then exit");
    println!("  --help                   Show this help");
}
