//! Command dispatch

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::{dispatch, Request, Response, TreeService};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::NodeRecord;
use crate::exitcode;
use crate::tree_traits::TreeNodeConvert;

/// Run the parsed command; returns the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    match &cli.command {
        Commands::Exec {
            script,
            seed,
            strict,
        } => {
            let settings = Settings::load(cli.config.as_deref())?;
            _exec(&settings, script.as_deref(), seed.as_deref(), *strict)
        }
        Commands::Show { records, json } => {
            let settings = Settings::load(cli.config.as_deref())?;
            _show(&settings, records.as_deref(), *json)
        }
        Commands::Config { command } => _config(cli, command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(exitcode::OK)
        }
    }
}

#[instrument(skip(settings))]
fn _exec(
    settings: &Settings,
    script: Option<&Path>,
    seed: Option<&Path>,
    strict: bool,
) -> CliResult<i32> {
    let mut service = match seed.or(settings.seed.as_deref()) {
        Some(path) => TreeService::seeded(&read_records(path)?)?,
        None => TreeService::new(),
    };

    let emit = |response: &Response| {
        output::response(response.status, &render(&response.body, settings.pretty));
    };
    let stats = match script {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| CliError::io(format!("open script {}", path.display()), e))?;
            replay(&mut service, BufReader::new(file), emit)?
        }
        None => replay(&mut service, io::stdin().lock(), emit)?,
    };
    debug!(total = stats.total, failed = stats.failed, "replay finished");

    if strict && stats.failed > 0 {
        Ok(exitcode::FAILED_REQUESTS)
    } else {
        Ok(exitcode::OK)
    }
}

/// Counts from one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub total: usize,
    pub failed: usize,
}

/// Feed every request line through the router, in order, handing each
/// response to `emit` as soon as it is produced.
///
/// Blank lines and `#` comments are skipped; unparsable lines yield an error
/// response instead of aborting the replay.
pub fn replay<R, F>(service: &mut TreeService, reader: R, mut emit: F) -> CliResult<ReplayStats>
where
    R: BufRead,
    F: FnMut(&Response),
{
    let mut stats = ReplayStats::default();
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CliError::io(format!("read script line {}", n + 1), e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let response = match trimmed.parse::<Request>() {
            Ok(request) => dispatch(service, &request),
            Err(e) => Response::from_error(&e),
        };
        stats.total += 1;
        if !response.is_success() {
            stats.failed += 1;
        }
        emit(&response);
    }
    Ok(stats)
}

#[instrument(skip(settings))]
fn _show(settings: &Settings, records: Option<&Path>, json: bool) -> CliResult<i32> {
    let path: PathBuf = records
        .map(Path::to_path_buf)
        .or_else(|| settings.seed.clone())
        .ok_or_else(|| CliError::Usage("no records file given and no seed configured".into()))?;

    let service = TreeService::seeded(&read_records(&path)?)?;

    if json {
        let value = serde_json::to_value(service.forest())
            .map_err(crate::application::ApplicationError::from)?;
        output::info(&render(&value, settings.pretty));
    } else if service.tree().is_empty() {
        output::warning("empty tree");
    } else {
        for tree in service.tree().to_tree_strings() {
            output::info(&tree);
        }
    }
    Ok(exitcode::OK)
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<i32> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory on this platform"),
        },
    }
    Ok(exitcode::OK)
}

/// Read a JSON array of `{id, parent, label}` records.
pub fn read_records(path: &Path) -> CliResult<Vec<NodeRecord>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("read records {}", path.display()), e))?;
    let records: Vec<NodeRecord> = serde_json::from_str(&content)
        .map_err(crate::application::ApplicationError::from)?;
    debug!(count = records.len(), "records loaded from {}", path.display());
    Ok(records)
}

fn render(value: &serde_json::Value, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.unwrap_or_else(|_| value.to_string())
}
