//! Command dispatch: drives a picker session against a record source

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{PickerAction, PickerEvent, PickerSession};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{render_forest, render_rows};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{EntityId, EntityKind, ExpansionView, OrphanPolicy, TreeBuilder};
use crate::infrastructure::{InfraError, JsonFileSource, RecordSource};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let cwd = std::env::current_dir().ok();
    let settings = Settings::load(cwd.as_deref())?;
    debug!("settings: {:?}", settings);

    match &cli.command {
        Some(Commands::Tree {
            query,
            all,
            orphans,
        }) => cmd_tree(cli, &settings, query.as_deref(), *all, *orphans),
        Some(Commands::List { kind, query }) => cmd_list(cli, &settings, *kind, query.as_deref()),
        Some(Commands::Select { id, kind }) => {
            cmd_select(cli, &settings, id, kind.unwrap_or(settings.default_kind))
        }
        Some(Commands::Config { command }) => cmd_config(command, &settings, cwd),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn record_source(cli: &Cli, settings: &Settings) -> CliResult<JsonFileSource> {
    cli.records
        .clone()
        .or_else(|| settings.records_file.clone())
        .map(JsonFileSource::new)
        .ok_or_else(|| {
            CliError::Usage("no records file: pass --records or set records_file in config".into())
        })
}

/// Open a session for `kind` and load it from `source`.
pub fn open_session(
    source: &dyn RecordSource,
    session: PickerSession,
    kind: EntityKind,
) -> CliResult<PickerSession> {
    let (session, _) = session.apply(PickerAction::BeginFetch(kind));
    let records = source.fetch(kind)?;
    let (session, events) = session.apply(PickerAction::CompleteFetch { kind, records });
    for event in &events {
        if let PickerEvent::RecordsLoaded { report, .. } = event {
            if report.malformed + report.duplicates + report.orphans > 0 {
                output::warning(&format!(
                    "skipped {} malformed, {} duplicate, {} orphaned record(s)",
                    report.malformed, report.duplicates, report.orphans
                ));
            }
        }
    }
    Ok(session)
}

fn apply_query(session: PickerSession, query: Option<&str>) -> PickerSession {
    match query {
        Some(q) => session.apply(PickerAction::SetQuery(q.to_string())).0,
        None => session,
    }
}

#[instrument(skip(cli, settings))]
fn cmd_tree(
    cli: &Cli,
    settings: &Settings,
    query: Option<&str>,
    all: bool,
    orphans: Option<OrphanPolicy>,
) -> CliResult<()> {
    let source = record_source(cli, settings)?;
    let mut session = PickerSession::from_settings(settings);
    if let Some(policy) = orphans {
        session = session.with_builder(TreeBuilder::new().with_orphan_policy(policy));
    }
    let session = open_session(&source, session, EntityKind::Group)?;
    let mut session = apply_query(session, query);
    if all {
        session = session.apply(PickerAction::ExpandAll).0;
    }

    let filtered = session.filtered_forest();
    if filtered.is_empty() {
        output::info(&"(no groups)");
        return Ok(());
    }
    let view = ExpansionView::new(session.expansion(), &filtered, session.query());
    print!("{}", render_forest(&filtered, &view, None));
    Ok(())
}

#[instrument(skip(cli, settings))]
fn cmd_list(cli: &Cli, settings: &Settings, kind: EntityKind, query: Option<&str>) -> CliResult<()> {
    let source = record_source(cli, settings)?;
    let session = open_session(&source, PickerSession::from_settings(settings), kind)?;
    let session = apply_query(session, query);

    let rows = session.visible_rows();
    if rows.is_empty() {
        output::info(&format!("(no {} entities)", kind));
        return Ok(());
    }
    print!("{}", render_rows(&rows));
    Ok(())
}

#[instrument(skip(cli, settings))]
fn cmd_select(cli: &Cli, settings: &Settings, id: &str, kind: EntityKind) -> CliResult<()> {
    let source = record_source(cli, settings)?;
    let session = open_session(&source, PickerSession::from_settings(settings), kind)?;

    let (session, events) = session.apply(PickerAction::Select(EntityId::from(id)));
    if let Some(PickerEvent::Rejected { reason, .. }) = events.first() {
        return Err(CliError::InvalidArgs(format!("{reason} ({kind})")));
    }

    let (_, events) = session.apply(PickerAction::Commit);
    for event in events {
        if let PickerEvent::SelectionChanged(records) = event {
            let json = serde_json::to_string_pretty(&records).map_err(|source| {
                InfraError::Serialize {
                    what: "selection",
                    source,
                }
            })?;
            output::info(&json);
        }
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands, settings: &Settings, cwd: Option<PathBuf>) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => {
            output::header(&"Config files");
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", &"(no config directory)"),
            }
            if let Some(dir) = cwd {
                output::action("local", &local_config_path(&dir).display());
            }
            output::detail(&"env: FLEETTREE_* (use __ for nesting, e.g. FLEETTREE_TREE__ORPHANS)");
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
