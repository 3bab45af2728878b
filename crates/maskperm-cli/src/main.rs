// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! maskperm CLI entrypoint.
//!
//! Administrative front end for the reconciliation engine: shows which
//! backend groups are missing MASK elements, merges the catalogue into one or
//! all groups, and saves an explicit per-group selection.
//!
//! # Usage
//! ```text
//! maskperm [--data-dir DIR] [--json] <status|update|show|select|types> [options]
//! ```
//!
//! Exits `0` on success and non-zero when a group is unknown or any write fails.
// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod output;

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use maskperm_core::{
    ConfigService, DictionaryLabels, EngineError, GroupId, ReconcileReport,
    ReconciliationEngine, UpdateRequest,
};
use maskperm_store_fs::{check_identifier, load_labels, DataDir, FsCatalogue, FsGroupStore};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type Engine = ReconciliationEngine<FsCatalogue, DictionaryLabels, FsGroupStore>;

#[derive(Parser)]
#[command(
    name = "maskperm",
    version,
    about = "Keep backend group permissions in sync with MASK content elements"
)]
struct Cli {
    /// Directory holding groups.json, catalogue.json, labels.json and maskperm.json.
    /// Defaults to the platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which groups miss MASK elements.
    Status(GroupArg),
    /// Merge every MASK element into one group, or into all groups.
    Update(GroupArg),
    /// Show the MASK elements available to a group and which are enabled.
    Show(RequiredGroup),
    /// Replace a group's MASK elements with exactly the given identifiers.
    Select(SelectArgs),
    /// List the MASK elements in the catalogue.
    Types,
}

#[derive(Args)]
struct GroupArg {
    /// Restrict to one group id.
    #[arg(long)]
    group: Option<u32>,
}

#[derive(Args)]
struct RequiredGroup {
    /// Group id.
    #[arg(long)]
    group: u32,
}

#[derive(Args)]
struct SelectArgs {
    /// Group id.
    #[arg(long)]
    group: u32,

    /// MASK element identifiers to enable; none clears the selection.
    ids: Vec<String>,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let engine = open_engine(cli.data_dir)?;
    let out = output::Output::new(cli.json);

    match cli.command {
        Commands::Status(args) => run_status(&engine, &out, args.group),
        Commands::Update(args) => run_update(&engine, &out, args.group),
        Commands::Show(args) => run_show(&engine, &out, args.group),
        Commands::Select(args) => run_select(&engine, &out, args),
        Commands::Types => {
            let types = engine.available_types()?;
            out.types(&types)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn open_engine(data_dir: Option<PathBuf>) -> Result<Engine> {
    let dir = match data_dir {
        Some(path) => DataDir::new(path),
        None => DataDir::platform().context("resolve data directory")?,
    };
    debug!(root = %dir.root().display(), "using data directory");

    let config = ConfigService::new(dir.config_store())
        .load_engine_config()
        .context("load engine settings")?;
    let labels = load_labels(&dir.labels_path()).context("load label dictionary")?;

    Ok(ReconciliationEngine::new(
        config,
        dir.catalogue(),
        labels,
        dir.group_store(),
    ))
}

/// Turn `GroupNotFound` into the operator-facing message; pass others through.
fn not_found(err: EngineError) -> anyhow::Error {
    match err {
        EngineError::GroupNotFound(id) => anyhow::anyhow!("Group not found: {id}"),
        other => other.into(),
    }
}

fn run_status(engine: &Engine, out: &output::Output, group: Option<u32>) -> Result<ExitCode> {
    if let Some(id) = group {
        let id = GroupId(id);
        let needed = engine.update_necessary(Some(id)).map_err(not_found)?;
        out.group_status(id, needed)?;
    } else {
        let overview = engine.overview()?;
        out.overview(&overview)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn run_update(engine: &Engine, out: &output::Output, group: Option<u32>) -> Result<ExitCode> {
    let request = match group {
        Some(id) => UpdateRequest::Group(GroupId(id)),
        None => UpdateRequest::AllGroups,
    };
    let report = engine.reconcile(request).map_err(not_found)?;
    out.report(&report, "Update successful!", "Update failed.")?;
    Ok(exit_for(&report))
}

fn run_show(engine: &Engine, out: &output::Output, group: u32) -> Result<ExitCode> {
    let id = GroupId(group);
    let selected = engine.selected_masks(id).map_err(not_found)?;
    let types = engine.available_types()?;
    out.selection(id, &types, &selected)?;
    Ok(ExitCode::SUCCESS)
}

fn run_select(engine: &Engine, out: &output::Output, args: SelectArgs) -> Result<ExitCode> {
    let selected: BTreeSet<String> = args.ids.into_iter().collect();
    for id in &selected {
        check_identifier(id).with_context(|| format!("cannot select '{id}'"))?;
    }
    if let Some(stray) = selected
        .iter()
        .find(|id| !engine.config().is_in_scope(id))
    {
        bail!(
            "'{stray}' is not a MASK element (expected prefix '{}')",
            engine.config().reserved_prefix
        );
    }
    let report = engine
        .reconcile(UpdateRequest::Explicit {
            group: GroupId(args.group),
            selected,
        })
        .map_err(not_found)?;
    out.report(
        &report,
        "MASK permissions saved.",
        "MASK permissions save failed.",
    )?;
    Ok(exit_for(&report))
}

fn exit_for(report: &ReconcileReport) -> ExitCode {
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
