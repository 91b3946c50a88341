//! # CLI Layer
//!
//! One possible UI client for rollmacro. It is the only place that knows about
//! stdin/stdout, exit codes and terminal colors; everything else goes through
//! [`RollmacroApi`].
//!
//! Data lives in the platform data directory, or in `$ROLLMACRO_HOME` when set.
//! Logging goes to stderr, filtered by `RUST_LOG` (`-v` turns on debug output).

use super::print::{
    print_config, print_messages, print_route, print_sheet_updates, print_tables, print_tree,
    print_variables,
};
use super::setup::{
    Cli, Commands, HeaderCommands, ImportArgs, MacroCommands, OrderArg, SyncCommands,
    TabCommands, TableCommands,
};
use clap::Parser;
use directories::ProjectDirs;
use rollmacro::api::{CmdResult, ConfigAction, RollmacroApi};
use rollmacro::error::{Result, RollmacroError};
use rollmacro::importer::{ImportConfig, MacroOrder};
use rollmacro::model::EntityId;
use rollmacro::roll::inline_rolls;
use rollmacro::store::fs::FileStore;
use rollmacro::sync::apply_updates;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const HOME_ENV: &str = "ROLLMACRO_HOME";

struct AppContext {
    api: RollmacroApi<FileStore>,
    entity: EntityId,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Commands::Roll { formula, macro_ref } => handle_roll(&mut ctx, formula, macro_ref),
        Commands::Change { command } => handle_change(&mut ctx, &command),
        Commands::Vars { expanded, raw } => handle_vars(&ctx, expanded, raw),
        Commands::SetVars { text } => handle_set_vars(&mut ctx, text),
        Commands::Import(args) => handle_import(&mut ctx, args),
        Commands::Tree => handle_tree(&ctx),
        Commands::Tab(cmd) => handle_tab(&mut ctx, cmd),
        Commands::Header(cmd) => handle_header(&mut ctx, cmd),
        Commands::Macro(cmd) => handle_macro(&mut ctx, cmd),
        Commands::Table(cmd) => handle_table(&mut ctx, cmd),
        Commands::Sync(cmd) => handle_sync(&mut ctx, cmd),
        Commands::Config { key, value } => handle_config(&ctx, key, value),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "rollmacro=debug" } else { "rollmacro=warn" };
    // A second init (tests driving `run` twice) is harmless.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "rollmacro", "rollmacro")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| RollmacroError::Store("Could not determine data dir".to_string()))
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let root = data_dir()?;
    tracing::debug!(root = %root.display(), entity = %cli.entity, "starting");
    let store = FileStore::new(root.clone());
    Ok(AppContext {
        api: RollmacroApi::new(store, root),
        entity: EntityId::new(cli.entity.clone()),
    })
}

/// Text from a file, or from piped stdin.
fn read_input(file: Option<&Path>) -> Result<String> {
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(path)?);
    }
    if std::io::stdin().is_terminal() {
        return Err(RollmacroError::Api(
            "No input: pass --file or pipe text on stdin".to_string(),
        ));
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn read_sheet(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn finish(result: CmdResult) -> Result<()> {
    print_messages(&result.messages);
    Ok(())
}

fn handle_roll(ctx: &mut AppContext, formula: Vec<String>, macro_ref: Option<String>) -> Result<()> {
    let result = match macro_ref {
        Some(id) => ctx.api.roll_macro(&ctx.entity, &id)?,
        None => {
            let formula = formula.join(" ");
            if formula.trim().is_empty() {
                return Err(RollmacroError::Api("Nothing to roll".to_string()));
            }
            if !inline_rolls(&formula).is_empty() {
                for result in ctx.api.roll_inline(&ctx.entity, &formula)? {
                    if let Some(route) = &result.route {
                        print_route(route);
                    }
                    print_messages(&result.messages);
                }
                return Ok(());
            }
            ctx.api.roll(&ctx.entity, &formula)?
        }
    };
    if let Some(route) = &result.route {
        print_route(route);
    }
    finish(result)
}

fn handle_change(ctx: &mut AppContext, command: &str) -> Result<()> {
    let result = ctx.api.change_variable(&ctx.entity, command)?;
    finish(result)
}

fn handle_vars(ctx: &AppContext, expanded: bool, raw: bool) -> Result<()> {
    let result = ctx.api.variables(&ctx.entity, expanded)?;
    if raw {
        println!("{}", result.output.unwrap_or_default());
    } else {
        print_variables(&result.variables);
    }
    Ok(())
}

fn handle_set_vars(ctx: &mut AppContext, text: Option<String>) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => read_input(None)?,
    };
    let result = ctx.api.set_variables(&ctx.entity, text.trim_end_matches('\n'))?;
    finish(result)
}

fn import_config(ctx: &AppContext, args: &ImportArgs) -> Result<Option<ImportConfig>> {
    if !args.has_overrides() {
        return Ok(None);
    }
    let mut config = ctx.api.load_config()?.import;
    if let Some(start) = &args.header_start {
        config.header_marker.start = start.clone();
    }
    if let Some(end) = &args.header_end {
        config.header_marker.end = end.clone();
    }
    if let Some(order) = args.order {
        config.macro_order = match order {
            OrderArg::Left => MacroOrder::Left,
            OrderArg::Right => MacroOrder::Right,
        };
    }
    if let Some(splitter) = &args.splitter {
        config.macro_splitter = splitter.clone();
    }
    if let Some(marker) = &args.variable_marker {
        config.variable_marker = marker.clone();
    }
    if let Some(left) = &args.left {
        config.replacement_delimiters.left = left.clone();
    }
    if let Some(right) = &args.right {
        config.replacement_delimiters.right = right.clone();
    }
    Ok(Some(config))
}

fn handle_import(ctx: &mut AppContext, args: ImportArgs) -> Result<()> {
    let text = read_input(args.file.as_deref())?;
    let config = import_config(ctx, &args)?;
    let result = ctx
        .api
        .import(&ctx.entity, &args.tab, &text, config, args.split)?;
    finish(result)
}

fn handle_tree(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.tree(&ctx.entity)?;
    if let Some(tree) = &result.tree {
        print_tree(tree);
    }
    Ok(())
}

fn handle_tab(ctx: &mut AppContext, cmd: TabCommands) -> Result<()> {
    let result = match cmd {
        TabCommands::Add { name } => ctx.api.add_tab(&ctx.entity, name.as_deref())?,
        TabCommands::Rename { tab, name } => ctx.api.rename_tab(&ctx.entity, &tab, &name)?,
        TabCommands::Delete { tab } => ctx.api.delete_tab(&ctx.entity, &tab)?,
    };
    finish(result)
}

fn handle_header(ctx: &mut AppContext, cmd: HeaderCommands) -> Result<()> {
    let result = match cmd {
        HeaderCommands::Add { tab, name } => {
            ctx.api.add_header(&ctx.entity, &tab, name.as_deref())?
        }
        HeaderCommands::Delete { header } => ctx.api.delete_header(&ctx.entity, &header)?,
        HeaderCommands::Toggle { header } => ctx.api.toggle_header(&ctx.entity, &header)?,
    };
    finish(result)
}

fn handle_macro(ctx: &mut AppContext, cmd: MacroCommands) -> Result<()> {
    let result = match cmd {
        MacroCommands::Add {
            header,
            display,
            formula,
        } => ctx.api.add_macro(
            &ctx.entity,
            &header,
            display.as_deref(),
            formula.as_deref(),
        )?,
        MacroCommands::Update {
            id,
            display,
            formula,
        } => ctx.api.update_macro(
            &ctx.entity,
            &id,
            display.as_deref(),
            formula.as_deref(),
        )?,
        MacroCommands::Delete { id } => ctx.api.delete_macro(&ctx.entity, &id)?,
    };
    finish(result)
}

fn handle_table(ctx: &mut AppContext, cmd: TableCommands) -> Result<()> {
    match cmd {
        TableCommands::List => {
            let result = ctx.api.tables()?;
            print_tables(&result.tables);
            Ok(())
        }
        TableCommands::Save { command, file } => {
            let body = read_input(file.as_deref())?;
            let result = ctx.api.save_table(&command, body.trim_end())?;
            finish(result)
        }
        TableCommands::Delete { command } => finish(ctx.api.delete_table(&command)?),
        TableCommands::Backup => {
            let result = ctx.api.backup_tables()?;
            println!("{}", result.output.unwrap_or_default());
            Ok(())
        }
        TableCommands::Restore { file } => {
            let json = read_input(file.as_deref())?;
            finish(ctx.api.restore_tables(&json)?)
        }
    }
}

fn handle_sync(ctx: &mut AppContext, cmd: SyncCommands) -> Result<()> {
    match cmd {
        SyncCommands::Pull { sheet } => {
            let sheet = read_sheet(&sheet)?;
            finish(ctx.api.sync_pull(&ctx.entity, &sheet)?)
        }
        SyncCommands::Push { key, sheet, write } => {
            let mut values = read_sheet(&sheet)?;
            let result = ctx.api.sync_push(&ctx.entity, &key, &values)?;
            if write && !result.sheet_updates.is_empty() {
                apply_updates(&mut values, &result.sheet_updates);
                std::fs::write(&sheet, serde_json::to_string_pretty(&values)?)?;
            }
            print_sheet_updates(&result.sheet_updates);
            finish(result)
        }
    }
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key.clone(), value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.config(action)?;
    if key.is_none() {
        if let Some(config) = &result.config {
            print_config(config);
        }
    }
    finish(result)
}
