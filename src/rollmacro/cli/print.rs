use colored::Colorize;
use rollmacro::api::{CmdMessage, MessageLevel};
use rollmacro::config::RollmacroConfig;
use rollmacro::config::KEYS;
use rollmacro::model::MacroTree;
use rollmacro::roll::Route;
use rollmacro::sync::SheetUpdate;
use rollmacro::tables::OriginalTable;

// Node ids are shown shortened; any unique prefix resolves.
const ID_WIDTH: usize = 8;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..ID_WIDTH].to_string()
}

pub(super) fn print_tree(tree: &MacroTree) {
    if tree.is_empty() {
        println!("No macros yet.");
        return;
    }
    for tab in &tree.tabs {
        println!("{} {}", short_id(&tab.id).yellow(), tab.name.bold());
        for header in &tab.headers {
            let marker = if header.open { "▾" } else { "▸" };
            println!("  {} {} {}", short_id(&header.id).yellow(), marker, header.name);
            if !header.open {
                continue;
            }
            for m in &header.macros {
                println!(
                    "    {} {}  {}",
                    short_id(&m.id).yellow(),
                    m.display,
                    m.formula.dimmed()
                );
            }
        }
    }
}

pub(super) fn print_variables(pairs: &[(String, String)]) {
    if pairs.is_empty() {
        println!("No variables.");
        return;
    }
    let width = pairs.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (key, value) in pairs {
        println!("{:<width$} = {}", key.cyan(), value, width = width);
    }
}

pub(super) fn print_route(route: &Route) {
    match route {
        Route::Roll(formula) if !formula.is_empty() => println!("{}", formula),
        Route::Table(body) => println!("{}", body),
        _ => {}
    }
}

pub(super) fn print_tables(tables: &[OriginalTable]) {
    if tables.is_empty() {
        println!("No tables.");
        return;
    }
    for table in tables {
        println!("{:<12} {}", table.command.cyan(), table.display_name());
    }
}

pub(super) fn print_sheet_updates(updates: &[SheetUpdate]) {
    for update in updates {
        println!("{} = {}", update.path().cyan(), update.value());
    }
}

pub(super) fn print_config(config: &RollmacroConfig) {
    for key in KEYS {
        if let Some(value) = config.get(key) {
            println!("{:<20} {}", key.cyan(), value);
        }
    }
}
