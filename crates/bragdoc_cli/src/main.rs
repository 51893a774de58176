//! `bragdoc` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments and resolve the workspace root and logging settings.
//! - Print every operation result as pretty JSON on stdout.
//!
//! # Invariants
//! - The process exits non-zero whenever the response envelope is not `ok`.

use bragdoc_api::{
    add_entry, create_brag_document, init_logging, list_entries, outline, remove_entry,
    update_entry, write_template, ActionResponse, EntrySelector,
};
use bragdoc_core::{default_log_level, WorkspaceConfig};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "bragdoc", version, about = "Maintain yearly brag documents and their entry index")]
struct Cli {
    /// Workspace root holding `BragDocuments/` and `Templates/`.
    #[arg(long, global = true, env = "BRAGDOC_WORKSPACE_ROOT")]
    workspace_root: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "BRAGDOC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true, env = "BRAGDOC_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Person {
    /// Full name of the document owner.
    #[arg(long)]
    name: String,
    #[arg(long)]
    year: i32,
}

#[derive(Debug, Args)]
struct Selector {
    #[arg(long)]
    entry_id: Option<String>,
    /// Current entry text, used with `--section` when no id is given.
    #[arg(long)]
    old_text: Option<String>,
    #[arg(long)]
    section: Option<String>,
    /// 0-based occurrence among same-text entries of the section.
    #[arg(long)]
    occurrence: Option<usize>,
}

impl From<Selector> for EntrySelector {
    fn from(value: Selector) -> Self {
        Self {
            entry_id: value.entry_id,
            old_text: value.old_text,
            section_path: value.section,
            occurrence_index: value.occurrence,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the yearly document from the workspace template.
    Create(Person),
    /// Add an entry to a section such as `Projects` or `Outside of work/Articles`.
    Add {
        #[command(flatten)]
        person: Person,
        #[arg(long)]
        section: String,
        #[arg(long)]
        text: String,
        /// Paragraphs after the section heading; appends when omitted.
        #[arg(long)]
        position: Option<usize>,
    },
    /// Rewrite the text of an existing entry.
    Update {
        #[command(flatten)]
        person: Person,
        #[command(flatten)]
        selector: Selector,
        #[arg(long)]
        new_text: String,
    },
    /// Remove an entry from the document and index.
    Remove {
        #[command(flatten)]
        person: Person,
        #[command(flatten)]
        selector: Selector,
    },
    /// List indexed entries.
    List {
        #[command(flatten)]
        person: Person,
        #[arg(long)]
        section: Option<String>,
    },
    /// Show document headings and optionally one section range.
    Outline {
        #[command(flatten)]
        person: Person,
        #[arg(long)]
        section: Option<String>,
    },
    /// Write the default template into the workspace.
    Template {
        #[arg(long)]
        overwrite: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let error = init_logging(level, &log_dir.to_string_lossy());
        if !error.is_empty() {
            eprintln!("bragdoc: logging disabled: {error}");
        }
    }

    let root = match cli.workspace_root {
        Some(root) => root,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(err) => {
                eprintln!("bragdoc: cannot resolve workspace root: {err}");
                return ExitCode::FAILURE;
            }
        },
    };
    let config = WorkspaceConfig::new(root);

    match cli.command {
        Command::Create(person) => print(create_brag_document(&config, &person.name, person.year)),
        Command::Add {
            person,
            section,
            text,
            position,
        } => print(add_entry(
            &config,
            &person.name,
            person.year,
            &section,
            &text,
            position,
        )),
        Command::Update {
            person,
            selector,
            new_text,
        } => print(update_entry(
            &config,
            &person.name,
            person.year,
            &selector.into(),
            &new_text,
        )),
        Command::Remove { person, selector } => print(remove_entry(
            &config,
            &person.name,
            person.year,
            &selector.into(),
        )),
        Command::List { person, section } => print(list_entries(
            &config,
            &person.name,
            person.year,
            section.as_deref(),
        )),
        Command::Outline { person, section } => print(outline(
            &config,
            &person.name,
            person.year,
            section.as_deref(),
        )),
        Command::Template { overwrite } => print(write_template(&config, overwrite)),
    }
}

fn print<T: Serialize>(response: ActionResponse<T>) -> ExitCode {
    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("bragdoc: cannot render response: {err}");
            return ExitCode::FAILURE;
        }
    }
    if response.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
