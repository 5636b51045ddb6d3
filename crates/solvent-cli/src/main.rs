use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

mod commands;

/// solvent: replicated to-do lists that merge without conflicts.
///
/// Edits a local notebook database, exchanges notebooks as JSON files, and
/// serves the sync API.
#[derive(Parser)]
#[command(name = "solvent", version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file.
    #[arg(long, global = true, default_value = "solvent.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty notebook and print its id.
    New,

    /// List stored notebooks.
    List,

    /// Print a notebook with its lists and items.
    Show {
        /// Notebook id.
        notebook: Uuid,
    },

    /// Add a list to a notebook.
    AddList {
        /// Notebook id.
        notebook: Uuid,
        /// Title of the new list.
        title: String,
    },

    /// Remove a list from a notebook.
    RemoveList {
        /// Notebook id.
        notebook: Uuid,
        /// List id.
        list: Uuid,
    },

    /// Rename a list.
    RenameList {
        /// Notebook id.
        notebook: Uuid,
        /// List id.
        list: Uuid,
        /// New title.
        title: String,
    },

    /// Add an item to the end of a list.
    AddItem {
        /// Notebook id.
        notebook: Uuid,
        /// List id.
        list: Uuid,
        /// Item text.
        title: String,
    },

    /// Remove an item from a list.
    RemoveItem {
        /// Notebook id.
        notebook: Uuid,
        /// List id.
        list: Uuid,
        /// Item id.
        item: Uuid,
    },

    /// Mark an item as done.
    Check {
        /// Notebook id.
        notebook: Uuid,
        /// List id.
        list: Uuid,
        /// Item id.
        item: Uuid,
    },

    /// Mark an item as not done. The item gets a new id.
    Uncheck {
        /// Notebook id.
        notebook: Uuid,
        /// List id.
        list: Uuid,
        /// Item id.
        item: Uuid,
    },

    /// Move an item to a position in its list (0 is the top).
    Move {
        /// Notebook id.
        notebook: Uuid,
        /// List id.
        list: Uuid,
        /// Item id.
        item: Uuid,
        /// Target position.
        index: usize,
    },

    /// Export a notebook as JSON.
    Export {
        /// Notebook id.
        notebook: Uuid,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge a notebook JSON file into the database.
    Merge {
        /// Path to a file produced by `export` or the sync API.
        file: PathBuf,
    },

    /// Serve the sync API over HTTP.
    Serve {
        /// Interface to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on.
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> commands::Result {
    let service = commands::open_service(&cli.db)?;

    match cli.command {
        Commands::New => commands::new_notebook(&service),
        Commands::List => commands::list(&service),
        Commands::Show { notebook } => commands::show(&service, notebook),
        Commands::AddList { notebook, title } => commands::add_list(&service, notebook, &title),
        Commands::RemoveList { notebook, list } => {
            commands::remove_list(&service, notebook, list)
        }
        Commands::RenameList {
            notebook,
            list,
            title,
        } => commands::rename_list(&service, notebook, list, &title),
        Commands::AddItem {
            notebook,
            list,
            title,
        } => commands::add_item(&service, notebook, list, &title),
        Commands::RemoveItem {
            notebook,
            list,
            item,
        } => commands::remove_item(&service, notebook, list, item),
        Commands::Check {
            notebook,
            list,
            item,
        } => commands::check(&service, notebook, list, item),
        Commands::Uncheck {
            notebook,
            list,
            item,
        } => commands::uncheck(&service, notebook, list, item),
        Commands::Move {
            notebook,
            list,
            item,
            index,
        } => commands::move_item(&service, notebook, list, item, index),
        Commands::Export { notebook, output } => {
            commands::export(&service, notebook, output.as_deref())
        }
        Commands::Merge { file } => commands::merge(&service, &file),
        Commands::Serve { host, port } => {
            let config = solvent_web::ServerConfig { host, port };
            solvent_web::serve(config, Arc::new(service)).await
        }
    }
}

/// Logs go to stderr so `export` output stays clean. `RUST_LOG` overrides
/// the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("solvent=info,solvent_store=info,solvent_web=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}
