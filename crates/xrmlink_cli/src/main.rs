//! xrmlink CLI
//!
//! Command-line tools for managing connections, entity definitions and
//! records.
//!
//! # Commands
//!
//! - `connect` - Save a connection and fetch its entity list
//! - `connections` - List saved connections
//! - `entities` - Refresh and list a connection's entity choices
//! - `define` - Create an entity definition from the remote schema
//! - `sync` - Regenerate entity definitions from the remote schema
//! - `inspect` - Display stored definitions and their catalogs
//! - `exec` - Run a CRUD operation against a definition

mod commands;

use clap::{Parser, Subcommand};
use commands::exec::ExecOperation;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// xrmlink command-line tools.
#[derive(Parser)]
#[command(name = "xrmlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the definition store snapshot
    #[arg(global = true, short, long)]
    store: Option<PathBuf>,

    /// Service fixture (JSON) to serve entity metadata and records from
    #[arg(global = true, short, long)]
    fixture: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a connection and fetch its entity list
    Connect {
        /// Connection name, unique across the store
        #[arg(short, long)]
        name: String,

        /// Organization service URL
        #[arg(short, long)]
        url: String,

        /// Domain of the user
        #[arg(short, long)]
        domain: Option<String>,

        /// User name
        #[arg(long, default_value = "")]
        user: String,

        /// Password; an empty password keeps the stored one
        #[arg(long, default_value = "")]
        password: String,
    },

    /// List saved connections
    Connections,

    /// Refresh and list a connection's entity choices
    Entities {
        /// Connection name
        #[arg(short, long)]
        connection: String,
    },

    /// Create an entity definition from the remote schema
    Define {
        /// Connection name
        #[arg(short, long)]
        connection: String,

        /// Entity choice, e.g. "Contact (contact)"
        #[arg(short, long)]
        entity: String,
    },

    /// Regenerate entity definitions from the remote schema
    Sync {
        /// Connection name
        #[arg(short, long)]
        connection: String,

        /// Logical name of one entity (default: every definition)
        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Display stored definitions and their catalogs
    Inspect {
        /// Show every field of each catalog
        #[arg(long)]
        fields: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a CRUD operation against a definition
    Exec {
        /// Connection name
        #[arg(short, long)]
        connection: String,

        /// Logical name of the entity
        #[arg(short, long)]
        entity: String,

        /// Operation to run
        #[arg(value_enum)]
        operation: ExecOperation,

        /// Record identifier (update, retrieve, delete)
        #[arg(long)]
        id: Option<String>,

        /// Record as a JSON object (create, update)
        #[arg(long)]
        record: Option<String>,

        /// Omit null values on update
        #[arg(long)]
        null_as_ignore: bool,

        /// Treat empty strings as null on update
        #[arg(long)]
        empty_as_null: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Commands::Version = cli.command {
        println!("xrmlink CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("xrmlink Core v{}", xrmlink_core::VERSION);
        return Ok(());
    }

    let store = cli.store.ok_or("Store path required")?;
    let session = commands::Session::open(&store, cli.fixture.as_deref())?;

    match cli.command {
        Commands::Connect {
            name,
            url,
            domain,
            user,
            password,
        } => commands::connection::add(&session, name, url, domain, user, password)?,
        Commands::Connections => commands::connection::list(&session),
        Commands::Entities { connection } => commands::entities::run(&session, &connection)?,
        Commands::Define { connection, entity } => {
            commands::define::run(&session, &connection, &entity)?;
        }
        Commands::Sync { connection, entity } => {
            commands::sync::run(&session, &connection, entity.as_deref())?;
        }
        Commands::Inspect { fields, json } => commands::inspect::run(&session, fields, json)?,
        Commands::Exec {
            connection,
            entity,
            operation,
            id,
            record,
            null_as_ignore,
            empty_as_null,
        } => {
            let request = commands::exec::ExecRequest {
                operation,
                id,
                record,
                null_as_ignore,
                empty_as_null,
            };
            commands::exec::run(&session, &connection, &entity, request)?;
        }
        Commands::Version => {}
    }

    Ok(())
}
