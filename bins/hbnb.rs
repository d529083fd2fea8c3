//! HBnB storage operator tool.
//!
//! Runs one command against the configured backend, then closes it.

use std::process::ExitCode;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use models::{Kind, Object};
use serde_json::{Map, Value};
use storage::Storage;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "hbnb")]
#[command(about = "Inspect and edit HBnB storage")]
struct Args {
    /// Emit JSON log lines instead of compact text
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count entities, overall or of one kind
    Count {
        kind: Option<Kind>,
    },

    /// Print every entity, or every entity of one kind
    List {
        kind: Option<Kind>,
    },

    /// Print one entity
    Show {
        kind: Kind,
        id: String,
    },

    /// Create an entity from a JSON object of attributes
    Create {
        kind: Kind,
        /// e.g. '{"name": "California"}'
        attrs: String,
    },

    /// Apply a JSON object of attributes to an entity
    Update {
        kind: Kind,
        id: String,
        attrs: String,
    },

    /// Delete an entity
    Destroy {
        kind: Kind,
        id: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    dotenv().ok();
    if args.json_logs {
        common::utils::logging::init_logging_json();
    } else {
        common::utils::logging::init_logging_default();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(args.command)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(event = "command_failed", error = %format!("{e:#}"), "hbnb command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let cfg = configs::AppConfig::load_and_validate().context("load configuration")?;
    let storage = Storage::from_config(&cfg.storage).await?;
    info!(event = "start", backend = storage.backend_name(), version = env!("CARGO_PKG_VERSION"), "hbnb starting");

    storage.reload().await?;
    let result = execute(&storage, command).await;
    let closed = storage.close().await;
    result?;
    closed?;
    Ok(())
}

async fn execute(storage: &Storage, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Count { kind } => {
            println!("{}", storage.count(kind).await?);
        }
        Commands::List { kind } => {
            let mut objects: Vec<Object> = storage.all(kind).await?.into_values().collect();
            objects.sort_by(|a, b| (a.kind(), a.base().created_at).cmp(&(b.kind(), b.base().created_at)));
            let records = objects.iter().map(Object::to_dict).collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Show { kind, id } => {
            let obj = fetch(storage, kind, &id).await?;
            println!("{}", serde_json::to_string_pretty(&obj.to_dict()?)?);
        }
        Commands::Create { kind, attrs } => {
            let mut obj = Object::create(kind, &parse_attrs(&attrs)?)?;
            storage.persist(&mut obj).await?;
            println!("{}", obj.id());
        }
        Commands::Update { kind, id, attrs } => {
            let mut obj = fetch(storage, kind, &id).await?;
            obj.update(&parse_attrs(&attrs)?)?;
            storage.persist(&mut obj).await?;
        }
        Commands::Destroy { kind, id } => {
            let obj = fetch(storage, kind, &id).await?;
            storage.delete(&obj).await?;
            storage.save().await?;
            info!(event = "destroyed", key = %obj.key(), "entity deleted");
        }
    }
    Ok(())
}

async fn fetch(storage: &Storage, kind: Kind, id: &str) -> anyhow::Result<Object> {
    storage
        .get(kind, id)
        .await?
        .ok_or_else(|| anyhow!("no instance found: {}", kind.key(id)))
}

fn parse_attrs(raw: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).context("attributes must be JSON")? {
        Value::Object(map) => Ok(map),
        _ => Err(anyhow!("attributes must be a JSON object")),
    }
}
