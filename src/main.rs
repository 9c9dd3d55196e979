//! denizen - entity object tool
//!
//! Parses, inspects and spawns entity objects against an in-memory host.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use denizen::host::Location;
use denizen::objects::{EntityTag, Mechanism, TagValue};
use denizen::{Config, Denizen};
use serde_json::json;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Denizen entity object tool
#[derive(Parser, Debug)]
#[command(name = "denizen", version, about = "Parse, inspect and spawn entity objects")]
struct Args {
    /// Config file (defaults to ./denizen.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server version string, overriding the config
    #[arg(long = "server-version")]
    server_version: Option<String>,

    /// Log and print as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an entity object and print its identity
    Parse {
        input: String,
        /// Attributes to read (e.g. `uuid`, `target_block[20]`)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Spawn an entity object
    Spawn {
        input: String,
        /// Location as `x,y,z,world`
        #[arg(long, default_value = "0,64,0,world")]
        at: String,
        /// Extra mechanisms as `name=value` (repeatable)
        #[arg(short, long = "mechanism")]
        mechanisms: Vec<String>,
    },
    /// List registered entity types
    Types,
    /// Pick random entity types
    Random {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
}

fn init_tracing(json: bool, verbose: bool) {
    let default = if verbose { "denizen=debug" } else { "denizen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn tag_value_json(value: &TagValue) -> serde_json::Value {
    match value {
        TagValue::Value(v) => json!(v),
        TagValue::Empty => serde_json::Value::Null,
        TagValue::Fallback(identity) => json!({ "unhandled": identity }),
    }
}

fn summary(entity: &EntityTag, denizen: &Denizen) -> serde_json::Value {
    json!({
        "identify": entity.identify(denizen),
        "simple": entity.identify_simple(),
        "state": format!("{:?}", entity.state()),
        "type": entity.entity_type().name(),
        "unique": entity.is_unique(denizen),
        "describe": entity.describe(denizen),
    })
}

fn print(value: &serde_json::Value, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(version) = &args.server_version {
        config.version = version.clone();
    }
    init_tracing(args.json, config.debug.verbose);

    let denizen = Denizen::new(config)?;

    match args.command {
        Command::Parse { input, tags } => {
            let entity = EntityTag::value_of(&input, &denizen)
                .ok_or_else(|| anyhow!("'{}' is not a valid entity", input))?;
            let mut out = summary(&entity, &denizen);
            for tag in &tags {
                out[tag.as_str()] = tag_value_json(&entity.get_attribute(&denizen, tag));
            }
            print(&out, args.json)?;
        }
        Command::Spawn {
            input,
            at,
            mechanisms,
        } => {
            let location: Location = at
                .parse()
                .map_err(|e| anyhow!("invalid location '{}': {}", at, e))?;
            let mut entity = EntityTag::value_of(&input, &denizen)
                .ok_or_else(|| anyhow!("'{}' is not a valid entity", input))?;
            for raw in &mechanisms {
                entity.adjust(&denizen, Mechanism::parse(raw))?;
            }
            entity.spawn_at(&denizen, &location)?;
            print(&summary(&entity, &denizen), args.json)?;
        }
        Command::Types => {
            print(&json!(denizen.types.names()), args.json)?;
        }
        Command::Random { count } => {
            let picks: Vec<String> = (0..count)
                .filter_map(|_| denizen.types.random())
                .map(|t| t.name().to_string())
                .collect();
            print(&json!(picks), args.json)?;
        }
    }

    Ok(())
}
