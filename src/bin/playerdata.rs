//! denizen_playerdata - inspect and edit persisted player data
//!
//! Reads `<world>/playerdata/<uuid>.json` through the version provider for
//! the given server version, so item and attribute layouts match that release.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use denizen::host::{FilePlayerData, ItemStack, Server, World};
use denizen::nms::offline_player::SlotContents;
use denizen::nms::{ImprovedOfflinePlayer, NmsHandler};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Persisted player data tool
#[derive(Parser, Debug)]
#[command(
    name = "denizen_playerdata",
    version,
    about = "Inspect and edit persisted player data"
)]
struct Args {
    /// World folder holding `playerdata/`
    #[arg(short, long)]
    world: PathBuf,

    /// Server version the data belongs to
    #[arg(long = "server-version", default_value = "1.21.4")]
    server_version: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored player uuids
    List,
    /// Print inventory, ender chest and max health
    Show { player: Uuid },
    /// Set the base max health
    SetMaxHealth { player: Uuid, value: f64 },
    /// Put an item in a slot (`i@air` empties it)
    SetSlot {
        player: Uuid,
        slot: i32,
        item: String,
        /// Edit the ender chest instead of the inventory
        #[arg(long)]
        ender: bool,
    },
}

fn slots_json(contents: &SlotContents) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = contents
        .iter()
        .map(|(slot, item)| (slot.to_string(), json!(item.identify())))
        .collect();
    serde_json::Value::Object(map)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "denizen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if !args.world.is_dir() {
        bail!("World folder not found: {}", args.world.display());
    }

    let handler = Arc::new(NmsHandler::detect(&args.server_version)?);
    let store = Arc::new(FilePlayerData::for_world(&args.world));

    let load = |id: Uuid| -> Result<ImprovedOfflinePlayer> {
        ImprovedOfflinePlayer::load(id, store.clone(), handler.clone())?
            .ok_or_else(|| anyhow!("No player data for {}", id))
    };

    match args.command {
        Command::List => {
            for id in store.stored_ids()? {
                println!("{}", id);
            }
        }
        Command::Show { player } => {
            let server = Server::new(&args.server_version);
            server.add_world(World::new("world", &args.world));
            let data = load(player)?;
            let out = json!({
                "uuid": data.id().to_string(),
                "max_health": data.max_health(&server),
                "inventory": slots_json(&data.inventory()),
                "ender_chest": slots_json(&data.ender_chest()),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::SetMaxHealth { player, value } => {
            if value <= 0.0 {
                bail!("Max health must be positive");
            }
            let mut data = load(player)?;
            data.set_max_health(value);
            data.save()?;
            info!("Set max health of {} to {}", player, value);
        }
        Command::SetSlot {
            player,
            slot,
            item,
            ender,
        } => {
            let item = ItemStack::parse_slot(&item)?;
            let mut data = load(player)?;
            let mut contents = if ender {
                data.ender_chest()
            } else {
                data.inventory()
            };
            match item {
                Some(item) => {
                    contents.insert(slot, item);
                }
                None => {
                    contents.remove(&slot);
                }
            }
            if ender {
                data.set_ender_chest(&contents);
            } else {
                data.set_inventory(&contents);
            }
            data.save()?;
            info!("Updated slot {} of {}", slot, player);
        }
    }

    Ok(())
}
