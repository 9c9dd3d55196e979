//! Version abstraction layer
//!
//! Each supported server release range has one provider implementing the
//! full set of capability tables ([`interfaces`]). The [`NmsHandler`] picks
//! the provider for the running version once, and everything else goes
//! through it.

pub mod handler;
pub mod interfaces;
pub mod offline_player;
pub mod v1_20;
pub mod v1_21;
pub mod version;

use thiserror::Error;
use uuid::Uuid;

pub use handler::NmsHandler;
pub use interfaces::{EntityHelper, FakeEntityHelper, ItemHelper, NmsProvider, PlayerDataHelper};
pub use offline_player::ImprovedOfflinePlayer;
pub use version::NmsVersion;

/// Errors from version resolution and capability calls
#[derive(Debug, Error)]
pub enum NmsError {
    #[error("invalid server version '{0}'")]
    InvalidVersion(String),

    #[error("no provider supports server version {0}")]
    UnsupportedVersion(NmsVersion),

    #[error("server version {0} matched more than one provider ({1})")]
    AmbiguousVersion(NmsVersion, String),

    #[error("player data for {id} could not be accessed: {source}")]
    Persistence {
        id: Uuid,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid compound: {0}")]
    InvalidCompound(String),
}
