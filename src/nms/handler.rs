//! Version dispatcher
//!
//! Resolves the running server version to exactly one provider. There is no
//! degraded mode: a version without a provider fails construction.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use super::interfaces::{EntityHelper, FakeEntityHelper, ItemHelper, NmsProvider, PlayerDataHelper};
use super::version::NmsVersion;
use super::{v1_20, v1_21, NmsError};

/// The resolved version and its provider
#[derive(Clone)]
pub struct NmsHandler {
    version: NmsVersion,
    provider: Arc<dyn NmsProvider>,
}

impl fmt::Debug for NmsHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NmsHandler")
            .field("version", &self.version)
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl NmsHandler {
    /// Every provider shipped with the crate
    pub fn builtin_providers() -> Vec<Arc<dyn NmsProvider>> {
        vec![
            Arc::new(v1_20::Provider::new()),
            Arc::new(v1_21::Provider::new()),
        ]
    }

    /// Pick the single provider whose range contains `version`
    pub fn resolve(version: NmsVersion, providers: &[Arc<dyn NmsProvider>]) -> Result<Self, NmsError> {
        let matching: Vec<&Arc<dyn NmsProvider>> =
            providers.iter().filter(|p| p.supports(version)).collect();
        match matching.as_slice() {
            [] => {
                error!("No version provider for server version {}", version);
                Err(NmsError::UnsupportedVersion(version))
            }
            [provider] => {
                info!("Using provider {} for server version {}", provider.name(), version);
                Ok(Self {
                    version,
                    provider: Arc::clone(provider),
                })
            }
            many => {
                let names: Vec<&str> = many.iter().map(|p| p.name()).collect();
                Err(NmsError::AmbiguousVersion(version, names.join(", ")))
            }
        }
    }

    /// Resolve against the built-in providers
    pub fn for_version(version: NmsVersion) -> Result<Self, NmsError> {
        Self::resolve(version, &Self::builtin_providers())
    }

    /// Detect the version from a server version string, then resolve
    pub fn detect(server_version: &str) -> Result<Self, NmsError> {
        Self::for_version(NmsVersion::detect(server_version)?)
    }

    pub fn version(&self) -> NmsVersion {
        self.version
    }

    pub fn is_at_least(&self, threshold: NmsVersion) -> bool {
        self.version.is_at_least(threshold)
    }

    pub fn is_at_most(&self, threshold: NmsVersion) -> bool {
        self.version.is_at_most(threshold)
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn entity_helper(&self) -> &dyn EntityHelper {
        self.provider.entity_helper()
    }

    pub fn item_helper(&self) -> &dyn ItemHelper {
        self.provider.item_helper()
    }

    pub fn player_data_helper(&self) -> &dyn PlayerDataHelper {
        self.provider.player_data_helper()
    }

    pub fn fake_entity_helper(&self) -> &dyn FakeEntityHelper {
        self.provider.fake_entity_helper()
    }
}
