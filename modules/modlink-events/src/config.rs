use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::error::RegistryError;

const COLLISION_POLICY_VAR: &str = "MODLINK_COLLISION_POLICY";

/// What the registry does when an event's concrete type differs from the
/// type its kind was subscribed with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Refuse to run the handler and report `RegistryError::KindCollision`.
    #[default]
    Strict,
    /// Skip the handler, log a warning, and report the event as handled.
    Skip,
}

impl FromStr for CollisionPolicy {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "skip" => Ok(Self::Skip),
            _ => Err(RegistryError::InvalidPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Skip => f.write_str("skip"),
        }
    }
}

/// Registry configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    pub collision_policy: CollisionPolicy,
}

impl RegistryConfig {
    pub fn new(collision_policy: CollisionPolicy) -> Self {
        Self { collision_policy }
    }

    /// Load configuration from environment variables.
    /// Panics with a clear message if a variable is set but malformed.
    pub fn from_env() -> Self {
        let collision_policy = match env::var(COLLISION_POLICY_VAR) {
            Ok(raw) => raw
                .parse()
                .unwrap_or_else(|e| panic!("{COLLISION_POLICY_VAR}: {e}")),
            Err(_) => CollisionPolicy::default(),
        };
        Self { collision_policy }
    }

    /// Log the effective configuration.
    pub fn log(&self) {
        info!(collision_policy = %self.collision_policy, "Registry config");
    }
}
