//! Unit behaviour configuration.

use serde::{Deserialize, Serialize};

/// What `collect` does while the owner's mining flag is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectPolicy {
    /// Run the settlement anyway; it is a no-op unless mining is active.
    #[default]
    SettleIfMining,
    /// Fail with `InvalidState` unless mining is active.
    RequireMining,
}

/// Tunable behaviour of a [`MiningUnit`](crate::MiningUnit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    pub collect_policy: CollectPolicy,
}

impl UnitConfig {
    pub fn with_collect_policy(mut self, policy: CollectPolicy) -> Self {
        self.collect_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settles_if_mining() {
        assert_eq!(UnitConfig::default().collect_policy, CollectPolicy::SettleIfMining);
    }

    #[test]
    fn deserialize_policy_names() {
        let cfg: UnitConfig = serde_json::from_str(r#"{"collect_policy":"require_mining"}"#).unwrap();
        assert_eq!(cfg.collect_policy, CollectPolicy::RequireMining);
    }

    #[test]
    fn missing_fields_fall_back_to_default() {
        let cfg: UnitConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, UnitConfig::default());
    }
}
