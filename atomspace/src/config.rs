// Copyright (c) 2026 cogmesh contributors
// SPDX-License-Identifier: AGPL-3.0

//! Store-level configuration, embedded under the `atomspace:` key of the
//! workspace configuration file.

use serde::{Deserialize, Serialize};

/// How new atoms treat an existing name index entry.
///
/// A node whose name is already held by a node is always deduplicated; the
/// policy only decides whether a new atom displaces a different holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameIndexPolicy {
    /// A new atom takes over the name; the previous holder stays reachable by
    /// id and type only.
    #[default]
    LastWriteWins,
    /// A new atom only claims the name when no atom currently holds it. This
    /// applies to nodes added under a name held by a link as well.
    FirstWriteWins,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomStoreConfig {
    #[serde(default)]
    pub name_index_policy: NameIndexPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_last_write_wins() {
        let config = AtomStoreConfig::default();
        assert_eq!(config.name_index_policy, NameIndexPolicy::LastWriteWins);
    }

    #[test]
    fn test_policy_parses_from_yaml() {
        let config: AtomStoreConfig =
            serde_yaml::from_str("name_index_policy: first_write_wins").unwrap();
        assert_eq!(config.name_index_policy, NameIndexPolicy::FirstWriteWins);

        let config: AtomStoreConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.name_index_policy, NameIndexPolicy::LastWriteWins);
    }
}
