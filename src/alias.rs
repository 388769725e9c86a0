//! Alias lookup
//!
//! Built once from configuration at startup and never modified, so it can be
//! shared across request tasks without locking.

use crate::config::AliasConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Maps alias names to resource paths
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    aliases: BTreeMap<String, PathBuf>,
}

impl AliasResolver {
    /// Build the map from configured entries
    ///
    /// Configuration validation rejects duplicate names; if duplicates are
    /// passed in anyway the last entry wins.
    pub fn new(entries: &[AliasConfig]) -> Self {
        let aliases = entries
            .iter()
            .map(|entry| (entry.name.clone(), PathBuf::from(&entry.target)))
            .collect();
        AliasResolver { aliases }
    }

    /// Look up the path for `name`
    pub fn resolve(&self, name: &str) -> Option<&Path> {
        self.aliases.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Iterate `(name, target)` pairs ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.aliases
            .iter()
            .map(|(name, target)| (name.as_str(), target.as_path()))
    }

    /// `"<name> : <target>"` per alias, one per line
    pub fn listing(&self) -> String {
        self.iter()
            .map(|(name, target)| format!("{} : {}", name, target.display()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
