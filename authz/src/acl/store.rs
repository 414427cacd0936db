//! Rule store boundary.
//!
//! Fetching persisted rules is the only suspension point in the core.
//! Fetches for unrelated guilds may run concurrently with no ordering
//! requirement; a failed fetch is surfaced to the caller, never retried or
//! defaulted here.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use crate::acl::rule::RawAccessRule;
use crate::GuildId;

/// Failure reading the rule store.
///
/// The core takes no default-allow or default-deny position on a failed
/// fetch; that policy belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store backend reported an error.
    #[error("rule store backend error: {0}")]
    Backend(String),

    /// The store could not be reached at all.
    #[error("rule store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only source of persisted access rules for a guild.
///
/// Rule administration (create/edit/delete) lives with the admin surface,
/// not here; evaluation only ever reads.
pub trait RuleStore: Send + Sync {
    /// Fetch every rule persisted for a guild.
    ///
    /// Rows come back raw; the evaluator skips rows it cannot interpret.
    fn fetch_rules(
        &self,
        guild: GuildId,
    ) -> impl Future<Output = Result<Vec<RawAccessRule>, StoreError>> + Send;
}

/// In-process rule store.
///
/// Backs tests and single-node embeddings; production deployments put a
/// database behind [`RuleStore`] instead.
#[derive(Debug, Default)]
pub struct MemoryRuleStore {
    rules: RwLock<HashMap<GuildId, Vec<RawAccessRule>>>,
}

impl MemoryRuleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a guild's rule set.
    pub fn set_rules(&self, guild: GuildId, rules: Vec<RawAccessRule>) {
        if let Ok(mut map) = self.rules.write() {
            map.insert(guild, rules);
        }
    }

    /// Append one rule to a guild's rule set.
    pub fn push_rule(&self, guild: GuildId, rule: RawAccessRule) {
        if let Ok(mut map) = self.rules.write() {
            map.entry(guild).or_default().push(rule);
        }
    }

    /// Drop every rule persisted for a guild.
    pub fn clear(&self, guild: GuildId) {
        if let Ok(mut map) = self.rules.write() {
            map.remove(&guild);
        }
    }
}

impl RuleStore for MemoryRuleStore {
    async fn fetch_rules(&self, guild: GuildId) -> Result<Vec<RawAccessRule>, StoreError> {
        let map = self
            .rules
            .read()
            .map_err(|_| StoreError::Unavailable("rule store lock poisoned".to_string()))?;
        Ok(map.get(&guild).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rule(command: &str) -> RawAccessRule {
        RawAccessRule {
            command: Some(command.to_string()),
            channel: 0,
            roles: vec![],
            modifier: "NONE".to_string(),
            action: "DISABLED".to_string(),
            error: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_unknown_guild_is_empty() {
        let store = MemoryRuleStore::new();
        assert_eq!(store.fetch_rules(1).await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn test_set_and_fetch_rules() {
        let store = MemoryRuleStore::new();
        store.set_rules(1, vec![sample_rule("kick")]);
        store.push_rule(1, sample_rule("ban"));

        let rules = store.fetch_rules(1).await.unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].command.as_deref(), Some("ban"));
    }

    #[tokio::test]
    async fn test_guilds_are_isolated() {
        let store = MemoryRuleStore::new();
        store.set_rules(1, vec![sample_rule("kick")]);
        assert!(store.fetch_rules(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_rules() {
        let store = MemoryRuleStore::new();
        store.set_rules(1, vec![sample_rule("kick")]);
        store.clear(1);
        assert!(store.fetch_rules(1).await.unwrap().is_empty());
    }
}
