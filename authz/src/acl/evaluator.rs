//! Access rule evaluation.
//!
//! Rules are bucketed by specificity and walked from most to least
//! specific; the first bucket that governs the actor decides, and any
//! [`RuleAction::Enabled`] rule in that bucket wins the bucket.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::acl::rule::{AccessRule, RawAccessRule, RuleAction, Specificity};
use crate::acl::store::{RuleStore, StoreError};
use crate::{ChannelId, GuildId, RoleId};

/// Outcome of an access check. Returned, never thrown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclDecision {
    /// The command may run.
    Allow,
    /// The command is blocked; carries the governing rules' error texts.
    Deny(Vec<String>),
}

impl AclDecision {
    /// Whether the decision permits the command.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// One command invocation to be checked.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    /// Role ids the actor holds.
    pub actor_roles: Vec<RoleId>,
    /// Invoked command name.
    pub command: String,
    /// Channel the command was invoked in.
    pub channel: ChannelId,
    /// The channel's parent category, if any.
    pub category: Option<ChannelId>,
    /// Actor owns the bot; rules never apply.
    pub is_bot_owner: bool,
    /// Invocation came from a direct message, so there is no guild context
    /// to test roles against.
    pub is_direct_message: bool,
    /// The command is hidden from operators and exempt from rules.
    pub command_is_hidden: bool,
    /// The command is a group stub that only dispatches to subcommands.
    pub command_is_group_stub: bool,
}

/// Keep the rules in scope for one command invocation.
#[must_use]
pub fn filter_rules<'a>(
    rules: &'a [AccessRule],
    command: &str,
    channel: ChannelId,
    category: Option<ChannelId>,
) -> Vec<&'a AccessRule> {
    rules
        .iter()
        .filter(|rule| rule.matches_scope(command, channel, category))
        .collect()
}

/// Decide allow/deny for a set of in-scope rules.
///
/// Buckets are visited in strictly descending specificity; the first bucket
/// containing at least one rule applicable to the actor decides. Within the
/// deciding bucket any enabled rule allows; otherwise the bucket's error
/// texts are collected into a deny. With no governing rule at all the
/// default is allow.
#[must_use]
pub fn test_rules(rules: &[&AccessRule], actor_roles: &[RoleId]) -> AclDecision {
    let mut buckets: BTreeMap<Specificity, Vec<&AccessRule>> = BTreeMap::new();
    for &rule in rules {
        buckets.entry(rule.specificity()).or_default().push(rule);
    }

    for (specificity, bucket) in buckets.iter().rev() {
        let governing: Vec<&AccessRule> = bucket
            .iter()
            .copied()
            .filter(|rule| rule.applies_to(actor_roles))
            .collect();
        if governing.is_empty() {
            continue;
        }

        debug!(?specificity, rules = governing.len(), "access rule bucket governs");
        if governing.iter().any(|rule| rule.action == RuleAction::Enabled) {
            return AclDecision::Allow;
        }
        return AclDecision::Deny(
            governing
                .iter()
                .filter_map(|rule| rule.error.clone())
                .collect(),
        );
    }

    AclDecision::Allow
}

/// Evaluates access rules against a backing store.
#[derive(Debug)]
pub struct AclEvaluator<S> {
    store: S,
}

impl<S: RuleStore> AclEvaluator<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The backing rule store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Decide whether a command invocation is administratively allowed.
    ///
    /// Short-circuits to allow for the bot owner, direct messages, hidden
    /// commands, and group stubs. Otherwise fetches the guild's persisted
    /// rules, drops rows that cannot be interpreted, and evaluates the
    /// remainder. A fetch failure is propagated; no default decision is
    /// assumed for it.
    #[tracing::instrument(skip(self, request), fields(command = %request.command))]
    pub async fn check_access(
        &self,
        guild: GuildId,
        request: &AccessRequest,
    ) -> Result<AclDecision, StoreError> {
        if request.is_bot_owner
            || request.is_direct_message
            || request.command_is_hidden
            || request.command_is_group_stub
        {
            debug!("access check short-circuited to allow");
            return Ok(AclDecision::Allow);
        }

        let rows = self.store.fetch_rules(guild).await?;
        let rules = parse_rules(rows);
        let in_scope = filter_rules(&rules, &request.command, request.channel, request.category);
        Ok(test_rules(&in_scope, &request.actor_roles))
    }
}

/// Interpret persisted rows, skipping any the store cannot vouch for.
///
/// The store is operator-edited; one bad row must not block every
/// authorization check in the guild.
fn parse_rules(rows: Vec<RawAccessRule>) -> Vec<AccessRule> {
    rows.into_iter()
        .filter_map(|row| match AccessRule::try_from(row) {
            Ok(rule) => Some(rule),
            Err(error) => {
                warn!(%error, "skipping malformed access rule row");
                None
            }
        })
        .collect()
}
