//! Persisted command access rules.
//!
//! Operators author rules that enable or disable a command for a set of
//! roles in a channel scope. Rules are ranked by specificity: the more
//! explicit constraints a rule names, the earlier it is considered.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{ChannelId, RoleId};

/// Channel id meaning "applies to every channel".
pub const WILDCARD_CHANNEL: ChannelId = 0;

/// How a rule's role set is matched against the actor's roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleModifier {
    /// Applies when the actor holds none of the named roles.
    None,
    /// Applies when the actor holds at least one of the named roles.
    Any,
    /// Applies when the actor holds every named role.
    All,
}

impl RoleModifier {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "NONE" => Some(Self::None),
            "ANY" => Some(Self::Any),
            "ALL" => Some(Self::All),
            _ => None,
        }
    }
}

/// What a matching rule does to the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleAction {
    /// The command may run.
    Enabled,
    /// The command is blocked; the rule's error text is surfaced.
    Disabled,
}

impl RuleAction {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "ENABLED" => Some(Self::Enabled),
            "DISABLED" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Rule ranking score.
///
/// Compared lexicographically, field by field in declaration order; a rule
/// is strictly more specific than another when its score compares greater.
/// The trailing scope field packs two bits: channel named, command named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    /// Named role count under [`RoleModifier::None`].
    pub excluded_roles: u32,
    /// Named role count under [`RoleModifier::All`].
    pub required_roles: u32,
    /// Whether any role is named under [`RoleModifier::Any`].
    pub named_any: u8,
    /// `channel_named << 1 | command_named`.
    pub scope: u8,
}

/// One persisted access rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
    /// Exact command name, or `None` for every command.
    pub command: Option<String>,

    /// Exact channel or parent-category id; [`WILDCARD_CHANNEL`] for every
    /// channel.
    pub channel: ChannelId,

    /// Role ids the modifier is matched against.
    pub roles: BTreeSet<RoleId>,

    /// How [`roles`](Self::roles) applies to the actor.
    pub modifier: RoleModifier,

    /// Whether a governing match enables or disables the command.
    pub action: RuleAction,

    /// Operator-authored text surfaced when the rule denies.
    pub error: Option<String>,
}

impl AccessRule {
    /// Ranking score for this rule.
    #[must_use]
    pub fn specificity(&self) -> Specificity {
        let role_count = u32::try_from(self.roles.len()).unwrap_or(u32::MAX);
        Specificity {
            excluded_roles: match self.modifier {
                RoleModifier::None => role_count,
                _ => 0,
            },
            required_roles: match self.modifier {
                RoleModifier::All => role_count,
                _ => 0,
            },
            named_any: u8::from(self.modifier == RoleModifier::Any && !self.roles.is_empty()),
            scope: (u8::from(self.channel != WILDCARD_CHANNEL) << 1)
                | u8::from(self.command.is_some()),
        }
    }

    /// Whether this rule governs the given actor.
    ///
    /// A rule naming no roles applies unconditionally; otherwise the
    /// modifier decides how the named roles are matched.
    #[must_use]
    pub fn applies_to(&self, actor_roles: &[RoleId]) -> bool {
        if self.roles.is_empty() {
            return true;
        }
        match self.modifier {
            RoleModifier::None => !actor_roles.iter().any(|role| self.roles.contains(role)),
            RoleModifier::Any => actor_roles.iter().any(|role| self.roles.contains(role)),
            RoleModifier::All => self.roles.iter().all(|role| actor_roles.contains(role)),
        }
    }

    /// Whether this rule is in scope for a command invocation.
    ///
    /// The channel constraint matches the channel itself or its parent
    /// category.
    #[must_use]
    pub fn matches_scope(
        &self,
        command: &str,
        channel: ChannelId,
        category: Option<ChannelId>,
    ) -> bool {
        let command_matches = self.command.as_deref().is_none_or(|name| name == command);
        let channel_matches = self.channel == WILDCARD_CHANNEL
            || self.channel == channel
            || Some(self.channel) == category;
        command_matches && channel_matches
    }
}

/// Access rule row as persisted: modifier and action are stored as text.
///
/// The rule store is operator-edited, so conversion to [`AccessRule`] is
/// fallible and a bad row must never block evaluation; callers skip
/// [`MalformedRule`] rows instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAccessRule {
    /// Exact command name, or `None` for every command.
    pub command: Option<String>,
    /// Channel or category id; 0 for every channel.
    pub channel: ChannelId,
    /// Role ids, as a JSON array.
    pub roles: Vec<RoleId>,
    /// One of `NONE`, `ANY`, `ALL`.
    pub modifier: String,
    /// One of `ENABLED`, `DISABLED`.
    pub action: String,
    /// Operator-authored denial text.
    pub error: Option<String>,
}

/// A persisted rule row that cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedRule {
    /// Unrecognized modifier value in the row.
    #[error("unknown rule modifier: {0:?}")]
    UnknownModifier(String),

    /// Unrecognized action value in the row.
    #[error("unknown rule action: {0:?}")]
    UnknownAction(String),
}

impl TryFrom<RawAccessRule> for AccessRule {
    type Error = MalformedRule;

    fn try_from(raw: RawAccessRule) -> Result<Self, Self::Error> {
        let modifier = RoleModifier::parse(&raw.modifier)
            .ok_or(MalformedRule::UnknownModifier(raw.modifier))?;
        let action =
            RuleAction::parse(&raw.action).ok_or(MalformedRule::UnknownAction(raw.action))?;
        Ok(Self {
            command: raw.command,
            channel: raw.channel,
            roles: raw.roles.into_iter().collect(),
            modifier,
            action,
            error: raw.error,
        })
    }
}
