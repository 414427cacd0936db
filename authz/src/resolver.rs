//! Capability resolution logic.
//!
//! Computes a member's effective capabilities from role capability sets and
//! the channel overwrite cascade (default role, then the member's roles,
//! then the member itself).

use std::collections::HashMap;

use crate::capability::Capabilities;
use crate::overwrite::OverwriteLayer;
use crate::RoleId;

/// Snapshot of one channel's overwrite table, keyed by numeric role id.
///
/// Built by the platform connector from fetched data; the resolver never
/// holds live role or channel objects, only ids and value types.
#[derive(Debug, Clone, Default)]
pub struct ChannelContext {
    /// Id of the @everyone pseudo-role.
    ///
    /// Its entry in [`role_overwrites`](Self::role_overwrites), if any, is
    /// the default layer and is excluded from the role-layer merge.
    pub everyone_role: RoleId,

    /// The channel's default overwrite, applied to every member.
    pub default_overwrite: Option<OverwriteLayer>,

    /// Per-role overwrites for this channel.
    pub role_overwrites: HashMap<RoleId, OverwriteLayer>,

    /// The member's own overwrite, the most specific authority.
    pub member_overwrite: Option<OverwriteLayer>,
}

impl ChannelContext {
    /// The default layer, or the all-inherit identity if unset.
    #[must_use]
    pub fn everyone_layer(&self) -> OverwriteLayer {
        self.default_overwrite.unwrap_or(OverwriteLayer::EMPTY)
    }

    /// Merge the overwrites of the roles the member holds.
    ///
    /// Same-precedence combination: an allow from any role beats a deny from
    /// any other. The @everyone pseudo-role is excluded; its overwrite is
    /// the default layer, one authority level below.
    #[must_use]
    pub fn role_layer(&self, actor_roles: &[RoleId]) -> OverwriteLayer {
        actor_roles
            .iter()
            .filter(|&&role| role != self.everyone_role)
            .filter_map(|role| self.role_overwrites.get(role))
            .fold(OverwriteLayer::EMPTY, |acc, &layer| acc.merge(layer))
    }
}

/// Compute a member's effective capabilities.
///
/// Resolution order:
/// 1. Combine role capability sets; any administrator resolves to
///    [`Capabilities::ALL`] immediately, untouchable by overwrites
/// 2. Without channel context, the combined set is the answer
/// 3. Otherwise compose default, role, and member overwrite layers in
///    authority order and apply the result to the combined set
///
/// Pure and deterministic: identical snapshots always yield the same
/// answer. Missing roles or overwrites are treated as absent.
#[must_use]
pub fn resolve_permissions(
    role_capabilities: &[Capabilities],
    channel: Option<&ChannelContext>,
    actor_roles: &[RoleId],
) -> Capabilities {
    let base = Capabilities::combine(role_capabilities);
    if base == Capabilities::ALL {
        return Capabilities::ALL;
    }

    let Some(channel) = channel else {
        // Guild-wide query, no overwrites apply.
        return base;
    };

    let effective = channel
        .everyone_layer()
        .compose(channel.role_layer(actor_roles))
        .compose(channel.member_overwrite.unwrap_or(OverwriteLayer::EMPTY));

    effective.apply_to(base)
}

/// Capability check errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// Member lacks a required capability.
    #[error("missing capability: {0:?}")]
    MissingCapability(Capabilities),
}

/// Require that a resolved capability set includes `required`.
///
/// Convenience for command dispatch: pairs with [`resolve_permissions`] so
/// handlers can gate on a capability in one line.
pub const fn require_capability(
    resolved: Capabilities,
    required: Capabilities,
) -> Result<(), PermissionError> {
    if resolved.has(required) {
        Ok(())
    } else {
        Err(PermissionError::MissingCapability(required))
    }
}
