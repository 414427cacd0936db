//! Channel capability overwrites.
//!
//! An overwrite layer records one authority level's explicit decisions: each
//! capability is either allowed, denied, or inherited (no decision at this
//! level). Layers from the default role, the member's roles, and the member
//! itself are composed in that order; the later authority wins any conflict.

use serde::{Deserialize, Serialize};

use crate::capability::Capabilities;

/// Per-capability decision within an overwrite layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteState {
    /// Explicitly grant the capability at this level.
    Allow,
    /// Explicitly remove the capability at this level.
    Deny,
    /// No decision at this level; defer to less specific authorities.
    Inherit,
}

/// A channel overwrite: disjoint allow and deny capability sets.
///
/// The invariant `allow ∩ deny = ∅` holds after every construction, merge,
/// and composition. Capabilities in neither set are inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOverwriteLayer", into = "RawOverwriteLayer")]
pub struct OverwriteLayer {
    allow: Capabilities,
    deny: Capabilities,
}

/// Unvalidated allow/deny pair, as persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawOverwriteLayer {
    allow: Capabilities,
    deny: Capabilities,
}

impl From<OverwriteLayer> for RawOverwriteLayer {
    fn from(layer: OverwriteLayer) -> Self {
        Self {
            allow: layer.allow,
            deny: layer.deny,
        }
    }
}

impl TryFrom<RawOverwriteLayer> for OverwriteLayer {
    type Error = OverlappingOverwrite;

    fn try_from(raw: RawOverwriteLayer) -> Result<Self, Self::Error> {
        Self::new(raw.allow, raw.deny)
    }
}

/// Attempted to build an overwrite whose allow and deny sets overlap.
///
/// This is a programming or data-corruption error, never an expected
/// outcome: the provided constructors and combinators keep the sets
/// disjoint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("overwrite allow and deny sets overlap on {overlap:?}")]
pub struct OverlappingOverwrite {
    /// The capabilities claimed by both sets.
    pub overlap: Capabilities,
}

impl OverwriteLayer {
    /// The all-inherit layer. Identity for both [`merge`](Self::merge) and
    /// [`compose`](Self::compose).
    pub const EMPTY: Self = Self {
        allow: Capabilities::NONE,
        deny: Capabilities::NONE,
    };

    /// Build a layer from explicit allow and deny sets.
    ///
    /// Returns [`OverlappingOverwrite`] if the sets are not disjoint.
    pub fn new(allow: Capabilities, deny: Capabilities) -> Result<Self, OverlappingOverwrite> {
        let overlap = allow.intersection(deny);
        if overlap.is_empty() {
            Ok(Self { allow, deny })
        } else {
            Err(OverlappingOverwrite { overlap })
        }
    }

    /// Internal constructor for pairs already known to be disjoint.
    const fn from_disjoint(allow: Capabilities, deny: Capabilities) -> Self {
        debug_assert!(allow.intersection(deny).is_empty());
        Self { allow, deny }
    }

    /// Build a layer from per-capability decisions.
    ///
    /// Later entries replace earlier ones for the same capability, so an
    /// explicit setting always clears the opposite bit. Capabilities never
    /// named are inherited.
    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = (Capabilities, OverwriteState)>,
    {
        states
            .into_iter()
            .fold(Self::EMPTY, |layer, (caps, state)| layer.with(caps, state))
    }

    /// Return a copy with the given capabilities' decision replaced.
    ///
    /// Capabilities outside `capabilities` keep their current decision.
    #[must_use]
    pub const fn with(self, capabilities: Capabilities, state: OverwriteState) -> Self {
        match state {
            OverwriteState::Allow => Self::from_disjoint(
                self.allow.union(capabilities),
                self.deny.difference(capabilities),
            ),
            OverwriteState::Deny => Self::from_disjoint(
                self.allow.difference(capabilities),
                self.deny.union(capabilities),
            ),
            OverwriteState::Inherit => Self::from_disjoint(
                self.allow.difference(capabilities),
                self.deny.difference(capabilities),
            ),
        }
    }

    /// Explicitly allowed capabilities.
    #[must_use]
    pub const fn allow(self) -> Capabilities {
        self.allow
    }

    /// Explicitly denied capabilities.
    #[must_use]
    pub const fn deny(self) -> Capabilities {
        self.deny
    }

    /// The decision recorded for a single capability.
    #[must_use]
    pub const fn state_of(self, capability: Capabilities) -> OverwriteState {
        if self.allow.contains(capability) {
            OverwriteState::Allow
        } else if self.deny.contains(capability) {
            OverwriteState::Deny
        } else {
            OverwriteState::Inherit
        }
    }

    /// Whether this layer makes no decision at all.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }

    /// Combine two layers of the same authority level.
    ///
    /// Used to fold the overwrites of several roles a member holds into one
    /// role layer: an allow from either side beats a deny from either side.
    /// Commutative and associative; [`EMPTY`](Self::EMPTY) is the identity.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        let allow = self.allow.union(other.allow);
        let deny = self.deny.union(other.deny).difference(allow);
        Self::from_disjoint(allow, deny)
    }

    /// Apply a higher-precedence layer on top of this one.
    ///
    /// Any capability `other` decides wins outright; capabilities `other`
    /// inherits keep this layer's decision. Non-commutative.
    #[must_use]
    pub const fn compose(self, other: Self) -> Self {
        let deny = self.deny.union(other.deny).difference(other.allow);
        let allow = self.allow.union(other.allow).difference(other.deny);
        Self::from_disjoint(allow, deny)
    }

    /// Apply this layer to a base capability set.
    #[must_use]
    pub const fn apply_to(self, capabilities: Capabilities) -> Capabilities {
        capabilities.union(self.allow).difference(self.deny)
    }
}

impl Default for OverwriteLayer {
    fn default() -> Self {
        Self::EMPTY
    }
}
