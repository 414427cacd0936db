//! Parley Authorization Core
//!
//! Capability resolution and command access control for the Parley chat
//! platform. Two independent gates:
//! - [`resolver::resolve_permissions`] turns role capability sets and a
//!   channel's overwrite cascade into one effective [`Capabilities`] value
//! - [`acl::AclEvaluator`] decides whether a specific command is
//!   administratively enabled for an actor in a channel
//!
//! Everything except the rule fetch is a pure computation over immutable
//! values, safe to call from any number of tasks.

pub mod acl;
pub mod capability;
pub mod overwrite;
pub mod resolver;

pub use acl::{AccessRequest, AclDecision, AclEvaluator, RuleStore};
pub use capability::Capabilities;
pub use overwrite::{OverlappingOverwrite, OverwriteLayer, OverwriteState};
pub use resolver::{resolve_permissions, require_capability, ChannelContext, PermissionError};

/// Snowflake-style guild id.
pub type GuildId = u64;

/// Snowflake-style role id.
pub type RoleId = u64;

/// Snowflake-style channel or category id.
pub type ChannelId = u64;
