//! Command access control lists.
//!
//! Independent of capability resolution: rules gate specific commands per
//! channel and role set, with specificity tie-breaking. Either gate may
//! veto a command on its own.

pub mod evaluator;
pub mod rule;
pub mod store;

pub use evaluator::{filter_rules, test_rules, AccessRequest, AclDecision, AclEvaluator};
pub use rule::{
    AccessRule, MalformedRule, RawAccessRule, RoleModifier, RuleAction, Specificity,
    WILDCARD_CHANNEL,
};
pub use store::{MemoryRuleStore, RuleStore, StoreError};
