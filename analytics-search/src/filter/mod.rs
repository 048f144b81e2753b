//! Rule-builder filter compilation.
//!
//! Translates a [`RuleTree`] (field/operator/value rules joined by AND or OR)
//! into a [`FilterClause`] tree in the backend's query language. Compilation
//! is pure: no I/O and no document state.

mod compiler;
mod types;

pub use compiler::{compile_rule, compile_rule_tree, escape_regexp};
pub use types::{BoolClause, Condition, FilterClause, Operator, RangeBounds, Rule, RuleTree};

#[cfg(test)]
mod tests;
