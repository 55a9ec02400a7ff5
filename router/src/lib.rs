#![deny(missing_docs)]
//! The Router — maps a signal's type to one or more instructions.
//!
//! An ordered list of rules dispatched in a deterministic order:
//! highest-priority matching rule wins, ties broken by declaration
//! order.

use agentrt_core::{CoreError, Instruction, Router, Signal};

/// One or more instruction templates a matching signal expands to.
#[derive(Debug, Clone)]
pub enum RuleTarget {
    /// A single instruction template.
    One(Instruction),
    /// Several instruction templates, dispatched in this order.
    Many(Vec<Instruction>),
}

impl RuleTarget {
    fn into_instructions(self) -> Vec<Instruction> {
        match self {
            RuleTarget::One(i) => vec![i],
            RuleTarget::Many(v) => v,
        }
    }
}

/// A compiled routing rule: a pattern over `signal.type`, a target, and
/// an optional priority (default `0`).
pub struct Rule {
    pattern: String,
    target: RuleTarget,
    priority: i32,
}

impl Rule {
    /// Build a rule with default priority `0`.
    pub fn new(pattern: impl Into<String>, target: RuleTarget) -> Self {
        Self {
            pattern: pattern.into(),
            target,
            priority: 0,
        }
    }

    /// Set the rule's priority. Higher values win ties.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Whether this rule's pattern matches a signal type.
    ///
    /// Pattern matching is segment-wise on `.`: an exact string match,
    /// or a `*` segment matches any single segment at that position.
    /// `signal.type` and `pattern` must have the same segment count
    /// unless the pattern ends in a trailing `**`, which matches any
    /// number of remaining segments.
    pub fn matches(&self, signal_type: &str) -> bool {
        pattern_matches(&self.pattern, signal_type)
    }
}

fn pattern_matches(pattern: &str, signal_type: &str) -> bool {
    if pattern == signal_type {
        return true;
    }
    let pattern_segs: Vec<&str> = pattern.split('.').collect();
    let type_segs: Vec<&str> = signal_type.split('.').collect();

    if pattern_segs.last() == Some(&"**") {
        let prefix = &pattern_segs[..pattern_segs.len() - 1];
        if type_segs.len() < prefix.len() {
            return false;
        }
        return prefix
            .iter()
            .zip(type_segs.iter())
            .all(|(p, t)| *p == "*" || p == t);
    }

    if pattern_segs.len() != type_segs.len() {
        return false;
    }
    pattern_segs
        .iter()
        .zip(type_segs.iter())
        .all(|(p, t)| *p == "*" || p == t)
}

/// A compiled routing table: a declaration-ordered list of [`Rule`]s.
pub struct RoutingTable {
    rules: Vec<Rule>,
}

impl RoutingTable {
    /// Build an empty routing table.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule, preserving declaration order for tie-breaking.
    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Router for RoutingTable {
    fn route(&self, signal: &Signal) -> Result<Vec<Instruction>, CoreError> {
        let winner = self
            .rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.matches(&signal.kind))
            .max_by_key(|(declaration_index, rule)| {
                // Higher priority wins; ties broken by earliest declaration,
                // so negate the index for max_by_key's "larger wins" semantics.
                (rule.priority, -(*declaration_index as i64))
            });

        let (_, rule) = winner.ok_or_else(|| {
            CoreError::Routing(format!("no route for {}", signal.kind))
        })?;

        let mut instructions = rule.target.clone().into_instructions();
        if let Some(first) = instructions.first_mut() {
            if let serde_json::Value::Object(data) = &signal.data {
                for (k, v) in data {
                    first.params.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
        }
        Ok(instructions)
    }
}
