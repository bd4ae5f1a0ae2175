use std::collections::HashMap;

use itertools::Itertools;

use crate::cfg::ConditionInfo;
use crate::checkers::{Checker, DiagnosticSink};
use crate::core::NodeId;

#[derive(Default, Copy, Clone)]
struct Seen {
    evaluated_to_true: bool,
    evaluated_to_false: bool,
}

/// Reports a condition whose outcome is fixed on every feasible path: one
/// that, across the whole procedure exploration, was only ever observed to
/// evaluate to `true` or only ever to `false`.
///
/// Conditions are notified through [Checker::on_condition_evaluated], called
/// from branch handling only when `check_path` is set (for-loop and
/// boolean-literal while conditions suppress it, spec §4.4).
#[derive(Default)]
pub struct ConditionAlwaysTrueOrFalse {
    seen: HashMap<NodeId, Seen>,
}

impl Checker for ConditionAlwaysTrueOrFalse {
    fn name(&self) -> &'static str {
        "ConditionAlwaysTrueOrFalse"
    }

    fn init(&mut self) {
        self.seen.clear();
    }

    fn on_condition_evaluated(&mut self, condition: &ConditionInfo, value: bool) {
        let entry = self.seen.entry(condition.node).or_default();
        if value {
            entry.evaluated_to_true = true;
        } else {
            entry.evaluated_to_false = true;
        }
    }

    fn end_of_execution(&mut self, sink: &mut dyn DiagnosticSink) {
        let nodes = self.seen.keys().copied().sorted_by_key(|n| n.0);
        for node in nodes {
            let seen = self.seen[&node];
            let message = match (seen.evaluated_to_true, seen.evaluated_to_false) {
                (true, false) => Some("Condition always evaluates to \"true\""),
                (false, true) => Some("Condition always evaluates to \"false\""),
                _ => None,
            };
            if let Some(message) = message {
                sink.report(super::Diagnostic {
                    checker: self.name(),
                    node,
                    message: message.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(id: u32) -> ConditionInfo {
        ConditionInfo {
            node: NodeId(id),
            is_boolean_literal: false,
        }
    }

    #[test]
    fn reports_only_conditions_seen_on_a_single_polarity() {
        let mut checker = ConditionAlwaysTrueOrFalse::default();
        checker.init();
        checker.on_condition_evaluated(&cond(1), true);
        checker.on_condition_evaluated(&cond(2), true);
        checker.on_condition_evaluated(&cond(2), false);

        let mut diags = Vec::new();
        checker.end_of_execution(&mut diags);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].node, NodeId(1));
    }

    #[test]
    fn init_resets_accumulator_between_procedures() {
        let mut checker = ConditionAlwaysTrueOrFalse::default();
        checker.on_condition_evaluated(&cond(1), true);
        checker.init();
        let mut diags = Vec::new();
        checker.end_of_execution(&mut diags);
        assert!(diags.is_empty());
    }
}
