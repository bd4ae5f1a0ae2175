use std::collections::HashSet;

use crate::cfg::{Statement, TreeKind};
use crate::checkers::{Checker, EngineContext};
use crate::core::{Constraint, NodeId};

/// Reports a possible null dereference. On every member-select that is not
/// the `.class` pseudo-field idiom, and on every zero-argument qualified
/// method invocation (the receiver is then exactly the top of the operand
/// stack), splits the receiver on nullness: the `NOT_NULL` branch proceeds,
/// the `NULL` branch (if feasible) is reported and, if it is the *only*
/// feasible branch, sinks the transition.
///
/// A given source node can be reached along several independently-explored
/// paths whose states differ only in bindings unrelated to the receiver
/// (e.g. another nullable parameter's polarity); `reported` dedupes so each
/// node is flagged at most once per procedure, the same way
/// [super::ConditionAlwaysTrueOrFalse] dedupes per condition node.
#[derive(Default)]
pub struct NullDereference {
    reported: HashSet<NodeId>,
}

impl Checker for NullDereference {
    fn name(&self) -> &'static str {
        "NullDereference"
    }

    fn init(&mut self) {
        self.reported.clear();
    }

    fn pre_statement(&mut self, stmt: &Statement, ctx: &mut EngineContext) -> bool {
        let has_receiver_on_top = matches!(stmt.kind, TreeKind::MemberSelect { is_class_pseudo_field: false })
            || matches!(stmt.kind, TreeKind::MethodInvocation { is_local_target: false, argc: 0 });
        if !has_receiver_on_top {
            return true;
        }
        let Some(&receiver) = ctx.program_state().stack_top() else {
            return true;
        };

        let null_states = ctx.constraint_manager.set_constraint(receiver, ctx.program_state(), Constraint::Null);
        let not_null_states = ctx
            .constraint_manager
            .set_constraint(receiver, ctx.program_state(), Constraint::NotNull);

        if !null_states.is_empty() && self.reported.insert(stmt.node) {
            ctx.report_issue(stmt.node, "Dereference of a nullable value");
        }

        match not_null_states.into_iter().next() {
            Some(refined) => {
                ctx.set_program_state(refined);
                true
            }
            None => false,
        }
    }
}
