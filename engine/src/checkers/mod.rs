//! The checker dispatcher (component C6): runs an ordered list of checkers
//! around every statement, lets any of them sink a transition, and routes
//! their reports to an abstract diagnostic sink (spec §1's "the engine ...
//! emits defect events to an abstract sink").
//!
//! Design note (spec §9): rather than giving checkers a back-reference to
//! the walker, each hook call is handed a narrow, freshly built
//! [EngineContext] exposing only the current state, the constraint manager
//! and the reporting sink.

mod always_true_false;
mod null_dereference;

pub use always_true_false::ConditionAlwaysTrueOrFalse;
pub use null_dereference::NullDereference;

use crate::cfg::{ConditionInfo, Statement};
use crate::core::{ConstraintManager, NodeId};
use crate::state::{ProgramPoint, ProgramState};

/// One reported defect. `checker` identifies which checker produced it;
/// `node` is the syntax node it is attached to (diagnostics only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub checker: &'static str,
    pub node: NodeId,
    pub message: String,
}

/// Where reported diagnostics go. The engine has no opinion on how they are
/// presented; a `Vec<Diagnostic>` is the simplest implementation and is
/// used throughout this crate's tests.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// The narrow view of engine state handed to a checker hook. Checkers may
/// read and replace the current program state (e.g. to refine it with a
/// freshly imposed constraint) and may report issues through it.
pub struct EngineContext<'a> {
    point: ProgramPoint,
    state: ProgramState,
    pub constraint_manager: &'a mut ConstraintManager,
    sink: &'a mut dyn DiagnosticSink,
    checker_name: &'static str,
}

impl<'a> EngineContext<'a> {
    pub fn program_state(&self) -> &ProgramState {
        &self.state
    }

    pub fn node(&self) -> ProgramPoint {
        self.point
    }

    pub fn set_program_state(&mut self, state: ProgramState) {
        self.state = state;
    }

    pub fn report_issue(&mut self, node: NodeId, message: impl Into<String>) {
        self.sink.report(Diagnostic {
            checker: self.checker_name,
            node,
            message: message.into(),
        });
    }
}

/// A pluggable observer of state transitions. Modelled as a capability
/// interface (spec §9) rather than a class hierarchy: implementors override
/// only the hooks they care about.
pub trait Checker {
    fn name(&self) -> &'static str;

    /// Called once before a procedure is explored. Checkers with
    /// per-procedure accumulators must reset them here.
    fn init(&mut self) {}

    /// Runs before the kind-specific effect of a statement. Returning
    /// `false` sinks the transition: the engine stops exploring from this
    /// node without enqueuing successors.
    fn pre_statement(&mut self, _stmt: &Statement, _ctx: &mut EngineContext) -> bool {
        true
    }

    /// Runs after the kind-specific effect of a statement. Has no veto.
    fn post_statement(&mut self, _stmt: &Statement, _ctx: &mut EngineContext) {}

    /// Notified from branch handling whenever a condition's feasible
    /// polarity is observed and `check_path` is set (spec §4.4 Branching).
    fn on_condition_evaluated(&mut self, _condition: &ConditionInfo, _value: bool) {}

    /// Called once at the end of a procedure's exploration.
    fn end_of_execution(&mut self, _sink: &mut dyn DiagnosticSink) {}
}

/// Runs an ordered list of checkers around every statement and terminator.
pub struct Dispatcher {
    checkers: Vec<Box<dyn Checker>>,
}

impl Dispatcher {
    pub fn new(checkers: Vec<Box<dyn Checker>>) -> Self {
        Dispatcher { checkers }
    }

    pub fn init(&mut self) {
        for checker in &mut self.checkers {
            checker.init();
        }
    }

    /// Runs every checker's pre-statement hook in registration order,
    /// short-circuiting (not calling the rest) on the first sink. Returns
    /// whether the transition survives and the (possibly checker-refined)
    /// state to continue with.
    pub fn pre_statement(
        &mut self,
        stmt: &Statement,
        state: ProgramState,
        point: ProgramPoint,
        cm: &mut ConstraintManager,
        sink: &mut dyn DiagnosticSink,
    ) -> (bool, ProgramState) {
        let mut current = state;
        for checker in &mut self.checkers {
            let mut ctx = EngineContext {
                point,
                state: current,
                constraint_manager: cm,
                sink,
                checker_name: checker.name(),
            };
            let survives = checker.pre_statement(stmt, &mut ctx);
            current = ctx.state;
            if !survives {
                return (false, current);
            }
        }
        (true, current)
    }

    pub fn post_statement(
        &mut self,
        stmt: &Statement,
        state: ProgramState,
        point: ProgramPoint,
        cm: &mut ConstraintManager,
        sink: &mut dyn DiagnosticSink,
    ) -> ProgramState {
        let mut current = state;
        for checker in &mut self.checkers {
            let mut ctx = EngineContext {
                point,
                state: current,
                constraint_manager: cm,
                sink,
                checker_name: checker.name(),
            };
            checker.post_statement(stmt, &mut ctx);
            current = ctx.state;
        }
        current
    }

    pub fn notify_condition_evaluated(&mut self, condition: &ConditionInfo, value: bool) {
        for checker in &mut self.checkers {
            checker.on_condition_evaluated(condition, value);
        }
    }

    pub fn end_of_execution(&mut self, sink: &mut dyn DiagnosticSink) {
        for checker in &mut self.checkers {
            checker.end_of_execution(sink);
        }
    }
}
