//! The worklist-driven traversal (component C5): per-statement transfer
//! functions, branch handling, and the resource limits that keep
//! exploration finite.

use itertools::Itertools;

use crate::cfg::{AssignmentTarget, Block, Cfg, ConditionInfo, Procedure, Statement, TerminatorKind, TreeKind};
use crate::checkers::{Dispatcher, DiagnosticSink};
use crate::config::EngineConfig;
use crate::core::{Constraint, ConstraintManager, FALSE_LITERAL, NULL_LITERAL, TRUE_LITERAL};
use crate::errors::EngineError;
use crate::graph::ExplodedGraph;
use crate::oracle::{AnnotationOracle, SymbolOracle};
use crate::state::{ProgramPoint, ProgramState};

/// Summary of one `visit_method` call, for logging/metrics. Not part of the
/// diagnostic stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionReport {
    pub steps: u64,
    pub nodes_explored: usize,
}

enum TransferOutcome {
    Proceed(ProgramState),
    Sink,
}

/// Drives the exploration of one procedure at a time. Owns the exploded
/// graph, the worklist and the constraint manager for the duration of a
/// single `visit_method` call; none of it survives past that call.
pub struct Walker {
    config: EngineConfig,
    dispatcher: Dispatcher,
    constraint_manager: ConstraintManager,
    graph: ExplodedGraph,
    worklist: Vec<crate::graph::Node>,
    steps: u64,
    current_procedure: String,
}

impl Walker {
    pub fn new(config: EngineConfig, dispatcher: Dispatcher) -> Self {
        Walker {
            config,
            dispatcher,
            constraint_manager: ConstraintManager::new(),
            graph: ExplodedGraph::new(),
            worklist: Vec::new(),
            steps: 0,
            current_procedure: String::new(),
        }
    }

    #[tracing::instrument(skip(self, procedure, cfg, symbols, annotations, sink), fields(procedure = %procedure.name))]
    pub fn visit_method(
        &mut self,
        procedure: &Procedure,
        cfg: &dyn Cfg,
        symbols: &dyn SymbolOracle,
        annotations: &dyn AnnotationOracle,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<ExecutionReport, EngineError> {
        self.current_procedure = procedure.name.clone();
        self.steps = 0;
        self.graph = ExplodedGraph::new();
        self.worklist = Vec::new();
        self.constraint_manager = ConstraintManager::new();
        self.dispatcher.init();

        for state in self.build_starting_states(procedure, annotations) {
            self.enqueue(ProgramPoint::entry_of(cfg.entry()), state)?;
        }

        let outcome = self.run_main_loop(cfg, symbols, sink);
        self.dispatcher.end_of_execution(sink);
        let report = ExecutionReport {
            steps: self.steps,
            nodes_explored: self.graph.len(),
        };
        self.graph = ExplodedGraph::new();
        self.worklist.clear();
        outcome.map(|_| report)
    }

    /// Mints one fresh SV per formal parameter (declaration order) and fans
    /// each current state out into a NULL/NOT_NULL pair for every parameter
    /// annotated as nullable (spec §4.4 "Starting states").
    fn build_starting_states(&mut self, procedure: &Procedure, annotations: &dyn AnnotationOracle) -> Vec<ProgramState> {
        let mut states = vec![ProgramState::new()];
        for &param in &procedure.parameters {
            let sv = self.constraint_manager.new_sv(None);
            states = states.into_iter().map(|s| s.put(param, sv)).collect();

            let nullable = self
                .config
                .nullable_annotations
                .iter()
                .any(|fqn| annotations.has_annotation(param, fqn));
            if nullable {
                let mut fanned = Vec::with_capacity(states.len() * 2);
                for s in states {
                    let null_state = self
                        .constraint_manager
                        .set_single_constraint(sv, &s, Constraint::Null)
                        .expect("a freshly minted SV always accepts its first constraint");
                    let not_null_state = self
                        .constraint_manager
                        .set_single_constraint(sv, &s, Constraint::NotNull)
                        .expect("a freshly minted SV always accepts its first constraint");
                    fanned.push(null_state);
                    fanned.push(not_null_state);
                }
                states = fanned;
            }
        }
        states
    }

    fn run_main_loop(&mut self, cfg: &dyn Cfg, symbols: &dyn SymbolOracle, sink: &mut dyn DiagnosticSink) -> Result<(), EngineError> {
        while let Some(node) = self.worklist.pop() {
            self.steps += 1;
            tracing::trace!(point = ?node.point, steps = self.steps, "pop");
            if self.steps > self.config.max_steps {
                tracing::warn!(procedure = %self.current_procedure, "maximum step count exceeded");
                return Err(EngineError::MaximumStepsReached {
                    procedure: self.current_procedure.clone(),
                });
            }

            let point = node.point;
            let state = node.state;
            // Reborrow the block fresh every iteration: the CFG is immutable
            // for the whole traversal, so this is just a lookup, not a clone.
            let block = cfg.block(point.block);
            if block.is_dead_end() {
                continue;
            }

            if point.index < block.elements.len() {
                let stmt = &block.elements[point.index];
                match self.transfer_statement(stmt, state, point, symbols, sink)? {
                    TransferOutcome::Sink => continue,
                    TransferOutcome::Proceed(next) => {
                        self.enqueue(ProgramPoint::new(point.block, point.index + 1), next)?;
                    }
                }
            } else if block.terminator.is_none() {
                self.handle_block_exit(block, state, symbols)?;
            } else {
                let terminator = block.terminator.as_ref().expect("checked above");
                let synthetic = Statement {
                    node: terminator.node,
                    kind: TreeKind::NoOp,
                    is_expression_statement_child: false,
                };
                let state = self
                    .dispatcher
                    .post_statement(&synthetic, state, point, &mut self.constraint_manager, sink);
                self.handle_block_exit(block, state, symbols)?;
            }
        }
        Ok(())
    }

    /// Runs the checker hooks and the kind-specific effect for one statement
    /// (spec §4.4 "Transfer function").
    fn transfer_statement(
        &mut self,
        stmt: &Statement,
        state: ProgramState,
        point: ProgramPoint,
        symbols: &dyn SymbolOracle,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<TransferOutcome, EngineError> {
        let (survives, state) = self
            .dispatcher
            .pre_statement(stmt, state, point, &mut self.constraint_manager, sink);
        if !survives {
            return Ok(TransferOutcome::Sink);
        }

        let state = self.apply_statement_effect(stmt, state, symbols)?;

        let state = self
            .dispatcher
            .post_statement(stmt, state, point, &mut self.constraint_manager, sink);

        let state = if stmt.is_expression_statement_child { state.clear_stack() } else { state };

        Ok(TransferOutcome::Proceed(state))
    }

    fn apply_statement_effect(&mut self, stmt: &Statement, state: ProgramState, symbols: &dyn SymbolOracle) -> Result<ProgramState, EngineError> {
        let cm = &mut self.constraint_manager;
        let node = stmt.node;
        match &stmt.kind {
            TreeKind::MethodInvocation { is_local_target, argc } => {
                let state = if *is_local_target { reset_fields(cm, state, symbols) } else { state };
                let (state, _args) = unstack(&state, argc + 1, node)?;
                let ret = cm.new_sv(Some(node));
                Ok(state.stack_value(ret))
            }
            TreeKind::VariableDeclaration { declared_symbol, has_initializer, is_for_each_var } => {
                if *has_initializer {
                    let (state, popped) = unstack(&state, 1, node)?;
                    Ok(state.put(*declared_symbol, popped[0]))
                } else if *is_for_each_var {
                    let sv = cm.new_sv(Some(node));
                    Ok(state.put(*declared_symbol, sv))
                } else if symbols.is_boolean(*declared_symbol) {
                    Ok(state.put(*declared_symbol, FALSE_LITERAL))
                } else if symbols.is_primitive(*declared_symbol) {
                    Ok(state)
                } else {
                    Ok(state.put(*declared_symbol, NULL_LITERAL))
                }
            }
            TreeKind::TypeCast { target_is_primitive } => {
                if *target_is_primitive {
                    let (state, _) = unstack(&state, 1, node)?;
                    let sv = cm.new_sv(Some(node));
                    Ok(state.stack_value(sv))
                } else {
                    Ok(state)
                }
            }
            TreeKind::Assignment { target } => {
                let (state, popped) = unstack(&state, 2, node)?;
                let value = popped[1];
                let state = match target {
                    AssignmentTarget::Identifier(symbol) => state.put(*symbol, value),
                    AssignmentTarget::Other => state,
                };
                Ok(state.stack_value(value))
            }
            TreeKind::ArrayAccess => {
                let (state, _) = unstack(&state, 2, node)?;
                let sv = cm.new_sv(Some(node));
                Ok(state.stack_value(sv))
            }
            TreeKind::NewArray { n_initializers } => {
                let (state, _) = unstack(&state, *n_initializers, node)?;
                let sv = cm.new_sv(Some(node));
                let state = cm
                    .set_single_constraint(sv, &state, Constraint::NotNull)
                    .expect("a freshly minted SV always accepts its first constraint");
                Ok(state.stack_value(sv))
            }
            TreeKind::NewClass { n_arguments } => {
                let (state, _) = unstack(&state, *n_arguments, node)?;
                let sv = cm.new_sv(Some(node));
                let state = cm
                    .set_single_constraint(sv, &state, Constraint::NotNull)
                    .expect("a freshly minted SV always accepts its first constraint");
                Ok(state.stack_value(sv))
            }
            TreeKind::BinaryOperator => {
                let (state, popped) = unstack(&state, 2, node)?;
                let sv = cm.new_sv(Some(node));
                cm.computed_from(sv, &popped);
                Ok(state.stack_value(sv))
            }
            TreeKind::UnaryOperator | TreeKind::InstanceOf => {
                let (state, popped) = unstack(&state, 1, node)?;
                let sv = cm.new_sv(Some(node));
                cm.computed_from(sv, &popped);
                Ok(state.stack_value(sv))
            }
            TreeKind::Identifier { symbol } => match state.get(*symbol) {
                Some(sv) => Ok(state.stack_value(sv)),
                None => {
                    let sv = cm.new_sv(Some(node));
                    Ok(state.put(*symbol, sv).stack_value(sv))
                }
            },
            TreeKind::MemberSelect { is_class_pseudo_field } => {
                let state = if *is_class_pseudo_field { state } else { unstack(&state, 1, node)?.0 };
                let sv = cm.new_sv(Some(node));
                Ok(state.stack_value(sv))
            }
            TreeKind::Literal(lit) => {
                let sv = cm.eval_literal(*lit);
                Ok(state.stack_value(sv))
            }
            TreeKind::LambdaOrMethodReference => {
                let sv = cm.new_sv(Some(node));
                Ok(state.stack_value(sv))
            }
            TreeKind::Unsupported => Err(EngineError::internal_at(
                "statement kind cannot appear inside a CFG block body",
                node,
            )),
            TreeKind::NoOp => Ok(state),
        }
    }

    fn handle_block_exit(&mut self, block: &Block, state: ProgramState, symbols: &dyn SymbolOracle) -> Result<(), EngineError> {
        let Some(terminator) = block.terminator.as_ref() else {
            return self.enqueue_all_successors(block, state);
        };
        match &terminator.kind {
            TerminatorKind::If(cond) | TerminatorKind::ConditionalAnd(cond) | TerminatorKind::ConditionalOr(cond) | TerminatorKind::ConditionalExpression(cond) => {
                self.handle_branch(block, cond, true, state)
            }
            TerminatorKind::While(cond) => {
                let check_path = !cond.is_boolean_literal;
                self.handle_branch(block, cond, check_path, state)
            }
            TerminatorKind::For { condition: Some(cond) } => self.handle_branch(block, cond, false, state),
            TerminatorKind::For { condition: None } => self.enqueue_all_successors(block, state),
            TerminatorKind::Synchronized => {
                let state = reset_fields(&mut self.constraint_manager, state, symbols);
                self.enqueue_all_successors(block, state)
            }
            TerminatorKind::Return
            | TerminatorKind::Goto
            | TerminatorKind::Switch
            | TerminatorKind::Try
            | TerminatorKind::Throw
            | TerminatorKind::Break
            | TerminatorKind::Continue => self.enqueue_all_successors(block, state),
        }
    }

    fn enqueue_all_successors(&mut self, block: &Block, state: ProgramState) -> Result<(), EngineError> {
        for &succ in &block.successors {
            self.enqueue(ProgramPoint::entry_of(succ), state.clone())?;
        }
        Ok(())
    }

    fn handle_branch(&mut self, block: &Block, condition: &ConditionInfo, check_path: bool, state: ProgramState) -> Result<(), EngineError> {
        let (false_states, true_states) = self.constraint_manager.assume_dual(&state);

        if let Some(false_succ) = block.false_successor {
            for s in false_states {
                let s = s.stack_value(FALSE_LITERAL);
                self.enqueue(ProgramPoint::entry_of(false_succ), s)?;
                if check_path {
                    self.dispatcher.notify_condition_evaluated(condition, false);
                }
            }
        }
        if let Some(true_succ) = block.true_successor {
            for s in true_states {
                let s = s.stack_value(TRUE_LITERAL);
                self.enqueue(ProgramPoint::entry_of(true_succ), s)?;
                if check_path {
                    self.dispatcher.notify_condition_evaluated(condition, true);
                }
            }
        }
        Ok(())
    }

    /// Bounds exploration (spec §4.4 "Enqueue and size control"): drops
    /// enqueues past the loop-unroll visit bound, aborts the procedure if
    /// the frontier and constraint store both grow too large, and
    /// deduplicates against the exploded graph.
    fn enqueue(&mut self, point: ProgramPoint, state: ProgramState) -> Result<(), EngineError> {
        let k = state.number_of_times_visited(point);
        if k > self.config.max_exec_program_point {
            tracing::trace!(?point, visits = k, "dropping enqueue: past the loop-unroll bound");
            return Ok(());
        }
        if self.is_too_big(&state) {
            tracing::warn!(procedure = %self.current_procedure, "exploded graph too big");
            return Err(EngineError::ExplodedGraphTooBig {
                procedure: self.current_procedure.clone(),
            });
        }
        let state = state.with_visited(point, k + 1);
        let node = self.graph.get_node(point, state);
        if node.is_new {
            self.worklist.push(node);
        }
        Ok(())
    }

    fn is_too_big(&self, state: &ProgramState) -> bool {
        let frontier = self.steps as usize + self.worklist.len();
        frontier > (self.config.max_steps as usize) / 2 && state.constraints_len() > self.config.too_big_constraints_threshold
    }
}

/// The field-haircut reset (spec §4.4 "Reset"): every binding the oracle
/// classifies as a field is replaced with a fresh, unconstrained SV. Symbols
/// are processed in a stable (sorted) order so the resulting state does not
/// depend on the backing map's iteration order (spec §5 determinism).
fn reset_fields(cm: &mut ConstraintManager, state: ProgramState, symbols: &dyn SymbolOracle) -> ProgramState {
    let fields = state
        .bound_symbols()
        .filter(|(s, _)| symbols.is_field(*s))
        .map(|(s, _)| s)
        .sorted();
    let mut state = state;
    for field in fields {
        let sv = cm.supersede_sv(field);
        state = state.put(field, sv);
    }
    state
}

fn unstack(state: &ProgramState, n: usize, node: crate::core::NodeId) -> Result<(ProgramState, Vec<crate::core::Sv>), EngineError> {
    state
        .unstack(n)
        .map_err(|e| EngineError::internal_at(format!("stack underflow: requested {} available {}", e.requested, e.available), node))
}
