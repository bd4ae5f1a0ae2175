//! The control-flow graph the engine consumes (spec §6's "CFG builder"
//! collaborator). Parsing source text and building this graph from it is
//! explicitly out of scope (spec §1): the walker only ever reads it through
//! [Cfg] and the plain data below.

use crate::core::{LiteralKind, NodeId};
use crate::oracle::Symbol;
use crate::state::BlockId;

/// A single procedure body, as the driver hands it to
/// [crate::walker::Walker::visit_method].
pub struct Procedure {
    pub name: String,
    /// Formal parameters, in declaration order (drives starting-state
    /// construction, spec §4.4 "Starting states").
    pub parameters: Vec<Symbol>,
}

/// Supplies the basic blocks of one procedure's control-flow graph.
pub trait Cfg {
    fn entry(&self) -> BlockId;
    fn block(&self, id: BlockId) -> &Block;
}

/// One basic block: an ordered list of statements, an optional terminator,
/// and its successors.
pub struct Block {
    pub elements: Vec<Statement>,
    pub terminator: Option<Terminator>,
    pub successors: Vec<BlockId>,
    /// Set only for blocks ending in a conditional terminator.
    pub true_successor: Option<BlockId>,
    pub false_successor: Option<BlockId>,
}

impl Block {
    /// A dead end: no terminator and no successors (e.g. a self-looping
    /// `goto` with nothing reachable past it).
    pub fn is_dead_end(&self) -> bool {
        self.terminator.is_none() && self.successors.is_empty()
    }
}

/// One statement inside a block, with the one piece of syntactic context
/// the transfer function needs beyond its kind: whether its parent is an
/// expression-statement (triggers the stack-cleanup rule).
pub struct Statement {
    pub node: NodeId,
    pub kind: TreeKind,
    pub is_expression_statement_child: bool,
}

/// Where an `ASSIGNMENT`'s target points. Only identifier targets have an
/// effect in this engine (spec §9 Open Question #1); field and
/// array-element targets are deliberately a no-op.
pub enum AssignmentTarget {
    Identifier(Symbol),
    Other,
}

/// The statement kinds the transfer function recognises (spec §4.4
/// "Transfer function"). `Unsupported` covers kinds that cannot appear
/// inside a CFG block body (labelled statement, switch, expression
/// statement as a node, parenthesised expression): reaching one is an
/// internal-error abort. Anything not listed here and not `Unsupported`
/// is `NoOp`: it still runs the pre/post checker hooks, just has no effect
/// on the state.
pub enum TreeKind {
    MethodInvocation { is_local_target: bool, argc: usize },
    VariableDeclaration { declared_symbol: Symbol, has_initializer: bool, is_for_each_var: bool },
    TypeCast { target_is_primitive: bool },
    Assignment { target: AssignmentTarget },
    ArrayAccess,
    NewArray { n_initializers: usize },
    NewClass { n_arguments: usize },
    BinaryOperator,
    UnaryOperator,
    InstanceOf,
    Identifier { symbol: Symbol },
    MemberSelect { is_class_pseudo_field: bool },
    Literal(LiteralKind),
    LambdaOrMethodReference,
    Unsupported,
    NoOp,
}

/// A branch condition, carried by the conditional terminator kinds.
pub struct ConditionInfo {
    pub node: NodeId,
    pub is_boolean_literal: bool,
}

/// A block's terminator (spec §4.4 "Branching"). `node` identifies the
/// terminator itself (used only to run the generic post-statement checker
/// hook on it before `handle_block_exit`); `kind` carries the
/// terminator-specific data.
pub struct Terminator {
    pub node: NodeId,
    pub kind: TerminatorKind,
}

pub enum TerminatorKind {
    If(ConditionInfo),
    ConditionalAnd(ConditionInfo),
    ConditionalOr(ConditionInfo),
    ConditionalExpression(ConditionInfo),
    While(ConditionInfo),
    For { condition: Option<ConditionInfo> },
    Synchronized,
    Return,
    Goto,
    Switch,
    Try,
    Throw,
    Break,
    Continue,
}
