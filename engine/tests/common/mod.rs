//! Shared harness for building synthetic CFGs and oracles: the engine never
//! parses source text, so integration tests construct small CFGs by hand.

use std::collections::{HashMap, HashSet};

use aries_symex::cfg::{Block, Cfg};
use aries_symex::oracle::{AnnotationOracle, Symbol, SymbolKind, SymbolOracle};
use aries_symex::state::BlockId;

pub fn block_id(n: u32) -> BlockId {
    BlockId::from_u32(n)
}

pub fn symbol(n: u32) -> Symbol {
    Symbol::from_u32(n)
}

/// A hand-built control-flow graph: just a map from block id to block.
pub struct FixedCfg {
    entry: BlockId,
    blocks: HashMap<BlockId, Block>,
}

impl FixedCfg {
    pub fn new(entry: BlockId, blocks: Vec<(BlockId, Block)>) -> Self {
        FixedCfg {
            entry,
            blocks: blocks.into_iter().collect(),
        }
    }
}

impl Cfg for FixedCfg {
    fn entry(&self) -> BlockId {
        self.entry
    }

    fn block(&self, id: BlockId) -> &Block {
        self.blocks.get(&id).unwrap_or_else(|| panic!("no block registered for {id:?}"))
    }
}

/// An oracle whose answers are configured per test by marking symbols into
/// one of a few sets; unmarked symbols default to "local variable,
/// non-primitive, not boolean, not annotated".
#[derive(Default)]
pub struct FixedOracle {
    fields: HashSet<Symbol>,
    primitives: HashSet<Symbol>,
    booleans: HashSet<Symbol>,
    nullable: HashSet<Symbol>,
}

impl FixedOracle {
    pub fn with_field(mut self, s: Symbol) -> Self {
        self.fields.insert(s);
        self
    }

    pub fn with_nullable(mut self, s: Symbol) -> Self {
        self.nullable.insert(s);
        self
    }
}

impl SymbolOracle for FixedOracle {
    fn kind(&self, symbol: Symbol) -> SymbolKind {
        if self.fields.contains(&symbol) {
            SymbolKind::Field
        } else {
            SymbolKind::LocalVariable
        }
    }

    fn is_primitive(&self, symbol: Symbol) -> bool {
        self.primitives.contains(&symbol)
    }

    fn is_boolean(&self, symbol: Symbol) -> bool {
        self.booleans.contains(&symbol)
    }
}

impl AnnotationOracle for FixedOracle {
    fn has_annotation(&self, symbol: Symbol, fully_qualified_name: &str) -> bool {
        self.nullable.contains(&symbol)
            && matches!(fully_qualified_name, "javax.annotation.CheckForNull" | "javax.annotation.Nullable")
    }
}
