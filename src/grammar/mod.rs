pub mod first_follow;
pub mod grammar;
pub mod ll1_parsing_table;
pub mod load;
pub mod parse;
pub mod pretty_print;

pub use first_follow::FirstFollow;
pub use grammar::{Grammar, NonTerminal, Production, Symbol};
pub use ll1_parsing_table::{ConflictPolicy, ParseTable};
pub use load::{GrammarDefinition, ProductionDefinition};

use std::collections::BTreeSet;

pub type SymbolId = usize;
pub type ProductionId = usize;
pub type SymbolSet = BTreeSet<SymbolId>;

pub const EPSILON: &str = "ε";
pub const EPSILON_ALIAS: &str = "ϵ";
pub const END_MARK: &str = "$";

pub const EPSILON_ID: SymbolId = 0;
pub const END_MARK_ID: SymbolId = 1;
