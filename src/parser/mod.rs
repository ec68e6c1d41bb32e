pub mod driver;
pub mod token;
pub mod tree;

pub use driver::{Derivation, DriverState, Parser, Step, TraceRow};
pub use token::{Token, TokenStream};
pub use tree::{ParseTree, ParseTreeNode};
