//! Conditional command parser
//!
//! Front end for a small language of assignments and if/else statements over
//! arithmetic expressions: lexing, recursive-descent parsing with error recovery,
//! scoped type checking, and FIRST/FOLLOW sets of the reference grammar.
//!
//! ```
//! let response = cond_parser::parse("if (x) y = 1 else y = 2");
//! assert!(response.ast.is_some());
//! // Nothing is declared: `x` is unknown, so the condition is not numeric, and `y` is
//! // reported once per branch
//! assert_eq!(response.errors.len(), 4);
//! ```

pub mod utils;
pub mod frontend;
pub mod grammar;
pub mod pipeline;
pub mod feedback;

pub use frontend::printer::{render, render_typed};
pub use pipeline::{parse, ParserResponse, Pipeline};
pub use utils::{Error, Position, Result};
