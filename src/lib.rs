//! Line-by-line evaluator for a scratchpad calculator.
//!
//! Every line of a buffer is a comment, a blank, an assignment
//! (`name = expression`) or an expression. Lines are evaluated top to
//! bottom against the variables bound so far, a fixed constant table and a
//! fixed set of builtin functions, yielding exactly one [`LineResult`] per
//! line. Expressions are parsed into an explicit tree and walked; nothing
//! outside that tree, the tables and the session variables is reachable.
//!
//! ```
//! use scratchpad_calc::evaluate_buffer;
//!
//! let results = evaluate_buffer(["price = 250 # per unit", "price * 3", "", "5 / 0"]);
//! let shown: Vec<&str> = results.iter().map(|result| result.rendered()).collect();
//! assert_eq!(shown, ["250", "750", "", "Division by zero"]);
//! ```

#![allow(nonstandard_style)]

pub mod builtins;
pub mod classifying;
pub mod error_handling;
pub mod evaluating;
pub mod parsing;
pub mod scanning;
pub mod session;
pub mod values;

pub use error_handling::{CalcError, Result, SyntaxError};
pub use session::{evaluate_buffer, LineResult, Session};
pub use values::{Number, Value};
