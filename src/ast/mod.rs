//! Recipe AST: step records, operators, and literal values.

pub mod operators;
pub mod steps;
pub mod values;

pub use operators::*;
pub use steps::*;
pub use values::*;
