//! Linear expression algebra.
//!
//! - `core`: Expr: variable terms + constant, named composition operations
//! - `ops`: operator overloads over Expr, Variable and f64
//! - `constraint`: Constraint: ranged linear inequality built from comparisons

pub mod constraint;
pub mod core;
mod ops;

pub use constraint::Constraint;
pub use self::core::Expr;
