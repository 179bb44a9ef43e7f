//! Types library for the rebasing equity ledger
//!
//! Value types shared by the ledger contracts and the tools built on them.
//! Everything here is plain data or pure arithmetic: no balances live in
//! this crate.
//!
//! # Modules
//! - `ids`: Ledger address identifiers
//! - `numeric`: Fixed-point scale and the truncating multiply-divide primitive
//! - `action`: Corporate actions (stock split, cash dividend)
//! - `money`: Cents parsing and human-readable unit/dollar formatting
//! - `errors`: Arithmetic and money-parsing errors

pub mod ids;
pub mod numeric;
pub mod action;
pub mod money;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::money::*;
    pub use crate::numeric::*;
}
