//! SwapForm Common Types
//!
//! Shared types used across the SwapForm crates: currency symbols, price
//! records, wallet holdings, swap quotes and the error taxonomy.

pub mod monetary;
pub mod wallet;
pub mod quote;
pub mod error;

pub use monetary::*;
pub use wallet::*;
pub use quote::*;
pub use error::*;
