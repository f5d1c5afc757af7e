//! resortops-common: domain types, invariant arithmetic and error types shared
//! across the ResortOps crates.
//!
//! Every rule that decides whether a write is allowed lives here:
//! bill balances, stock movements, kitchen wastage, leave entitlement and
//! KOT revenue roll-ups. The database and web crates only move rows around.

#[macro_use]
mod macros;

pub mod error;
pub mod auth;
pub mod billing;
pub mod inventory;
pub mod kitchen;
pub mod leave;
pub mod revenue;
pub mod staff;

pub use error::{ApiError, DomainError, DomainResult};
