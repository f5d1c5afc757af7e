//! ResortOps Database Layer
//!
//! PostgreSQL persistence for the back office: vendors and their bills,
//! staff, inventory, the kitchen menu and daily production reports, leave
//! requests, KOTs, users with their sessions, and Drive document records.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use resortops_config::DatabaseConfig;
//! use resortops_db::{Database, VendorRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect(&DatabaseConfig::default()).await?;
//!     db.migrate().await?;
//!
//!     let vendors = VendorRepository::new(Arc::new(db));
//!     println!("{} active vendors", vendors.list(true, None).await?.len());
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod schema;
pub mod vendors;
pub mod bills;
pub mod staff;
pub mod inventory;
pub mod dishes;
pub mod kitchen_reports;
pub mod leave;
pub mod kots;
pub mod users;
pub mod documents;

pub use database::{Database, DatabaseStats};
pub use error::{DbError, Result};
pub use schema::Document;
pub use vendors::VendorRepository;
pub use bills::{BillFilter, BillRepository};
pub use staff::{StaffFilter, StaffRepository};
pub use inventory::InventoryRepository;
pub use dishes::DishRepository;
pub use kitchen_reports::KitchenReportRepository;
pub use leave::{LeaveFilter, LeaveRepository};
pub use kots::KotRepository;
pub use users::{SessionRepository, UserRepository};
pub use documents::{DocumentRepository, NewDocument};
