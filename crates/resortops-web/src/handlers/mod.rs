//! HTTP handlers for all web routes.

pub mod auth;
pub mod bills;
pub mod dashboard;
pub mod exports;
pub mod inventory;
pub mod kitchen;
pub mod leave;
pub mod revenue;
pub mod staff;
pub mod system;
pub mod uploads;
pub mod vendors;
