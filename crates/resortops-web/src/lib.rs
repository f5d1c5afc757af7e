//! resortops-web: HTTP back office for a resort property.
//! Provides:
//!   - Vendor bills and payments
//!   - Staff directory, payroll with loss-of-pay
//!   - Inventory with stock movements and low-stock alerts
//!   - Kitchen dishes, production/wastage reports and KOT revenue
//!   - Leave requests with EL accrual and LOP overflow
//!   - CSV/PDF exports and Google Drive document uploads
//!   - Session-cookie auth and an SSE event feed

pub mod auth;
pub mod drive;
pub mod export;
pub mod handlers;
pub mod router;
pub mod sse;
pub mod state;
