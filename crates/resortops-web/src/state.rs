//! Shared application state for the web server.

use std::sync::Arc;

use resortops_config::Config;
use resortops_db::{
    BillRepository, Database, DishRepository, DocumentRepository, InventoryRepository, KitchenReportRepository,
    KotRepository, LeaveRepository, SessionRepository, StaffRepository, UserRepository, VendorRepository,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::drive::DriveClient;

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    BillCreated { bill_id: Uuid, vendor_id: Uuid, bill_number: String, total: Decimal },
    PaymentRecorded { bill_id: Uuid, amount: Decimal, balance: Decimal },
    /// Stock fell to or below the item's threshold
    StockAlert { item_id: Uuid, name: String, quantity: f64, min_threshold: f64 },
    LeaveDecided { request_id: Uuid, staff_id: Uuid, status: String, lop_days: f64 },
    KitchenReportFiled { report_id: Uuid, report_date: chrono::NaiveDate, wasted: i64 },
    DocumentUploaded { document_id: Uuid, name: String },
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub db: Arc<Database>,
    pub config: Arc<Config>,
    pub drive: DriveClient,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: Config) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let drive = DriveClient::new(config.drive.clone());
        Self { db, config: Arc::new(config), drive, event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    /// Fan an event out to SSE subscribers. Having no subscribers is normal.
    pub fn publish(&self, event: AppEvent) {
        let _ = self.event_tx.send(event);
    }

    pub fn vendors(&self) -> VendorRepository {
        VendorRepository::new(self.db.clone())
    }

    pub fn bills(&self) -> BillRepository {
        BillRepository::new(self.db.clone())
    }

    pub fn staff(&self) -> StaffRepository {
        StaffRepository::new(self.db.clone())
    }

    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new(self.db.clone()).with_default_threshold(self.config.inventory.default_min_threshold)
    }

    pub fn dishes(&self) -> DishRepository {
        DishRepository::new(self.db.clone())
    }

    pub fn kitchen_reports(&self) -> KitchenReportRepository {
        KitchenReportRepository::new(self.db.clone())
    }

    pub fn leave(&self) -> LeaveRepository {
        LeaveRepository::new(self.db.clone()).with_policy(self.config.leave.policy())
    }

    pub fn kots(&self) -> KotRepository {
        KotRepository::new(self.db.clone())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.db.clone())
    }

    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self.db.clone())
    }

    pub fn documents(&self) -> DocumentRepository {
        DocumentRepository::new(self.db.clone())
    }
}

pub type SharedState = Arc<AppState>;
