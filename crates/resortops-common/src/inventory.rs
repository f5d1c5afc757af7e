//! Inventory stock arithmetic and threshold-based status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

text_enum! {
    pub enum StockStatus {
        InStock => "in_stock",
        LowStock => "low_stock",
        OutOfStock => "out_of_stock",
    }
}

text_enum! {
    pub enum MovementKind {
        Add => "add",
        Remove => "remove",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    pub quantity: f64,
    pub min_threshold: f64,
    pub unit_cost: Option<f64>,
    pub vendor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn status(&self) -> StockStatus {
        stock_status(self.quantity, self.min_threshold)
    }

    pub fn value(&self) -> f64 {
        stock_value(self.quantity, self.unit_cost)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInput {
    pub name: String,
    pub category: Option<String>,
    pub unit: String,
    #[serde(default)]
    pub quantity: f64,
    pub min_threshold: Option<f64>,
    pub unit_cost: Option<f64>,
    pub vendor_id: Option<Uuid>,
}

impl ItemInput {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("item name is required".into()));
        }
        if self.unit.trim().is_empty() {
            return Err(DomainError::Validation("unit is required".into()));
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(DomainError::InvalidValue { field: "quantity", value: self.quantity.to_string() });
        }
        if let Some(t) = self.min_threshold {
            if !t.is_finite() || t < 0.0 {
                return Err(DomainError::InvalidValue { field: "min_threshold", value: t.to_string() });
            }
        }
        if let Some(c) = self.unit_cost {
            if !c.is_finite() || c < 0.0 {
                return Err(DomainError::InvalidValue { field: "unit_cost", value: c.to_string() });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMovement {
    pub id: Uuid,
    pub item_id: Uuid,
    pub kind: MovementKind,
    pub quantity: f64,
    pub quantity_after: f64,
    pub reason: Option<String>,
    pub performed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub kind: MovementKind,
    pub quantity: f64,
    pub reason: Option<String>,
}

pub fn stock_status(quantity: f64, threshold: f64) -> StockStatus {
    if quantity <= 0.0 {
        StockStatus::OutOfStock
    } else if quantity <= threshold {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// Apply a movement to the current quantity and return the new quantity.
pub fn apply_movement(item: &str, current: f64, kind: MovementKind, quantity: f64) -> DomainResult<f64> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(DomainError::Validation("movement quantity must be greater than zero".into()));
    }
    match kind {
        MovementKind::Add => {
            let total = current + quantity;
            if !total.is_finite() {
                return Err(DomainError::InvalidValue { field: "quantity", value: quantity.to_string() });
            }
            Ok(total)
        }
        MovementKind::Remove if quantity > current => Err(DomainError::InsufficientStock {
            item: item.to_string(),
            available: current,
            requested: quantity,
        }),
        MovementKind::Remove => Ok(current - quantity),
    }
}

pub fn stock_value(quantity: f64, unit_cost: Option<f64>) -> f64 {
    quantity * unit_cost.unwrap_or(0.0)
}

/// Items whose status is not `InStock`, most depleted first.
pub fn alerts(items: &[InventoryItem]) -> Vec<&InventoryItem> {
    let mut low: Vec<&InventoryItem> = items
        .iter()
        .filter(|i| i.status() != StockStatus::InStock)
        .collect();
    low.sort_by(|a, b| {
        let ra = ratio(a);
        let rb = ratio(b);
        ra.partial_cmp(&rb).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.name.cmp(&b.name))
    });
    low
}

fn ratio(item: &InventoryItem) -> f64 {
    if item.min_threshold > 0.0 { item.quantity / item.min_threshold } else { item.quantity }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, quantity: f64, threshold: f64) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            name: name.into(),
            category: None,
            unit: "kg".into(),
            quantity,
            min_threshold: threshold,
            unit_cost: Some(40.0),
            vendor_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(stock_status(0.0, 5.0), StockStatus::OutOfStock);
        assert_eq!(stock_status(5.0, 5.0), StockStatus::LowStock);
        assert_eq!(stock_status(5.5, 5.0), StockStatus::InStock);
        assert_eq!(stock_status(1.0, 0.0), StockStatus::InStock);
    }

    #[test]
    fn test_remove_more_than_available_is_rejected() {
        let err = apply_movement("Rice", 3.0, MovementKind::Remove, 4.0).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { requested, .. } if requested == 4.0));
        assert_eq!(apply_movement("Rice", 3.0, MovementKind::Remove, 3.0).unwrap(), 0.0);
        assert_eq!(apply_movement("Rice", 3.0, MovementKind::Add, 2.5).unwrap(), 5.5);
    }

    #[test]
    fn test_non_positive_movement_rejected() {
        assert!(apply_movement("Rice", 3.0, MovementKind::Add, 0.0).is_err());
        assert!(apply_movement("Rice", 3.0, MovementKind::Add, -1.0).is_err());
        assert!(apply_movement("Rice", 3.0, MovementKind::Add, f64::NAN).is_err());
    }

    #[test]
    fn test_addition_overflowing_to_infinity_rejected() {
        let err = apply_movement("Rice", f64::MAX, MovementKind::Add, f64::MAX).unwrap_err();
        assert!(matches!(err, DomainError::InvalidValue { field: "quantity", .. }));
    }

    #[test]
    fn test_alerts_sorted_by_depletion() {
        let items = vec![
            item("Sugar", 4.0, 5.0),
            item("Flour", 50.0, 5.0),
            item("Oil", 0.0, 2.0),
            item("Salt", 1.0, 5.0),
        ];
        let names: Vec<&str> = alerts(&items).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Oil", "Salt", "Sugar"]);
    }

    #[test]
    fn test_stock_value() {
        assert_eq!(item("Ghee", 2.5, 1.0).value(), 100.0);
        assert_eq!(stock_value(10.0, None), 0.0);
    }
}
