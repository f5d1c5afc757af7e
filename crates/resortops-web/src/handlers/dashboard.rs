//! Dashboard handler: landing page with the back-office overview.

use axum::extract::State;
use axum::response::Html;
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use minijinja::{context, Environment};
use resortops_common::auth::User;
use resortops_common::billing::{summarize_payables, PayablesSummary};
use resortops_common::inventory::alerts;
use resortops_common::ApiError;
use resortops_db::{BillFilter, DatabaseStats};
use serde::Serialize;

use crate::auth::session_user;
use crate::handlers::inventory::ItemView;
use crate::state::SharedState;

/// Navigation shared across pages
pub const NAV_HTML: &str = include_str!("../../templates/nav.html");
const DASHBOARD_HTML: &str = include_str!("../../templates/dashboard.html");

/// Everything the signed-in view shows.
#[derive(Debug, Serialize)]
pub struct Overview {
    pub user: User,
    pub stats: DatabaseStats,
    pub payables: PayablesSummary,
    pub alerts: Vec<ItemView>,
}

pub async fn dashboard(State(state): State<SharedState>, jar: CookieJar) -> Result<Html<String>, ApiError> {
    let property = &state.config.property;
    let Some(user) = session_user(&state, &jar).await? else {
        return Ok(Html(render_dashboard(&property.name, &property.currency, None)?));
    };

    let today = Utc::now().date_naive();
    let stats = state.db.stats().await?;
    let bills = state.bills().list(&BillFilter::default()).await?;
    let items = state.inventory().list(None).await?;

    let overview = Overview {
        user,
        stats,
        payables: summarize_payables(&bills, today),
        alerts: alerts(&items).into_iter().cloned().map(ItemView::from).collect(),
    };
    Ok(Html(render_dashboard(&property.name, &property.currency, Some(&overview))?))
}

/// Render the page; without an overview the login form is shown instead.
pub fn render_dashboard(property: &str, currency: &str, overview: Option<&Overview>) -> Result<String, ApiError> {
    let mut env = Environment::new();
    env.add_template("nav.html", NAV_HTML).map_err(template_error)?;
    env.add_template("dashboard.html", DASHBOARD_HTML).map_err(template_error)?;

    let tmpl = env.get_template("dashboard.html").map_err(template_error)?;
    tmpl.render(context! {
        property => property,
        currency => currency,
        generated => Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        user => overview.map(|o| &o.user),
        stats => overview.map(|o| &o.stats),
        payables => overview.map(|o| &o.payables),
        alerts => overview.map(|o| &o.alerts),
    })
    .map_err(template_error)
}

fn template_error(e: minijinja::Error) -> ApiError {
    ApiError::Internal(anyhow::anyhow!("dashboard template: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use resortops_common::auth::Role;
    use resortops_common::inventory::InventoryItem;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "meera".into(),
            full_name: Some("Meera Nair".into()),
            role: Role::Manager,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_anonymous_gets_login_form() {
        let html = render_dashboard("Coral Bay", "INR", None).unwrap();
        assert!(html.contains("Coral Bay"));
        assert!(html.contains("/api/auth/login"));
        assert!(!html.contains("Open bills"));
    }

    #[test]
    fn test_overview_lists_alerts() {
        let item = InventoryItem {
            id: Uuid::new_v4(),
            name: "Basmati rice".into(),
            category: Some("dry store".into()),
            unit: "kg".into(),
            quantity: 0.0,
            min_threshold: 10.0,
            unit_cost: Some(95.0),
            vendor_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let overview = Overview {
            user: user(),
            stats: DatabaseStats { vendors: 4, open_bills: 2, ..Default::default() },
            payables: PayablesSummary { outstanding: dec!(1250.50), overdue_count: 1, ..Default::default() },
            alerts: vec![ItemView::from(item)],
        };

        let html = render_dashboard("Coral Bay", "INR", Some(&overview)).unwrap();
        assert!(html.contains("meera"));
        assert!(html.contains("INR 1250.50"));
        assert!(html.contains("Basmati rice"));
        assert!(html.contains("out_of_stock"));
        assert!(!html.contains("All items are in stock."));
    }
}
