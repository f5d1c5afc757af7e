//! Document uploads to Google Drive.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use resortops_common::ApiError;
use resortops_db::NewDocument;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::state::{AppEvent, SharedState};

/// Record types an upload may be attached to.
pub const ENTITY_TYPES: &[&str] = &["bill", "vendor", "staff", "inventory", "kitchen_report"];

#[derive(Debug, Deserialize)]
pub struct DocumentQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub limit: Option<i64>,
}

struct Upload {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

/// POST /api/uploads (multipart: `file`, optional `entity_type` and `entity_id`)
pub async fn upload_document(
    State(state): State<SharedState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    if !state.drive.is_enabled() {
        return Err(ApiError::ServiceUnavailable("Google Drive upload is not configured".into()));
    }

    let mut upload: Option<Upload> = None;
    let mut entity_type: Option<String> = None;
    let mut entity_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field.content_type().unwrap_or("application/octet-stream").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("could not read file: {e}")))?;
                upload = Some(Upload { name, mime_type, bytes: bytes.to_vec() });
            }
            Some("entity_type") => {
                let text = field.text().await.map_err(|e| ApiError::BadRequest(e.to_string()))?;
                entity_type = Some(text.trim().to_string()).filter(|t| !t.is_empty());
            }
            Some("entity_id") => {
                let text = field.text().await.map_err(|e| ApiError::BadRequest(e.to_string()))?;
                entity_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| ApiError::BadRequest(format!("invalid entity_id {text:?}")))?,
                );
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("missing 'file' field".into()))?;
    if upload.bytes.is_empty() {
        return Err(ApiError::BadRequest("uploaded file is empty".into()));
    }
    if let Some((kind, id)) = attachment_target(entity_type.as_deref(), entity_id)? {
        ensure_entity_exists(&state, kind, id).await?;
    }

    let size_bytes = upload.bytes.len() as i64;
    let file = state.drive.upload(&upload.name, &upload.mime_type, upload.bytes).await?;

    let document = state
        .documents()
        .insert(&NewDocument {
            drive_file_id: file.id,
            name: file.name,
            mime_type: Some(upload.mime_type),
            size_bytes,
            web_view_link: file.web_view_link,
            entity_type,
            entity_id,
            uploaded_by: Some(user.0.id),
        })
        .await?;

    if let (Some("bill"), Some(bill_id), Some(link)) =
        (document.entity_type.as_deref(), document.entity_id, document.web_view_link.as_deref())
    {
        state.bills().set_attachment(bill_id, link).await?;
    }

    state.publish(AppEvent::DocumentUploaded { document_id: document.id, name: document.name.clone() });
    Ok((StatusCode::CREATED, Json(document)))
}

/// Check the `entity_type`/`entity_id` pair of an upload. Both or neither
/// must be given.
pub fn attachment_target(entity_type: Option<&str>, entity_id: Option<Uuid>) -> Result<Option<(&str, Uuid)>, ApiError> {
    match (entity_type, entity_id) {
        (None, None) => Ok(None),
        (Some(kind), Some(id)) if ENTITY_TYPES.contains(&kind) => Ok(Some((kind, id))),
        (Some(kind), Some(_)) => Err(ApiError::BadRequest(format!("unknown entity_type {kind:?}"))),
        (Some(_), None) => Err(ApiError::BadRequest("entity_type given without entity_id".into())),
        (None, Some(_)) => Err(ApiError::BadRequest("entity_id given without entity_type".into())),
    }
}

/// 404 before anything reaches Drive if the record is missing.
async fn ensure_entity_exists(state: &SharedState, kind: &str, id: Uuid) -> Result<(), ApiError> {
    match kind {
        "bill" => state.bills().get(id).await.map(drop)?,
        "vendor" => state.vendors().get(id).await.map(drop)?,
        "staff" => state.staff().get(id).await.map(drop)?,
        "inventory" => state.inventory().get(id).await.map(drop)?,
        "kitchen_report" => state.kitchen_reports().get(id).await.map(drop)?,
        other => return Err(ApiError::BadRequest(format!("unknown entity_type {other:?}"))),
    }
    Ok(())
}

/// GET /api/uploads
pub async fn list_documents(
    State(state): State<SharedState>,
    Query(query): Query<DocumentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    let docs = state
        .documents()
        .list(query.entity_type.as_deref(), query.entity_id, limit)
        .await?;
    Ok(Json(docs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_target_pairs() {
        let id = Uuid::new_v4();
        assert_eq!(attachment_target(None, None).unwrap(), None);
        assert_eq!(attachment_target(Some("bill"), Some(id)).unwrap(), Some(("bill", id)));
        assert!(matches!(attachment_target(Some("invoice"), Some(id)), Err(ApiError::BadRequest(_))));
        assert!(matches!(attachment_target(Some("bill"), None), Err(ApiError::BadRequest(_))));
        assert!(matches!(attachment_target(None, Some(id)), Err(ApiError::BadRequest(_))));
    }
}
