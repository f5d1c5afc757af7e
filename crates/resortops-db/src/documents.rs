//! Records of files uploaded to Google Drive.

use std::sync::Arc;

use uuid::Uuid;

use crate::database::Database;
use crate::error::Result;
use crate::schema::Document;

const DOCUMENT_COLUMNS: &str = "id, drive_file_id, name, mime_type, size_bytes, web_view_link, \
     entity_type, entity_id, uploaded_by, created_at";

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub drive_file_id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub size_bytes: i64,
    pub web_view_link: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<Uuid>,
    pub uploaded_by: Option<Uuid>,
}

#[derive(Clone)]
pub struct DocumentRepository {
    db: Arc<Database>,
}

impl DocumentRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn insert(&self, doc: &NewDocument) -> Result<Document> {
        let row = sqlx::query_as::<_, Document>(&format!(
            "INSERT INTO documents
                (id, drive_file_id, name, mime_type, size_bytes, web_view_link, entity_type, entity_id, uploaded_by)
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
             RETURNING {DOCUMENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&doc.drive_file_id)
        .bind(&doc.name)
        .bind(&doc.mime_type)
        .bind(doc.size_bytes)
        .bind(&doc.web_view_link)
        .bind(&doc.entity_type)
        .bind(doc.entity_id)
        .bind(doc.uploaded_by)
        .fetch_one(self.db.pool())
        .await?;
        Ok(row)
    }

    /// Documents, newest first, optionally only those linked to one record.
    pub async fn list(&self, entity_type: Option<&str>, entity_id: Option<Uuid>, limit: i64) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents
             WHERE ($1::TEXT IS NULL OR entity_type = $1)
               AND ($2::UUID IS NULL OR entity_id = $2)
             ORDER BY created_at DESC
             LIMIT $3"
        ))
        .bind(entity_type)
        .bind(entity_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }
}
