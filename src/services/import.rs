//! Bulk loading of content documents from JSON exports.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::db::{new_object_id, Collection, Document, StoreError};
use crate::slug::unique_slug;

/// Outcome of one import run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportReport {
    pub inserted: usize,
    /// Keys or slugs that already existed in the collection.
    pub duplicates: Vec<String>,
    /// Entries that could not be decoded, with the reason.
    pub rejected: Vec<(usize, String)>,
}

/// Insert each entry of `docs` into `collection`.
///
/// Missing store ids, domain keys, slugs and timestamps are filled in.
/// `prepare` runs on every decoded document before it is written.
/// Duplicates and undecodable entries are reported and skipped; any other
/// store failure aborts the run.
pub async fn import_documents<T, F>(
    collection: &Collection<T>,
    docs: Vec<Value>,
    prepare: F,
) -> Result<ImportReport, StoreError>
where
    T: Document,
    F: Fn(&mut T),
{
    let mut report = ImportReport::default();

    for (index, value) in docs.into_iter().enumerate() {
        let Value::Object(mut fields) = value else {
            report.rejected.push((index, "entry is not a JSON object".to_string()));
            continue;
        };
        fill_defaults::<T>(&mut fields);

        let mut doc: T = match serde_json::from_value(Value::Object(fields)) {
            Ok(doc) => doc,
            Err(e) => {
                report.rejected.push((index, e.to_string()));
                continue;
            }
        };
        prepare(&mut doc);

        match collection.insert(&doc).await {
            Ok(_) => report.inserted += 1,
            Err(e) if e.is_duplicate_key() => {
                tracing::warn!("Skipping duplicate {} '{}'", collection.name(), doc.key());
                report.duplicates.push(doc.key().to_string());
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        "Imported {} {} ({} duplicate, {} rejected)",
        report.inserted,
        collection.name(),
        report.duplicates.len(),
        report.rejected.len()
    );
    Ok(report)
}

fn fill_defaults<T: Document>(fields: &mut Map<String, Value>) {
    let now = Utc::now();

    if !has_text(fields, "_id") {
        fields.insert("_id".to_string(), Value::String(new_object_id()));
    }
    if !has_text(fields, T::KEY_FIELD) {
        fields.insert(
            T::KEY_FIELD.to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );
    }
    if !has_text(fields, "slug") {
        let title = fields
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default();
        fields.insert("slug".to_string(), Value::String(unique_slug(title, now)));
    }
    let stamp = Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true));
    for field in ["created_at", "updated_at"] {
        if !has_text(fields, field) {
            fields.insert(field.to_string(), stamp.clone());
        }
    }
}

fn has_text(fields: &Map<String, Value>, name: &str) -> bool {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map_or(false, |s| !s.is_empty())
}
