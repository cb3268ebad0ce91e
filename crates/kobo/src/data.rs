//! Submission data listing and platform-generated exports.

use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::{Duration, Instant};

use crate::client::{KoboApiError, KoboClient};
use crate::config::join_url;

/// Page size for the paginated data API.
pub const DATA_PAGE_SIZE: u32 = 1000;

/// How often the export status is polled.
const EXPORT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How long an export may take before giving up.
const EXPORT_DEADLINE_SECS: u64 = 120;

/// One page of the submission data listing.
#[derive(Debug, Deserialize)]
struct DataPage {
    next: Option<String>,
    #[serde(default)]
    results: Vec<Map<String, Value>>,
}

impl KoboClient {
    /// Fetch all existing submissions for a project as JSON records keyed
    /// by flattened field names, following pagination links.
    pub async fn list_submissions(
        &self,
        asset_uid: &str,
    ) -> Result<Vec<Map<String, Value>>, KoboApiError> {
        let mut url = format!(
            "{}?format=json&limit={DATA_PAGE_SIZE}",
            join_url(
                &self.session().kf_base,
                &format!("/api/v2/assets/{asset_uid}/data/")
            )
        );
        let mut records = Vec::new();

        loop {
            let response = self.get(&url).send().await?;
            let page: DataPage = Self::parse_json(response).await?;
            records.extend(page.results);

            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        tracing::debug!(asset_uid, count = records.len(), "Fetched submissions");
        Ok(records)
    }

    /// Create a full data export on the platform, poll until it is ready,
    /// and download the resulting workbook bytes.
    pub async fn export_data(&self, asset_uid: &str) -> Result<Vec<u8>, KoboApiError> {
        let exports_url = join_url(
            &self.session().kf_base,
            &format!("/api/v2/assets/{asset_uid}/exports/"),
        );
        let source_url = join_url(
            &self.session().kf_base,
            &format!("/api/v2/assets/{asset_uid}/data/"),
        );
        let payload = json!({
            "source": source_url,
            "type": "xls",
            "fields_from_all_versions": true,
            "hierarchy_in_labels": true,
            "group_sep": "/",
            "lang": "_xml",
            "multiple_select": "summary",
        });

        let response = self.post(&exports_url).json(&payload).send().await?;
        let created: Value = Self::parse_json(response).await?;
        let export_uid = created
            .get("uid")
            .and_then(Value::as_str)
            .ok_or_else(|| KoboApiError::Malformed("export response has no uid".to_string()))?
            .to_string();

        let status_url = join_url(
            &self.session().kf_base,
            &format!("/api/v2/assets/{asset_uid}/exports/{export_uid}/"),
        );
        let deadline = Instant::now() + Duration::from_secs(EXPORT_DEADLINE_SECS);

        while Instant::now() < deadline {
            let response = self.get(&status_url).send().await?;
            let status_doc: Value = Self::parse_json(response).await?;

            match status_doc.get("status").and_then(Value::as_str) {
                Some("complete") => {
                    let download_url = status_doc
                        .get("result")
                        .and_then(Value::as_str)
                        .ok_or_else(|| {
                            KoboApiError::Malformed(
                                "export completed but has no download URL".to_string(),
                            )
                        })?;
                    let response = self.get(download_url).send().await?;
                    let response = Self::ensure_success(response).await?;
                    let bytes = response.bytes().await?;
                    tracing::info!(asset_uid, size = bytes.len(), "Downloaded export");
                    return Ok(bytes.to_vec());
                }
                Some("error") => return Err(KoboApiError::ExportFailed),
                _ => tokio::time::sleep(EXPORT_POLL_INTERVAL).await,
            }
        }

        Err(KoboApiError::ExportTimeout(EXPORT_DEADLINE_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_page_deserialization() {
        let page: DataPage = serde_json::from_value(json!({
            "next": "https://h.example/api/v2/assets/aX/data/?page=2",
            "results": [
                {"_id": 1, "_uuid": "u1", "name": "Alice"},
            ]
        }))
        .unwrap();

        assert!(page.next.is_some());
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].get("name"), Some(&json!("Alice")));
    }

    #[test]
    fn test_data_page_defaults() {
        let page: DataPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.next.is_none());
        assert!(page.results.is_empty());
    }
}
