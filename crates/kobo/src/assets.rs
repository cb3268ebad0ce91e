//! Survey project (asset) listing, detail, and form-id resolution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{KoboApiError, KoboClient};
use crate::config::join_url;

/// One survey project as listed by the asset API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSummary {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub asset_type: String,
}

/// One page of the asset listing.
#[derive(Debug, Deserialize)]
struct AssetPage {
    next: Option<String>,
    #[serde(default)]
    results: Vec<AssetSummary>,
}

/// A deployed form as listed by the data-collection API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployedForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub id_string: Option<String>,
}

/// Keep only real survey projects, dropping library templates and other
/// non-asset kinds.
fn keep_survey_assets(results: Vec<AssetSummary>) -> Vec<AssetSummary> {
    results.into_iter().filter(|a| a.kind == "asset").collect()
}

/// Pick the form id used for submissions.
///
/// Prefer the id the asset declares in its settings. Without one, match
/// the asset name against deployed form titles (unique match wins); as a
/// last resort, a single deployed form is assumed to be the one.
pub fn choose_form_id(
    settings_id: Option<&str>,
    asset_name: &str,
    forms: &[DeployedForm],
) -> Option<String> {
    if let Some(id) = settings_id.map(str::trim).filter(|s| !s.is_empty()) {
        return Some(id.to_string());
    }

    let title_matches: Vec<&DeployedForm> = forms
        .iter()
        .filter(|f| f.title == asset_name && f.id_string.is_some())
        .collect();
    if title_matches.len() == 1 {
        return title_matches[0].id_string.clone();
    }

    if forms.len() == 1 {
        return forms[0].id_string.clone();
    }

    None
}

impl KoboClient {
    /// List all survey projects visible to the session, following
    /// pagination links.
    pub async fn list_assets(&self) -> Result<Vec<AssetSummary>, KoboApiError> {
        let mut url = format!(
            "{}?asset_type=survey&format=json",
            join_url(&self.session().kf_base, "/api/v2/assets/")
        );
        let mut assets = Vec::new();

        loop {
            let response = self.get(&url).send().await?;
            let page: AssetPage = Self::parse_json(response).await?;
            assets.extend(keep_survey_assets(page.results));

            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        tracing::debug!(count = assets.len(), "Listed survey projects");
        Ok(assets)
    }

    /// Fetch the full asset detail document (including the survey
    /// definition under `content`).
    pub async fn get_asset(&self, uid: &str) -> Result<Value, KoboApiError> {
        let url = format!(
            "{}?format=json",
            join_url(&self.session().kf_base, &format!("/api/v2/assets/{uid}/"))
        );
        let response = self.get(&url).send().await?;
        Self::parse_json(response).await
    }

    /// List deployed forms from the data-collection API. A response that
    /// is not a JSON array is treated as "no forms".
    pub async fn list_deployed_forms(&self) -> Result<Vec<DeployedForm>, KoboApiError> {
        let url = join_url(&self.session().kc_base, "/api/v1/forms");
        let response = self.get(&url).send().await?;
        let body: Value = Self::parse_json(response).await?;

        match body {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    /// Resolve the form id for an asset detail document.
    ///
    /// When the asset declares an id, deployment is verified best-effort
    /// (a mismatch is only logged — the declared id is still used). When
    /// it does not, the deployed-form listing drives the fallback ladder
    /// in [`choose_form_id`].
    pub async fn resolve_form_id(&self, asset: &Value) -> Result<Option<String>, KoboApiError> {
        let settings_id = asset
            .pointer("/content/settings/id_string")
            .and_then(Value::as_str);
        let asset_name = asset
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("(untitled)");

        if let Some(id) = settings_id.map(str::trim).filter(|s| !s.is_empty()) {
            match self.list_deployed_forms().await {
                Ok(forms) => {
                    let deployed = forms
                        .iter()
                        .any(|f| f.id_string.as_deref() == Some(id));
                    if !deployed {
                        tracing::warn!(form_id = id, "Declared form id not found among deployed forms");
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Could not verify form id against deployed forms");
                }
            }
            return Ok(Some(id.to_string()));
        }

        let forms = self.list_deployed_forms().await?;
        Ok(choose_form_id(None, asset_name, &forms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(title: &str, id_string: Option<&str>) -> DeployedForm {
        DeployedForm {
            title: title.to_string(),
            id_string: id_string.map(String::from),
        }
    }

    #[test]
    fn test_settings_id_wins() {
        let forms = vec![form("Other", Some("other_form"))];
        assert_eq!(
            choose_form_id(Some("declared_id"), "My Survey", &forms),
            Some("declared_id".to_string())
        );
    }

    #[test]
    fn test_blank_settings_id_falls_through() {
        let forms = vec![form("My Survey", Some("survey_v2"))];
        assert_eq!(
            choose_form_id(Some("   "), "My Survey", &forms),
            Some("survey_v2".to_string())
        );
    }

    #[test]
    fn test_unique_title_match() {
        let forms = vec![
            form("My Survey", Some("survey_v2")),
            form("Another", Some("another")),
        ];
        assert_eq!(
            choose_form_id(None, "My Survey", &forms),
            Some("survey_v2".to_string())
        );
    }

    #[test]
    fn test_ambiguous_title_match_yields_none() {
        let forms = vec![
            form("My Survey", Some("a")),
            form("My Survey", Some("b")),
            form("Third", Some("c")),
        ];
        assert_eq!(choose_form_id(None, "My Survey", &forms), None);
    }

    #[test]
    fn test_single_deployed_form_fallback() {
        let forms = vec![form("Different Title", Some("only_form"))];
        assert_eq!(
            choose_form_id(None, "My Survey", &forms),
            Some("only_form".to_string())
        );
    }

    #[test]
    fn test_no_forms_yields_none() {
        assert_eq!(choose_form_id(None, "My Survey", &[]), None);
    }

    #[test]
    fn test_keep_survey_assets_filters_templates() {
        let page: AssetPage = serde_json::from_value(json!({
            "next": null,
            "results": [
                {"uid": "a1", "name": "Survey", "kind": "asset", "asset_type": "survey"},
                {"uid": "a2", "name": "Template", "kind": "collection", "asset_type": "template"},
            ]
        }))
        .unwrap();

        let kept = keep_survey_assets(page.results);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].uid, "a1");
    }

    #[test]
    fn test_asset_page_tolerates_missing_fields() {
        let page: AssetPage = serde_json::from_value(json!({
            "results": [{"uid": "a1"}]
        }))
        .unwrap();

        assert!(page.next.is_none());
        assert_eq!(page.results[0].name, "");
        assert_eq!(page.results[0].kind, "");
    }
}
