//! Form schema model and parsing of the platform's asset JSON.
//!
//! A deployed survey asset carries its form definition under
//! `content.survey`: an ordered array of question objects, each with a
//! `type` string and usually a `name`. Group and repeat boundaries appear
//! as explicit `begin_*` / `end_*` marker rows in the same array.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Structural kind of a survey row, as far as flattening and payload
/// construction care. Scalar question types (text, integer, date,
/// select_one, …) all behave identically downstream and collapse into
/// [`FieldKind::Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    BeginGroup,
    EndGroup,
    BeginRepeat,
    EndRepeat,
    Geopoint,
    SelectMultiple,
    Scalar,
}

impl FieldKind {
    /// Classify a raw `type` string from the asset survey array.
    pub fn from_type_name(type_name: &str) -> Self {
        match type_name {
            "begin_group" => Self::BeginGroup,
            "end_group" => Self::EndGroup,
            "begin_repeat" => Self::BeginRepeat,
            "end_repeat" => Self::EndRepeat,
            "geopoint" => Self::Geopoint,
            "select_multiple" => Self::SelectMultiple,
            _ => Self::Scalar,
        }
    }

    /// Whether this row is a group or repeat boundary marker rather than
    /// a question.
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            Self::BeginGroup | Self::EndGroup | Self::BeginRepeat | Self::EndRepeat
        )
    }
}

/// One row of the survey definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyField {
    /// Question or group name. Boundary end-markers usually have none.
    pub name: Option<String>,
    /// Structural kind derived from the raw type.
    pub kind: FieldKind,
    /// The raw `type` string as it appears in the asset.
    pub type_name: String,
    /// Choice list name for `select_multiple` questions.
    pub select_list: Option<String>,
}

/// Parse the survey definition out of an asset detail document.
///
/// Expects the shape returned by the asset detail endpoint:
/// `{ "content": { "survey": [ {...}, ... ] } }`. Non-object entries in
/// the survey array are ignored; a missing or non-array `survey` is a
/// validation error.
pub fn parse_survey(asset: &serde_json::Value) -> Result<Vec<SurveyField>, CoreError> {
    let survey = asset
        .pointer("/content/survey")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            CoreError::Validation("asset content has no survey definition".to_string())
        })?;

    let mut fields = Vec::with_capacity(survey.len());
    for row in survey {
        let Some(obj) = row.as_object() else {
            continue;
        };
        let type_name = obj
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if type_name.is_empty() {
            continue;
        }
        let name = obj
            .get("name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let select_list = obj
            .get("select_from_list_name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        fields.push(SurveyField {
            name,
            kind: FieldKind::from_type_name(&type_name),
            type_name,
            select_list,
        });
    }

    Ok(fields)
}
