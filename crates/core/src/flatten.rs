//! Schema flattening: hierarchical survey definition to a flat, ordered,
//! duplicate-free column sequence.
//!
//! Group boundaries contribute a `group/child` path prefix instead of a
//! column of their own. Geopoint questions expand into four fixed-order
//! scalar columns. Repeat groups are unsupported: the whole repeat section
//! is skipped and a warning recorded, never an error.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::schema::{FieldKind, SurveyField};

/// Suffixes a geopoint question expands into, in fixed order.
pub const GEOPOINT_SUFFIXES: &[&str] = &["_latitude", "_longitude", "_altitude", "_precision"];

/// Identifier columns appended to generated templates so edits can be
/// correlated back to platform submissions.
pub const SYSTEM_COLUMNS: &[&str] = &["meta/instanceID", "_uuid", "_id"];

/// One question surviving flattening, addressed by its slash-joined path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatField {
    /// Full path including enclosing group names, e.g. `household/head_name`.
    pub path: String,
    /// Structural kind of the owning question.
    pub kind: FieldKind,
    /// Choice list name for `select_multiple` questions.
    pub select_list: Option<String>,
}

impl FlatField {
    /// Column names this field contributes to the spreadsheet header.
    pub fn column_names(&self) -> Vec<String> {
        match self.kind {
            FieldKind::Geopoint => GEOPOINT_SUFFIXES
                .iter()
                .map(|suffix| format!("{}{suffix}", self.path))
                .collect(),
            _ => vec![self.path.clone()],
        }
    }
}

/// Result of flattening one survey definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlatSchema {
    /// Questions in schema order, geopoints not yet expanded.
    pub fields: Vec<FlatField>,
    /// Human-readable warnings (skipped repeats, duplicate names).
    pub warnings: Vec<String>,
}

impl FlatSchema {
    /// Ordered spreadsheet columns, geopoints expanded.
    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().flat_map(|f| f.column_names()).collect()
    }

    /// Columns for a generated template: schema columns plus the trailing
    /// identifier columns, without introducing duplicates.
    pub fn template_columns(&self) -> Vec<String> {
        let mut columns = self.column_names();
        for system in SYSTEM_COLUMNS {
            if !columns.iter().any(|c| c == system) {
                columns.push((*system).to_string());
            }
        }
        columns
    }
}

/// Flatten a survey definition into an ordered column schema.
///
/// Skips boundary markers, unnamed questions, and system questions whose
/// name starts with `_`. Repeat sections are dropped wholesale with a
/// warning. Duplicate paths keep the first occurrence and warn on the rest,
/// so the returned column sequence is duplicate-free.
pub fn flatten_survey(survey: &[SurveyField]) -> FlatSchema {
    let mut flat = FlatSchema::default();
    let mut stack: Vec<String> = Vec::new();
    let mut repeat_depth: usize = 0;
    let mut seen: HashSet<String> = HashSet::new();

    for field in survey {
        match field.kind {
            FieldKind::BeginRepeat => {
                if repeat_depth == 0 {
                    let name = field.name.as_deref().unwrap_or("(unnamed)");
                    flat.warnings.push(format!(
                        "Repeat group '{name}' is not supported; its questions were skipped"
                    ));
                }
                repeat_depth += 1;
            }
            FieldKind::EndRepeat => {
                repeat_depth = repeat_depth.saturating_sub(1);
            }
            FieldKind::BeginGroup => {
                if repeat_depth == 0 {
                    let name = field.name.clone().unwrap_or_else(|| "group".to_string());
                    stack.push(name);
                }
            }
            FieldKind::EndGroup => {
                if repeat_depth == 0 {
                    // Unbalanced end markers are ignored.
                    stack.pop();
                }
            }
            FieldKind::Geopoint | FieldKind::SelectMultiple | FieldKind::Scalar => {
                if repeat_depth > 0 {
                    continue;
                }
                let Some(name) = field.name.as_deref() else {
                    continue;
                };
                if name.is_empty() || name.starts_with('_') {
                    continue;
                }

                let path = if stack.is_empty() {
                    name.to_string()
                } else {
                    format!("{}/{name}", stack.join("/"))
                };

                if !seen.insert(path.clone()) {
                    flat.warnings
                        .push(format!("Duplicate question path '{path}' ignored"));
                    continue;
                }

                flat.fields.push(FlatField {
                    path,
                    kind: field.kind,
                    select_list: field.select_list.clone(),
                });
            }
        }
    }

    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(name: &str, type_name: &str) -> SurveyField {
        SurveyField {
            name: Some(name.to_string()),
            kind: FieldKind::from_type_name(type_name),
            type_name: type_name.to_string(),
            select_list: None,
        }
    }

    fn marker(type_name: &str, name: Option<&str>) -> SurveyField {
        SurveyField {
            name: name.map(String::from),
            kind: FieldKind::from_type_name(type_name),
            type_name: type_name.to_string(),
            select_list: None,
        }
    }

    #[test]
    fn test_geopoint_expands_to_four_columns_in_order() {
        let survey = vec![question("loc", "geopoint")];
        let flat = flatten_survey(&survey);

        assert_eq!(
            flat.column_names(),
            vec![
                "loc_latitude",
                "loc_longitude",
                "loc_altitude",
                "loc_precision"
            ]
        );
    }

    #[test]
    fn test_group_children_use_slash_paths() {
        let survey = vec![
            marker("begin_group", Some("household")),
            question("head_name", "text"),
            marker("begin_group", Some("address")),
            question("street", "text"),
            marker("end_group", None),
            marker("end_group", None),
            question("notes", "text"),
        ];
        let flat = flatten_survey(&survey);

        assert_eq!(
            flat.column_names(),
            vec!["household/head_name", "household/address/street", "notes"]
        );
        assert!(flat.warnings.is_empty());
    }

    #[test]
    fn test_repeat_section_skipped_with_warning() {
        let survey = vec![
            question("name", "text"),
            marker("begin_repeat", Some("children")),
            question("child_name", "text"),
            marker("begin_group", Some("inner")),
            question("child_age", "integer"),
            marker("end_group", None),
            marker("end_repeat", None),
            question("village", "text"),
        ];
        let flat = flatten_survey(&survey);

        assert_eq!(flat.column_names(), vec!["name", "village"]);
        assert_eq!(flat.warnings.len(), 1);
        assert!(flat.warnings[0].contains("children"));
    }

    #[test]
    fn test_flattening_is_idempotent() {
        let survey = vec![
            marker("begin_group", Some("g")),
            question("a", "text"),
            marker("end_group", None),
            question("loc", "geopoint"),
        ];
        let first = flatten_survey(&survey).column_names();
        let second = flatten_survey(&survey).column_names();
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_paths_keep_first_and_warn() {
        let survey = vec![
            question("name", "text"),
            question("name", "integer"),
            question("age", "integer"),
        ];
        let flat = flatten_survey(&survey);

        assert_eq!(flat.column_names(), vec!["name", "age"]);
        assert_eq!(flat.warnings.len(), 1);
        assert!(flat.warnings[0].contains("name"));
    }

    #[test]
    fn test_system_and_unnamed_questions_skipped() {
        let survey = vec![
            question("_system_thing", "text"),
            marker("text", None),
            question("kept", "text"),
        ];
        let flat = flatten_survey(&survey);
        assert_eq!(flat.column_names(), vec!["kept"]);
    }

    #[test]
    fn test_unbalanced_end_group_ignored() {
        let survey = vec![
            marker("end_group", None),
            question("a", "text"),
        ];
        let flat = flatten_survey(&survey);
        assert_eq!(flat.column_names(), vec!["a"]);
    }

    #[test]
    fn test_template_columns_append_system_columns() {
        let survey = vec![question("name", "text"), question("location", "geopoint")];
        let flat = flatten_survey(&survey);

        assert_eq!(
            flat.template_columns(),
            vec![
                "name",
                "location_latitude",
                "location_longitude",
                "location_altitude",
                "location_precision",
                "meta/instanceID",
                "_uuid",
                "_id"
            ]
        );
    }
}
