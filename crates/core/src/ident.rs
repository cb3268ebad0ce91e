//! Submission identifier handling: `uuid:` prefix normalization, the
//! known-identifier index, and upload-row matching.
//!
//! The platform stores a submission's instance identifier both as a bare
//! `_uuid` and as a `uuid:`-prefixed `meta/instanceID`. Uploads may carry
//! either spelling, so the index keeps both and matching normalizes before
//! lookup.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::upload::{UploadRow, UploadSheet};

/// Bare identifier column.
pub const UUID_COLUMN: &str = "_uuid";

/// Prefixed identifier column.
pub const INSTANCE_ID_COLUMN: &str = "meta/instanceID";

/// Header spellings accepted as a stand-in for [`INSTANCE_ID_COLUMN`] when
/// normalizing edit-mode uploads.
pub const INSTANCE_ID_ALIASES: &[&str] = &[
    "meta_instanceID",
    "meta/instanceid",
    "instanceID",
    "instance_id",
    "_uuid",
    "__uuid",
    "uuid",
    "submission_uuid",
    "_submission__uuid",
];

const UUID_PREFIX: &str = "uuid:";

/// Normalize an identifier to its `uuid:`-prefixed form.
pub fn ensure_uuid_prefix(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with(UUID_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{UUID_PREFIX}{trimmed}")
    }
}

/// Strip the `uuid:` prefix if present.
pub fn strip_uuid_prefix(raw: &str) -> &str {
    raw.trim().strip_prefix(UUID_PREFIX).unwrap_or(raw.trim())
}

/// Index of identifiers belonging to existing platform submissions.
///
/// Each inserted identifier is stored in both its prefixed and bare form,
/// so lookups succeed whichever spelling the upload uses.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    ids: HashSet<String>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from submission records as returned by the data
    /// API. Each record contributes its `meta/instanceID`, falling back to
    /// `_uuid` when the former is absent.
    pub fn from_submissions(submissions: &[Map<String, Value>]) -> Self {
        let mut index = Self::new();
        for record in submissions {
            let id = record
                .get(INSTANCE_ID_COLUMN)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .or_else(|| record.get(UUID_COLUMN).and_then(Value::as_str));
            if let Some(id) = id {
                index.insert(id);
            }
        }
        index
    }

    /// Insert one identifier (both spellings).
    pub fn insert(&mut self, id: &str) {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return;
        }
        self.ids.insert(ensure_uuid_prefix(trimmed));
        self.ids.insert(strip_uuid_prefix(trimmed).to_string());
    }

    /// Whether the identifier (in either spelling) is known.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id.trim())
    }

    /// Number of stored spellings. Zero means no submissions exist.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Classification of one upload row against existing submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// The row's identifier resolved to an existing submission; the
    /// normalized (`uuid:`-prefixed) identifier is carried along.
    Existing(String),
    /// The row does not correspond to a known submission. If the row
    /// carried an identifier that simply was not found, it is preserved
    /// here so a fresh record can keep it.
    New { preset_id: Option<String> },
}

/// Match an upload row against the known-identifier index.
///
/// Resolution order: the `_uuid` column first; if absent or blank, the
/// `meta/instanceID` column. An identifier that is present but unknown
/// classifies the row as NEW, never as an error.
pub fn match_row(row: &UploadRow, known: &IdentifierIndex) -> MatchResult {
    let mut preset_id: Option<String> = None;

    for column in [UUID_COLUMN, INSTANCE_ID_COLUMN] {
        let Some(raw) = row.get(column) else {
            continue;
        };
        if raw.trim().is_empty() {
            continue;
        }
        let id = ensure_uuid_prefix(raw);
        if known.contains(&id) || known.contains(strip_uuid_prefix(&id)) {
            return MatchResult::Existing(id);
        }
        if preset_id.is_none() {
            preset_id = Some(id);
        }
    }

    MatchResult::New { preset_id }
}

/// What [`normalize_identifier_headers`] changed, for user feedback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdNormalization {
    /// `meta/instanceID` was created from an alias column.
    pub created_from_alias: bool,
    /// Existing `meta/instanceID` values were `uuid:`-prefixed.
    pub standardized_prefix: bool,
}

/// Normalize identifier columns on an edit-mode upload.
///
/// If the sheet lacks a `meta/instanceID` column, the first alias column
/// present is copied into it row by row. All `meta/instanceID` values are
/// then normalized to the prefixed form.
pub fn normalize_identifier_headers(sheet: &mut UploadSheet) -> IdNormalization {
    let mut info = IdNormalization::default();

    if !sheet.headers.iter().any(|h| h == INSTANCE_ID_COLUMN) {
        let alias = INSTANCE_ID_ALIASES
            .iter()
            .find(|a| sheet.headers.iter().any(|h| h == *a))
            .copied();
        if let Some(alias) = alias {
            for row in &mut sheet.rows {
                if let Some(value) = row.get(alias).map(ensure_uuid_prefix) {
                    row.set(INSTANCE_ID_COLUMN, value);
                }
            }
            sheet.headers.push(INSTANCE_ID_COLUMN.to_string());
            info.created_from_alias = true;
        }
    }

    if sheet.headers.iter().any(|h| h == INSTANCE_ID_COLUMN) {
        for row in &mut sheet.rows {
            if let Some(value) = row.get(INSTANCE_ID_COLUMN).map(ensure_uuid_prefix) {
                row.set(INSTANCE_ID_COLUMN, value);
            }
        }
        info.standardized_prefix = true;
    }

    info
}
