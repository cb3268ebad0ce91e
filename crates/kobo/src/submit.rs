//! XML submission intake: posting one OpenRosa document per upload row.

use reqwest::multipart::{Form, Part};

use crate::client::{truncate_body, KoboApiError, KoboClient};
use crate::config::join_url;

/// Accepted result of posting one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The platform stored a new record.
    Created,
    /// The platform already had this instance; counts as success.
    Duplicate,
}

impl SubmitOutcome {
    /// Human-readable reason for the run report.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Created => "Submitted",
            Self::Duplicate => "Duplicate (already exists)",
        }
    }
}

/// Map an intake response status to an outcome or error.
///
/// 200/201/202 are acceptance; 409 means the instance already exists and
/// is treated as success so re-uploads stay idempotent.
fn classify_status(status: u16, body: String) -> Result<SubmitOutcome, KoboApiError> {
    match status {
        200 | 201 | 202 => Ok(SubmitOutcome::Created),
        409 => Ok(SubmitOutcome::Duplicate),
        401 | 403 => Err(KoboApiError::Unauthorized { status }),
        _ => Err(KoboApiError::Api {
            status,
            body: truncate_body(&body),
        }),
    }
}

impl KoboClient {
    /// Post one XML submission document to the data-collection API.
    pub async fn post_submission(&self, xml: Vec<u8>) -> Result<SubmitOutcome, KoboApiError> {
        let url = join_url(&self.session().kc_base, "/submission");

        let part = Part::bytes(xml)
            .file_name("submission.xml")
            .mime_str("text/xml")?;
        let form = Form::new().part("xml_submission_file", part);

        let response = self.post(&url).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        classify_status(status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_acceptance_statuses() {
        for status in [200, 201, 202] {
            assert_matches!(
                classify_status(status, String::new()),
                Ok(SubmitOutcome::Created)
            );
        }
    }

    #[test]
    fn test_duplicate_is_success() {
        assert_matches!(
            classify_status(409, "already exists".to_string()),
            Ok(SubmitOutcome::Duplicate)
        );
    }

    #[test]
    fn test_auth_rejection() {
        assert_matches!(
            classify_status(401, String::new()),
            Err(KoboApiError::Unauthorized { status: 401 })
        );
    }

    #[test]
    fn test_other_statuses_carry_body() {
        let err = classify_status(400, "bad value for field 'age'".to_string()).unwrap_err();
        assert_matches!(err, KoboApiError::Api { status: 400, ref body }
            if body.contains("bad value"));
    }

    #[test]
    fn test_outcome_reasons() {
        assert_eq!(SubmitOutcome::Created.reason(), "Submitted");
        assert_eq!(SubmitOutcome::Duplicate.reason(), "Duplicate (already exists)");
    }
}
