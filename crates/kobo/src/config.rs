//! Server selection and session configuration.
//!
//! Authentication state is an explicit [`KoboSession`] value (base URLs +
//! token) handed to the client, never ambient globals, so multiple
//! sessions against different servers can coexist.

use serde::{Deserialize, Serialize};

/// Project/form API host of the global platform instance.
pub const GLOBAL_KF_URL: &str = "https://kf.kobotoolbox.org";
/// Data-collection host of the global platform instance.
pub const GLOBAL_KC_URL: &str = "https://kc.kobotoolbox.org";
/// Project/form API host of the EU platform instance.
pub const EU_KF_URL: &str = "https://eu.kobotoolbox.org";
/// Data-collection host of the EU platform instance.
pub const EU_KC_URL: &str = "https://kc-eu.kobotoolbox.org";

/// Which platform instance to talk to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerChoice {
    Global,
    Eu,
    /// Self-hosted or otherwise non-preset instance.
    Custom { kf_url: String, kc_url: String },
}

impl ServerChoice {
    /// Resolve to normalized `(kf_base, kc_base)` URLs.
    pub fn endpoints(&self) -> (String, String) {
        match self {
            Self::Global => (GLOBAL_KF_URL.to_string(), GLOBAL_KC_URL.to_string()),
            Self::Eu => (EU_KF_URL.to_string(), EU_KC_URL.to_string()),
            Self::Custom { kf_url, kc_url } => {
                (normalize_base_url(kf_url), normalize_base_url(kc_url))
            }
        }
    }
}

/// Connection settings for one authenticated platform session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KoboSession {
    /// Base URL of the project/form API.
    pub kf_base: String,
    /// Base URL of the data-collection API.
    pub kc_base: String,
    /// Private API token (`Authorization: Token <...>`).
    pub token: String,
}

impl KoboSession {
    pub fn new(choice: &ServerChoice, token: impl Into<String>) -> Self {
        let (kf_base, kc_base) = choice.endpoints();
        Self {
            kf_base,
            kc_base,
            token: token.into(),
        }
    }
}

/// Normalize a user-supplied base URL to `scheme://host` with no trailing
/// slash or path.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((scheme, rest)) = trimmed.split_once("://") {
        let host = rest.split('/').next().unwrap_or(rest);
        if !host.is_empty() {
            return format!("{scheme}://{host}");
        }
    }
    trimmed.trim_end_matches('/').to_string()
}

/// Join a base URL and path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_endpoints() {
        assert_eq!(
            ServerChoice::Global.endpoints(),
            (GLOBAL_KF_URL.to_string(), GLOBAL_KC_URL.to_string())
        );
        assert_eq!(
            ServerChoice::Eu.endpoints(),
            (EU_KF_URL.to_string(), EU_KC_URL.to_string())
        );
    }

    #[test]
    fn test_custom_endpoints_normalized() {
        let choice = ServerChoice::Custom {
            kf_url: "https://kobo.example.org/some/path".to_string(),
            kc_url: "https://kc.example.org/".to_string(),
        };
        assert_eq!(
            choice.endpoints(),
            (
                "https://kobo.example.org".to_string(),
                "https://kc.example.org".to_string()
            )
        );
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://kf.kobotoolbox.org"),
            "https://kf.kobotoolbox.org"
        );
        assert_eq!(
            normalize_base_url(" https://host.example/api/v2/ "),
            "https://host.example"
        );
        assert_eq!(normalize_base_url("host.example/"), "host.example");
        assert_eq!(normalize_base_url(""), "");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://h.example/", "/api/v2/assets/"),
            "https://h.example/api/v2/assets/"
        );
        assert_eq!(
            join_url("https://h.example", "submission"),
            "https://h.example/submission"
        );
    }

    #[test]
    fn test_session_from_choice() {
        let session = KoboSession::new(&ServerChoice::Eu, "secret");
        assert_eq!(session.kf_base, EU_KF_URL);
        assert_eq!(session.kc_base, EU_KC_URL);
        assert_eq!(session.token, "secret");
    }
}
