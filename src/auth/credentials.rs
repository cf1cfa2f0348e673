//! Configured credential material, validated once at config load.

use config::ConfigError;

/// The credential the webhook endpoint expects, derived from the
/// `auth_type`/`auth_token` configuration pair. Constructing this type is
/// the validation: an instance always has a usable secret for its scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCredentials {
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl AuthCredentials {
    /// Resolve the raw configuration pair. `auth_type` is matched
    /// case-insensitively; a configured `auth_token` without an `auth_type`
    /// means `Bearer` (older configurations predate the `auth_type` option).
    pub fn from_config(
        auth_type: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Option<Self>, ConfigError> {
        let auth_type = match (auth_type, auth_token) {
            (Some(auth_type), _) => title_case(auth_type),
            (None, Some(_)) => "Bearer".to_string(),
            (None, None) => return Ok(None),
        };

        let token = auth_token.ok_or_else(|| {
            ConfigError::Message("No auth_token specified!".to_string())
        })?;

        match auth_type.as_str() {
            "Basic" => {
                // split at the first colon, so passwords may contain colons
                let Some((username, password)) = token.split_once(':') else {
                    return Err(ConfigError::Message(format!(
                        "Invalid auth_token '{token}' specified! For HTTP basic auth, it must \
                         contain a username and a password, separated by a colon \
                         (<username>:<password>)."
                    )));
                };
                Ok(Some(Self::Basic {
                    username: username.to_string(),
                    password: password.to_string(),
                }))
            }
            "Bearer" => Ok(Some(Self::Bearer {
                token: token.to_string(),
            })),
            other => Err(ConfigError::Message(format!(
                "Invalid auth_type '{other}' specified! Must be one of: Basic, Bearer"
            ))),
        }
    }

    /// Scheme name as advertised in the `WWW-Authenticate` challenge.
    pub fn scheme_name(&self) -> &'static str {
        match self {
            AuthCredentials::Basic { .. } => "Basic",
            AuthCredentials::Bearer { .. } => "Bearer",
        }
    }
}

/// Normalize a scheme token the way HTTP auth schemes are written:
/// first letter uppercase, the rest lowercase.
pub(crate) fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_auth_configured() {
        assert_eq!(AuthCredentials::from_config(None, None).unwrap(), None);
    }

    #[test]
    fn test_bearer() {
        let creds = AuthCredentials::from_config(Some("Bearer"), Some("secret"))
            .unwrap()
            .unwrap();
        assert_eq!(
            creds,
            AuthCredentials::Bearer {
                token: "secret".to_string()
            }
        );
        assert_eq!(creds.scheme_name(), "Bearer");
    }

    #[test]
    fn test_auth_type_is_case_insensitive() {
        let creds = AuthCredentials::from_config(Some("bearer"), Some("secret"))
            .unwrap()
            .unwrap();
        assert_eq!(creds.scheme_name(), "Bearer");

        let creds = AuthCredentials::from_config(Some("BASIC"), Some("u:p"))
            .unwrap()
            .unwrap();
        assert_eq!(creds.scheme_name(), "Basic");
    }

    #[test]
    fn test_token_without_type_means_bearer() {
        let creds = AuthCredentials::from_config(None, Some("secret"))
            .unwrap()
            .unwrap();
        assert_eq!(creds.scheme_name(), "Bearer");
    }

    #[test]
    fn test_basic_splits_at_first_colon() {
        let creds = AuthCredentials::from_config(Some("Basic"), Some("user:pa:ss"))
            .unwrap()
            .unwrap();
        assert_eq!(
            creds,
            AuthCredentials::Basic {
                username: "user".to_string(),
                password: "pa:ss".to_string()
            }
        );
    }

    #[test]
    fn test_basic_requires_colon() {
        let err = AuthCredentials::from_config(Some("Basic"), Some("nocolon")).unwrap_err();
        assert!(err.to_string().contains("Invalid auth_token"));
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let err = AuthCredentials::from_config(Some("Bearer"), None).unwrap_err();
        assert!(err.to_string().contains("No auth_token"));
    }

    #[test]
    fn test_unknown_auth_type_is_an_error() {
        let err = AuthCredentials::from_config(Some("Digest"), Some("x")).unwrap_err();
        assert!(err.to_string().contains("Invalid auth_type 'Digest'"));
    }
}
