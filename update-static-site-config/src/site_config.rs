use serde::{Deserialize, Serialize};

/// Prefix that turns the JSON document into a script the front end can load.
pub(crate) const CONFIG_PREFIX: &str = "window._config = ";

/// Front-end configuration published as `window._config`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub(crate) struct SiteConfig {
    pub(crate) cognito: CognitoConfig,
    pub(crate) api: ApiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CognitoConfig {
    pub(crate) user_pool_id: String,
    pub(crate) user_pool_client_id: String,
    pub(crate) region: String,
    pub(crate) disabled: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiConfig {
    pub(crate) invoke_url: String,
}

impl SiteConfig {
    /// Auth disabled, API pointed at `invoke_url`.
    pub(crate) fn with_invoke_url(invoke_url: impl Into<String>) -> Self {
        Self {
            cognito: CognitoConfig {
                user_pool_id: String::new(),
                user_pool_client_id: String::new(),
                region: String::new(),
                disabled: true,
            },
            api: ApiConfig {
                invoke_url: invoke_url.into(),
            },
        }
    }

    /// Pretty JSON with two-space indent and non-ASCII escaped as `\uXXXX`.
    pub(crate) fn render(&self) -> serde_json::Result<String> {
        let json = escape_non_ascii(&serde_json::to_string_pretty(self)?);
        Ok(format!("{CONFIG_PREFIX}{json}"))
    }
}

/// Non-ASCII characters only occur inside string literals of serialized
/// JSON, so each can be swapped for its UTF-16 escape(s).
fn escape_non_ascii(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    let mut units = [0u16; 2];
    for c in json.chars() {
        if c.is_ascii() {
            escaped.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    escaped
}
