use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry in the image library, embedded with `{{image(id)}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub name: String,
    /// Inline `data:` URL holding the base64 payload
    #[serde(default)]
    pub data: Option<String>,
    /// External location, used when there is no inline data
    #[serde(default)]
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Image {
    /// The `src` to render: inline data first, then the external url
    pub fn source(&self) -> Option<&str> {
        self.data
            .as_deref()
            .filter(|data| !data.is_empty())
            .or_else(|| self.url.as_deref().filter(|url| !url.is_empty()))
    }
}
