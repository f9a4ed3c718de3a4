use serde::{Deserialize, Deserializer, Serialize};

/// Configuration for the user profile API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileConfig {
    /// Base URL of the profile API.
    pub api_endpoint: String,
}

impl Default for UserProfileConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "http://localhost:8080".to_string(),
        }
    }
}

/// A user's profile as returned by the remote API.
///
/// Pass-through mapping of the wire shape, not a validated schema: fields
/// the server omits come back as `None`, except `profile_picture` which
/// collapses to an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "empty_when_null")]
    pub profile_picture: String,
}

fn empty_when_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Fields a caller may change; serialized verbatim as the PUT body, with
/// absent fields omitted entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// One unit of work for a batched profile fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserProfileLoaderInput {
    pub user_id: String,
    pub request_id: String,
}
