//! Read-only client for the public user directory (DummyJSON-style API).
//!
//! Every call logs failures and hands back `None`; nothing is retried.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://dummyjson.com/users";

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub maiden_name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    /// Fields this client does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub limit: u64,
}

/// The basic data for a locally drafted user record.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub maiden_name: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub email: String,
    pub username: String,
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserDirectoryClient {
    client: Client,
    base_url: String,
}

impl UserDirectoryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DirectoryError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, DirectoryError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    pub async fn all_users(&self) -> Option<UserPage> {
        match self.fetch(&self.base_url).await {
            Ok(page) => Some(page),
            Err(e) => {
                log::error!("Error fetching all users: {}", e);
                None
            }
        }
    }

    pub async fn user_by_id(&self, id: i64) -> Option<User> {
        let url = format!("{}/{}", self.base_url, id);
        match self.fetch(&url).await {
            Ok(user) => Some(user),
            Err(e) => {
                log::error!("Error fetching user {}: {}", id, e);
                None
            }
        }
    }

    /// Highest id among the listed users, `Some(0)` when the list is empty.
    pub async fn last_user_id(&self) -> Option<i64> {
        let page = self.all_users().await?;
        Some(page.users.iter().map(|u| u.id).max().unwrap_or(0))
    }

    /// Build a user record with the next free id. The record is only drafted
    /// locally; the directory is never written to.
    pub async fn draft_next_user(&self, profile: UserProfile) -> Option<User> {
        let Some(last_id) = self.last_user_id().await else {
            log::error!("Could not retrieve last user id");
            return None;
        };

        let user = User {
            id: last_id + 1,
            first_name: profile.first_name,
            last_name: profile.last_name,
            maiden_name: profile.maiden_name,
            age: profile.age,
            gender: profile.gender,
            email: profile.email,
            username: profile.username,
            birth_date: profile.birth_date,
            extra: serde_json::Map::new(),
        };
        log::info!("Drafted user record {} ({})", user.id, user.username);
        Some(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_deserializes_camel_case_and_keeps_unknown_fields() {
        let json = r#"{
            "id": 1,
            "firstName": "Emily",
            "lastName": "Johnson",
            "maidenName": "Smith",
            "age": 28,
            "gender": "female",
            "email": "emily.johnson@x.dummyjson.com",
            "username": "emilys",
            "birthDate": "1996-5-30",
            "eyeColor": "Green"
        }"#;

        let user: User = serde_json::from_str(json).expect("valid user json");

        assert_eq!(user.id, 1);
        assert_eq!(user.first_name, "Emily");
        assert_eq!(user.maiden_name, "Smith");
        assert_eq!(user.age, Some(28));
        assert_eq!(user.birth_date.as_deref(), Some("1996-5-30"));
        assert_eq!(user.extra["eyeColor"], "Green");
    }

    #[test]
    fn user_tolerates_missing_optional_fields() {
        let user: User = serde_json::from_str(r#"{"id": 7}"#).expect("valid user json");
        assert_eq!(user.id, 7);
        assert!(user.first_name.is_empty());
        assert!(user.age.is_none());
    }

    #[test]
    fn page_serializes_back_with_camel_case_fields() {
        let page = UserPage {
            users: vec![User {
                id: 3,
                first_name: "Michelle".to_string(),
                ..User::default()
            }],
            total: 1,
            skip: 0,
            limit: 30,
        };

        let value = serde_json::to_value(&page).expect("serializable");
        assert_eq!(value["users"][0]["firstName"], "Michelle");
        assert_eq!(value["limit"], 30);
    }

    #[test]
    fn base_url_is_normalised() {
        let client = UserDirectoryClient::new("http://localhost/users/", Duration::from_secs(1))
            .expect("client should build");
        assert_eq!(client.base_url(), "http://localhost/users");
    }

    #[tokio::test]
    async fn unreachable_directory_yields_none() {
        // Port 9 (discard) is closed on loopback in test environments.
        let client = UserDirectoryClient::new("http://127.0.0.1:9/users", Duration::from_secs(2))
            .expect("client should build");

        assert!(client.all_users().await.is_none());
        assert!(client.user_by_id(1).await.is_none());
        assert!(client.last_user_id().await.is_none());
        assert!(client.draft_next_user(UserProfile::default()).await.is_none());
    }
}
