//! Memos REST client.
//!
//! The sync engine talks to the remote instance only through [`RemoteApi`];
//! [`MemosClient`] is the reqwest-backed implementation.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::config::{normalize_base_url, SyncConfig};
use crate::error::{Error, Result};
use crate::models::{MemoPage, Resource, ResourceList, User, UserSearch};
use crate::util::compact_text;

/// Page size requested from the memo listing.
pub const MEMO_PAGE_SIZE: u32 = 50;

/// Parameters for one memo listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoPageRequest<'a> {
    pub page_size: u32,
    pub page_token: &'a str,
    /// Account reference the listing is scoped to, e.g. `users/1`
    pub creator: &'a str,
}

impl MemoPageRequest<'_> {
    /// `creator=='users/1'`
    pub fn filter(&self) -> String {
        format!("creator=='{}'", self.creator)
    }
}

/// Remote content operations consumed by the sync engine.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Fetch one page of memos.
    async fn list_memos(&self, request: MemoPageRequest<'_>) -> Result<MemoPage>;

    /// Fetch the complete, unpaginated resource listing.
    async fn list_resources(&self) -> Result<Vec<Resource>>;

    /// Download the raw bytes of a resource.
    async fn download_resource(&self, resource: &Resource) -> Result<Vec<u8>>;

    /// Search accounts by exact username.
    async fn search_users(&self, username: &str) -> Result<Vec<User>>;
}

/// Resolve a username to the account reference used by memo filters.
///
/// Exactly one match is required.
pub async fn resolve_account(api: &dyn RemoteApi, username: &str) -> Result<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(Error::InvalidInput("username must not be empty".to_string()));
    }

    let users = api.search_users(username).await?;
    match users.as_slice() {
        [user] => Ok(user.account_ref()),
        _ => Err(Error::InvalidInput(format!(
            "Invalid username '{username}': expected exactly one match, found {}",
            users.len()
        ))),
    }
}

/// HTTP client for a Memos instance.
#[derive(Clone)]
pub struct MemosClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for MemosClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("MemosClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl MemosClient {
    /// Builds a client for an explicit instance URL and bearer token.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Self::with_http_client(base_url, token, client)
    }

    /// Builds a client from a run snapshot, honoring its request timeout.
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Self::with_http_client(config.base_url(), config.token(), client)
    }

    fn with_http_client(
        base_url: &str,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            token: token.into().trim().to_string(),
            client,
        })
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, route: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, route)
    }

    fn file_url(&self, resource_name: &str) -> String {
        let encoded = resource_name
            .trim_matches('/')
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/file/{}/", self.base_url, encoded)
    }

    async fn get_json<T>(&self, url: String, query: &[(&str, String)]) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RemoteApi for MemosClient {
    async fn list_memos(&self, request: MemoPageRequest<'_>) -> Result<MemoPage> {
        self.get_json(
            self.api_url("memos"),
            &[
                ("pageSize", request.page_size.to_string()),
                ("pageToken", request.page_token.to_string()),
                ("filter", request.filter()),
            ],
        )
        .await
    }

    async fn list_resources(&self) -> Result<Vec<Resource>> {
        let list: ResourceList = self.get_json(self.api_url("resources"), &[]).await?;
        Ok(list.resources)
    }

    async fn download_resource(&self, resource: &Resource) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.file_url(&resource.name))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn search_users(&self, username: &str) -> Result<Vec<User>> {
        let search: UserSearch = self
            .get_json(
                self.api_url("users:search"),
                &[("filter", format!("username=='{username}'"))],
            )
            .await?;
        Ok(search.users)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api(parse_api_error(status, &body)))
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", compact_text(&message), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "test-token";

    fn client(server: &MockServer) -> MemosClient {
        MemosClient::new(&server.uri(), TOKEN).unwrap()
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        assert!(MemosClient::new("", TOKEN).is_err());
        assert!(MemosClient::new("memos.example.com", TOKEN).is_err());
    }

    #[test]
    fn file_url_keeps_resource_path_segments() {
        let client = MemosClient::new("https://memos.example.com/", TOKEN).unwrap();
        assert_eq!(
            client.file_url("resources/7"),
            "https://memos.example.com/file/resources/7/"
        );
        assert_eq!(
            client.file_url("resources/a b"),
            "https://memos.example.com/file/resources/a%20b/"
        );
    }

    #[test]
    fn parse_api_error_prefers_message_field() {
        assert_eq!(
            parse_api_error(StatusCode::UNAUTHORIZED, r#"{"message":"token expired"}"#),
            "token expired (401)"
        );
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, ""),
            "HTTP 502"
        );
    }

    #[tokio::test]
    async fn list_memos_sends_page_size_token_and_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/memos"))
            .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
            .and(query_param("pageSize", "50"))
            .and(query_param("pageToken", "cursor-1"))
            .and(query_param("filter", "creator=='users/1'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "memos": [
                    { "name": "memos/1", "content": "one", "updateTime": "2024-01-01T00:00:00Z" }
                ],
                "nextPageToken": "cursor-2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let page = client(&server)
            .list_memos(MemoPageRequest {
                page_size: MEMO_PAGE_SIZE,
                page_token: "cursor-1",
                creator: "users/1",
            })
            .await
            .unwrap();

        assert_eq!(page.memos.len(), 1);
        assert_eq!(page.memos[0].content, "one");
        assert_eq!(page.next_page_token, "cursor-2");
    }

    #[tokio::test]
    async fn list_resources_returns_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/resources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resources": [
                    {
                        "name": "resources/7",
                        "filename": "photo.jpg",
                        "createTime": "2024-01-01T00:00:00Z",
                        "type": "image/jpeg",
                        "memo": "memos/42"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let resources = client(&server).list_resources().await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].owner_memo(), Some("memos/42"));
    }

    #[tokio::test]
    async fn download_resource_returns_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/file/resources/7/"))
            .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .mount(&server)
            .await;

        let resource = Resource {
            name: "resources/7".to_string(),
            ..Resource::default()
        };
        let bytes = client(&server).download_resource(&resource).await.unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn non_success_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/resources"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "unauthenticated" })),
            )
            .mount(&server)
            .await;

        let error = client(&server).list_resources().await.unwrap_err();
        assert!(matches!(error, Error::Api(ref message) if message == "unauthenticated (401)"));
    }

    #[tokio::test]
    async fn resolve_account_requires_exactly_one_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users:search"))
            .and(query_param("filter", "username=='john-doe'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{ "id": 3 }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users:search"))
            .and(query_param("filter", "username=='nobody'"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [] })))
            .mount(&server)
            .await;

        let client = client(&server);
        assert_eq!(
            resolve_account(&client, "john-doe").await.unwrap(),
            "users/3"
        );

        let error = resolve_account(&client, "nobody").await.unwrap_err();
        assert!(error.to_string().contains("Invalid username"));
    }
}
