//! In-memory fakes of the remote API and the vault for engine tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{MemoPageRequest, RemoteApi};
use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::models::{Memo, MemoPage, Resource, SyncSettings, User};
use crate::storage::FileStore;

pub fn test_config() -> SyncConfig {
    let settings = SyncSettings {
        url: "https://memos.example.com".to_string(),
        token: "token".to_string(),
        user_id: "users/1".to_string(),
        ..SyncSettings::default()
    };
    SyncConfig::from_settings(&settings, Path::new("/vault")).unwrap()
}

pub fn memo(name: &str, content: &str, update_time: &str) -> Memo {
    Memo::new(name, content, update_time)
}

pub fn page(memos: Vec<Memo>, next_page_token: &str) -> MemoPage {
    MemoPage {
        memos,
        next_page_token: next_page_token.to_string(),
    }
}

pub fn resource(
    name: &str,
    filename: Option<&str>,
    create_time: &str,
    mime_type: &str,
    memo: Option<&str>,
) -> Resource {
    Resource {
        name: name.to_string(),
        filename: filename.map(ToString::to_string),
        create_time: create_time.to_string(),
        mime_type: mime_type.to_string(),
        memo: memo.map(ToString::to_string),
    }
}

/// Remote API serving canned pages keyed by page token.
#[derive(Default)]
pub struct FakeRemote {
    pages: HashMap<String, MemoPage>,
    failing_tokens: HashSet<String>,
    resources: Option<Vec<Resource>>,
    files: HashMap<String, Vec<u8>>,
    requested_tokens: Mutex<Vec<String>>,
    requested_page_sizes: Mutex<Vec<u32>>,
    requested_filters: Mutex<Vec<String>>,
    downloads: Mutex<Vec<String>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            resources: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, token: &str, page: MemoPage) -> Self {
        self.pages.insert(token.to_string(), page);
        self
    }

    pub fn failing_page(mut self, token: &str) -> Self {
        self.failing_tokens.insert(token.to_string());
        self
    }

    pub fn with_resource(mut self, resource: Resource, bytes: &[u8]) -> Self {
        self.files.insert(resource.name.clone(), bytes.to_vec());
        self.resources.get_or_insert_with(Vec::new).push(resource);
        self
    }

    /// Listed, but the download answers 404.
    pub fn with_broken_resource(mut self, resource: Resource) -> Self {
        self.resources.get_or_insert_with(Vec::new).push(resource);
        self
    }

    pub fn failing_resource_listing(mut self) -> Self {
        self.resources = None;
        self
    }

    pub fn requested_tokens(&self) -> Vec<String> {
        self.requested_tokens.lock().unwrap().clone()
    }

    pub fn requested_page_sizes(&self) -> Vec<u32> {
        self.requested_page_sizes.lock().unwrap().clone()
    }

    pub fn requested_filters(&self) -> Vec<String> {
        self.requested_filters.lock().unwrap().clone()
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn list_memos(&self, request: MemoPageRequest<'_>) -> Result<MemoPage> {
        self.requested_tokens
            .lock()
            .unwrap()
            .push(request.page_token.to_string());
        self.requested_page_sizes
            .lock()
            .unwrap()
            .push(request.page_size);
        self.requested_filters.lock().unwrap().push(request.filter());

        if self.failing_tokens.contains(request.page_token) {
            return Err(Error::Api("HTTP 503".to_string()));
        }
        Ok(self
            .pages
            .get(request.page_token)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_resources(&self) -> Result<Vec<Resource>> {
        self.resources
            .clone()
            .ok_or_else(|| Error::Api("unauthenticated (401)".to_string()))
    }

    async fn download_resource(&self, resource: &Resource) -> Result<Vec<u8>> {
        self.downloads.lock().unwrap().push(resource.name.clone());
        self.files
            .get(&resource.name)
            .cloned()
            .ok_or_else(|| Error::Api("HTTP 404".to_string()))
    }

    async fn search_users(&self, _username: &str) -> Result<Vec<User>> {
        Ok(Vec::new())
    }
}

/// Vault kept in memory with the same create/append semantics as `VaultStore`.
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), content.as_bytes().to_vec());
        self
    }

    pub fn text(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn bytes(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn create(&self, path: &Path, content: &str) -> Result<()> {
        self.create_binary(path, content.as_bytes()).await
    }

    async fn create_binary(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut files = self.files.lock().unwrap();
        if files.contains_key(path) {
            return Err(Error::AlreadyExists(path.to_path_buf()));
        }
        files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    async fn append(&self, path: &Path, text: &str) -> Result<()> {
        let mut files = self.files.lock().unwrap();
        let file = files.get_mut(path).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.display().to_string(),
            ))
        })?;
        file.extend_from_slice(text.as_bytes());
        Ok(())
    }

    async fn get_file_by_path(&self, path: &Path) -> Result<Option<PathBuf>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .contains_key(path)
            .then(|| path.to_path_buf()))
    }
}
