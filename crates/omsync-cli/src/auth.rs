//! Memos access token persistence in the system keychain.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use omsync_core::util::normalize_text_option;

use crate::error::CliError;

pub const TOKEN_ENV: &str = "OMSYNC_TOKEN";

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "omsync-cli";

type TokenResult<T> = Result<T, CliError>;

fn storage_error(error: impl std::fmt::Display) -> CliError {
    CliError::Auth(format!("Secure storage failed: {error}"))
}

#[derive(Clone)]
pub struct TokenStore {
    username: String,
}

impl TokenStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("memos_token:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> TokenResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username).map_err(storage_error)
    }

    #[cfg(not(test))]
    pub fn load(&self) -> TokenResult<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(normalize_text_option(Some(token))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(storage_error(error)),
        }
    }

    #[cfg(test)]
    pub fn load(&self) -> TokenResult<Option<String>> {
        let guard = Self::test_store().lock().map_err(storage_error)?;
        Ok(normalize_text_option(guard.get(&self.username).cloned()))
    }

    #[cfg(not(test))]
    pub fn save(&self, token: &str) -> TokenResult<()> {
        self.entry()?
            .set_password(&validated(token)?)
            .map_err(storage_error)
    }

    #[cfg(test)]
    pub fn save(&self, token: &str) -> TokenResult<()> {
        let token = validated(token)?;
        let mut guard = Self::test_store().lock().map_err(storage_error)?;
        guard.insert(self.username.clone(), token);
        Ok(())
    }

    #[cfg(not(test))]
    pub fn clear(&self) -> TokenResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(storage_error(error)),
        }
    }

    #[cfg(test)]
    pub fn clear(&self) -> TokenResult<()> {
        let mut guard = Self::test_store().lock().map_err(storage_error)?;
        guard.remove(&self.username);
        Ok(())
    }
}

fn validated(token: &str) -> TokenResult<String> {
    normalize_text_option(Some(token.to_string()))
        .ok_or_else(|| CliError::Auth("Token must not be empty".to_string()))
}

/// `OMSYNC_TOKEN` wins over the keychain entry.
pub fn resolve_token(profile_name: &str) -> TokenResult<Option<String>> {
    if let Some(token) = normalize_text_option(std::env::var(TOKEN_ENV).ok()) {
        return Ok(Some(token));
    }
    TokenStore::new(profile_name).load()
}
