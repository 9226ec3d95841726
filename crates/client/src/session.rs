use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::error::{ClientError, Result};

/// File-backed persistence for the authentication token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token.trim()).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Authentication context shared by everything that talks to the API.
///
/// The token is read from the store once, when the session is initialised,
/// and only changes through [`Session::login`] and [`Session::logout`].
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<RwLock<Option<String>>>,
    store: Option<TokenStore>,
}

impl Session {
    pub async fn init(store: TokenStore) -> Result<Self> {
        let token = store.load().await?;
        debug!(
            path = %store.path().display(),
            authenticated = token.is_some(),
            "session initialised"
        );
        Ok(Self {
            token: Arc::new(RwLock::new(token)),
            store: Some(store),
        })
    }

    /// In-memory session that never touches disk.
    pub fn with_token(token: Option<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token)),
            store: None,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn require_token(&self) -> Result<String> {
        self.token()
            .ok_or_else(|| ClientError::Authorization("no authentication token".to_string()))
    }

    pub async fn login(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::Validation("Token cannot be empty".to_string()));
        }
        if let Some(store) = &self.store {
            store.save(token).await?;
        }
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        info!("Logged in");
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        if let Some(store) = &self.store {
            store.clear().await?;
        }
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        info!("Logged out");
        Ok(())
    }
}
