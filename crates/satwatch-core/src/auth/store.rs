use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Keychain service name for the keyring backend
const SERVICE_NAME: &str = "satwatch";

/// The two credentials a session holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const ALL: [TokenKind; 2] = [TokenKind::Access, TokenKind::Refresh];

    /// Fixed key the token is stored under.
    pub fn key(&self) -> &'static str {
        match self {
            TokenKind::Access => "access_token",
            TokenKind::Refresh => "refresh_token",
        }
    }
}

/// Durable storage for the access/refresh token pair.
///
/// Reads and writes are synchronous. `set` and `clear` never fail from the
/// caller's point of view: backends that can fail to persist log a warning
/// and keep serving the in-process value where they have one.
pub trait TokenStore: Send + Sync {
    fn get(&self, kind: TokenKind) -> Option<String>;

    fn set(&self, kind: TokenKind, value: &str);

    /// Remove both tokens. Idempotent.
    fn clear(&self);
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<TokenKind, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding both tokens.
    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        let store = Self::new();
        store.set(TokenKind::Access, access);
        store.set(TokenKind::Refresh, refresh);
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        tokens.get(&kind).cloned()
    }

    fn set(&self, kind: TokenKind, value: &str) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.insert(kind, value.to_string());
    }

    fn clear(&self) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.clear();
    }
}

// ============================================================================
// JSON file store
// ============================================================================

/// On-disk layout of the token file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TokenFile {
    access_token: Option<String>,
    refresh_token: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl TokenFile {
    fn slot(&mut self, kind: TokenKind) -> &mut Option<String> {
        match kind {
            TokenKind::Access => &mut self.access_token,
            TokenKind::Refresh => &mut self.refresh_token,
        }
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Token store persisted as a small JSON file.
///
/// The file is read once at open; afterwards the in-memory copy is
/// authoritative and every mutation rewrites the file.
pub struct FileTokenStore {
    path: PathBuf,
    tokens: RwLock<TokenFile>,
}

impl FileTokenStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tokens = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read token file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse token file {}", path.display()))?
        } else {
            TokenFile::default()
        };
        debug!(path = %path.display(), "Opened token file");
        Ok(Self {
            path,
            tokens: RwLock::new(tokens),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tokens: &TokenFile) -> Result<()> {
        if tokens.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove token file")?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(tokens)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).context("Failed to open token file")?;

        // `mode` only applies on creation, so tighten a file that already existed
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .context("Failed to restrict token file permissions")?;
        }
        file.write_all(contents.as_bytes())
            .context("Failed to write token file")?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        match kind {
            TokenKind::Access => tokens.access_token.clone(),
            TokenKind::Refresh => tokens.refresh_token.clone(),
        }
    }

    fn set(&self, kind: TokenKind, value: &str) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        *tokens.slot(kind) = Some(value.to_string());
        tokens.updated_at = Some(Utc::now());
        if let Err(e) = self.persist(&tokens) {
            warn!(error = %e, token = kind.key(), "Failed to persist token");
        }
    }

    fn clear(&self) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        *tokens = TokenFile::default();
        if let Err(e) = self.persist(&tokens) {
            warn!(error = %e, "Failed to remove persisted tokens");
        }
    }
}

// ============================================================================
// OS keychain store
// ============================================================================

/// Token store backed by the OS keychain, one entry per token kind.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, kind: TokenKind) -> Result<Entry> {
        Entry::new(&self.service, kind.key()).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, kind: TokenKind) -> Option<String> {
        let entry = self.entry(kind).ok()?;
        match entry.get_password() {
            Ok(token) => Some(token),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(error = %e, token = kind.key(), "Failed to read token from keychain");
                None
            }
        }
    }

    fn set(&self, kind: TokenKind, value: &str) {
        let result = self
            .entry(kind)
            .and_then(|entry| entry.set_password(value).context("Failed to store token in keychain"));
        if let Err(e) = result {
            warn!(error = %e, token = kind.key(), "Failed to persist token");
        }
    }

    fn clear(&self) {
        for kind in TokenKind::ALL {
            let entry = match self.entry(kind) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, token = kind.key(), "Failed to open keychain entry");
                    continue;
                }
            };
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => warn!(error = %e, token = kind.key(), "Failed to delete token from keychain"),
            }
        }
    }
}
