//! File Session Storage
//!
//! Persists the session as JSON in the user's data directory. The bearer token
//! is encrypted at rest with AES-256-GCM; the key is generated on first use and
//! kept next to the session file.

use super::{Session, SessionStore};
use crate::types::{AppError, AppResult};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

const SESSION_FILE: &str = "session.json";
const ENCRYPTION_KEY_FILE: &str = ".session_key";
const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

fn storage_error(context: &str, e: impl std::fmt::Display) -> AppError {
    AppError::Session(format!("{}: {}", context, e))
}

/// Seals and opens the stored bearer token. Sealed form is
/// `base64(nonce || ciphertext)`.
struct TokenCipher {
    aead: Aes256Gcm,
}

impl TokenCipher {
    fn new(key: &[u8; KEY_SIZE]) -> AppResult<Self> {
        let aead = Aes256Gcm::new_from_slice(key).map_err(|e| storage_error("cipher", e))?;
        Ok(Self { aead })
    }

    fn seal(&self, token: &str) -> AppResult<String> {
        let nonce: [u8; NONCE_SIZE] = rand::random();
        let mut sealed = nonce.to_vec();
        sealed.extend(
            self.aead
                .encrypt(Nonce::from_slice(&nonce), token.as_bytes())
                .map_err(|e| storage_error("encrypting token", e))?,
        );
        Ok(BASE64.encode(sealed))
    }

    fn open(&self, sealed: &str) -> AppResult<String> {
        let raw = BASE64
            .decode(sealed)
            .map_err(|e| storage_error("decoding token", e))?;
        if raw.len() <= NONCE_SIZE {
            return Err(AppError::Session("sealed token is truncated".to_string()));
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);
        let token = self
            .aead
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| storage_error("decrypting token", e))?;
        String::from_utf8(token).map_err(|e| storage_error("decoding token", e))
    }
}

pub struct FileSessionStore {
    session_path: PathBuf,
    key_path: PathBuf,
}

impl FileSessionStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref();
        Self {
            session_path: base_dir.join(SESSION_FILE),
            key_path: base_dir.join(ENCRYPTION_KEY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.session_path
    }

    async fn ensure_dir(&self) -> AppResult<()> {
        if let Some(parent) = self.session_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("creating session directory", e))?;
        }
        Ok(())
    }

    /// Cipher for this device's key, minting the key on first use.
    async fn cipher(&self) -> AppResult<TokenCipher> {
        match self.read_key().await? {
            Some(key) => TokenCipher::new(&key),
            None => TokenCipher::new(&self.mint_key().await?),
        }
    }

    async fn read_key(&self) -> AppResult<Option<[u8; KEY_SIZE]>> {
        let encoded = match fs::read(&self.key_path).await {
            Ok(encoded) => encoded,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("reading session key", e)),
        };

        let key = BASE64
            .decode(&encoded)
            .ok()
            .and_then(|bytes| <[u8; KEY_SIZE]>::try_from(bytes).ok());
        if key.is_none() {
            warn!("Session key file is malformed, replacing it");
        }
        Ok(key)
    }

    async fn mint_key(&self) -> AppResult<[u8; KEY_SIZE]> {
        self.ensure_dir().await?;

        let key: [u8; KEY_SIZE] = rand::random();
        fs::write(&self.key_path, BASE64.encode(key))
            .await
            .map_err(|e| storage_error("writing session key", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.key_path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| storage_error("restricting session key permissions", e))?;
        }

        info!("Generated new session encryption key");
        Ok(key)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> AppResult<Session> {
        let content = match fs::read_to_string(&self.session_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file found");
                return Ok(Session::default());
            }
            Err(e) => return Err(storage_error("reading session", e)),
        };

        let mut session: Session = match serde_json::from_str(&content) {
            Ok(session) => session,
            Err(e) => {
                warn!("Session file is corrupted, starting logged out: {}", e);
                return Ok(Session::default());
            }
        };

        if let Some(cookie) = session.cookie.as_mut() {
            match self.cipher().await?.open(&cookie.token) {
                Ok(token) => cookie.token = token,
                Err(e) => {
                    warn!("Failed to decrypt session token, dropping it: {}", e);
                    session.cookie = None;
                }
            }
        }

        Ok(session)
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        self.ensure_dir().await?;

        let mut stored = session.clone();
        if let Some(cookie) = stored.cookie.as_mut() {
            cookie.token = self.cipher().await?.seal(&cookie.token)?;
        }

        let content = serde_json::to_string_pretty(&stored)
            .map_err(|e| storage_error("encoding session", e))?;
        fs::write(&self.session_path, content)
            .await
            .map_err(|e| storage_error("writing session", e))?;

        debug!("Saved session to {:?}", self.session_path);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.session_path).await {
            Ok(()) => {
                info!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("removing session", e)),
        }
    }
}
