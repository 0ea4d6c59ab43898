//! Local storage for the viewing principal's own private key.
//!
//! Each `get` hands out a fresh [`PrivateKey`] handle which the caller drops
//! (and thereby wipes) as soon as its sign/unwrap call is done. The messaging
//! paths only read from the store; `set` and `clear` belong to registration
//! and sign-out.

use crate::error::{RelayError, RelayResult};
use courier_crypto::PrivateKey;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zeroize::Zeroizing;

/// Storage for one private key bundle.
pub trait LocalKeyStore: Send + Sync {
    /// Returns the stored key, or `None` if nothing is stored.
    fn get(&self) -> RelayResult<Option<PrivateKey>>;

    fn set(&self, key: &PrivateKey) -> RelayResult<()>;

    fn clear(&self) -> RelayResult<()>;
}

/// Reads the private key, failing with [`RelayError::MissingPrivateKey`]
/// when the store is empty.
pub fn require_private_key(store: &dyn LocalKeyStore) -> RelayResult<PrivateKey> {
    store.get()?.ok_or(RelayError::MissingPrivateKey)
}

/// Key store that lives only as long as the process.
#[derive(Default)]
pub struct InMemoryKeyStore {
    encoded: Mutex<Option<Zeroizing<String>>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalKeyStore for InMemoryKeyStore {
    fn get(&self) -> RelayResult<Option<PrivateKey>> {
        let guard = self.encoded.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard
            .as_ref()
            .map(|text| PrivateKey::from_base64(text).map_err(RelayError::from))
            .transpose()
    }

    fn set(&self, key: &PrivateKey) -> RelayResult<()> {
        *self.encoded.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) =
            Some(key.to_base64());
        Ok(())
    }

    fn clear(&self) -> RelayResult<()> {
        self.encoded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        Ok(())
    }
}

/// Key store backed by a single file holding the base64 bundle.
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalKeyStore for FileKeyStore {
    fn get(&self) -> RelayResult<Option<PrivateKey>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => {
                let text = Zeroizing::new(text);
                Ok(Some(PrivateKey::from_base64(&text)?))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &PrivateKey) -> RelayResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(key.to_base64().as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn clear(&self) -> RelayResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
