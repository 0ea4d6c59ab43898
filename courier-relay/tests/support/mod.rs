//! Shared helpers: a directory with registered principals and a send shortcut.
#![allow(dead_code)]

use courier_crypto::PrivateKey;
use courier_relay::account;
use courier_relay::key_store::require_private_key;
use courier_relay::{
    ComposeRequest, InMemoryDirectory, InMemoryKeyStore, RelayConfig, TransportRecord,
    compose_message,
};
use std::sync::Arc;

/// One registered identity with its own local key store.
pub struct Principal {
    pub id: String,
    pub key_store: Arc<InMemoryKeyStore>,
}

impl Principal {
    pub fn private_key(&self) -> PrivateKey {
        require_private_key(self.key_store.as_ref()).expect("registered principal has a key")
    }
}

pub struct World {
    pub directory: Arc<InMemoryDirectory>,
    pub config: RelayConfig,
}

impl World {
    pub fn new() -> Self {
        Self {
            directory: Arc::new(InMemoryDirectory::new()),
            config: RelayConfig::default(),
        }
    }

    pub fn register(&self, id: &str) -> Principal {
        let key_store = Arc::new(InMemoryKeyStore::new());
        account::register(id, self.directory.as_ref(), key_store.as_ref())
            .expect("registration must succeed");
        Principal {
            id: id.to_string(),
            key_store,
        }
    }

    pub fn send(&self, from: &Principal, to: &Principal, text: &str) -> TransportRecord {
        compose_message(
            &ComposeRequest::new(&from.id, &to.id, text),
            self.directory.as_ref(),
            from.key_store.as_ref(),
            &self.config,
        )
        .expect("compose must succeed")
    }
}

/// Routes `tracing` output through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
