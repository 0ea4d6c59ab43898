//! Relay-side protocol for end-to-end encrypted two-party messaging.
//!
//! Provides:
//! - Transport record codec with an explicit scheme tag
//! - Per-message decrypt/verify pipeline with parallel batch processing
//! - Directory and local key store collaborators
//! - Registration, explicit key reset and sign-out
//! - Compose flow and conversation bookkeeping
//! - Push-feed consumer with stale-session discard

pub mod account;
pub mod codec;
pub mod compose;
pub mod config;
pub mod conversation;
pub mod directory;
pub mod error;
pub mod feed;
pub mod key_store;
pub mod pipeline;
pub mod types;

pub use compose::{ComposeRequest, compose_message};
pub use config::RelayConfig;
pub use conversation::{Conversation, ConversationIndex};
pub use directory::{Directory, InMemoryDirectory};
pub use error::{CodecError, RelayError, RelayResult};
pub use feed::{ConversationFeed, FeedHandle, FeedUpdate, SessionEpoch, create_conversation_feed};
pub use key_store::{FileKeyStore, InMemoryKeyStore, LocalKeyStore};
pub use pipeline::{DecryptedMessage, DecryptionPipeline, MessageOutcome, PipelineState, ViewerRole};
pub use types::*;

use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber writing to stderr.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Calling this more
/// than once is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();
}
