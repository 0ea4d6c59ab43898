//! Push-feed consumer.
//!
//! The channel delivers the full ordered record set of a conversation on
//! every update. The feed decrypts each batch off the async runtime and
//! publishes the resulting view, which replaces whatever was shown before.

use crate::config::RelayConfig;
use crate::directory::Directory;
use crate::error::{RelayError, RelayResult};
use crate::key_store::{LocalKeyStore, require_private_key};
use crate::pipeline::{DecryptedMessage, DecryptionPipeline};
use crate::types::TransportRecord;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Counter identifying the current local session.
///
/// Bumped on sign-out. Results computed under an older value are stale and
/// must not be shown.
#[derive(Clone, Debug, Default)]
pub struct SessionEpoch(Arc<AtomicU64>);

impl SessionEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Ends the current session and returns its value.
    pub fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }
}

/// Commands accepted by a running feed.
#[derive(Debug)]
pub enum FeedCommand {
    Stop,
}

/// What the feed publishes for each delivered batch.
#[derive(Debug)]
pub enum FeedUpdate {
    /// Replacement view, in delivery order.
    Messages(Vec<DecryptedMessage>),
    /// The read action failed as a whole (no local private key). The
    /// previous view stays as it was.
    ReadFailed(RelayError),
}

/// Handle for sending commands to a running feed.
#[derive(Clone)]
pub struct FeedHandle {
    command_tx: mpsc::Sender<FeedCommand>,
}

impl FeedHandle {
    pub async fn stop(&self) -> RelayResult<()> {
        self.command_tx
            .send(FeedCommand::Stop)
            .await
            .map_err(|_| RelayError::FeedClosed)
    }
}

/// Consumes record batches for one viewer and publishes decrypted views.
pub struct ConversationFeed {
    viewer_id: String,
    directory: Arc<dyn Directory>,
    key_store: Arc<dyn LocalKeyStore>,
    config: RelayConfig,
    epoch: SessionEpoch,
    command_rx: mpsc::Receiver<FeedCommand>,
    batch_rx: mpsc::Receiver<Vec<TransportRecord>>,
    update_tx: mpsc::Sender<FeedUpdate>,
}

/// Creates a feed, its command handle and the sender the channel pushes
/// batches into.
///
/// The feed stops on [`FeedHandle::stop`], when every batch sender or every
/// handle is dropped, or when `update_tx`'s receiver goes away.
pub fn create_conversation_feed(
    viewer_id: impl Into<String>,
    directory: Arc<dyn Directory>,
    key_store: Arc<dyn LocalKeyStore>,
    config: RelayConfig,
    epoch: SessionEpoch,
    update_tx: mpsc::Sender<FeedUpdate>,
) -> (FeedHandle, mpsc::Sender<Vec<TransportRecord>>, ConversationFeed) {
    let (command_tx, command_rx) = mpsc::channel(8);
    let (batch_tx, batch_rx) = mpsc::channel(config.feed_buffer.max(1));

    let feed = ConversationFeed {
        viewer_id: viewer_id.into(),
        directory,
        key_store,
        config,
        epoch,
        command_rx,
        batch_rx,
        update_tx,
    };

    (FeedHandle { command_tx }, batch_tx, feed)
}

impl ConversationFeed {
    /// Runs the feed loop until stopped.
    pub async fn run(&mut self) {
        info!(viewer = %self.viewer_id, "conversation feed started");

        loop {
            tokio::select! {
                batch = self.batch_rx.recv() => {
                    match batch {
                        Some(records) => {
                            if let Err(e) = self.handle_batch(records).await {
                                info!("stopping feed: {e}");
                                break;
                            }
                        }
                        None => {
                            info!("batch channel closed, stopping feed");
                            break;
                        }
                    }
                }
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(FeedCommand::Stop) => {
                            info!("conversation feed stopping");
                            break;
                        }
                        None => {
                            info!("command channel closed, stopping feed");
                            break;
                        }
                    }
                }
            }
        }

        info!(viewer = %self.viewer_id, "conversation feed stopped");
    }

    /// Decrypts one batch and publishes it unless the session ended while it
    /// was being processed. Fails only when nobody is listening anymore.
    async fn handle_batch(&mut self, records: Vec<TransportRecord>) -> RelayResult<()> {
        let session = self.epoch.current();
        let count = records.len();

        let viewer_id = self.viewer_id.clone();
        let directory = Arc::clone(&self.directory);
        let key_store = Arc::clone(&self.key_store);
        let config = self.config.clone();

        let joined = tokio::task::spawn_blocking(move || -> RelayResult<Vec<DecryptedMessage>> {
            let private_key = require_private_key(key_store.as_ref())?;
            Ok(DecryptionPipeline::new(&viewer_id, directory.as_ref(), &config)
                .process_batch(&records, &private_key))
        })
        .await;

        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                error!("decrypt task failed: {e}");
                return Ok(());
            }
        };

        if self.epoch.current() != session {
            debug!(session, count, "discarding batch from ended session");
            return Ok(());
        }

        let update = match result {
            Ok(messages) => {
                debug!(count, "publishing conversation view");
                FeedUpdate::Messages(messages)
            }
            Err(e) => {
                warn!("read failed: {e}");
                FeedUpdate::ReadFailed(e)
            }
        };

        self.update_tx
            .send(update)
            .await
            .map_err(|_| RelayError::FeedClosed)
    }
}
