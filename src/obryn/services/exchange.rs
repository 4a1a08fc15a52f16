use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use super::notification::Notifier;
use super::response_generator::{GenerateRequest, GeneratorError, HistoryEntry, ResponseGenerator};
use crate::obryn::models::conversations_store::ConversationStore;
use crate::obryn::models::{Conversation, ConversationKind};
use crate::obryn::repositories::RepositoryError;
use crate::settings::repositories::DevSettingsRepository;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("a send is already in flight for this conversation")]
    Busy,

    #[error("conversation not found")]
    NotFound,

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Persist(#[from] RepositoryError),
}

/// Coordinates one round trip: user message in, assistant message out.
///
/// Sends are serialized per conversation: a second send while one is pending
/// for the same conversation is rejected, not queued, which keeps assistant
/// messages in request order.
pub struct MessageExchange {
    store: Arc<AsyncMutex<ConversationStore>>,
    generator: Arc<dyn ResponseGenerator>,
    settings: Arc<dyn DevSettingsRepository>,
    notifier: Arc<dyn Notifier>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Releases the per-conversation send slot on any exit path.
struct InFlightGuard {
    set: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set.lock().remove(&self.id);
    }
}

fn history_entries(conversation: &Conversation) -> Vec<HistoryEntry> {
    conversation
        .messages()
        .iter()
        .map(|m| HistoryEntry {
            role: m.role(),
            content: m.content().to_string(),
        })
        .collect()
}

impl MessageExchange {
    pub fn new(
        store: Arc<AsyncMutex<ConversationStore>>,
        generator: Arc<dyn ResponseGenerator>,
        settings: Arc<dyn DevSettingsRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            generator,
            settings,
            notifier,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn store(&self) -> &Arc<AsyncMutex<ConversationStore>> {
        &self.store
    }

    /// Send `text` in `conversation_id` and return the assistant reply.
    ///
    /// The user message is recorded and persisted before the network call and
    /// is never rolled back. A failed call appends no assistant message.
    pub async fn send(&self, conversation_id: &str, text: &str) -> Result<String, ExchangeError> {
        let _guard = {
            let mut in_flight = self.in_flight.lock();
            if !in_flight.insert(conversation_id.to_string()) {
                return Err(ExchangeError::Busy);
            }
            InFlightGuard {
                set: self.in_flight.clone(),
                id: conversation_id.to_string(),
            }
        };

        // Record the user message first; history for the request is the
        // state before this turn.
        let (history, is_learning, language) = {
            let mut store = self.store.lock().await;
            let conversation = store.get(conversation_id).ok_or(ExchangeError::NotFound)?;
            let is_learning = conversation.kind() == ConversationKind::Learn;
            let language = conversation.language();
            let history = history_entries(conversation);

            store
                .append_user_message(conversation_id, text)
                .ok_or(ExchangeError::NotFound)?;
            store.persist().await?;

            (history, is_learning, language)
        };

        let settings = match self.settings.load().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "Could not load dev settings, using defaults");
                Default::default()
            }
        };

        let request = GenerateRequest::new(
            text.to_string(),
            is_learning,
            language.map(|l| l.id()),
            &settings,
            history,
        );

        let reply = self.generator.generate(request).await?;
        debug!(conversation_id, reply_len = reply.len(), "Assistant reply received");

        {
            let mut store = self.store.lock().await;
            store
                .append_assistant_message(conversation_id, &reply)
                .ok_or(ExchangeError::NotFound)?;
            store.persist().await?;
        }

        // Best-effort cue; a broken notifier never fails the exchange
        if let Err(err) = self.notifier.notify() {
            warn!(error = %err, "Notification failed");
        }

        Ok(reply)
    }
}
