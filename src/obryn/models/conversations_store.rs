use std::sync::Arc;

use tracing::{debug, warn};

use super::conversation::{Conversation, LearnLanguage};
use crate::obryn::repositories::{RepositoryResult, SnapshotRepository, StoreSnapshot};

/// Single source of truth for all conversations and the active pointer.
///
/// Conversations keep list order: the newest is prepended. All mutation goes
/// through this type so the persisted snapshot never diverges from memory.
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
    repository: Arc<dyn SnapshotRepository>,
}

impl ConversationStore {
    pub fn new(repository: Arc<dyn SnapshotRepository>) -> Self {
        Self {
            conversations: Vec::new(),
            active_id: None,
            repository,
        }
    }

    /// Restore conversations and the last-active id from storage.
    ///
    /// Fails soft: an unreadable snapshot is treated as empty state. An empty
    /// store is healed by creating one default chat conversation and making
    /// it active.
    pub async fn load(&mut self) -> RepositoryResult<()> {
        let snapshot = match self.repository.load().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "Could not load snapshot, starting empty");
                StoreSnapshot::default()
            }
        };

        self.conversations = snapshot.conversations;

        // The pointer must reference an existing conversation
        self.active_id = snapshot
            .active_id
            .filter(|id| self.conversations.iter().any(|c| c.id() == *id))
            .or_else(|| self.conversations.first().map(|c| c.id().to_string()));

        if self.conversations.is_empty() {
            debug!("Empty store on load, creating default conversation");
            self.create_chat();
            self.persist().await?;
        }

        Ok(())
    }

    /// Create a plain chat conversation, prepend it and make it active.
    pub fn create_chat(&mut self) -> String {
        self.insert_active(Conversation::new_chat())
    }

    /// Create a language-learning conversation, prepend it and make it active.
    pub fn create_learn(&mut self, language: LearnLanguage) -> String {
        self.insert_active(Conversation::new_learn(language))
    }

    fn insert_active(&mut self, conversation: Conversation) -> String {
        let id = conversation.id().to_string();
        self.conversations.insert(0, conversation);
        self.active_id = Some(id.clone());
        id
    }

    /// Set the active conversation. A stale id is a benign no-op.
    pub fn select_conversation(&mut self, id: &str) -> bool {
        if self.conversations.iter().any(|c| c.id() == id) {
            self.active_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Delete a conversation. If it was active, the first remaining
    /// conversation (by list order) becomes active, or none.
    pub fn delete_conversation(&mut self, id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id() != id);
        let removed = self.conversations.len() != before;

        if removed && self.active_id.as_deref() == Some(id) {
            self.active_id = self.conversations.first().map(|c| c.id().to_string());
        }

        removed
    }

    /// Append a user message, returning its id. The conversation's first
    /// message also sets the title (see [`Conversation::record_user_message`]).
    pub fn append_user_message(&mut self, conversation_id: &str, text: &str) -> Option<String> {
        let conversation = self.get_mut(conversation_id)?;
        Some(conversation.record_user_message(text).id().to_string())
    }

    /// Append an assistant message, returning its id.
    pub fn append_assistant_message(
        &mut self,
        conversation_id: &str,
        text: &str,
    ) -> Option<String> {
        let conversation = self.get_mut(conversation_id)?;
        Some(conversation.record_assistant_message(text).id().to_string())
    }

    /// Remove one message. No cascading effects.
    pub fn delete_message(&mut self, conversation_id: &str, message_id: &str) -> bool {
        match self.get_mut(conversation_id) {
            Some(conversation) => conversation.delete_message(message_id),
            None => false,
        }
    }

    /// Replace one message's content. Role-agnostic at this level.
    pub fn edit_message(
        &mut self,
        conversation_id: &str,
        message_id: &str,
        new_content: &str,
    ) -> bool {
        match self.get_mut(conversation_id) {
            Some(conversation) => conversation.edit_message(message_id, new_content),
            None => false,
        }
    }

    /// Serialize the full list and active id to storage. Called after every
    /// mutating operation so a crash loses at most the in-flight change.
    pub async fn persist(&self) -> RepositoryResult<()> {
        self.repository
            .save(StoreSnapshot {
                conversations: self.conversations.clone(),
                active_id: self.active_id.clone(),
            })
            .await
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id() == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn count(&self) -> usize {
        self.conversations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obryn::models::conversation::{ConversationKind, DEFAULT_CHAT_TITLE};
    use crate::obryn::repositories::InMemorySnapshotRepository;

    fn store() -> ConversationStore {
        ConversationStore::new(Arc::new(InMemorySnapshotRepository::new()))
    }

    fn assert_pointer_valid(store: &ConversationStore) {
        match store.active_id() {
            Some(id) => assert!(store.get(id).is_some(), "active pointer is dangling"),
            None => {}
        }
    }

    #[test]
    fn new_conversation_is_prepended_and_active() {
        let mut store = store();
        let first = store.create_chat();
        let second = store.create_learn(LearnLanguage::French);

        assert_eq!(store.conversations()[0].id(), second);
        assert_eq!(store.conversations()[1].id(), first);
        assert_eq!(store.active_id(), Some(second.as_str()));
        assert_eq!(store.conversations()[0].title(), "Français 배우기");
    }

    #[test]
    fn active_pointer_survives_create_delete_sequences() {
        let mut store = store();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(store.create_chat());
            assert_pointer_valid(&store);
        }
        for id in ids {
            store.delete_conversation(&id);
            assert_pointer_valid(&store);
        }
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn deleting_active_selects_first_remaining() {
        let mut store = store();
        let c = store.create_chat();
        let b = store.create_chat();
        let a = store.create_chat();
        // list order is [a, b, c], active = a

        assert!(store.delete_conversation(&a));
        assert_eq!(store.active_id(), Some(b.as_str()));
        assert_eq!(store.conversations()[0].id(), b);
        assert_eq!(store.conversations()[1].id(), c);
    }

    #[test]
    fn deleting_active_of_two_selects_the_other() {
        let mut store = store();
        let b = store.create_chat();
        let a = store.create_chat();
        // [A, B], active = A

        assert!(store.delete_conversation(&a));
        assert_eq!(store.active_id(), Some(b.as_str()));
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn deleting_inactive_keeps_pointer() {
        let mut store = store();
        let b = store.create_chat();
        let a = store.create_chat();

        assert!(store.delete_conversation(&b));
        assert_eq!(store.active_id(), Some(a.as_str()));
    }

    #[test]
    fn select_unknown_id_is_noop() {
        let mut store = store();
        let id = store.create_chat();
        assert!(!store.select_conversation("missing"));
        assert_eq!(store.active_id(), Some(id.as_str()));
    }

    #[test]
    fn operations_on_unknown_conversation_signal_not_found() {
        let mut store = store();
        assert!(store.append_user_message("missing", "hi").is_none());
        assert!(store.append_assistant_message("missing", "hi").is_none());
        assert!(!store.delete_message("missing", "m"));
        assert!(!store.edit_message("missing", "m", "x"));
        assert!(!store.delete_conversation("missing"));
    }

    #[test]
    fn first_user_message_sets_title_via_store() {
        let mut store = store();
        let id = store.create_chat();
        let input: String = "x".repeat(45);
        store.append_user_message(&id, &input).unwrap();

        let title = store.get(&id).unwrap().title();
        assert_eq!(title.chars().count(), 30);
        assert!(input.starts_with(title));
    }

    #[tokio::test]
    async fn empty_store_on_load_heals_with_default_chat() {
        let repo = Arc::new(InMemorySnapshotRepository::new());
        let mut store = ConversationStore::new(repo.clone());
        store.load().await.unwrap();

        assert_eq!(store.count(), 1);
        let conversation = &store.conversations()[0];
        assert_eq!(conversation.kind(), ConversationKind::Chat);
        assert_eq!(conversation.title(), DEFAULT_CHAT_TITLE);
        assert_eq!(store.active_id(), Some(conversation.id()));

        // The healed state was persisted too
        assert_eq!(repo.saved().conversations.len(), 1);
    }

    #[tokio::test]
    async fn persist_then_load_round_trips_identically() {
        let repo = Arc::new(InMemorySnapshotRepository::new());

        let mut store = ConversationStore::new(repo.clone());
        let learn = store.create_learn(LearnLanguage::Korean);
        let chat = store.create_chat();
        store.append_user_message(&chat, "hello").unwrap();
        store.append_assistant_message(&chat, "hi!").unwrap();
        store.select_conversation(&learn);
        store.persist().await.unwrap();

        let mut reloaded = ConversationStore::new(repo);
        reloaded.load().await.unwrap();

        assert_eq!(reloaded.conversations(), store.conversations());
        assert_eq!(reloaded.active_id(), Some(learn.as_str()));
    }

    #[tokio::test]
    async fn load_drops_dangling_active_pointer() {
        let repo = Arc::new(InMemorySnapshotRepository::new());
        let conversation = Conversation::new_chat();
        let kept = conversation.id().to_string();
        repo.save(StoreSnapshot {
            conversations: vec![conversation],
            active_id: Some("deleted-long-ago".to_string()),
        })
        .await
        .unwrap();

        let mut store = ConversationStore::new(repo);
        store.load().await.unwrap();
        assert_eq!(store.active_id(), Some(kept.as_str()));
    }
}
