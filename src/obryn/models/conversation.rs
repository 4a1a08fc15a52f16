use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title placeholder for plain chat conversations until the first user
/// message overwrites it.
pub const DEFAULT_CHAT_TITLE: &str = "New Conversation";

/// Maximum length (in characters) of a title derived from the first message.
pub const TITLE_MAX_CHARS: usize = 30;

/// Truncate text to max length
fn truncate_text(text: &str, max_len: usize) -> String {
    text.chars().take(max_len).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Chat,
    Learn,
}

/// Languages offered for language-learning conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearnLanguage {
    English,
    Korean,
    Chinese,
    Spanish,
    French,
    Japanese,
    German,
}

impl LearnLanguage {
    pub const ALL: [LearnLanguage; 7] = [
        LearnLanguage::English,
        LearnLanguage::Korean,
        LearnLanguage::Chinese,
        LearnLanguage::Spanish,
        LearnLanguage::French,
        LearnLanguage::Japanese,
        LearnLanguage::German,
    ];

    /// Stable identifier used on the wire and in persisted snapshots.
    pub fn id(self) -> &'static str {
        match self {
            LearnLanguage::English => "english",
            LearnLanguage::Korean => "korean",
            LearnLanguage::Chinese => "chinese",
            LearnLanguage::Spanish => "spanish",
            LearnLanguage::French => "french",
            LearnLanguage::Japanese => "japanese",
            LearnLanguage::German => "german",
        }
    }

    /// Display name in the language itself.
    pub fn native_name(self) -> &'static str {
        match self {
            LearnLanguage::English => "English",
            LearnLanguage::Korean => "한국어",
            LearnLanguage::Chinese => "中文",
            LearnLanguage::Spanish => "Español",
            LearnLanguage::French => "Français",
            LearnLanguage::Japanese => "日本語",
            LearnLanguage::German => "Deutsch",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|l| l.id() == id)
    }

    /// Title for a new learning conversation, e.g. "한국어 배우기".
    pub fn learn_title(self) -> String {
        format!("{} 배우기", self.native_name())
    }
}

/// A single message within a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: String,
    role: MessageRole,
    content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// A named, ordered collection of messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    title: String,
    messages: Vec<Message>,
    created_at: i64, // Unix timestamp, milliseconds
    kind: ConversationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<LearnLanguage>,
}

impl Conversation {
    /// Create a plain chat conversation with the placeholder title.
    pub fn new_chat() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_CHAT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: Utc::now().timestamp_millis(),
            kind: ConversationKind::Chat,
            language: None,
        }
    }

    /// Create a language-learning conversation titled after the language.
    pub fn new_learn(language: LearnLanguage) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: language.learn_title(),
            messages: Vec::new(),
            created_at: Utc::now().timestamp_millis(),
            kind: ConversationKind::Learn,
            language: Some(language),
        }
    }

    /// Append a user message. The first user message also becomes the title,
    /// truncated to [`TITLE_MAX_CHARS`] characters.
    pub fn record_user_message(&mut self, text: &str) -> &Message {
        if self.messages.is_empty() {
            self.title = truncate_text(text, TITLE_MAX_CHARS);
        }
        self.messages
            .push(Message::new(MessageRole::User, text.to_string()));
        self.messages.last().expect("message was just pushed")
    }

    /// Append an assistant message.
    pub fn record_assistant_message(&mut self, text: &str) -> &Message {
        self.messages
            .push(Message::new(MessageRole::Assistant, text.to_string()));
        self.messages.last().expect("message was just pushed")
    }

    /// Remove a single message. Returns false if the id is unknown.
    pub fn delete_message(&mut self, message_id: &str) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != message_id);
        self.messages.len() != before
    }

    /// Replace the content of a message. Role and id are untouched.
    /// Role-agnostic on purpose: the assistant-only restriction is a policy
    /// check at the interface layer, not a store invariant.
    pub fn edit_message(&mut self, message_id: &str, new_content: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == message_id) {
            Some(message) => {
                message.content = new_content.to_string();
                true
            }
            None => false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> ConversationKind {
        self.kind
    }

    pub fn language(&self) -> Option<LearnLanguage> {
        self.language
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_user_message_becomes_truncated_title() {
        let mut conversation = Conversation::new_chat();
        assert_eq!(conversation.title(), DEFAULT_CHAT_TITLE);

        let input = "a".repeat(45);
        conversation.record_user_message(&input);

        assert_eq!(conversation.title().chars().count(), 30);
        assert!(input.starts_with(conversation.title()));
    }

    #[test]
    fn second_user_message_keeps_title() {
        let mut conversation = Conversation::new_chat();
        conversation.record_user_message("first question");
        conversation.record_assistant_message("answer");
        conversation.record_user_message("second question");

        assert_eq!(conversation.title(), "first question");
    }

    #[test]
    fn learn_conversation_title_uses_native_name() {
        let conversation = Conversation::new_learn(LearnLanguage::Korean);
        assert_eq!(conversation.title(), "한국어 배우기");
        assert_eq!(conversation.kind(), ConversationKind::Learn);
        assert_eq!(conversation.language(), Some(LearnLanguage::Korean));
    }

    #[test]
    fn first_message_overwrites_learn_title_too() {
        let mut conversation = Conversation::new_learn(LearnLanguage::Japanese);
        conversation.record_user_message("こんにちは");
        assert_eq!(conversation.title(), "こんにちは");
    }

    #[test]
    fn edit_message_changes_only_content() {
        let mut conversation = Conversation::new_chat();
        conversation.record_user_message("hello");
        conversation.record_assistant_message("hi there");

        let assistant_id = conversation.messages()[1].id().to_string();
        let user_before = conversation.messages()[0].clone();

        assert!(conversation.edit_message(&assistant_id, "revised"));

        let assistant = &conversation.messages()[1];
        assert_eq!(assistant.id(), assistant_id);
        assert_eq!(assistant.role(), MessageRole::Assistant);
        assert_eq!(assistant.content(), "revised");
        assert_eq!(conversation.messages()[0], user_before);
    }

    #[test]
    fn delete_unknown_message_is_noop() {
        let mut conversation = Conversation::new_chat();
        conversation.record_user_message("hello");
        assert!(!conversation.delete_message("missing"));
        assert_eq!(conversation.message_count(), 1);
    }

    #[test]
    fn language_ids_round_trip() {
        for language in LearnLanguage::ALL {
            assert_eq!(LearnLanguage::parse(language.id()), Some(language));
        }
        assert_eq!(LearnLanguage::parse("klingon"), None);
    }
}
