pub mod conversation;
pub mod conversations_store;

pub use conversation::{Conversation, ConversationKind, LearnLanguage, Message, MessageRole};
pub use conversations_store::ConversationStore;
