pub mod obryn;
pub mod settings;

pub use obryn::models::{Conversation, ConversationKind, LearnLanguage, Message, MessageRole};
pub use obryn::models::conversations_store::ConversationStore;
pub use obryn::services::exchange::{ExchangeError, MessageExchange};
