pub mod exchange;
pub mod music;
pub mod notification;
pub mod response_generator;
pub mod vision;
pub mod voice;

pub use exchange::{ExchangeError, MessageExchange};
pub use notification::{Notifier, TerminalBellNotifier};
pub use response_generator::{GenerateRequest, GeneratorError, HttpResponseGenerator, ResponseGenerator};
