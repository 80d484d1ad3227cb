pub mod category;
pub mod message;
pub mod money;
pub mod transaction;

pub use category::Category;
pub use message::{MessageStatus, MessageStore, NewMessage, SmsRecord, StoredMessage};
pub use money::{Currency, Money};
pub use transaction::TransactionFields;
