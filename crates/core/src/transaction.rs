use super::money::{Currency, Money};

/// Structured values pulled out of one message body. Every field is
/// independent and may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFields {
    pub amount: Option<Money>,
    pub new_balance: Option<Money>,
    pub fee: Option<Money>,
    pub transaction_id: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_phone: Option<String>,
}

impl TransactionFields {
    /// Currency of `amount`. Present exactly when an amount is.
    pub fn currency(&self) -> Option<Currency> {
        self.amount.map(|_| Currency::Rwf)
    }

    pub fn is_empty(&self) -> bool {
        *self == TransactionFields::default()
    }
}
