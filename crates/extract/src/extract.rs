use std::sync::OnceLock;

use momo_core::{Category, Currency, Money, TransactionFields};
use regex::Regex;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

/// Digits with optional `,` thousands groups and one optional decimal part.
const NUMBER: &str = r"[0-9]+(?:,[0-9]+)*(?:\.[0-9]+)?";

re!(re_amount,
    &format!(r"(?i)({NUMBER})\s*{}", Currency::Rwf.marker()));
re!(re_balance,
    &format!(r"(?i)(?:new balance|balance)[:\s]*({NUMBER})\s*{}", Currency::Rwf.marker()));
re!(re_fee,
    &format!(r"(?i)fee[:\s]*({NUMBER})\s*{}", Currency::Rwf.marker()));
re!(re_transaction_id,
    r"(?i)(?:txid|transaction id)[:\s]*([0-9]+)");

re!(re_name_to_from,
    r"(?i)(?:to|from)\s+([A-Za-z\s]+?)(?:\s+[0-9]+|\s+\(|$)");
re!(re_name_payment_sent,
    r"(?i)(?:payment|sent).*?to\s+([A-Za-z\s]+?)(?:\s+[0-9]+|\s+has)");
re!(re_name_transferred,
    r"(?i)transferred to\s+([A-Za-z\s]+?)(?:\s+\(|$)");

re!(re_phone,
    r"\(?(250[0-9]{9})\)?");

/// Recipient name candidates, highest priority first.
const NAME_PATTERNS: [fn() -> &'static Regex; 3] =
    [re_name_to_from, re_name_payment_sent, re_name_transferred];

// ── Category rules ───────────────────────────────────────────────────────────

enum Keywords {
    Any(&'static [&'static str]),
    All(&'static [&'static str]),
}

impl Keywords {
    fn matches(&self, lowered: &str) -> bool {
        match self {
            Keywords::Any(words) => words.iter().any(|w| lowered.contains(w)),
            Keywords::All(words) => words.iter().all(|w| lowered.contains(w)),
        }
    }
}

/// Evaluated top to bottom against the lower-cased body; the first hit wins.
const CATEGORY_RULES: &[(Keywords, Category)] = &[
    (Keywords::Any(&["you have received"]), Category::IncomingMoney),
    (Keywords::All(&["your payment", "completed"]), Category::PaymentsToCodeHolders),
    (Keywords::Any(&["bank deposit"]), Category::BankDeposits),
    (Keywords::Any(&["transferred to"]), Category::TransfersToMobileNumbers),
    (Keywords::Any(&["withdrawn"]), Category::WithdrawalsFromAgents),
    (Keywords::Any(&["airtime"]), Category::AirtimeBillPayments),
    (Keywords::Any(&["cash power"]), Category::CashPowerBillPayments),
    (Keywords::Any(&["one-time password", "otp"]), Category::ThirdPartyInitiated),
    (Keywords::Any(&["direct payment"]), Category::DirectPayments),
    (Keywords::Any(&["bank transfer"]), Category::BankTransfers),
    (Keywords::Any(&["internet bundle", "voice bundle"]), Category::BundlePurchases),
];

// ── Public API ────────────────────────────────────────────────────────────────

pub struct Extractor;

impl Extractor {
    /// Categorize a message body and pull out its transaction fields.
    /// Never fails: anything unrecognised is left unset and the category
    /// falls back to [`Category::Other`].
    pub fn classify(body: &str) -> (Category, TransactionFields) {
        (Self::categorize(body), Self::extract_fields(body))
    }

    pub fn categorize(body: &str) -> Category {
        let lowered = body.to_lowercase();
        CATEGORY_RULES
            .iter()
            .find(|(keywords, _)| keywords.matches(&lowered))
            .map_or(Category::Other, |(_, category)| *category)
    }

    pub fn extract_fields(body: &str) -> TransactionFields {
        TransactionFields {
            amount: Self::extract_amount(body),
            new_balance: labeled_money(re_balance(), body),
            fee: labeled_money(re_fee(), body),
            transaction_id: Self::extract_transaction_id(body),
            recipient_name: Self::extract_recipient_name(body),
            recipient_phone: Self::extract_recipient_phone(body),
        }
    }

    // ── Amounts ───────────────────────────────────────────────────────────────

    fn extract_amount(text: &str) -> Option<Money> {
        labeled_money(re_amount(), text)
    }

    // ── Identifiers ──────────────────────────────────────────────────────────

    fn extract_transaction_id(text: &str) -> Option<String> {
        let c = re_transaction_id().captures(text)?;
        Some(c.get(1)?.as_str().to_string())
    }

    fn extract_recipient_phone(text: &str) -> Option<String> {
        re_phone()
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .find(|m| is_whole_digit_run(text, m.start(), m.end()))
            .map(|m| m.as_str().to_string())
    }

    // ── Recipient name ───────────────────────────────────────────────────────

    fn extract_recipient_name(text: &str) -> Option<String> {
        NAME_PATTERNS.iter().find_map(|re| {
            let name = re().captures(text)?.get(1)?.as_str().trim();
            is_plausible_name(name).then(|| name.to_string())
        })
    }
}

/// Convenience wrapper around [`Extractor::classify`].
pub fn classify(body: &str) -> (Category, TransactionFields) {
    Extractor::classify(body)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn labeled_money(re: &Regex, text: &str) -> Option<Money> {
    let c = re.captures(text)?;
    Money::parse(c.get(1)?.as_str())
}

fn is_plausible_name(name: &str) -> bool {
    name.chars().count() > 2 && !name.chars().all(|c| c.is_ascii_digit())
}

/// The digits in `text[start..end]` are not part of a longer digit run.
fn is_whole_digit_run(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].bytes().next_back();
    let after = text[end..].bytes().next();
    !before.is_some_and(|b| b.is_ascii_digit()) && !after.is_some_and(|b| b.is_ascii_digit())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
