use momo_core::{Category, Currency, Money};
use momo_extract::Extractor;

const SAMPLES: &[&str] = &[
    "You have received 2000 RWF from Jane Smith (*********013) on your mobile money account at 2024-05-10 16:30:51. Message from sender: . Your new balance:2000 RWF. Financial Transaction Id: 76662021700.",
    "TxId: 73214484437. Your payment of 1,500 RWF to Jane Smith 12845 has been completed at 2024-05-10 16:31:39. Your new balance: 1,500 RWF. Fee was 0 RWF.",
    "*165*S*10000 RWF transferred to Samuel Carter (250791666666) from 36521838 at 2024-05-11 20:34:47 . Fee was: 100 RWF. New balance: 28300 RWF.",
    "You Alex Doe (*********036) have via agent: Agent Sophia (250790777777), withdrawn 20000 RWF from your mobile money account: 36521838 at 2024-05-26 02:10:27 and you can now collect your money in cash. Your new balance: 6400 RWF. Fee paid: 350 RWF. Financial Transaction Id: 14098463509.",
    "*162*TxId:13913173274*S*Your payment of 3000 RWF to Airtime with token  has been completed at 2024-05-12 11:41:28. Fee was 0 RWF. Your new balance: 25280 RWF . Message: - -. *EN#",
    "",
];

#[test]
fn incoming_money_scenario() {
    let body = "You have received 5,000 RWF from Jane Doe (250788123456) ... New balance: 20,000 RWF";
    let (category, f) = Extractor::classify(body);
    assert_eq!(category, Category::IncomingMoney);
    assert_eq!(f.amount, Some(Money::from_cents(500_000)));
    assert_eq!(f.currency(), Some(Currency::Rwf));
    assert_eq!(f.new_balance, Some(Money::from_cents(2_000_000)));
    assert_eq!(f.recipient_name.as_deref(), Some("Jane Doe"));
    assert_eq!(f.recipient_phone.as_deref(), Some("250788123456"));
}

#[test]
fn transaction_id_and_fee_without_keywords() {
    let (category, f) = Extractor::classify("TxID: 987654321. Fee: 50 RWF.");
    assert_eq!(category, Category::Other);
    assert_eq!(f.transaction_id.as_deref(), Some("987654321"));
    assert_eq!(f.fee, Some(Money::from_cents(5_000)));
}

#[test]
fn empty_body_yields_other_and_no_fields() {
    let (category, f) = Extractor::classify("");
    assert_eq!(category, Category::Other);
    assert_eq!(f.amount, None);
    assert_eq!(f.currency(), None);
    assert_eq!(f.new_balance, None);
    assert_eq!(f.fee, None);
    assert_eq!(f.transaction_id, None);
    assert_eq!(f.recipient_name, None);
    assert_eq!(f.recipient_phone, None);
}

#[test]
fn otp_and_airtime_resolves_to_airtime() {
    let (category, _) = Extractor::classify("Your OTP for the airtime purchase is 5521");
    assert_eq!(category, Category::AirtimeBillPayments);
}

#[test]
fn withdrawn_and_airtime_resolves_to_withdrawal() {
    let (category, _) = Extractor::classify("You have withdrawn 1000 RWF; airtime bonus applied");
    assert_eq!(category, Category::WithdrawalsFromAgents);
}

#[test]
fn payment_notification() {
    let (category, f) = Extractor::classify(SAMPLES[1]);
    assert_eq!(category, Category::PaymentsToCodeHolders);
    assert_eq!(f.amount, Some(Money::from_cents(150_000)));
    assert_eq!(f.new_balance, Some(Money::from_cents(150_000)));
    assert_eq!(f.transaction_id.as_deref(), Some("73214484437"));
    assert_eq!(f.recipient_name.as_deref(), Some("Jane Smith"));
    assert_eq!(f.fee, None);
}

#[test]
fn transfer_notification() {
    let (category, f) = Extractor::classify(SAMPLES[2]);
    assert_eq!(category, Category::TransfersToMobileNumbers);
    assert_eq!(f.amount, Some(Money::from_cents(1_000_000)));
    // "Fee was: 100 RWF" has a word between the label and the number.
    assert_eq!(f.fee, None);
    assert_eq!(f.new_balance, Some(Money::from_cents(2_830_000)));
    assert_eq!(f.recipient_name.as_deref(), Some("Samuel Carter"));
    assert_eq!(f.recipient_phone.as_deref(), Some("250791666666"));
}

#[test]
fn withdrawal_notification() {
    let (category, f) = Extractor::classify(SAMPLES[3]);
    assert_eq!(category, Category::WithdrawalsFromAgents);
    assert_eq!(f.amount, Some(Money::from_cents(2_000_000)));
    assert_eq!(f.fee, None);
    assert_eq!(f.new_balance, Some(Money::from_cents(640_000)));
    assert_eq!(f.transaction_id.as_deref(), Some("14098463509"));
    assert_eq!(f.recipient_phone.as_deref(), Some("250790777777"));
}

#[test]
fn payment_to_airtime_is_a_code_holder_payment() {
    // The payment rule sits above the airtime rule.
    let (category, f) = Extractor::classify(SAMPLES[4]);
    assert_eq!(category, Category::PaymentsToCodeHolders);
    assert_eq!(f.transaction_id.as_deref(), Some("13913173274"));
    assert_eq!(f.amount, Some(Money::from_cents(300_000)));
}

#[test]
fn amount_and_currency_always_travel_together() {
    for body in SAMPLES.iter().chain(["no money here", "50 rwf", "RWF 50"].iter()) {
        let (_, f) = Extractor::classify(body);
        assert_eq!(f.amount.is_some(), f.currency().is_some(), "body: {body}");
    }
}

#[test]
fn names_are_never_short_or_numeric() {
    for body in SAMPLES {
        if let Some(name) = Extractor::classify(body).1.recipient_name {
            assert!(name.chars().count() > 2, "name {name:?}");
            assert!(!name.chars().all(|c| c.is_ascii_digit()), "name {name:?}");
            assert_eq!(name.trim(), name);
        }
    }
}

#[test]
fn classify_is_idempotent() {
    for body in SAMPLES {
        assert_eq!(Extractor::classify(body), Extractor::classify(body));
    }
}

#[test]
fn classify_from_many_threads() {
    let expected: Vec<_> = SAMPLES.iter().map(|b| Extractor::classify(b)).collect();
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| SAMPLES.iter().map(|b| Extractor::classify(b)).collect::<Vec<_>>()))
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
