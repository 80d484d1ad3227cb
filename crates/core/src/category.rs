use serde::Serialize;
use std::fmt;

/// Transaction category assigned to a message. Variants are declared in
/// matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Category {
    #[serde(rename = "Incoming Money")]
    IncomingMoney,
    #[serde(rename = "Payments to Code Holders")]
    PaymentsToCodeHolders,
    #[serde(rename = "Bank Deposits")]
    BankDeposits,
    #[serde(rename = "Transfers to Mobile Numbers")]
    TransfersToMobileNumbers,
    #[serde(rename = "Withdrawals from Agents")]
    WithdrawalsFromAgents,
    #[serde(rename = "Airtime Bill Payments")]
    AirtimeBillPayments,
    #[serde(rename = "Cash Power Bill Payments")]
    CashPowerBillPayments,
    #[serde(rename = "Transactions Initiated by Third Parties")]
    ThirdPartyInitiated,
    #[serde(rename = "Direct Payments")]
    DirectPayments,
    #[serde(rename = "Bank Transfers")]
    BankTransfers,
    #[serde(rename = "Internet and Voice Bundle Purchases")]
    BundlePurchases,
    #[default]
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::IncomingMoney,
        Category::PaymentsToCodeHolders,
        Category::BankDeposits,
        Category::TransfersToMobileNumbers,
        Category::WithdrawalsFromAgents,
        Category::AirtimeBillPayments,
        Category::CashPowerBillPayments,
        Category::ThirdPartyInitiated,
        Category::DirectPayments,
        Category::BankTransfers,
        Category::BundlePurchases,
        Category::Other,
    ];

    /// The tag stored in the database and returned by the API.
    pub fn label(self) -> &'static str {
        match self {
            Category::IncomingMoney => "Incoming Money",
            Category::PaymentsToCodeHolders => "Payments to Code Holders",
            Category::BankDeposits => "Bank Deposits",
            Category::TransfersToMobileNumbers => "Transfers to Mobile Numbers",
            Category::WithdrawalsFromAgents => "Withdrawals from Agents",
            Category::AirtimeBillPayments => "Airtime Bill Payments",
            Category::CashPowerBillPayments => "Cash Power Bill Payments",
            Category::ThirdPartyInitiated => "Transactions Initiated by Third Parties",
            Category::DirectPayments => "Direct Payments",
            Category::BankTransfers => "Bank Transfers",
            Category::BundlePurchases => "Internet and Voice Bundle Purchases",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
