//! Wallet and ledger types
//!
//! A wallet is a set of running balances per user; it is only ever mutated
//! through ledger transactions, which are immutable append-only records.

use serde::{Deserialize, Serialize};

/// Per-user running balances, all in cents
///
/// Created lazily on first credit or debt - never implicitly on read,
/// never deleted. A driver's withdrawable amount is conceptually
/// `balance - cash_owed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    /// Owner (business, driver, or platform holding account)
    pub user_id: String,
    /// Withdrawable balance
    pub balance: i64,
    /// Reserved, not yet withdrawable (moved by the payout collaborator)
    pub pending_balance: i64,
    /// Cash collected on delivery that is owed back to the platform
    pub cash_owed: i64,
    /// Lifetime credit sum
    pub total_earned: i64,
    /// Lifetime withdrawal sum
    pub total_withdrawn: i64,
}

impl Wallet {
    /// Zero-initialized wallet for a user
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            balance: 0,
            pending_balance: 0,
            cash_owed: 0,
            total_earned: 0,
            total_withdrawn: 0,
        }
    }

    /// Amount actually available for payout
    pub fn withdrawable(&self) -> i64 {
        self.balance - self.cash_owed
    }
}

/// Ledger entry type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Earnings credited as withdrawable balance
    Income,
    /// Driver commission kept out of cash collected at the door
    CashIncome,
    /// Debt owed to the platform for cash collected beyond commission
    CashDebt,
    /// Payout to the user's bank account
    Withdrawal,
    /// Administrative clearing of cash debt
    CashSettlement,
}

impl TransactionType {
    /// Income-family entries add to `balance` and are settlement-unique
    /// per `(order_id, user_id, type)`
    pub fn is_income(&self) -> bool {
        matches!(self, TransactionType::Income | TransactionType::CashIncome)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TransactionType::Income => "INCOME",
            TransactionType::CashIncome => "CASH_INCOME",
            TransactionType::CashDebt => "CASH_DEBT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::CashSettlement => "CASH_SETTLEMENT",
        };
        write!(f, "{}", label)
    }
}

/// Ledger entry status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[default]
    Completed,
    Pending,
    Failed,
}

/// Immutable ledger entry
///
/// Appended exactly once per wallet-affecting event, never mutated or
/// deleted. Amounts are unsigned magnitudes; the type says which balance
/// they move and in which direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletTransaction {
    pub id: String,
    pub user_id: String,
    /// Order that produced this entry (None for payouts and admin ops)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub tx_type: TransactionType,
    /// Amount in cents
    pub amount: i64,
    pub description: String,
    pub status: TransactionStatus,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_lazily_zeroed() {
        let wallet = Wallet::new("driver-1");
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.cash_owed, 0);
        assert_eq!(wallet.withdrawable(), 0);
    }

    #[test]
    fn test_withdrawable_subtracts_cash_debt() {
        let mut wallet = Wallet::new("driver-1");
        wallet.balance = 5000;
        wallet.cash_owed = 1200;
        assert_eq!(wallet.withdrawable(), 3800);
    }

    #[test]
    fn test_income_family() {
        assert!(TransactionType::Income.is_income());
        assert!(TransactionType::CashIncome.is_income());
        assert!(!TransactionType::CashDebt.is_income());
        assert!(!TransactionType::Withdrawal.is_income());
    }
}
