//! Ledger operations over wallets
//!
//! The idempotency check here is the single most important correctness
//! property of the settlement core: before any settlement credit or debt
//! is posted, the `(order_id, user_id, type)` settlement index is
//! consulted inside the same write transaction. A hit means the entry was
//! already posted - the existing entry is returned and no balance moves.

use crate::store::{MarketStorage, StorageError};
use redb::WriteTransaction;
use shared::wallet::{TransactionStatus, TransactionType, Wallet, WalletTransaction};
use thiserror::Error;

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Ledger amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("{0:?} is not a settlement credit type")]
    InvalidCreditType(TransactionType),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Withdrawal of {requested} exceeds withdrawable {available} (balance minus cash owed)")]
    WithdrawalExceedsAvailable { requested: i64, available: i64 },

    #[error("Cash settlement of {requested} exceeds outstanding debt {owed}")]
    SettlementExceedsDebt { requested: i64, owed: i64 },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Wallet ledger over marketplace storage
#[derive(Clone)]
pub struct WalletLedger {
    storage: MarketStorage,
}

impl WalletLedger {
    pub fn new(storage: MarketStorage) -> Self {
        Self { storage }
    }

    /// Load-or-initialize a wallet inside a write transaction
    ///
    /// Wallets come into existence on first credit or debt, never on read.
    fn load_or_init(&self, txn: &WriteTransaction, user_id: &str) -> LedgerResult<Wallet> {
        Ok(self
            .storage
            .load_wallet(txn, user_id)?
            .unwrap_or_else(|| Wallet::new(user_id)))
    }

    /// Post a settlement credit: balance and lifetime earnings go up
    ///
    /// Idempotent per `(order_id, user_id, type)`. A repeated call returns
    /// the previously posted entry untouched.
    pub fn credit(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
        amount: i64,
        order_id: &str,
        tx_type: TransactionType,
        description: impl Into<String>,
        now: i64,
    ) -> LedgerResult<WalletTransaction> {
        if !tx_type.is_income() {
            return Err(LedgerError::InvalidCreditType(tx_type));
        }
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let type_key = tx_type.to_string();
        if let Some(existing_id) =
            self.storage
                .settlement_index_get(txn, order_id, user_id, &type_key)?
        {
            tracing::warn!(
                order_id = %order_id,
                user_id = %user_id,
                tx_type = %type_key,
                "Duplicate settlement credit suppressed"
            );
            return self
                .storage
                .load_transaction(txn, &existing_id)?
                .ok_or(LedgerError::Storage(StorageError::TransactionNotFound(
                    existing_id,
                )));
        }

        let entry = WalletTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            order_id: Some(order_id.to_string()),
            tx_type,
            amount,
            description: description.into(),
            status: TransactionStatus::Completed,
            created_at: now,
        };
        self.storage.store_transaction(txn, &entry)?;
        self.storage
            .settlement_index_insert(txn, order_id, user_id, &type_key, &entry.id)?;

        let mut wallet = self.load_or_init(txn, user_id)?;
        wallet.balance += amount;
        wallet.total_earned += amount;
        self.storage.store_wallet(txn, &wallet)?;

        Ok(entry)
    }

    /// Record a cash-collection debt: `cash_owed` goes up, balance untouched
    ///
    /// Same idempotency key scheme as `credit`.
    pub fn record_debt(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
        amount: i64,
        order_id: &str,
        description: impl Into<String>,
        now: i64,
    ) -> LedgerResult<WalletTransaction> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let type_key = TransactionType::CashDebt.to_string();
        if let Some(existing_id) =
            self.storage
                .settlement_index_get(txn, order_id, user_id, &type_key)?
        {
            tracing::warn!(
                order_id = %order_id,
                user_id = %user_id,
                "Duplicate cash debt suppressed"
            );
            return self
                .storage
                .load_transaction(txn, &existing_id)?
                .ok_or(LedgerError::Storage(StorageError::TransactionNotFound(
                    existing_id,
                )));
        }

        let entry = WalletTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            order_id: Some(order_id.to_string()),
            tx_type: TransactionType::CashDebt,
            amount,
            description: description.into(),
            status: TransactionStatus::Completed,
            created_at: now,
        };
        self.storage.store_transaction(txn, &entry)?;
        self.storage
            .settlement_index_insert(txn, order_id, user_id, &type_key, &entry.id)?;

        let mut wallet = self.load_or_init(txn, user_id)?;
        wallet.cash_owed += amount;
        self.storage.store_wallet(txn, &wallet)?;

        Ok(entry)
    }

    /// Record a payout, refusing anything that would take
    /// `balance - cash_owed` below zero
    ///
    /// The payout transfer itself is the external collaborator's job; this
    /// only moves the books.
    pub fn record_withdrawal(
        &self,
        user_id: &str,
        amount: i64,
        description: impl Into<String>,
    ) -> LedgerResult<WalletTransaction> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let txn = self.storage.begin_write()?;
        let mut wallet = self
            .storage
            .load_wallet(&txn, user_id)?
            .ok_or_else(|| LedgerError::WalletNotFound(user_id.to_string()))?;

        let available = wallet.withdrawable();
        if amount > available {
            return Err(LedgerError::WithdrawalExceedsAvailable {
                requested: amount,
                available,
            });
        }

        let entry = WalletTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            order_id: None,
            tx_type: TransactionType::Withdrawal,
            amount,
            description: description.into(),
            status: TransactionStatus::Completed,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.storage.store_transaction(&txn, &entry)?;

        wallet.balance -= amount;
        wallet.total_withdrawn += amount;
        self.storage.store_wallet(&txn, &wallet)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(user_id = %user_id, amount, "Withdrawal recorded");
        Ok(entry)
    }

    /// Administrative clearing of collected cash debt
    pub fn settle_cash_debt(
        &self,
        user_id: &str,
        amount: i64,
        description: impl Into<String>,
    ) -> LedgerResult<WalletTransaction> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let txn = self.storage.begin_write()?;
        let mut wallet = self
            .storage
            .load_wallet(&txn, user_id)?
            .ok_or_else(|| LedgerError::WalletNotFound(user_id.to_string()))?;

        if amount > wallet.cash_owed {
            return Err(LedgerError::SettlementExceedsDebt {
                requested: amount,
                owed: wallet.cash_owed,
            });
        }

        let entry = WalletTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            order_id: None,
            tx_type: TransactionType::CashSettlement,
            amount,
            description: description.into(),
            status: TransactionStatus::Completed,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        self.storage.store_transaction(&txn, &entry)?;

        wallet.cash_owed -= amount;
        self.storage.store_wallet(&txn, &wallet)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(user_id = %user_id, amount, "Cash debt settled");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn setup() -> (MarketStorage, WalletLedger) {
        let storage = MarketStorage::open_in_memory().unwrap();
        let ledger = WalletLedger::new(storage.clone());
        (storage, ledger)
    }

    #[test]
    fn test_credit_creates_wallet_lazily() {
        let (storage, ledger) = setup();
        assert!(storage.get_wallet("biz-1").unwrap().is_none());

        let txn = storage.begin_write().unwrap();
        ledger
            .credit(&txn, "biz-1", 10435, "order-1", TransactionType::Income, "Earnings", NOW)
            .unwrap();
        txn.commit().unwrap();

        let wallet = storage.get_wallet("biz-1").unwrap().unwrap();
        assert_eq!(wallet.balance, 10435);
        assert_eq!(wallet.total_earned, 10435);
        assert_eq!(wallet.cash_owed, 0);
    }

    #[test]
    fn test_credit_is_idempotent_per_order_user_type() {
        let (storage, ledger) = setup();

        let txn = storage.begin_write().unwrap();
        let first = ledger
            .credit(&txn, "biz-1", 10435, "order-1", TransactionType::Income, "Earnings", NOW)
            .unwrap();
        let second = ledger
            .credit(&txn, "biz-1", 10435, "order-1", TransactionType::Income, "Earnings", NOW)
            .unwrap();
        txn.commit().unwrap();

        // Same entry back, not a new one
        assert_eq!(first.id, second.id);
        assert_eq!(storage.count_transactions().unwrap(), 1);

        // Balance credited exactly once
        let wallet = storage.get_wallet("biz-1").unwrap().unwrap();
        assert_eq!(wallet.balance, 10435);
        assert_eq!(wallet.total_earned, 10435);
    }

    #[test]
    fn test_idempotency_survives_separate_transactions() {
        let (storage, ledger) = setup();

        let txn = storage.begin_write().unwrap();
        ledger
            .credit(&txn, "driver-1", 2175, "order-1", TransactionType::Income, "Commission", NOW)
            .unwrap();
        txn.commit().unwrap();

        let txn = storage.begin_write().unwrap();
        ledger
            .credit(&txn, "driver-1", 2175, "order-1", TransactionType::Income, "Commission", NOW)
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(storage.count_transactions().unwrap(), 1);
        let wallet = storage.get_wallet("driver-1").unwrap().unwrap();
        assert_eq!(wallet.balance, 2175);
    }

    #[test]
    fn test_distinct_types_are_distinct_entries() {
        let (storage, ledger) = setup();

        let txn = storage.begin_write().unwrap();
        ledger
            .credit(&txn, "driver-1", 2175, "order-1", TransactionType::CashIncome, "Commission", NOW)
            .unwrap();
        ledger
            .record_debt(&txn, "driver-1", 12325, "order-1", "Cash collected", NOW)
            .unwrap();
        txn.commit().unwrap();

        assert_eq!(storage.count_transactions().unwrap(), 2);
        let wallet = storage.get_wallet("driver-1").unwrap().unwrap();
        assert_eq!(wallet.balance, 2175);
        assert_eq!(wallet.cash_owed, 12325);
    }

    #[test]
    fn test_record_debt_never_touches_balance() {
        let (storage, ledger) = setup();

        let txn = storage.begin_write().unwrap();
        ledger
            .record_debt(&txn, "driver-1", 12325, "order-1", "Cash collected", NOW)
            .unwrap();
        txn.commit().unwrap();

        let wallet = storage.get_wallet("driver-1").unwrap().unwrap();
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.total_earned, 0);
        assert_eq!(wallet.cash_owed, 12325);
    }

    #[test]
    fn test_credit_rejects_non_income_types() {
        let (storage, ledger) = setup();
        let txn = storage.begin_write().unwrap();
        let result = ledger.credit(
            &txn,
            "driver-1",
            100,
            "order-1",
            TransactionType::CashDebt,
            "wrong",
            NOW,
        );
        assert!(matches!(result, Err(LedgerError::InvalidCreditType(_))));
    }

    #[test]
    fn test_credit_rejects_non_positive_amounts() {
        let (storage, ledger) = setup();
        let txn = storage.begin_write().unwrap();
        for amount in [0, -5] {
            let result = ledger.credit(
                &txn,
                "biz-1",
                amount,
                "order-1",
                TransactionType::Income,
                "bad",
                NOW,
            );
            assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
        }
    }

    #[test]
    fn test_withdrawal_respects_cash_debt() {
        let (storage, ledger) = setup();

        let txn = storage.begin_write().unwrap();
        ledger
            .credit(&txn, "driver-1", 5000, "order-1", TransactionType::CashIncome, "Commission", NOW)
            .unwrap();
        ledger
            .record_debt(&txn, "driver-1", 1200, "order-1", "Cash collected", NOW)
            .unwrap();
        txn.commit().unwrap();

        // withdrawable = 5000 - 1200 = 3800
        let result = ledger.record_withdrawal("driver-1", 3801, "Payout");
        assert!(matches!(
            result,
            Err(LedgerError::WithdrawalExceedsAvailable {
                requested: 3801,
                available: 3800
            })
        ));

        ledger.record_withdrawal("driver-1", 3800, "Payout").unwrap();
        let wallet = storage.get_wallet("driver-1").unwrap().unwrap();
        assert_eq!(wallet.balance, 1200);
        assert_eq!(wallet.total_withdrawn, 3800);
        assert_eq!(wallet.withdrawable(), 0);
    }

    #[test]
    fn test_withdrawal_requires_existing_wallet() {
        let (_storage, ledger) = setup();
        let result = ledger.record_withdrawal("ghost", 100, "Payout");
        assert!(matches!(result, Err(LedgerError::WalletNotFound(_))));
    }

    #[test]
    fn test_settle_cash_debt() {
        let (storage, ledger) = setup();

        let txn = storage.begin_write().unwrap();
        ledger
            .record_debt(&txn, "driver-1", 12325, "order-1", "Cash collected", NOW)
            .unwrap();
        txn.commit().unwrap();

        // Over-settlement is a bookkeeping error
        let result = ledger.settle_cash_debt("driver-1", 13000, "Cash handover");
        assert!(matches!(
            result,
            Err(LedgerError::SettlementExceedsDebt { .. })
        ));

        ledger
            .settle_cash_debt("driver-1", 12325, "Cash handover")
            .unwrap();
        let wallet = storage.get_wallet("driver-1").unwrap().unwrap();
        assert_eq!(wallet.cash_owed, 0);
    }
}
