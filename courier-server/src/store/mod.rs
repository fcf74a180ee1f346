//! redb-based storage for orders, payments, wallets, and the ledger
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Order state |
//! | `payments` | `order_id` | `PaymentRecord` | One payment record per order |
//! | `wallets` | `user_id` | `Wallet` | Running balances |
//! | `wallet_transactions` | `tx_id` | `WalletTransaction` | Append-only ledger |
//! | `settlement_index` | `(order_id, user_id, type)` | `tx_id` | Settlement uniqueness |
//!
//! # Atomicity
//!
//! All settlement writes (order earnings, wallet balances, ledger entries,
//! index rows) go through a single write transaction: either everything
//! commits or nothing does. redb admits one write transaction at a time,
//! which also gives at-most-one concurrent settlement execution per order.
//!
//! The `settlement_index` table doubles as the storage-level unique
//! constraint on `(order_id, user_id, type)`: even if a second settlement
//! attempt slipped past the in-order idempotency check, the index row
//! already present would short-circuit the credit.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::order::{Order, PaymentRecord};
use shared::wallet::{Wallet, WalletTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for orders: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for payment records: key = order_id, value = JSON-serialized PaymentRecord
const PAYMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("payments");

/// Table for wallets: key = user_id, value = JSON-serialized Wallet
const WALLETS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");

/// Table for ledger entries: key = tx_id, value = JSON-serialized WalletTransaction
const TRANSACTIONS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("wallet_transactions");

/// Table enforcing settlement uniqueness: key = (order_id, user_id, type), value = tx_id
const SETTLEMENT_INDEX_TABLE: TableDefinition<(&str, &str, &str), &str> =
    TableDefinition::new("settlement_index");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Ledger entry not found: {0}")]
    TransactionNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Marketplace storage backed by redb
///
/// redb commits with `Durability::Immediate`: once `commit()` returns the
/// data is on disk in a consistent state, which is what a financial ledger
/// needs against power loss.
#[derive(Clone)]
pub struct MarketStorage {
    db: Arc<Database>,
}

impl MarketStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables up front so read transactions never race
        // against first-write table creation
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(PAYMENTS_TABLE)?;
            let _ = write_txn.open_table(WALLETS_TABLE)?;
            let _ = write_txn.open_table(TRANSACTIONS_TABLE)?;
            let _ = write_txn.open_table(SETTLEMENT_INDEX_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Order Operations ==========

    /// Load an order within a write transaction
    pub fn load_order(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<Order> {
        let table = txn.open_table(ORDERS_TABLE)?;
        let bytes = table
            .get(order_id)?
            .ok_or_else(|| StorageError::OrderNotFound(order_id.to_string()))?;
        Ok(serde_json::from_slice(bytes.value())?)
    }

    /// Store an order within a write transaction
    pub fn store_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let bytes = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Get an order (read-only)
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// All orders (read-only, audit pass)
    pub fn all_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for entry in table.iter()? {
            let (_, bytes) = entry?;
            orders.push(serde_json::from_slice(bytes.value())?);
        }
        Ok(orders)
    }

    // ========== Payment Operations ==========

    /// Store a payment record within a write transaction
    pub fn store_payment(&self, txn: &WriteTransaction, payment: &PaymentRecord) -> StorageResult<()> {
        let mut table = txn.open_table(PAYMENTS_TABLE)?;
        let bytes = serde_json::to_vec(payment)?;
        table.insert(payment.order_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Load a payment record within a write transaction
    pub fn load_payment(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<PaymentRecord>> {
        let table = txn.open_table(PAYMENTS_TABLE)?;
        match table.get(order_id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// Get a payment record (read-only)
    pub fn get_payment(&self, order_id: &str) -> StorageResult<Option<PaymentRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PAYMENTS_TABLE)?;
        match table.get(order_id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// Number of payment records (read-only)
    pub fn count_payments(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PAYMENTS_TABLE)?;
        Ok(table.len()?)
    }

    // ========== Wallet Operations ==========

    /// Load a wallet within a write transaction (None if never credited)
    pub fn load_wallet(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
    ) -> StorageResult<Option<Wallet>> {
        let table = txn.open_table(WALLETS_TABLE)?;
        match table.get(user_id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// Store a wallet within a write transaction
    pub fn store_wallet(&self, txn: &WriteTransaction, wallet: &Wallet) -> StorageResult<()> {
        let mut table = txn.open_table(WALLETS_TABLE)?;
        let bytes = serde_json::to_vec(wallet)?;
        table.insert(wallet.user_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Get a wallet (read-only)
    pub fn get_wallet(&self, user_id: &str) -> StorageResult<Option<Wallet>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS_TABLE)?;
        match table.get(user_id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    // ========== Ledger Operations ==========

    /// Append a ledger entry within a write transaction
    pub fn store_transaction(
        &self,
        txn: &WriteTransaction,
        entry: &WalletTransaction,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(TRANSACTIONS_TABLE)?;
        let bytes = serde_json::to_vec(entry)?;
        table.insert(entry.id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Load a ledger entry by id within a write transaction
    pub fn load_transaction(
        &self,
        txn: &WriteTransaction,
        tx_id: &str,
    ) -> StorageResult<Option<WalletTransaction>> {
        let table = txn.open_table(TRANSACTIONS_TABLE)?;
        match table.get(tx_id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// All ledger entries (read-only, audit pass)
    pub fn all_transactions(&self) -> StorageResult<Vec<WalletTransaction>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSACTIONS_TABLE)?;
        let mut entries = Vec::new();
        for entry in table.iter()? {
            let (_, bytes) = entry?;
            entries.push(serde_json::from_slice(bytes.value())?);
        }
        Ok(entries)
    }

    /// Number of ledger entries (read-only)
    pub fn count_transactions(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TRANSACTIONS_TABLE)?;
        Ok(table.len()?)
    }

    /// Ledger entries for one user, oldest first (read-only)
    pub fn transactions_for_user(&self, user_id: &str) -> StorageResult<Vec<WalletTransaction>> {
        let mut entries: Vec<WalletTransaction> = self
            .all_transactions()?
            .into_iter()
            .filter(|t| t.user_id == user_id)
            .collect();
        entries.sort_by_key(|t| t.created_at);
        Ok(entries)
    }

    // ========== Settlement Index ==========

    /// Existing settlement entry id for `(order_id, user_id, type)`, if any
    pub fn settlement_index_get(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
        user_id: &str,
        tx_type: &str,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(SETTLEMENT_INDEX_TABLE)?;
        Ok(table
            .get((order_id, user_id, tx_type))?
            .map(|guard| guard.value().to_string()))
    }

    /// Record the settlement entry id for `(order_id, user_id, type)`
    pub fn settlement_index_insert(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
        user_id: &str,
        tx_type: &str,
        tx_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SETTLEMENT_INDEX_TABLE)?;
        table.insert((order_id, user_id, tx_type), tx_id)?;
        Ok(())
    }
}
