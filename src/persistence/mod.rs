//! Database layer: pool, migrations, and access for users, wallet lots, transactions.

mod pool;
mod transactions;
mod users;
mod wallet;

pub use pool::{create_pool_and_migrate, run_migrations};
pub use sqlx::PgPool;
pub use transactions::{insert_transaction, list_transactions_for_user, TransactionRow};
pub use users::{
    get_user_by_id, get_user_by_username, insert_user, lock_cash, set_cash, update_password_hash,
    UserRow,
};
pub use wallet::{
    delete_lot, insert_lot, list_holdings, lock_lots, update_lot_shares, HoldingRow, LotRow,
};
