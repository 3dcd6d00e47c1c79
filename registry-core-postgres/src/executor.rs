use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Transaction shared by every repository built for one unit of work.
///
/// Repositories lock `tx`, run their statements and release the lock. Once
/// committed or rolled back the slot is empty and further use fails with
/// "Transaction has been consumed".
#[derive(Clone)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub async fn commit(&self) -> Result<(), sqlx::Error> {
        match self.tx.lock().await.take() {
            Some(tx) => tx.commit().await,
            None => Ok(()),
        }
    }

    pub async fn rollback(&self) -> Result<(), sqlx::Error> {
        match self.tx.lock().await.take() {
            Some(tx) => tx.rollback().await,
            None => Ok(()),
        }
    }
}
