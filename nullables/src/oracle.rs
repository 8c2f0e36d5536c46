//! Nullable balance oracle: canned balances instead of HTTP calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tally_oracle::{BalanceOracle, OracleError};
use tally_types::{TokenAmount, WalletAddress};

enum Answer {
    Balance(TokenAmount),
    Error(OracleError),
}

/// Answers from a table keyed by wallet. Unknown wallets hold zero.
pub struct NullBalanceOracle {
    answers: Mutex<HashMap<WalletAddress, Answer>>,
    delay: Mutex<Duration>,
    calls: AtomicU64,
}

impl NullBalanceOracle {
    pub fn new() -> Self {
        Self {
            answers: Mutex::new(HashMap::new()),
            delay: Mutex::new(Duration::ZERO),
            calls: AtomicU64::new(0),
        }
    }

    pub fn set_balance(&self, wallet: &WalletAddress, balance: TokenAmount) {
        self.answers
            .lock()
            .unwrap()
            .insert(wallet.clone(), Answer::Balance(balance));
    }

    /// Answer every lookup for `wallet` with `error`.
    pub fn set_error(&self, wallet: &WalletAddress, error: OracleError) {
        self.answers
            .lock()
            .unwrap()
            .insert(wallet.clone(), Answer::Error(error));
    }

    /// Hold every answer back for `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for NullBalanceOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BalanceOracle for NullBalanceOracle {
    async fn get_balance(&self, wallet: &WalletAddress) -> Result<TokenAmount, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match self.answers.lock().unwrap().get(wallet) {
            Some(Answer::Balance(balance)) => Ok(balance.clone()),
            Some(Answer::Error(error)) => Err(error.clone()),
            None => Ok(TokenAmount::zero()),
        }
    }
}
