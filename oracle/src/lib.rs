//! Balance oracle: the external service that knows each wallet's token balance.
//!
//! The balance a wallet holds at vote time is its voting weight. The oracle is
//! reached over HTTP (`GET {base}/api/token/balanceOf/{wallet}` returning
//! `{"tokenHave": "<decimal>"}`), and its error responses are relayed to the
//! voter unchanged.
//!
//! The vote pipeline only sees the [`BalanceOracle`] trait, so tests swap in a
//! nullable oracle without touching the network.

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpBalanceOracle;
pub use error::OracleError;
pub use types::OracleConfig;

use async_trait::async_trait;
use tally_types::{TokenAmount, WalletAddress};

/// Source of voting weight.
#[async_trait]
pub trait BalanceOracle: Send + Sync {
    /// Current token balance of `wallet`. A well-formed response without a
    /// balance means zero.
    async fn get_balance(&self, wallet: &WalletAddress) -> Result<TokenAmount, OracleError>;
}
