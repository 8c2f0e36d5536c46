//! Exercises the HTTP oracle client against a local axum server standing in
//! for the real balance service.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::time::Duration;

use tally_oracle::{BalanceOracle, HttpBalanceOracle, OracleConfig, OracleError};
use tally_types::{TokenAmount, WalletAddress};

const RICH: [u8; 20] = [0x11; 20];
const EMPTY: [u8; 20] = [0x22; 20];
const BANNED: [u8; 20] = [0x33; 20];
const BROKEN: [u8; 20] = [0x44; 20];
const SLOW: [u8; 20] = [0x55; 20];

async fn balance_of(Path(wallet): Path<String>) -> axum::response::Response {
    let rich = WalletAddress::from_bytes(RICH).to_string();
    let empty = WalletAddress::from_bytes(EMPTY).to_string();
    let banned = WalletAddress::from_bytes(BANNED).to_string();
    let broken = WalletAddress::from_bytes(BROKEN).to_string();
    let slow = WalletAddress::from_bytes(SLOW).to_string();

    if wallet == rich {
        Json(json!({"tokenHave": "98765432109876543210.123456789"})).into_response()
    } else if wallet == empty {
        Json(json!({"wallet": wallet})).into_response()
    } else if wallet == banned {
        (
            StatusCode::FORBIDDEN,
            Json(json!({"message": "Wallet is blocked"})),
        )
            .into_response()
    } else if wallet == broken {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
    } else if wallet == slow {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(json!({"tokenHave": "1"})).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn spawn_oracle() -> String {
    let app = Router::new().route("/api/token/balanceOf/:wallet", get(balance_of));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn client() -> HttpBalanceOracle {
    let mut cfg = OracleConfig::new(spawn_oracle().await);
    cfg.timeout = Duration::from_millis(300);
    HttpBalanceOracle::new(cfg).unwrap()
}

#[tokio::test]
async fn returns_exact_decimal_balance() {
    let oracle = client().await;
    let balance = oracle
        .get_balance(&WalletAddress::from_bytes(RICH))
        .await
        .unwrap();
    assert_eq!(
        balance,
        TokenAmount::parse("98765432109876543210.123456789").unwrap()
    );
}

#[tokio::test]
async fn missing_field_means_zero() {
    let oracle = client().await;
    let balance = oracle
        .get_balance(&WalletAddress::from_bytes(EMPTY))
        .await
        .unwrap();
    assert!(balance.is_zero());
}

#[tokio::test]
async fn structured_error_is_relayed() {
    let oracle = client().await;
    let err = oracle
        .get_balance(&WalletAddress::from_bytes(BANNED))
        .await
        .unwrap_err();
    match err {
        OracleError::Rejected { status, message, .. } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Wallet is blocked");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn unstructured_error_is_not_relayed() {
    let oracle = client().await;
    let err = oracle
        .get_balance(&WalletAddress::from_bytes(BROKEN))
        .await
        .unwrap_err();
    assert!(matches!(err, OracleError::RequestFailed(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_oracle_times_out() {
    let oracle = client().await;
    let err = oracle
        .get_balance(&WalletAddress::from_bytes(SLOW))
        .await
        .unwrap_err();
    assert!(matches!(err, OracleError::Timeout(_)), "got {err:?}");
    assert!(err.is_retryable());
}
