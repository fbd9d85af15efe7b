#[path = "../../stakeflow-api/tests/common/mod.rs"]
mod common;

use common::{start_programmable_backend, RecordedRequest};
use serde_json::{json, Value};
use stakeflow_chain::{ChainGuard, NetworkSwitcher, Ready, WalletSession};
use stakeflow_signer::{SignRequest, TransactionSigner};
use stakeflow_types::{parse_address, Bytes, SignError, TxHash, U256};
use stakeflow_wallet::{RpcWallet, WalletConfig, USER_REJECTED};

const ACCOUNT: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";
const HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

fn reply(req: &RecordedRequest, result: Value) -> (u16, String) {
    let id = req.json()["id"].clone();
    (200, json!({ "jsonrpc": "2.0", "id": id, "result": result }).to_string())
}

fn reply_error(req: &RecordedRequest, code: i64, message: &str) -> (u16, String) {
    let id = req.json()["id"].clone();
    (
        200,
        json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
            .to_string(),
    )
}

fn wallet_for(url: String) -> RpcWallet {
    RpcWallet::new(&WalletConfig {
        rpc_url: url,
        timeout_ms: 5_000,
    })
}

fn sign_request() -> SignRequest {
    SignRequest {
        from: parse_address(ACCOUNT).unwrap(),
        to: parse_address("0xA55416de5DE61A0AC1aa8970a280E04388B1dE4b").unwrap(),
        data: Bytes::from(vec![0x5c, 0xe1, 0xc5, 0xee]),
        value: U256::from(5_000_000_000_000_000u64),
        gas: U256::from(210_000u64),
        max_fee_per_gas: U256::from(1_500_000_014u64),
        max_priority_fee_per_gas: U256::from(1_500_000_000u64),
        chain_id: 560048,
    }
}

#[tokio::test]
async fn test_session_reads_account_and_chain() {
    let backend = start_programmable_backend(|req| match req.json()["method"].as_str() {
        Some("eth_accounts") => reply(req, json!([ACCOUNT.to_lowercase()])),
        Some("eth_chainId") => reply(req, json!("0x88bb0")),
        _ => reply_error(req, -32601, "method not found"),
    })
    .await;
    let wallet = wallet_for(backend.url());

    assert_eq!(
        wallet.account().await,
        Ok(Some(parse_address(ACCOUNT).unwrap()))
    );
    assert_eq!(wallet.chain_id().await, Some(560048));
}

#[tokio::test]
async fn test_disconnected_wallet_has_no_account() {
    let backend = start_programmable_backend(|req| reply(req, json!([]))).await;
    let wallet = wallet_for(backend.url());
    assert_eq!(wallet.account().await, Ok(None));
}

#[tokio::test]
async fn test_unreachable_wallet_is_an_error() {
    // Bind then drop to get a port with nothing listening.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let wallet = wallet_for(format!("http://127.0.0.1:{}", port));

    let err = wallet.account().await.unwrap_err();
    assert!(err.starts_with("wallet request failed"), "{}", err);
    assert_eq!(wallet.chain_id().await, None);
}

#[tokio::test]
async fn test_switch_chain_sends_hex_chain_id() {
    let backend = start_programmable_backend(|req| match req.json()["method"].as_str() {
        Some("eth_chainId") => reply(req, json!("0x1")),
        Some("wallet_switchEthereumChain") => reply(req, Value::Null),
        _ => reply_error(req, -32601, "method not found"),
    })
    .await;
    let wallet = wallet_for(backend.url());

    let ready = ChainGuard::new(560048).ensure(&wallet).await.unwrap();
    assert_eq!(ready, Ready::Switched { from: Some(1) });

    let switch = backend
        .requests()
        .into_iter()
        .find(|r| r.json()["method"] == "wallet_switchEthereumChain")
        .unwrap();
    assert_eq!(switch.json()["params"], json!([{ "chainId": "0x88bb0" }]));
}

#[tokio::test]
async fn test_switch_to_unknown_chain_fails() {
    let backend =
        start_programmable_backend(|req| reply_error(req, 4902, "Unrecognized chain ID")).await;
    let wallet = wallet_for(backend.url());

    let err = wallet.switch_chain(560048).await.unwrap_err();
    assert_eq!(err, "chain 560048 is not configured in the wallet");
}

#[tokio::test]
async fn test_send_transaction_uses_hex_quantities() {
    let backend = start_programmable_backend(|req| reply(req, json!(HASH))).await;
    let wallet = wallet_for(backend.url());

    let hash = wallet.send_transaction(&sign_request()).await.unwrap();
    assert_eq!(hash, HASH.parse::<TxHash>().unwrap());

    let body = backend.requests()[0].json();
    assert_eq!(body["method"], "eth_sendTransaction");
    let tx = &body["params"][0];
    assert_eq!(tx["from"], ACCOUNT);
    assert_eq!(tx["data"], "0x5ce1c5ee");
    assert_eq!(tx["value"], "0x11c37937e08000");
    assert_eq!(tx["gas"], "0x33450");
    assert_eq!(tx["maxFeePerGas"], "0x59682f0e");
    assert_eq!(tx["maxPriorityFeePerGas"], "0x59682f00");
    assert_eq!(tx["chainId"], "0x88bb0");
}

#[tokio::test]
async fn test_user_rejection_maps_to_rejected() {
    let backend = start_programmable_backend(|req| {
        reply_error(req, USER_REJECTED, "User denied transaction signature.")
    })
    .await;
    let wallet = wallet_for(backend.url());

    let err = wallet.send_transaction(&sign_request()).await.unwrap_err();
    assert_eq!(err, SignError::Rejected("User denied transaction signature.".into()));
}

#[tokio::test]
async fn test_garbage_hash_is_provider_error() {
    let backend = start_programmable_backend(|req| reply(req, json!("not-a-hash"))).await;
    let wallet = wallet_for(backend.url());

    let err = wallet.send_transaction(&sign_request()).await.unwrap_err();
    assert!(matches!(err, SignError::Provider { .. }));
}
