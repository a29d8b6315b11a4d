//! End-to-end lifecycle against an in-process JSON-RPC node.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use thk_client::{
    processor::PollingReceiptProcessor, ClientConfig, HttpTransport, RawTransactionManager,
    Thk, Transfer, TransactionError, TransactionRequest, Transport, TransportError, U256,
};
use thk_crypto::Credentials;

const KEY: &str = "0x8e5b44b6cee8fa05092b4b5a8843aa6b0ec37915a940c9b5938e88a7e6fdd83a";
const TO: &str = "0x5dfcfc6f4b48f93213dad643a50228ff873c15b9";
const HASH: &str = "0x90e85cef8f7b78a38c7c7e3450df38936109fefa5149eda7859cd94b5d27ca58";

#[derive(Default)]
struct NodeState {
    requests: Vec<Value>,
    pending_polls: u32,
}

type SharedState = Arc<Mutex<NodeState>>;

async fn rpc_handler(State(state): State<SharedState>, Json(req): Json<Value>) -> Json<Value> {
    let mut node = state.lock().unwrap();
    node.requests.push(req.clone());

    let response = match req["method"].as_str().unwrap_or_default() {
        "GetAccount" => json!({
            "result": { "address": req["params"]["address"], "nonce": 7, "balance": "1000000000000000000000" }
        }),
        "SendTx" => json!({ "result": { "TXhash": HASH } }),
        "GetTransactionByHash" if node.pending_polls > 0 => {
            node.pending_polls -= 1;
            json!({ "error": { "code": 4003, "message": "not found" } })
        }
        "GetTransactionByHash" => json!({
            "result": {
                "status": 1,
                "transactionHash": req["params"]["hash"],
                "blockHeight": 88,
                "gasUsed": 21000,
                "gasFee": "0",
                "logs": null,
                "out": "0x"
            }
        }),
        other => json!({ "error": { "code": 404, "message": format!("unknown method {other}") } }),
    };
    Json(response)
}

async fn spawn_node(pending_polls: u32) -> (SocketAddr, SharedState) {
    let state = Arc::new(Mutex::new(NodeState { pending_polls, ..Default::default() }));
    let app = Router::new().route("/", post(rpc_handler)).with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (addr, state)
}

fn manager(addr: SocketAddr) -> RawTransactionManager<HttpTransport> {
    let config = ClientConfig {
        rpc_url: format!("http://{addr}"),
        private_key: Some(KEY.to_string()),
        poll_interval_ms: 5,
        poll_attempts: 10,
        ..Default::default()
    };
    RawTransactionManager::from_config(&config).unwrap()
}

#[tokio::test]
async fn transfer_is_confirmed_over_http() {
    let (addr, state) = spawn_node(2).await;
    let manager = manager(addr);

    let receipt = Transfer::new(&manager).send(TO.parse().unwrap(), U256::from(1u64)).await.unwrap();
    assert_eq!(receipt.transaction_hash, HASH);
    assert_eq!(receipt.block_height, 88);
    assert_eq!(receipt.gas_used, "21000");

    let requests = state.lock().unwrap().requests.clone();
    let methods: Vec<&str> = requests.iter().map(|r| r["method"].as_str().unwrap()).collect();
    assert_eq!(
        methods,
        ["GetAccount", "SendTx", "GetTransactionByHash", "GetTransactionByHash", "GetTransactionByHash"]
    );
    for request in &requests {
        assert_eq!(request["jsonrpc"], "2.0");
        assert_eq!(request["id"], 1);
    }
    let send = &requests[1]["params"];
    assert_eq!(send["nonce"], "7");
    assert_eq!(send["chainId"], "1");
    assert_eq!(send["to"], TO);
}

#[tokio::test]
async fn exhausted_budget_times_out() {
    let (addr, _state) = spawn_node(u32::MAX).await;
    let thk = Arc::new(Thk::new(HttpTransport::new(format!("http://{addr}"))));
    let processor =
        Arc::new(PollingReceiptProcessor::new(Arc::clone(&thk), Duration::from_millis(2), 3));
    let manager =
        RawTransactionManager::new(thk, Credentials::from_private_key_hex(KEY).unwrap(), 1, processor);

    let err = manager
        .execute_transaction(TransactionRequest::transfer(TO.parse().unwrap(), U256::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, TransactionError::ConfirmationTimeout { .. }));
    assert!(err
        .to_string()
        .starts_with("Transaction receipt was not generated after 0 seconds for transaction: 0x"));
}

#[tokio::test]
async fn http_error_status_is_transport_error() {
    let app = Router::new().route("/", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let transport = HttpTransport::new(format!("http://{addr}"));
    let err = transport.send("GetAccount", json!({})).await.unwrap_err();
    assert!(matches!(err, TransportError::Http(_)));
}

#[tokio::test]
async fn submission_to_unreachable_node_keeps_local_hash() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let manager = manager(addr);
    let tx = thk_client::UnsignedTransaction::new(1, 0, 21_000, TO.parse().ok(), U256::ZERO, Vec::new());
    let err = manager.sign_and_send(tx).await.unwrap_err();
    match err {
        TransactionError::Submission { local_hash, source } => {
            assert_eq!(local_hash.len(), 66);
            assert!(matches!(source, TransportError::Http(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
}
