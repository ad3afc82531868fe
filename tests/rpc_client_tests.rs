//! JSON-RPC client tests against a mock HTTP endpoint.

#![cfg(feature = "solana-devnet")]

use std::time::Duration;

use base64::Engine as _;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use governance_demo::adapters::solana::{
    AccountMeta, CommitmentLevel, Instruction, Keypair, Pubkey, RpcClient, Signature,
};
use governance_demo::{GovernanceDemoError, LedgerClient};

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

fn with_context(value: Value) -> Value {
    json!({ "context": { "slot": 1 }, "value": value })
}

async fn mount(server: &MockServer, rpc_method: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(response)
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> RpcClient {
    RpcClient::new(&server.uri()).with_confirmation_polling(3, Duration::from_millis(5))
}

fn noop_instruction(payer: &Pubkey) -> Instruction {
    Instruction {
        program_id: Pubkey::new([9; 32]),
        accounts: vec![AccountMeta::new(*payer, true)],
        data: vec![1],
    }
}

async fn mount_submission(server: &MockServer, signature: &Signature) {
    mount(
        server,
        "getLatestBlockhash",
        rpc_result(with_context(json!({
            "blockhash": Pubkey::new([7; 32]).to_string(),
            "lastValidBlockHeight": 100,
        }))),
    )
    .await;
    mount(server, "sendTransaction", rpc_result(json!(signature.to_string()))).await;
}

#[tokio::test]
async fn test_get_balance_reads_context_value() {
    let server = MockServer::start().await;
    mount(&server, "getBalance", rpc_result(with_context(json!(25_000_000)))).await;

    let balance = client(&server).get_balance(&Pubkey::new([1; 32])).await.unwrap();
    assert_eq!(balance, 25_000_000);

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["params"][1]["commitment"], "confirmed");
}

#[tokio::test]
async fn test_error_object_maps_to_rpc_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        "getBalance",
        ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "Invalid param" },
        })),
    )
    .await;

    let err = client(&server).get_balance(&Pubkey::new([1; 32])).await.unwrap_err();
    assert!(matches!(err, GovernanceDemoError::Rpc { code: -32602, .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let client = RpcClient::new("http://127.0.0.1:1");
    let err = client.get_balance(&Pubkey::new([1; 32])).await.unwrap_err();
    assert!(matches!(err, GovernanceDemoError::NetworkError { .. }));
}

#[tokio::test]
async fn test_send_and_confirm_returns_confirmed_signature() {
    let server = MockServer::start().await;
    let expected = Signature::new([5; 64]);
    mount_submission(&server, &expected).await;
    mount(
        &server,
        "getSignatureStatuses",
        rpc_result(with_context(json!([{
            "slot": 10,
            "confirmations": 1,
            "err": null,
            "confirmationStatus": "confirmed",
        }]))),
    )
    .await;

    let payer = Keypair::new();
    let signature = client(&server)
        .send_and_confirm(&[noop_instruction(&payer.pubkey())], &payer, &[])
        .await
        .unwrap();
    assert_eq!(signature, expected);

    let requests = server.received_requests().await.unwrap();
    let sent = requests
        .iter()
        .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap())
        .find(|b| b["method"] == "sendTransaction")
        .unwrap();
    assert_eq!(sent["params"][1]["encoding"], "base64");

    let wire = base64::engine::general_purpose::STANDARD
        .decode(sent["params"][0].as_str().unwrap())
        .unwrap();
    // one signature, then the header's required-signature count
    assert_eq!(wire[0], 1);
    assert_eq!(wire[1 + 64], 1);
}

#[tokio::test]
async fn test_unconfirmed_transaction_times_out() {
    let server = MockServer::start().await;
    mount_submission(&server, &Signature::new([6; 64])).await;
    mount(&server, "getSignatureStatuses", rpc_result(with_context(json!([null])))).await;

    let payer = Keypair::new();
    let err = client(&server)
        .send_and_confirm(&[noop_instruction(&payer.pubkey())], &payer, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceDemoError::ConfirmationTimeout { attempts: 3, .. }));
}

#[tokio::test]
async fn test_failed_transaction_reports_error() {
    let server = MockServer::start().await;
    mount_submission(&server, &Signature::new([8; 64])).await;
    mount(
        &server,
        "getSignatureStatuses",
        rpc_result(with_context(json!([{
            "slot": 10,
            "confirmations": null,
            "err": { "InstructionError": [0, { "Custom": 1 }] },
            "confirmationStatus": "processed",
        }]))),
    )
    .await;

    let payer = Keypair::new();
    let err = client(&server)
        .send_and_confirm(&[noop_instruction(&payer.pubkey())], &payer, &[])
        .await
        .unwrap_err();
    match err {
        GovernanceDemoError::TransactionFailed { reason, .. } => assert!(reason.contains("Custom")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_finalized_client_waits_past_confirmed() {
    let server = MockServer::start().await;
    mount_submission(&server, &Signature::new([4; 64])).await;
    mount(
        &server,
        "getSignatureStatuses",
        rpc_result(with_context(json!([{
            "slot": 10,
            "confirmations": 3,
            "err": null,
            "confirmationStatus": "confirmed",
        }]))),
    )
    .await;

    let client = RpcClient::new_with_commitment(&server.uri(), CommitmentLevel::Finalized)
        .with_confirmation_polling(2, Duration::from_millis(5));
    let payer = Keypair::new();
    let err = client
        .send_and_confirm(&[noop_instruction(&payer.pubkey())], &payer, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceDemoError::ConfirmationTimeout { attempts: 2, .. }));

    let requests = server.received_requests().await.unwrap();
    let blockhash = requests
        .iter()
        .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap())
        .find(|b| b["method"] == "getLatestBlockhash")
        .unwrap();
    assert_eq!(blockhash["params"][0]["commitment"], "finalized");
}

#[tokio::test]
async fn test_oversized_transaction_is_not_sent() {
    let server = MockServer::start().await;
    mount_submission(&server, &Signature::new([3; 64])).await;

    let payer = Keypair::new();
    let mut instruction = noop_instruction(&payer.pubkey());
    instruction.data = vec![0u8; 2_000];

    let err = client(&server)
        .send_and_confirm(&[instruction], &payer, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, GovernanceDemoError::InvalidInput { .. }));

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap())
        .all(|b| b["method"] != "sendTransaction"));
}

#[tokio::test]
async fn test_missing_account_is_none() {
    let server = MockServer::start().await;
    mount(&server, "getAccountInfo", rpc_result(with_context(Value::Null))).await;

    let data = client(&server).get_account_data(&Pubkey::new([2; 32])).await.unwrap();
    assert!(data.is_none());
}

#[tokio::test]
async fn test_account_data_is_base64_decoded() {
    let server = MockServer::start().await;
    let raw = vec![14u8, 0, 1, 2, 3];
    let encoded = base64::engine::general_purpose::STANDARD.encode(&raw);
    mount(
        &server,
        "getAccountInfo",
        rpc_result(with_context(json!({
            "data": [encoded, "base64"],
            "executable": false,
            "lamports": 1_000_000,
            "owner": Pubkey::new([9; 32]).to_string(),
            "rentEpoch": 0,
        }))),
    )
    .await;

    let data = client(&server).get_account_data(&Pubkey::new([2; 32])).await.unwrap();
    assert_eq!(data, Some(raw));
}
