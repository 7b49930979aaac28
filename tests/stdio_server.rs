//! Protocol server integration tests
//!
//! Runs a full MCP session over an in-memory pipe.

use std::sync::Arc;
use std::time::Duration;

use egov_laws_mcp::api::{ApiResponse, MockLawApi};
use egov_laws_mcp::protocol::{ErrorCode, McpHandler, McpServer, ServerInfo};
use egov_laws_mcp::tools::Dispatcher;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn session(api: Arc<MockLawApi>, lines: &[Value], raw_tail: &str) -> Vec<Value> {
    let dispatcher = Arc::new(Dispatcher::new(api, Duration::from_secs(5)));
    let handler = McpHandler::new(dispatcher, ServerInfo::new("egov-laws-mcp"));
    let server = McpServer::new(handler);

    let (client, server_side) = tokio::io::duplex(256 * 1024);
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (server_read, server_write) = tokio::io::split(server_side);

    let mut input = String::new();
    for line in lines {
        input.push_str(&line.to_string());
        input.push('\n');
    }
    input.push_str(raw_tail);

    client_write.write_all(input.as_bytes()).await.unwrap();
    client_write.shutdown().await.unwrap();

    server.serve(server_read, server_write).await.unwrap();

    let mut output = String::new();
    client_read.read_to_string(&mut output).await.unwrap();
    output.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
}

fn by_id(responses: &[Value], id: i64) -> &Value {
    responses
        .iter()
        .find(|r| r["id"] == json!(id))
        .unwrap_or_else(|| panic!("no response for id {}", id))
}

fn tool_payload(response: &Value) -> Value {
    assert_eq!(response["result"]["isError"], false);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

#[tokio::test]
async fn test_full_session() {
    let body = json!({"laws": [{"law_info": {"law_id": "325AC0000000201"}}]});
    let api = Arc::new(MockLawApi::always(ApiResponse::json(&body)));

    let responses = session(
        api.clone(),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {"protocolVersion": "2025-06-18"}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
                   "params": {"name": "list_laws", "arguments": {"limit": 5, "queryParameters": {"law_title": "建築基準法"}}}}),
        ],
        "",
    )
    .await;

    // The notification gets nothing back
    assert_eq!(responses.len(), 3);

    assert_eq!(by_id(&responses, 1)["result"]["protocolVersion"], "2025-06-18");

    let names: Vec<&str> = by_id(&responses, 2)["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["list_laws", "search_laws", "get_law", "get_law_revisions", "get_law_file"]
    );

    assert_eq!(tool_payload(by_id(&responses, 3)), body);
    assert_eq!(api.requests()[0].query_value("law_title"), Some("建築基準法"));
}

#[tokio::test]
async fn test_tool_errors_stay_in_band() {
    let api = Arc::new(MockLawApi::failing(404, "not found"));

    let responses = session(
        api.clone(),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "get_law", "arguments": {}}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "get_law", "arguments": {"law_id": "X"}}}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "get_law_versions"}}),
        ],
        "",
    )
    .await;

    assert!(tool_payload(by_id(&responses, 1))["error"].as_str().unwrap().contains("law_id"));
    assert_eq!(
        tool_payload(by_id(&responses, 2)),
        json!({"error": "Remote API returned 404: not found"})
    );
    assert_eq!(
        tool_payload(by_id(&responses, 3)),
        json!({"error": "Unknown tool name: get_law_versions"})
    );
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn test_protocol_errors() {
    let responses = session(
        Arc::new(MockLawApi::new()),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "prompts/list"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"arguments": {}}}),
        ],
        "this is not json\n",
    )
    .await;

    assert_eq!(by_id(&responses, 1)["error"]["code"], ErrorCode::METHOD_NOT_FOUND);
    assert_eq!(by_id(&responses, 2)["error"]["code"], ErrorCode::INVALID_PARAMS);

    let parse_error = responses.iter().find(|r| r["id"].is_null()).unwrap();
    assert_eq!(parse_error["error"]["code"], ErrorCode::PARSE_ERROR);
}

#[tokio::test]
async fn test_slow_call_does_not_block_others() {
    use egov_laws_mcp::api::mock::MockReply;

    let api = Arc::new(MockLawApi::always(ApiResponse::json(&json!({"fast": true}))));
    api.push(MockReply::Delay(Duration::from_millis(300), ApiResponse::json(&json!({"slow": true}))));

    let responses = session(
        api,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "get_law", "arguments": {"law_id": "A"}}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "get_law", "arguments": {"law_id": "B"}}}),
        ],
        "",
    )
    .await;

    // Whichever call drew the delay is written last
    assert_eq!(responses.len(), 2);
    assert_eq!(tool_payload(&responses[0]), json!({"fast": true}));
    assert_eq!(tool_payload(&responses[1]), json!({"slow": true}));
}
