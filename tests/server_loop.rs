//! End-to-end tests of the server loop over in-memory transports.

mod common;

use serde_json::{json, Value};

use common::{Call, RecordingCalendar};
use google_calendar_mcp::mcp::{McpServer, StdioTransport};

/// Feeds `input` through a server and returns each output line as JSON.
async fn serve(input: &str) -> (Vec<Value>, Vec<Call>) {
    serve_bytes(input.as_bytes()).await
}

async fn serve_bytes(input: &[u8]) -> (Vec<Value>, Vec<Call>) {
    let transport = StdioTransport::from_parts(input, Vec::new());
    let mut server = McpServer::with_transport(RecordingCalendar::new(), transport);

    server.serve().await.unwrap();

    let calls = server.dispatcher().calendar().calls();
    let output = String::from_utf8(server.into_transport().into_writer()).unwrap();
    let lines = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    (lines, calls)
}

#[tokio::test]
async fn test_full_session() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"1"}}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"delete_event","arguments":{"event_id":"evt-del"}}}"#,
        "\n",
    );

    let (lines, calls) = serve(input).await;

    let ids: Vec<&Value> = lines.iter().map(|l| &l["id"]).collect();
    assert_eq!(ids, [&json!(1), &json!(2), &json!(3)]);
    assert_eq!(lines[1]["result"]["tools"].as_array().unwrap().len(), 5);
    assert_eq!(
        lines[2]["result"]["content"][0]["text"],
        "Event deleted successfully!"
    );
    assert_eq!(
        calls,
        vec![Call::Delete {
            calendar_id: None,
            event_id: "evt-del".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_responses_keep_request_order() {
    let input = (1..=5)
        .map(|id| format!(r#"{{"jsonrpc":"2.0","id":{id},"method":"ping"}}"#))
        .collect::<Vec<_>>()
        .join("\n");

    let (lines, _) = serve(&input).await;

    let ids: Vec<i64> = lines.iter().map(|l| l["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, [1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_blank_lines_and_crlf() {
    let input = "\r\n   \n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\r\n\n";

    let (lines, _) = serve(input).await;

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["id"], 1);
}

#[tokio::test]
async fn test_malformed_line_does_not_stop_the_loop() {
    let input = concat!(
        "this is not json\n",
        r#"[1, 2]"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
        "\n",
    );

    let (lines, _) = serve(input).await;

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["error"]["code"], -32700);
    assert!(lines[0].get("id").is_none());
    assert_eq!(lines[1]["error"]["code"], -32600);
    assert_eq!(lines[2]["id"], 2);
}

#[tokio::test]
async fn test_only_notifications_produce_no_output() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","method":"initialized"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n",
    );

    let (lines, calls) = serve(input).await;

    assert!(lines.is_empty());
    assert!(calls.is_empty());
}

#[tokio::test]
async fn test_non_utf8_line_is_answered_and_serving_continues() {
    let mut input = Vec::new();
    input.extend_from_slice(br#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
    input.extend_from_slice(b"\n\xff\xfe garbage\n");
    input.extend_from_slice(br#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#);
    input.push(b'\n');

    let (lines, _) = serve_bytes(&input).await;

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], 1);
    assert_eq!(lines[1]["error"]["code"], -32700);
    assert!(lines[1].get("id").is_none());
    assert_eq!(lines[2]["id"], 3);
    assert_eq!(lines[2]["result"], json!({}));
}
