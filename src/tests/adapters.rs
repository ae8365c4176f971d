#[cfg(test)]
mod test {

    use serde_json::Value;

    use crate::adapters::chat::{self, ChatToolStatus};
    use crate::adapters::{function_calling, mcp};
    use crate::tests::common::*;
    use crate::tools::Toolkit;

    async fn toolkit() -> (EchoApi, Toolkit) {
        let api = EchoApi::start().await;
        let toolkit = Toolkit::new(api.client());
        (api, toolkit)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_adapter_lists_the_same_tools() {
        let (_api, toolkit) = toolkit().await;
        let expected: Vec<String> = toolkit.list_tool_descriptors().into_iter().map(|d| d.name).collect();

        let listed = mcp::list_tools(&toolkit);
        let mcp_names: Vec<String> = listed["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tool| tool["name"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(mcp_names, expected);
        assert_eq!(listed["tools"][0]["inputSchema"]["type"], "object");

        let function_names: Vec<String> = function_calling::definitions(&toolkit)
            .iter()
            .map(|def| {
                assert_eq!(def["type"], "function");
                def["function"]["name"].as_str().unwrap().to_owned()
            })
            .collect();
        assert_eq!(function_names, expected);

        let chat_names: Vec<String> = chat::tools(&toolkit).into_iter().map(|tool| tool.name).collect();
        assert_eq!(chat_names, expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn mcp_call_wraps_results_and_errors() {
        let (_api, toolkit) = toolkit().await;

        let ok = mcp::call_tool(&toolkit, "retrieve_payout", json!({ "payout_id": "po_1" })).await;
        assert_eq!(ok["isError"], false);
        assert_eq!(ok["structuredContent"]["path"], "/payouts/po_1");
        assert_eq!(ok["content"][0]["type"], "text");

        let failed = mcp::call_tool(&toolkit, "list_payouts", json!({ "limit": 0 })).await;
        assert_eq!(failed["isError"], true);
        assert_eq!(failed["structuredContent"]["error"]["kind"], "validation");
        assert_eq!(failed["structuredContent"]["error"]["field"], "limit");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn mcp_structured_content_is_always_an_object() {
        let router = token_router(counter(), Some(3600))
            .route("/payouts", axum::routing::get(|| async { axum::Json(json!([1, 2])) }))
            .route("/payments", axum::routing::get(|| async { "" }));
        let (_handle, addr) = spawn_axum(router).await;
        let toolkit = Toolkit::new(client_for(addr));

        let listed = mcp::call_tool(&toolkit, "list_payouts", json!({})).await;
        assert_eq!(listed["isError"], false);
        assert_eq!(listed["structuredContent"], json!({ "result": [1, 2] }));
        let text = listed["content"][0]["text"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!([1, 2]));

        let empty = mcp::call_tool(&toolkit, "list_payments", json!({})).await;
        assert_eq!(empty["isError"], false);
        assert_eq!(empty["structuredContent"], json!({ "result": null }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn mcp_json_rpc_dispatch() {
        let (_api, toolkit) = toolkit().await;

        let init = mcp::handle_rpc(&toolkit, json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize" }))
            .await
            .unwrap();
        assert_eq!(init["result"]["protocolVersion"], mcp::PROTOCOL_VERSION);
        assert_eq!(init["result"]["serverInfo"]["name"], mcp::SERVER_NAME);

        let listed = mcp::handle_rpc(&toolkit, json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }))
            .await
            .unwrap();
        assert_eq!(listed["id"], 2);
        assert_eq!(listed["result"]["tools"].as_array().unwrap().len(), 21);

        let called = mcp::handle_rpc(
            &toolkit,
            json!({
                "jsonrpc": "2.0",
                "id": "c-1",
                "method": "tools/call",
                "params": { "name": "get_payout_status", "arguments": { "payout_id": "po_7" } }
            }),
        )
        .await
        .unwrap();
        assert_eq!(called["id"], "c-1");
        assert_eq!(
            called["result"]["structuredContent"],
            json!({ "payout_id": "po_7", "status": "paid" })
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn mcp_protocol_errors() {
        let (_api, toolkit) = toolkit().await;

        let unknown = mcp::handle_rpc(&toolkit, json!({ "jsonrpc": "2.0", "id": 1, "method": "resources/list" }))
            .await
            .unwrap();
        assert_eq!(unknown["error"]["code"], -32601);

        let no_name = mcp::handle_rpc(
            &toolkit,
            json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {} }),
        )
        .await
        .unwrap();
        assert_eq!(no_name["error"]["code"], -32602);

        let bad_version = mcp::handle_rpc(&toolkit, json!({ "jsonrpc": "1.0", "id": 3, "method": "ping" }))
            .await
            .unwrap();
        assert_eq!(bad_version["error"]["code"], -32600);

        let notification =
            mcp::handle_rpc(&toolkit, json!({ "jsonrpc": "2.0", "method": "notifications/initialized" })).await;
        assert!(notification.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn function_calling_envelopes() {
        let (api, toolkit) = toolkit().await;

        let ok = function_calling::call(&toolkit, "retrieve_refund", r#"{"refund_id":"re_1"}"#).await;
        assert_eq!(ok["ok"], true);
        assert_eq!(ok["data"]["path"], "/refunds/re_1");

        let calls_before = api.total_calls();
        let bad_json = function_calling::call(&toolkit, "retrieve_refund", "{refund_id:").await;
        assert_eq!(bad_json["ok"], false);
        assert_eq!(bad_json["error"]["kind"], "validation");
        assert_eq!(bad_json["error"]["field"], "arguments");
        assert_eq!(api.total_calls(), calls_before);

        let blank = function_calling::call(&toolkit, "list_recent_payouts", "  ").await;
        assert_eq!(blank["ok"], true);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn chat_output_carries_text_and_artifact() {
        let (_api, toolkit) = toolkit().await;

        let ok = chat::invoke(&toolkit, "retrieve_dispute", json!({ "dispute_id": "dp_1" })).await;
        assert_eq!(ok.status, ChatToolStatus::Success);
        let parsed: Value = serde_json::from_str(&ok.content).unwrap();
        assert_eq!(Some(parsed), ok.artifact);

        let failed = chat::invoke(&toolkit, "retrieve_dispute", json!({ "dispute_id": "" })).await;
        assert_eq!(failed.status, ChatToolStatus::Error);
        assert!(failed.content.starts_with("Invalid argument 'dispute_id'"));
        assert_eq!(failed.artifact.unwrap()["kind"], "validation");
    }
}
