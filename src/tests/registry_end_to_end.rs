#[cfg(test)]
mod test {

    use std::sync::atomic::Ordering;

    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Json;
    use httpmock::prelude::*;
    use serde_json::Value;

    use crate::client::{ApiClient, ClientOptions};
    use crate::errors::ToolErrorKind;
    use crate::tests::common::*;
    use crate::tools::{ToolRegistry, Toolkit};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn first_call_fetches_token_second_reuses_it() {
        let api = EchoApi::start().await;
        let toolkit = Toolkit::new(api.client());

        let payout = toolkit.invoke("retrieve_payout", json!({ "payout_id": "po_1" })).await.unwrap();
        assert_eq!(payout["path"], "/payouts/po_1");
        assert_eq!(api.total_calls(), 2);

        let status = toolkit.invoke("get_payout_status", json!({ "payout_id": "po_1" })).await.unwrap();
        assert_eq!(status, json!({ "payout_id": "po_1", "status": "paid" }));
        assert_eq!(api.total_calls(), 3);
        assert_eq!(hits(&api.token_calls), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn retrieve_payout_scenario_counts_http_calls() {
        let calls = counter();
        let (token_seen, payout_seen, list_seen) = (calls.clone(), calls.clone(), calls.clone());
        let listing = json!({
            "data": [{ "id": "po_1", "status": "paid", "amount": 100 }],
            "has_more": true,
            "next_cursor": "po_1"
        });
        let served = listing.clone();
        let router = Router::new()
            .route(
                "/oauth/token",
                axum::routing::post(move || {
                    let seen = token_seen.clone();
                    async move {
                        seen.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "access_token": "t1", "expires_in": 3600 }))
                    }
                }),
            )
            .route(
                "/payouts/po_1",
                get(move || {
                    let seen = payout_seen.clone();
                    async move {
                        seen.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "id": "po_1", "status": "paid" }))
                    }
                }),
            )
            .route(
                "/payouts",
                get(move || {
                    let seen = list_seen.clone();
                    let served = served.clone();
                    async move {
                        seen.fetch_add(1, Ordering::SeqCst);
                        Json(served)
                    }
                }),
            );
        let (_handle, addr) = spawn_axum(router).await;
        let toolkit = Toolkit::new(client_for(addr));

        let first = toolkit.invoke("retrieve_payout", json!({ "payout_id": "po_1" })).await.unwrap();
        assert_eq!(first, json!({ "id": "po_1", "status": "paid" }));
        assert_eq!(hits(&calls), 2);

        let second = toolkit.invoke("retrieve_payout", json!({ "payout_id": "po_1" })).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(hits(&calls), 3);

        let listed = toolkit.invoke("list_payouts", json!({})).await.unwrap();
        assert_eq!(listed, listing);
        assert_eq!(toolkit.client().token_cache().current().await.as_deref(), Some("t1"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn successful_bodies_pass_through_unchanged() {
        let record = json!({
            "id": "pay_42",
            "object": "payment",
            "amount": 12_345,
            "metadata": { "order": "A-17", "tags": ["x", null, 3.5] },
            "refunds": { "data": [], "has_more": false },
            "captured_at": null
        });
        let served = record.clone();
        let router = token_router(counter(), Some(3600))
            .route("/payments/pay_42", get(move || {
                let served = served.clone();
                async move { Json(served) }
            }));
        let (_handle, addr) = spawn_axum(router).await;
        let toolkit = Toolkit::new(client_for(addr));

        let got = toolkit.invoke("retrieve_payment", json!({ "payment_id": "pay_42" })).await.unwrap();
        assert_eq!(got, record);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn status_projection_reads_data_envelope() {
        let router = token_router(counter(), Some(3600)).route(
            "/refunds/re_1",
            get(|| async { Json(json!({ "data": { "id": "re_1", "status": "succeeded" } })) }),
        );
        let (_handle, addr) = spawn_axum(router).await;
        let toolkit = Toolkit::new(client_for(addr));

        let status = toolkit.invoke("get_refund_status", json!({ "refund_id": "re_1" })).await.unwrap();
        assert_eq!(status, json!({ "refund_id": "re_1", "status": "succeeded" }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn status_projection_without_status_is_contract_error() {
        let router = token_router(counter(), Some(3600))
            .route("/payments/pay_1", get(|| async { Json(json!({ "id": "pay_1" })) }));
        let (_handle, addr) = spawn_axum(router).await;
        let toolkit = Toolkit::new(client_for(addr));

        let err = toolkit.invoke("get_payment_status", json!({ "payment_id": "pay_1" })).await.unwrap_err();
        assert_eq!(err.kind(), ToolErrorKind::UpstreamContract);
        assert_eq!(err.field(), Some("status"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn not_found_keeps_kind_under_context() {
        let api_calls = counter();
        let seen = api_calls.clone();
        let router = token_router(counter(), Some(3600)).route(
            "/disputes/dp_404",
            get(move || {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::NOT_FOUND, Json(json!({ "error": { "message": "No such dispute" } })))
                }
            }),
        );
        let (_handle, addr) = spawn_axum(router).await;
        let toolkit = Toolkit::new(client_for(addr));

        let err = toolkit.invoke("retrieve_dispute", json!({ "dispute_id": "dp_404" })).await.unwrap_err();

        assert_eq!(err.kind(), ToolErrorKind::UpstreamHttp);
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("failed to retrieve dispute dp_404"));
        assert!(err.payload().not_found);
        assert_eq!(hits(&api_calls), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn filters_are_forwarded_as_query() {
        let api = EchoApi::start().await;
        let toolkit = Toolkit::new(api.client());

        let listed = toolkit
            .invoke("list_payouts", json!({ "limit": 5, "status": "paid" }))
            .await
            .unwrap();
        assert_eq!(query_of(&listed), "limit=5&status=paid");

        let listed = toolkit
            .invoke("list_balance_transactions", json!({ "payout_id": "po_1", "type": "fee" }))
            .await
            .unwrap();
        assert_eq!(listed["path"], "/balance-transactions");
        assert_eq!(query_of(&listed), "payout_id=po_1&type=fee");

        let listed = toolkit
            .invoke("list_payment_methods", json!({ "customer_id": "cus_1", "limit": 100 }))
            .await
            .unwrap();
        assert_eq!(listed["path"], "/payment-methods");
        assert_eq!(query_of(&listed), "limit=100&customer_id=cus_1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn create_payout_sends_normalized_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(200).json_body(json!({ "access_token": "t", "expires_in": 3600 }));
            })
            .await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/payouts")
                    .header("idempotency-key", "po-create-1")
                    .json_body(json!({ "amount": 1500, "currency": "EUR", "destination": "ba_1" }));
                then.status(201).json_body(json!({ "id": "po_new", "status": "pending" }));
            })
            .await;
        let client = ApiClient::new(test_credentials(), ClientOptions::for_host(&server.base_url())).unwrap();
        let toolkit = Toolkit::new(client);

        let created = toolkit
            .invoke(
                "create_payout",
                json!({
                    "amount": 1500,
                    "currency": "eur",
                    "destination": "ba_1",
                    "description": " ",
                    "idempotency_key": "po-create-1"
                }),
            )
            .await
            .unwrap();

        assert_eq!(created["id"], "po_new");
        create.assert_async().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn action_tools_hit_their_paths() {
        let api = EchoApi::start().await;
        let toolkit = Toolkit::new(api.client());

        let cases = [
            ("cancel_payout", json!({ "payout_id": "po_1" }), "/payouts/po_1/cancel"),
            ("capture_payment", json!({ "payment_id": "pay_1", "amount": 500 }), "/payments/pay_1/capture"),
            ("create_refund", json!({ "payment_id": "pay_1", "reason": "duplicate" }), "/refunds"),
            ("retrieve_payment_method", json!({ "payment_method_token": "pm_1" }), "/payment-methods/pm_1"),
            ("retrieve_balance_transaction", json!({ "balance_transaction_id": "bt_1" }), "/balance-transactions/bt_1"),
        ];
        for (tool, args, path) in cases {
            let response = toolkit.invoke(tool, args).await.unwrap();
            assert_eq!(response["path"], path, "{}", tool);
        }
        assert_eq!(hits(&api.token_calls), 1);
    }

    #[test]
    fn standard_registry_describes_every_tool() {
        let registry = ToolRegistry::standard();
        let names: Vec<&str> = registry.names().collect();

        assert_eq!(
            names,
            vec![
                "cancel_payout",
                "capture_payment",
                "create_payout",
                "create_refund",
                "get_payment_status",
                "get_payout_status",
                "get_refund_status",
                "list_balance_transactions",
                "list_disputes",
                "list_payment_methods",
                "list_payments",
                "list_payouts",
                "list_recent_payments",
                "list_recent_payouts",
                "list_refunds",
                "retrieve_balance_transaction",
                "retrieve_dispute",
                "retrieve_payment",
                "retrieve_payment_method",
                "retrieve_payout",
                "retrieve_refund",
            ]
        );

        for descriptor in registry.descriptors() {
            assert!(!descriptor.description.is_empty(), "{}", descriptor.name);
            assert_eq!(descriptor.parameter_schema["type"], "object", "{}", descriptor.name);
            assert!(descriptor.parameter_schema["properties"].is_object(), "{}", descriptor.name);
            assert_eq!(descriptor.parameter_schema["additionalProperties"], false, "{}", descriptor.name);
        }

        let recent = &registry.get("list_recent_payouts").unwrap().descriptor.parameter_schema;
        assert_eq!(recent["properties"]["limit"]["maximum"], 25);
        let retrieve = &registry.get("retrieve_payout").unwrap().descriptor.parameter_schema;
        assert_eq!(retrieve["required"], json!(["payout_id"]));
        let list: &Value = &registry.get("list_payments").unwrap().descriptor.parameter_schema;
        assert_eq!(list["required"], json!([]));
    }
}
