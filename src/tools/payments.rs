use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{ApiClient, ApiRequest};
use crate::errors::ToolError;
use crate::tools::registry::{ToolDescriptor, ToolRegistry};
use crate::tools::validation::{
    idempotency_key_property, identifier_property, object_schema, project_status, validate_amount,
    validate_identifier, validate_optional_identifier, Pagination, LIST_LIMIT, RECENT_DEFAULT_LIMIT,
    RECENT_PAYMENTS_LIMIT,
};

const PAYMENTS: &str = "payments";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPaymentsParams {
    #[serde(flatten)]
    pub page: Pagination,
    pub status: Option<String>,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRecentPaymentsParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIdParams {
    pub payment_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CapturePaymentParams {
    pub payment_id: String,
    pub amount: Option<i64>,
    pub idempotency_key: Option<String>,
}

pub async fn list_payments(client: &ApiClient, params: ListPaymentsParams) -> Result<Value, ToolError> {
    let customer_id = validate_optional_identifier("customer_id", params.customer_id.as_deref())?;
    let status = params.status.as_deref().filter(|s| !s.trim().is_empty());
    let request = params
        .page
        .apply(ApiRequest::get([PAYMENTS]), LIST_LIMIT)?
        .query_opt("status", status)
        .query_opt("customer_id", customer_id);
    client.request(&request).await
}

pub async fn list_recent_payments(client: &ApiClient, params: ListRecentPaymentsParams) -> Result<Value, ToolError> {
    let page = Pagination {
        limit: Some(params.limit.unwrap_or(RECENT_DEFAULT_LIMIT)),
        ..Pagination::default()
    };
    let request = page.apply(ApiRequest::get([PAYMENTS]), RECENT_PAYMENTS_LIMIT)?;
    client.request(&request).await
}

pub async fn retrieve_payment(client: &ApiClient, params: PaymentIdParams) -> Result<Value, ToolError> {
    let payment_id = validate_identifier("payment_id", &params.payment_id)?;
    client
        .request(&ApiRequest::get([PAYMENTS, payment_id]))
        .await
        .map_err(|e| e.context(format!("failed to retrieve payment {}", payment_id)))
}

pub async fn get_payment_status(client: &ApiClient, params: PaymentIdParams) -> Result<Value, ToolError> {
    let payment = retrieve_payment(client, params.clone()).await?;
    let status = project_status(&payment)?;
    Ok(json!({ "payment_id": params.payment_id, "status": status }))
}

pub async fn capture_payment(client: &ApiClient, params: CapturePaymentParams) -> Result<Value, ToolError> {
    let payment_id = validate_identifier("payment_id", &params.payment_id)?;
    let amount = params.amount.map(|a| validate_amount("amount", a)).transpose()?;

    let mut request = ApiRequest::post([PAYMENTS, payment_id, "capture"]).idempotency_key(params.idempotency_key.clone());
    if let Some(amount) = amount {
        request = request.json(json!({ "amount": amount }));
    }
    client
        .request(&request)
        .await
        .map_err(|e| e.context(format!("failed to capture payment {}", payment_id)))
}

pub fn register(registry: &mut ToolRegistry) {
    registry.register(list_payments_tool(), |client, params: ListPaymentsParams| async move {
        list_payments(&client, params).await
    });
    registry.register(list_recent_payments_tool(), |client, params: ListRecentPaymentsParams| async move {
        list_recent_payments(&client, params).await
    });
    registry.register(retrieve_payment_tool(), |client, params: PaymentIdParams| async move {
        retrieve_payment(&client, params).await
    });
    registry.register(get_payment_status_tool(), |client, params: PaymentIdParams| async move {
        get_payment_status(&client, params).await
    });
    registry.register(capture_payment_tool(), |client, params: CapturePaymentParams| async move {
        capture_payment(&client, params).await
    });
}

fn list_payments_tool() -> ToolDescriptor {
    let mut properties = Pagination::schema_properties(LIST_LIMIT);
    properties.insert(
        "status".to_owned(),
        json!({ "type": "string", "description": "Filter by payment status, e.g. succeeded" }),
    );
    properties.insert("customer_id".to_owned(), identifier_property("Only payments of this customer"));
    ToolDescriptor::new(
        "list_payments",
        "List payments with optional status and customer filters, using cursor pagination.",
        object_schema(properties, &[]),
    )
}

fn list_recent_payments_tool() -> ToolDescriptor {
    let mut properties = Map::new();
    properties.insert(
        "limit".to_owned(),
        json!({
            "type": "integer",
            "minimum": RECENT_PAYMENTS_LIMIT.start(),
            "maximum": RECENT_PAYMENTS_LIMIT.end(),
            "description": "Number of recent payments to return (default 10)"
        }),
    );
    ToolDescriptor::new("list_recent_payments", "List the most recent payments.", object_schema(properties, &[]))
}

fn payment_id_schema() -> Value {
    let mut properties = Map::new();
    properties.insert("payment_id".to_owned(), identifier_property("The payment ID"));
    object_schema(properties, &["payment_id"])
}

fn retrieve_payment_tool() -> ToolDescriptor {
    ToolDescriptor::new("retrieve_payment", "Get a specific payment by ID.", payment_id_schema())
}

fn get_payment_status_tool() -> ToolDescriptor {
    ToolDescriptor::new("get_payment_status", "Get only the current status of a payment.", payment_id_schema())
}

fn capture_payment_tool() -> ToolDescriptor {
    let mut properties = Map::new();
    properties.insert("payment_id".to_owned(), identifier_property("The payment ID"));
    properties.insert(
        "amount".to_owned(),
        json!({ "type": "integer", "minimum": 1, "description": "Amount to capture in minor units; defaults to the full amount" }),
    );
    properties.insert("idempotency_key".to_owned(), idempotency_key_property());
    ToolDescriptor::new(
        "capture_payment",
        "Capture a previously authorized payment.",
        object_schema(properties, &["payment_id"]),
    )
}
