//! Payout tools.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{ApiClient, ApiRequest};
use crate::errors::ToolError;
use crate::tools::registry::{ToolDescriptor, ToolRegistry};
use crate::tools::validation::{
    idempotency_key_property, identifier_property, object_schema, project_status, validate_amount,
    validate_currency, validate_identifier, validate_optional_identifier, Pagination, LIST_LIMIT,
    RECENT_DEFAULT_LIMIT, RECENT_PAYOUTS_LIMIT,
};

const PAYOUTS: &str = "payouts";
const PAYOUT_STATUSES: [&str; 5] = ["pending", "in_transit", "paid", "failed", "canceled"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPayoutsParams {
    #[serde(flatten)]
    pub page: Pagination,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRecentPayoutsParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayoutIdParams {
    pub payout_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayoutParams {
    pub amount: i64,
    pub currency: String,
    pub destination: Option<String>,
    pub description: Option<String>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelPayoutParams {
    pub payout_id: String,
    pub idempotency_key: Option<String>,
}

pub async fn list_payouts(client: &ApiClient, params: ListPayoutsParams) -> Result<Value, ToolError> {
    let status = validate_status(params.status.as_deref())?;
    let request = params
        .page
        .apply(ApiRequest::get([PAYOUTS]), LIST_LIMIT)?
        .query_opt("status", status);
    client.request(&request).await
}

pub async fn list_recent_payouts(client: &ApiClient, params: ListRecentPayoutsParams) -> Result<Value, ToolError> {
    let page = Pagination {
        limit: Some(params.limit.unwrap_or(RECENT_DEFAULT_LIMIT)),
        ..Pagination::default()
    };
    let request = page.apply(ApiRequest::get([PAYOUTS]), RECENT_PAYOUTS_LIMIT)?;
    client.request(&request).await
}

pub async fn retrieve_payout(client: &ApiClient, params: PayoutIdParams) -> Result<Value, ToolError> {
    let payout_id = validate_identifier("payout_id", &params.payout_id)?;
    client
        .request(&ApiRequest::get([PAYOUTS, payout_id]))
        .await
        .map_err(|e| e.context(format!("failed to retrieve payout {}", payout_id)))
}

/// Retrieves the payout and returns only its status.
pub async fn get_payout_status(client: &ApiClient, params: PayoutIdParams) -> Result<Value, ToolError> {
    let payout = retrieve_payout(client, params.clone()).await?;
    let status = project_status(&payout)?;
    Ok(json!({ "payout_id": params.payout_id, "status": status }))
}

pub async fn create_payout(client: &ApiClient, params: CreatePayoutParams) -> Result<Value, ToolError> {
    let amount = validate_amount("amount", params.amount)?;
    let currency = validate_currency(&params.currency)?;
    let destination = validate_optional_identifier("destination", params.destination.as_deref())?;

    let mut body = Map::new();
    body.insert("amount".to_owned(), json!(amount));
    body.insert("currency".to_owned(), json!(currency));
    if let Some(destination) = destination {
        body.insert("destination".to_owned(), json!(destination));
    }
    if let Some(description) = params.description.filter(|d| !d.trim().is_empty()) {
        body.insert("description".to_owned(), json!(description));
    }

    let request = ApiRequest::post([PAYOUTS])
        .json(Value::Object(body))
        .idempotency_key(params.idempotency_key);
    client.request(&request).await
}

pub async fn cancel_payout(client: &ApiClient, params: CancelPayoutParams) -> Result<Value, ToolError> {
    let payout_id = validate_identifier("payout_id", &params.payout_id)?;
    let request = ApiRequest::post([PAYOUTS, payout_id, "cancel"]).idempotency_key(params.idempotency_key);
    client
        .request(&request)
        .await
        .map_err(|e| e.context(format!("failed to cancel payout {}", payout_id)))
}

fn validate_status(status: Option<&str>) -> Result<Option<&str>, ToolError> {
    match status.filter(|s| !s.trim().is_empty()) {
        Some(s) if !PAYOUT_STATUSES.contains(&s) => Err(ToolError::validation(
            "status",
            s,
            format!("must be one of {:?}", PAYOUT_STATUSES),
        )),
        other => Ok(other),
    }
}

pub fn register(registry: &mut ToolRegistry) {
    registry.register(list_payouts_tool(), |client, params: ListPayoutsParams| async move {
        list_payouts(&client, params).await
    });
    registry.register(list_recent_payouts_tool(), |client, params: ListRecentPayoutsParams| async move {
        list_recent_payouts(&client, params).await
    });
    registry.register(retrieve_payout_tool(), |client, params: PayoutIdParams| async move {
        retrieve_payout(&client, params).await
    });
    registry.register(get_payout_status_tool(), |client, params: PayoutIdParams| async move {
        get_payout_status(&client, params).await
    });
    registry.register(create_payout_tool(), |client, params: CreatePayoutParams| async move {
        create_payout(&client, params).await
    });
    registry.register(cancel_payout_tool(), |client, params: CancelPayoutParams| async move {
        cancel_payout(&client, params).await
    });
}

fn list_payouts_tool() -> ToolDescriptor {
    let mut properties = Pagination::schema_properties(LIST_LIMIT);
    properties.insert(
        "status".to_owned(),
        json!({
            "type": "string",
            "enum": PAYOUT_STATUSES,
            "description": "Filter by payout status"
        }),
    );
    ToolDescriptor::new(
        "list_payouts",
        "List payouts (transfers to bank accounts), newest first, with cursor pagination.",
        object_schema(properties, &[]),
    )
}

fn list_recent_payouts_tool() -> ToolDescriptor {
    let mut properties = Map::new();
    properties.insert(
        "limit".to_owned(),
        json!({
            "type": "integer",
            "minimum": RECENT_PAYOUTS_LIMIT.start(),
            "maximum": RECENT_PAYOUTS_LIMIT.end(),
            "description": "Number of recent payouts to return (default 10)"
        }),
    );
    ToolDescriptor::new(
        "list_recent_payouts",
        "List the most recent payouts.",
        object_schema(properties, &[]),
    )
}

fn payout_id_schema() -> Value {
    let mut properties = Map::new();
    properties.insert("payout_id".to_owned(), identifier_property("The payout ID"));
    object_schema(properties, &["payout_id"])
}

fn retrieve_payout_tool() -> ToolDescriptor {
    ToolDescriptor::new("retrieve_payout", "Get a specific payout by ID.", payout_id_schema())
}

fn get_payout_status_tool() -> ToolDescriptor {
    ToolDescriptor::new(
        "get_payout_status",
        "Get only the current status of a payout.",
        payout_id_schema(),
    )
}

fn create_payout_tool() -> ToolDescriptor {
    let mut properties = Map::new();
    properties.insert(
        "amount".to_owned(),
        json!({ "type": "integer", "minimum": 1, "description": "Amount in minor currency units" }),
    );
    properties.insert(
        "currency".to_owned(),
        json!({ "type": "string", "minLength": 3, "maxLength": 3, "description": "ISO 4217 currency code" }),
    );
    properties.insert("destination".to_owned(), identifier_property("Destination bank account ID"));
    properties.insert(
        "description".to_owned(),
        json!({ "type": "string", "description": "Free-form description shown on the payout" }),
    );
    properties.insert("idempotency_key".to_owned(), idempotency_key_property());
    ToolDescriptor::new(
        "create_payout",
        "Create a payout to a bank account.",
        object_schema(properties, &["amount", "currency"]),
    )
}

fn cancel_payout_tool() -> ToolDescriptor {
    let mut properties = Map::new();
    properties.insert("payout_id".to_owned(), identifier_property("The payout ID"));
    properties.insert("idempotency_key".to_owned(), idempotency_key_property());
    ToolDescriptor::new(
        "cancel_payout",
        "Cancel a pending payout.",
        object_schema(properties, &["payout_id"]),
    )
}
