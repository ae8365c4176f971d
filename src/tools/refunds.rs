use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{ApiClient, ApiRequest};
use crate::errors::ToolError;
use crate::tools::registry::{ToolDescriptor, ToolRegistry};
use crate::tools::validation::{
    idempotency_key_property, identifier_property, object_schema, project_status, validate_amount,
    validate_identifier, validate_optional_identifier, Pagination, LIST_LIMIT,
};

const REFUNDS: &str = "refunds";
const REFUND_REASONS: [&str; 3] = ["duplicate", "fraudulent", "requested_by_customer"];

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRefundParams {
    pub payment_id: String,
    pub amount: Option<i64>,
    pub reason: Option<String>,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundIdParams {
    pub refund_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRefundsParams {
    #[serde(flatten)]
    pub page: Pagination,
    pub payment_id: Option<String>,
}

/// Full refund unless `amount` is given.
pub async fn create_refund(client: &ApiClient, params: CreateRefundParams) -> Result<Value, ToolError> {
    let payment_id = validate_identifier("payment_id", &params.payment_id)?;
    let amount = params.amount.map(|a| validate_amount("amount", a)).transpose()?;
    let reason = params.reason.as_deref().filter(|r| !r.trim().is_empty());
    if let Some(reason) = reason {
        if !REFUND_REASONS.contains(&reason) {
            return Err(ToolError::validation(
                "reason",
                reason,
                format!("must be one of {:?}", REFUND_REASONS),
            ));
        }
    }

    let mut body = Map::new();
    body.insert("payment_id".to_owned(), json!(payment_id));
    if let Some(amount) = amount {
        body.insert("amount".to_owned(), json!(amount));
    }
    if let Some(reason) = reason {
        body.insert("reason".to_owned(), json!(reason));
    }

    let request = ApiRequest::post([REFUNDS])
        .json(Value::Object(body))
        .idempotency_key(params.idempotency_key.clone());
    client
        .request(&request)
        .await
        .map_err(|e| e.context(format!("failed to refund payment {}", payment_id)))
}

pub async fn retrieve_refund(client: &ApiClient, params: RefundIdParams) -> Result<Value, ToolError> {
    let refund_id = validate_identifier("refund_id", &params.refund_id)?;
    client
        .request(&ApiRequest::get([REFUNDS, refund_id]))
        .await
        .map_err(|e| e.context(format!("failed to retrieve refund {}", refund_id)))
}

pub async fn get_refund_status(client: &ApiClient, params: RefundIdParams) -> Result<Value, ToolError> {
    let refund = retrieve_refund(client, params.clone()).await?;
    let status = project_status(&refund)?;
    Ok(json!({ "refund_id": params.refund_id, "status": status }))
}

pub async fn list_refunds(client: &ApiClient, params: ListRefundsParams) -> Result<Value, ToolError> {
    let payment_id = validate_optional_identifier("payment_id", params.payment_id.as_deref())?;
    let request = params
        .page
        .apply(ApiRequest::get([REFUNDS]), LIST_LIMIT)?
        .query_opt("payment_id", payment_id);
    client.request(&request).await
}

pub fn register(registry: &mut ToolRegistry) {
    registry.register(create_refund_tool(), |client, params: CreateRefundParams| async move {
        create_refund(&client, params).await
    });
    registry.register(retrieve_refund_tool(), |client, params: RefundIdParams| async move {
        retrieve_refund(&client, params).await
    });
    registry.register(get_refund_status_tool(), |client, params: RefundIdParams| async move {
        get_refund_status(&client, params).await
    });
    registry.register(list_refunds_tool(), |client, params: ListRefundsParams| async move {
        list_refunds(&client, params).await
    });
}

fn create_refund_tool() -> ToolDescriptor {
    let mut properties = Map::new();
    properties.insert("payment_id".to_owned(), identifier_property("The payment to refund"));
    properties.insert(
        "amount".to_owned(),
        json!({ "type": "integer", "minimum": 1, "description": "Partial amount in minor units; omit for a full refund" }),
    );
    properties.insert(
        "reason".to_owned(),
        json!({ "type": "string", "enum": REFUND_REASONS, "description": "Why the payment is refunded" }),
    );
    properties.insert("idempotency_key".to_owned(), idempotency_key_property());
    ToolDescriptor::new(
        "create_refund",
        "Refund a payment fully or partially.",
        object_schema(properties, &["payment_id"]),
    )
}

fn refund_id_schema() -> Value {
    let mut properties = Map::new();
    properties.insert("refund_id".to_owned(), identifier_property("The refund ID"));
    object_schema(properties, &["refund_id"])
}

fn retrieve_refund_tool() -> ToolDescriptor {
    ToolDescriptor::new("retrieve_refund", "Get a specific refund by ID.", refund_id_schema())
}

fn get_refund_status_tool() -> ToolDescriptor {
    ToolDescriptor::new("get_refund_status", "Get only the current status of a refund.", refund_id_schema())
}

fn list_refunds_tool() -> ToolDescriptor {
    let mut properties = Pagination::schema_properties(LIST_LIMIT);
    properties.insert("payment_id".to_owned(), identifier_property("Only refunds of this payment"));
    ToolDescriptor::new(
        "list_refunds",
        "List refunds, optionally for one payment.",
        object_schema(properties, &[]),
    )
}
