use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{ApiClient, ApiRequest};
use crate::errors::ToolError;
use crate::tools::registry::{ToolDescriptor, ToolRegistry};
use crate::tools::validation::{identifier_property, object_schema, validate_identifier, Pagination, LIST_LIMIT};

const DISPUTES: &str = "disputes";
const DISPUTE_STATUSES: [&str; 6] = ["needs_response", "under_review", "charge_refunded", "accepted", "won", "lost"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDisputesParams {
    #[serde(flatten)]
    pub page: Pagination,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisputeIdParams {
    pub dispute_id: String,
}

pub async fn list_disputes(client: &ApiClient, params: ListDisputesParams) -> Result<Value, ToolError> {
    let status = params.status.as_deref().filter(|s| !s.trim().is_empty());
    if let Some(status) = status {
        if !DISPUTE_STATUSES.contains(&status) {
            return Err(ToolError::validation(
                "status",
                status,
                format!("must be one of {:?}", DISPUTE_STATUSES),
            ));
        }
    }
    let request = params
        .page
        .apply(ApiRequest::get([DISPUTES]), LIST_LIMIT)?
        .query_opt("status", status);
    client.request(&request).await
}

pub async fn retrieve_dispute(client: &ApiClient, params: DisputeIdParams) -> Result<Value, ToolError> {
    let dispute_id = validate_identifier("dispute_id", &params.dispute_id)?;
    client
        .request(&ApiRequest::get([DISPUTES, dispute_id]))
        .await
        .map_err(|e| e.context(format!("failed to retrieve dispute {}", dispute_id)))
}

pub fn register(registry: &mut ToolRegistry) {
    registry.register(list_disputes_tool(), |client, params: ListDisputesParams| async move {
        list_disputes(&client, params).await
    });
    registry.register(retrieve_dispute_tool(), |client, params: DisputeIdParams| async move {
        retrieve_dispute(&client, params).await
    });
}

fn list_disputes_tool() -> ToolDescriptor {
    let mut properties = Pagination::schema_properties(LIST_LIMIT);
    properties.insert(
        "status".to_owned(),
        json!({ "type": "string", "enum": DISPUTE_STATUSES, "description": "Filter by dispute status" }),
    );
    ToolDescriptor::new(
        "list_disputes",
        "List payment disputes (chargebacks).",
        object_schema(properties, &[]),
    )
}

fn retrieve_dispute_tool() -> ToolDescriptor {
    let mut properties = Map::new();
    properties.insert("dispute_id".to_owned(), identifier_property("The dispute ID"));
    ToolDescriptor::new(
        "retrieve_dispute",
        "Get a specific dispute by ID.",
        object_schema(properties, &["dispute_id"]),
    )
}
