use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::client::{ApiClient, ApiRequest};
use crate::errors::ToolError;
use crate::tools::registry::{ToolDescriptor, ToolRegistry};
use crate::tools::validation::{
    identifier_property, object_schema, validate_identifier, validate_optional_identifier, Pagination, LIST_LIMIT,
};

const BALANCE_TRANSACTIONS: &str = "balance-transactions";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBalanceTransactionsParams {
    #[serde(flatten)]
    pub page: Pagination,
    pub payout_id: Option<String>,
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceTransactionIdParams {
    pub balance_transaction_id: String,
}

pub async fn list_balance_transactions(
    client: &ApiClient,
    params: ListBalanceTransactionsParams,
) -> Result<Value, ToolError> {
    let payout_id = validate_optional_identifier("payout_id", params.payout_id.as_deref())?;
    let transaction_type = params.transaction_type.as_deref().filter(|t| !t.trim().is_empty());
    let request = params
        .page
        .apply(ApiRequest::get([BALANCE_TRANSACTIONS]), LIST_LIMIT)?
        .query_opt("payout_id", payout_id)
        .query_opt("type", transaction_type);
    client.request(&request).await
}

pub async fn retrieve_balance_transaction(
    client: &ApiClient,
    params: BalanceTransactionIdParams,
) -> Result<Value, ToolError> {
    let id = validate_identifier("balance_transaction_id", &params.balance_transaction_id)?;
    client
        .request(&ApiRequest::get([BALANCE_TRANSACTIONS, id]))
        .await
        .map_err(|e| e.context(format!("failed to retrieve balance transaction {}", id)))
}

pub fn register(registry: &mut ToolRegistry) {
    registry.register(list_balance_transactions_tool(), |client, params: ListBalanceTransactionsParams| async move {
        list_balance_transactions(&client, params).await
    });
    registry.register(retrieve_balance_transaction_tool(), |client, params: BalanceTransactionIdParams| async move {
        retrieve_balance_transaction(&client, params).await
    });
}

fn list_balance_transactions_tool() -> ToolDescriptor {
    let mut properties = Pagination::schema_properties(LIST_LIMIT);
    properties.insert("payout_id".to_owned(), identifier_property("Only transactions settled in this payout"));
    properties.insert(
        "type".to_owned(),
        json!({ "type": "string", "description": "Filter by transaction type, e.g. charge, refund, payout, fee" }),
    );
    ToolDescriptor::new(
        "list_balance_transactions",
        "List balance transactions (every movement of funds in the account balance).",
        object_schema(properties, &[]),
    )
}

fn retrieve_balance_transaction_tool() -> ToolDescriptor {
    let mut properties = Map::new();
    properties.insert(
        "balance_transaction_id".to_owned(),
        identifier_property("The balance transaction ID"),
    );
    ToolDescriptor::new(
        "retrieve_balance_transaction",
        "Get a specific balance transaction by ID.",
        object_schema(properties, &["balance_transaction_id"]),
    )
}
