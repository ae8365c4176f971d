use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::{ApiClient, ApiRequest};
use crate::errors::ToolError;
use crate::tools::registry::{ToolDescriptor, ToolRegistry};
use crate::tools::validation::{
    identifier_property, object_schema, validate_identifier, validate_optional_identifier, Pagination, LIST_LIMIT,
};

const PAYMENT_METHODS: &str = "payment-methods";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPaymentMethodsParams {
    #[serde(flatten)]
    pub page: Pagination,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodParams {
    pub payment_method_token: String,
}

pub async fn list_payment_methods(client: &ApiClient, params: ListPaymentMethodsParams) -> Result<Value, ToolError> {
    let customer_id = validate_optional_identifier("customer_id", params.customer_id.as_deref())?;
    let request = params
        .page
        .apply(ApiRequest::get([PAYMENT_METHODS]), LIST_LIMIT)?
        .query_opt("customer_id", customer_id);
    client.request(&request).await
}

pub async fn retrieve_payment_method(client: &ApiClient, params: PaymentMethodParams) -> Result<Value, ToolError> {
    let token = validate_identifier("payment_method_token", &params.payment_method_token)?;
    client
        .request(&ApiRequest::get([PAYMENT_METHODS, token]))
        .await
        .map_err(|e| e.context(format!("failed to retrieve payment method {}", token)))
}

pub fn register(registry: &mut ToolRegistry) {
    registry.register(list_payment_methods_tool(), |client, params: ListPaymentMethodsParams| async move {
        list_payment_methods(&client, params).await
    });
    registry.register(retrieve_payment_method_tool(), |client, params: PaymentMethodParams| async move {
        retrieve_payment_method(&client, params).await
    });
}

fn list_payment_methods_tool() -> ToolDescriptor {
    let mut properties = Pagination::schema_properties(LIST_LIMIT);
    properties.insert("customer_id".to_owned(), identifier_property("Only payment methods of this customer"));
    ToolDescriptor::new(
        "list_payment_methods",
        "List stored payment methods, optionally for one customer.",
        object_schema(properties, &[]),
    )
}

fn retrieve_payment_method_tool() -> ToolDescriptor {
    let mut properties = Map::new();
    properties.insert(
        "payment_method_token".to_owned(),
        identifier_property("Token identifying the payment method"),
    );
    ToolDescriptor::new(
        "retrieve_payment_method",
        "Get a stored payment method by its token.",
        object_schema(properties, &["payment_method_token"]),
    )
}
