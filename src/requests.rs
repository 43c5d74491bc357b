//! Typed parameter builders for the order and trade endpoints

use crate::endpoints::EndpointId;
use crate::errors::{AlephxError, Result};
use crate::path::Params;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

/// Parameters implementing this can be sent to a specific endpoint
pub trait EndpointParams {
    fn endpoint(&self) -> EndpointId;
    fn to_params(&self) -> Result<Params>;
}

fn into_params<T: Serialize>(value: &T) -> Result<Params> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AlephxError::InvalidParams(format!("expected an object, got {}", other))),
    }
}

/// Body of `POST orders`
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrder {
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub side: OrderSide,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str_option", skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub time_in_force: String,
    pub idempotency_key: String,
}

impl CreateOrder {
    /// New order with `gtc` time in force and a fresh idempotency key
    pub fn new(
        symbol: impl Into<String>,
        order_type: OrderType,
        side: OrderSide,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            order_type,
            side,
            quantity,
            price,
            time_in_force: "gtc".to_string(),
            idempotency_key: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_time_in_force(mut self, time_in_force: impl Into<String>) -> Self {
        self.time_in_force = time_in_force.into();
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = key.into();
        self
    }
}

impl EndpointParams for CreateOrder {
    fn endpoint(&self) -> EndpointId {
        EndpointId::V1PrivatePostOrders
    }

    fn to_params(&self) -> Result<Params> {
        if self.order_type == OrderType::Limit && self.price.is_none() {
            return Err(AlephxError::InvalidParams("limit orders require a price".to_string()));
        }
        into_params(self)
    }
}

/// What to do with a single order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Fetch,
    Cancel,
}

/// `{id}` for `GET orders/{id}` and `PATCH orders/{id}/cancel`
#[derive(Debug, Clone, Serialize)]
pub struct OrderRef {
    pub id: String,
    #[serde(skip)]
    pub action: OrderAction,
}

impl OrderRef {
    pub fn fetch(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: OrderAction::Fetch,
        }
    }

    pub fn cancel(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            action: OrderAction::Cancel,
        }
    }
}

impl EndpointParams for OrderRef {
    fn endpoint(&self) -> EndpointId {
        match self.action {
            OrderAction::Fetch => EndpointId::V1PrivateGetOrdersId,
            OrderAction::Cancel => EndpointId::V1PrivatePatchOrdersIdCancel,
        }
    }

    fn to_params(&self) -> Result<Params> {
        into_params(self)
    }
}

/// `GET trades` restricted to the fills of one order
#[derive(Debug, Clone)]
pub struct OrderTradesFilter {
    pub order_id: String,
}

impl EndpointParams for OrderTradesFilter {
    fn endpoint(&self) -> EndpointId {
        EndpointId::V1PrivateGetTrades
    }

    fn to_params(&self) -> Result<Params> {
        // The exchange expects the filter list as a JSON-encoded string
        let filters = json!([{ "field": "order_id", "op": "==", "value": self.order_id }]);
        let mut params = Params::new();
        params.insert("filters".to_string(), Value::String(serde_json::to_string(&filters)?));
        Ok(params)
    }
}
