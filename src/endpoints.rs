//! AlephX REST endpoint registry
//!
//! Every route the exchange exposes, with its path template, version and
//! visibility tags, HTTP verb and rate-limit cost. Each route has a single
//! canonical [`EndpointId`] and two alias names used by call sites:
//! `v1_private_get_orders_id` and `v1PrivateGetOrdersId` resolve to the same
//! descriptor.
//!
//! The table is append-only: new API versions add entries, existing entries
//! never change.

use crate::errors::{AlephxError, Result};
use serde::Serialize;
use std::fmt;

/// HTTP verbs used by REST routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Whether request parameters travel in the query string
    pub fn uses_query(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// API version tag (first tag of every endpoint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    V1,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
        }
    }
}

/// Visibility tag, selects whether a request gets signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

/// Per-endpoint options consumed by the surrounding client
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EndpointConfig {
    /// Rate-limiter weight, in units of the exchange's base rate limit
    pub cost: f64,
}

/// Immutable description of one REST route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    #[serde(skip)]
    pub id: EndpointId,
    pub path: &'static str,
    pub version: ApiVersion,
    pub visibility: Visibility,
    pub method: HttpMethod,
    pub config: EndpointConfig,
}

impl Endpoint {
    /// Tags in the order the client expects them: version, then visibility
    pub fn tags(&self) -> [&'static str; 2] {
        [self.version.as_str(), self.visibility.as_str()]
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    pub fn snake_name(&self) -> &'static str {
        self.id.snake_name()
    }

    pub fn camel_name(&self) -> &'static str {
        self.id.camel_name()
    }

    /// Whether the path contains `{placeholder}` segments
    pub fn has_placeholders(&self) -> bool {
        self.path.contains('{')
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}] cost={}",
            self.method,
            self.path,
            self.tags().join(","),
            self.config.cost
        )
    }
}

/// Canonical identifier for each endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointId {
    V1PublicGetSystemStatus,
    V1PublicGetTradingPairs,
    V1PrivateGetAssetsBalances,
    V1PrivateGetOrders,
    V1PrivateGetOrdersId,
    V1PrivateGetTrades,
    V1PrivatePostOrders,
    V1PrivatePatchOrdersIdCancel,
}

impl EndpointId {
    pub fn snake_name(&self) -> &'static str {
        match self {
            EndpointId::V1PublicGetSystemStatus => "v1_public_get_system_status",
            EndpointId::V1PublicGetTradingPairs => "v1_public_get_trading_pairs",
            EndpointId::V1PrivateGetAssetsBalances => "v1_private_get_assets_balances",
            EndpointId::V1PrivateGetOrders => "v1_private_get_orders",
            EndpointId::V1PrivateGetOrdersId => "v1_private_get_orders_id",
            EndpointId::V1PrivateGetTrades => "v1_private_get_trades",
            EndpointId::V1PrivatePostOrders => "v1_private_post_orders",
            EndpointId::V1PrivatePatchOrdersIdCancel => "v1_private_patch_orders_id_cancel",
        }
    }

    pub fn camel_name(&self) -> &'static str {
        match self {
            EndpointId::V1PublicGetSystemStatus => "v1PublicGetSystemStatus",
            EndpointId::V1PublicGetTradingPairs => "v1PublicGetTradingPairs",
            EndpointId::V1PrivateGetAssetsBalances => "v1PrivateGetAssetsBalances",
            EndpointId::V1PrivateGetOrders => "v1PrivateGetOrders",
            EndpointId::V1PrivateGetOrdersId => "v1PrivateGetOrdersId",
            EndpointId::V1PrivateGetTrades => "v1PrivateGetTrades",
            EndpointId::V1PrivatePostOrders => "v1PrivatePostOrders",
            EndpointId::V1PrivatePatchOrdersIdCancel => "v1PrivatePatchOrdersIdCancel",
        }
    }

    /// Resolve either alias to its identifier
    pub fn from_name(name: &str) -> Option<Self> {
        ENDPOINTS
            .iter()
            .map(|e| e.id)
            .find(|id| id.snake_name() == name || id.camel_name() == name)
    }

    /// Descriptor for this identifier. Every identifier has exactly one row in the table.
    pub fn endpoint(&self) -> &'static Endpoint {
        match ENDPOINTS.iter().find(|e| e.id == *self) {
            Some(endpoint) => endpoint,
            None => unreachable!("endpoint table is missing {:?}", self),
        }
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.camel_name())
    }
}

const fn entry(
    id: EndpointId,
    path: &'static str,
    visibility: Visibility,
    method: HttpMethod,
    cost: f64,
) -> Endpoint {
    Endpoint {
        id,
        path,
        version: ApiVersion::V1,
        visibility,
        method,
        config: EndpointConfig { cost },
    }
}

/// The full route table, in definition order
pub static ENDPOINTS: &[Endpoint] = &[
    entry(EndpointId::V1PublicGetSystemStatus, "system/status", Visibility::Public, HttpMethod::Get, 0.0),
    entry(EndpointId::V1PublicGetTradingPairs, "trading-pairs", Visibility::Public, HttpMethod::Get, 0.0),
    entry(EndpointId::V1PrivateGetAssetsBalances, "assets/balances", Visibility::Private, HttpMethod::Get, 0.0),
    entry(EndpointId::V1PrivateGetOrders, "orders", Visibility::Private, HttpMethod::Get, 0.0),
    entry(EndpointId::V1PrivateGetOrdersId, "orders/{id}", Visibility::Private, HttpMethod::Get, 0.0),
    entry(EndpointId::V1PrivateGetTrades, "trades", Visibility::Private, HttpMethod::Get, 0.0),
    entry(EndpointId::V1PrivatePostOrders, "orders", Visibility::Private, HttpMethod::Post, 0.0),
    entry(EndpointId::V1PrivatePatchOrdersIdCancel, "orders/{id}/cancel", Visibility::Private, HttpMethod::Patch, 0.0),
];

/// Look up an endpoint by its snake_case or camelCase name
pub fn lookup(name: &str) -> Result<&'static Endpoint> {
    EndpointId::from_name(name)
        .map(|id| id.endpoint())
        .ok_or_else(|| AlephxError::UnknownEndpoint(name.to_string()))
}

/// Iterate every endpoint in definition order
pub fn all() -> impl Iterator<Item = &'static Endpoint> {
    ENDPOINTS.iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Identifiers shipped in the first release; later releases may only add to this
    const RELEASE_1_NAMES: &[&str] = &[
        "v1_public_get_system_status",
        "v1_private_get_assets_balances",
        "v1_private_get_orders",
        "v1_private_get_orders_id",
        "v1_private_get_trades",
        "v1_private_post_orders",
        "v1_private_patch_orders_id_cancel",
        "v1PublicGetSystemStatus",
        "v1PrivateGetAssetsBalances",
        "v1PrivateGetOrders",
        "v1PrivateGetOrdersId",
        "v1PrivateGetTrades",
        "v1PrivatePostOrders",
        "v1PrivatePatchOrdersIdCancel",
    ];

    #[test]
    fn test_aliases_resolve_to_same_descriptor() {
        for endpoint in all() {
            let snake = lookup(endpoint.snake_name()).unwrap();
            let camel = lookup(endpoint.camel_name()).unwrap();
            assert!(std::ptr::eq(snake, camel), "{} aliases differ", endpoint.id);
            assert_eq!(snake.path, camel.path);
            assert_eq!(snake.tags(), camel.tags());
            assert_eq!(snake.method, camel.method);
            assert_eq!(snake.config.cost, camel.config.cost);
        }
    }

    #[test]
    fn test_post_orders_descriptor() {
        let endpoint = lookup("v1PrivatePostOrders").unwrap();
        assert_eq!(endpoint.path, "orders");
        assert_eq!(endpoint.tags(), ["v1", "private"]);
        assert_eq!(endpoint.method, HttpMethod::Post);
        assert_eq!(endpoint.config.cost, 0.0);
    }

    #[test]
    fn test_unknown_endpoint() {
        let err = lookup("v1PrivateDeleteOrders").unwrap_err();
        assert!(matches!(err, AlephxError::UnknownEndpoint(ref n) if n == "v1PrivateDeleteOrders"));
        assert!(lookup("").is_err());
        // Aliases are exact, not case-insensitive
        assert!(lookup("V1PRIVATEGETORDERS").is_err());
    }

    #[test]
    fn test_placeholder_paths_have_collection_counterpart() {
        let paths: HashSet<&str> = all().map(|e| e.path).collect();
        for endpoint in all().filter(|e| e.has_placeholders()) {
            let collection = endpoint
                .path
                .split('/')
                .take_while(|segment| !segment.starts_with('{'))
                .collect::<Vec<_>>()
                .join("/");
            assert!(
                paths.contains(collection.as_str()),
                "{} has no counterpart '{}'",
                endpoint.path,
                collection
            );
        }
    }

    #[test]
    fn test_methods_are_standard_verbs() {
        let standard = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];
        for endpoint in all() {
            assert!(standard.contains(&endpoint.method.as_str()));
        }
    }

    #[test]
    fn test_table_is_append_only() {
        let current: HashSet<&str> = all()
            .flat_map(|e| [e.snake_name(), e.camel_name()])
            .collect();
        for name in RELEASE_1_NAMES {
            assert!(current.contains(name), "{} was removed", name);
        }
    }

    #[test]
    fn test_ids_unique_and_every_id_has_a_row() {
        let ids: HashSet<EndpointId> = all().map(|e| e.id).collect();
        assert_eq!(ids.len(), ENDPOINTS.len());
        for endpoint in all() {
            assert_eq!(endpoint.id.endpoint(), endpoint);
            assert_eq!(EndpointId::from_name(endpoint.snake_name()), Some(endpoint.id));
        }
    }

    #[test]
    fn test_display() {
        let endpoint = EndpointId::V1PrivatePatchOrdersIdCancel.endpoint();
        assert_eq!(endpoint.to_string(), "PATCH orders/{id}/cancel [v1,private] cost=0");
        assert_eq!(EndpointId::V1PrivateGetOrdersId.to_string(), "v1PrivateGetOrdersId");
    }

    #[test]
    fn test_reqwest_method_conversion() {
        assert_eq!(reqwest::Method::from(HttpMethod::Patch), reqwest::Method::PATCH);
        assert!(HttpMethod::Get.uses_query());
        assert!(!HttpMethod::Post.uses_query());
    }
}
