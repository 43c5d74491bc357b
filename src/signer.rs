//! Request preparation and signing
//!
//! Turns an [`Endpoint`] plus caller parameters into a fully formed HTTP
//! request: substituted path, query string or JSON body, and the `ZKX_ACCESS_*`
//! authentication headers for private routes. Nothing here performs I/O; the
//! result can be handed to any transport, or converted to a
//! `reqwest::RequestBuilder` with [`PreparedRequest::into_reqwest`].
//!
//! Signature payload: `timestamp_seconds + METHOD + /api/{version}/{path}`,
//! hex-encoded HMAC-SHA256 keyed with the raw secret. The query string is not
//! part of the signed path.

use crate::config::{Config, Credentials};
use crate::endpoints::{Endpoint, HttpMethod};
use crate::errors::{AlephxError, Result};
use crate::path::{implode_params, omit_path_params, urlencode_with_array_repeat, Params};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_ACCESS_KEY: &str = "ZKX_ACCESS_KEY";
pub const HEADER_ACCESS_SIGN: &str = "ZKX_ACCESS_SIGN";
pub const HEADER_ACCESS_TIMESTAMP: &str = "ZKX_ACCESS_TIMESTAMP";
const CONTENT_TYPE_JSON: &str = "application/json";

/// A request ready to be sent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    /// Header name/value pairs in insertion order
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Build (but do not send) a reqwest request
    pub fn into_reqwest(self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut req = client.request(self.method.into(), &self.url);
        for (name, value) in &self.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(body) = self.body {
            req = req.body(body);
        }
        req
    }
}

/// Hex-encoded HMAC-SHA256 of `payload` keyed with `secret`
pub fn compute_signature(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AlephxError::Signing(format!("invalid HMAC key: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Prepares requests against a configured REST host
#[derive(Debug, Clone)]
pub struct Signer {
    rest_url: String,
    credentials: Credentials,
}

impl Signer {
    pub fn new(rest_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            rest_url: rest_url.into(),
            credentials,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rest_url(), config.credentials.clone())
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    /// Prepare a request stamped with the current time
    pub fn prepare(&self, endpoint: &Endpoint, params: &Params) -> Result<PreparedRequest> {
        self.prepare_at(endpoint, params, chrono::Utc::now().timestamp())
    }

    /// Prepare a request with an explicit unix timestamp in seconds
    pub fn prepare_at(&self, endpoint: &Endpoint, params: &Params, timestamp: i64) -> Result<PreparedRequest> {
        let method = endpoint.method;
        let signed_path = format!(
            "/api/{}/{}",
            endpoint.version.as_str(),
            implode_params(endpoint.path, params)?
        );
        let query = omit_path_params(endpoint.path, params);

        let mut full_path = signed_path.clone();
        if method.uses_query() && !query.is_empty() {
            full_path.push('?');
            full_path.push_str(&urlencode_with_array_repeat(&query));
        }
        let url = format!("{}{}", self.rest_url, full_path);

        let mut headers = Vec::new();
        let mut body = None;

        if endpoint.is_private() {
            if !method.uses_query() && !query.is_empty() {
                body = Some(serde_json::to_string(&query)?);
            }

            match self.authorization_value() {
                Some(authorization) => {
                    debug!("Signing {} with Authorization header", endpoint.id);
                    headers.push(("Authorization".to_string(), authorization));
                }
                None => {
                    let (api_key, secret) = match (&self.credentials.api_key, &self.credentials.secret) {
                        (Some(key), Some(secret)) => (key, secret),
                        _ => return Err(AlephxError::MissingCredentials),
                    };
                    let timestamp = timestamp.to_string();
                    let payload = format!("{}{}{}", timestamp, method, signed_path);
                    let signature = compute_signature(secret, &payload)?;
                    debug!("Signing {} with HMAC at {}", endpoint.id, timestamp);

                    headers.push((HEADER_ACCESS_KEY.to_string(), api_key.clone()));
                    headers.push((HEADER_ACCESS_SIGN.to_string(), signature));
                    headers.push((HEADER_ACCESS_TIMESTAMP.to_string(), timestamp));
                }
            }
            headers.push(("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()));
        }

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Explicit header first, then bearer token when key/secret are incomplete
    fn authorization_value(&self) -> Option<String> {
        if let Some(authorization) = &self.credentials.authorization {
            return Some(authorization.clone());
        }
        match &self.credentials.token {
            Some(token) if !self.credentials.has_api_credentials() => Some(format!("Bearer {}", token)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::EndpointId;
    use serde_json::json;

    const TS: i64 = 1727363886;

    fn params(value: serde_json::Value) -> Params {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn hmac_signer() -> Signer {
        Signer::new("https://api.alephx.xyz", Credentials::new("key-1", "s3cret"))
    }

    #[test]
    fn test_compute_signature_known_vector() {
        // RFC 4231 test case 2
        assert_eq!(
            compute_signature("Jefe", "what do ya want for nothing?").unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_compute_signature_accepts_long_and_empty_keys() {
        let long_key = "k".repeat(200);
        let signature = compute_signature(&long_key, "payload").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(compute_signature("", "payload").unwrap().len(), 64);
    }

    #[test]
    fn test_public_get_has_no_auth() {
        let signer = Signer::new("https://api.alephx.xyz", Credentials::default());
        let req = signer
            .prepare_at(EndpointId::V1PublicGetSystemStatus.endpoint(), &Params::new(), TS)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.alephx.xyz/api/v1/system/status");
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn test_private_get_signs_path_without_query() {
        let p = params(json!({"id": "0da4eb8d", "expand": "fills"}));
        let req = hmac_signer()
            .prepare_at(EndpointId::V1PrivateGetOrdersId.endpoint(), &p, TS)
            .unwrap();

        assert_eq!(req.url, "https://api.alephx.xyz/api/v1/orders/0da4eb8d?expand=fills");
        assert!(req.body.is_none());

        let expected = compute_signature("s3cret", "1727363886GET/api/v1/orders/0da4eb8d").unwrap();
        assert_eq!(req.header(HEADER_ACCESS_SIGN), Some(expected.as_str()));
        assert_eq!(req.header(HEADER_ACCESS_KEY), Some("key-1"));
        assert_eq!(req.header(HEADER_ACCESS_TIMESTAMP), Some("1727363886"));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_private_post_puts_params_in_body() {
        let p = params(json!({"symbol": "CLEO-ALEO", "side": "buy", "quantity": "0.1"}));
        let req = hmac_signer()
            .prepare_at(EndpointId::V1PrivatePostOrders.endpoint(), &p, TS)
            .unwrap();

        assert_eq!(req.url, "https://api.alephx.xyz/api/v1/orders");
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"symbol":"CLEO-ALEO","side":"buy","quantity":"0.1"}"#)
        );
        let expected = compute_signature("s3cret", "1727363886POST/api/v1/orders").unwrap();
        assert_eq!(req.header(HEADER_ACCESS_SIGN), Some(expected.as_str()));
    }

    #[test]
    fn test_patch_cancel_with_only_path_params_has_no_body() {
        let p = params(json!({"id": "abc"}));
        let req = hmac_signer()
            .prepare_at(EndpointId::V1PrivatePatchOrdersIdCancel.endpoint(), &p, TS)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Patch);
        assert_eq!(req.url, "https://api.alephx.xyz/api/v1/orders/abc/cancel");
        assert!(req.body.is_none());
    }

    #[test]
    fn test_missing_credentials() {
        let signer = Signer::new("https://api.alephx.xyz", Credentials::default());
        let err = signer
            .prepare_at(EndpointId::V1PrivateGetOrders.endpoint(), &Params::new(), TS)
            .unwrap_err();
        assert!(matches!(err, AlephxError::MissingCredentials));
    }

    #[test]
    fn test_bearer_token_when_no_api_credentials() {
        let signer = Signer::new("https://api.alephx.xyz", Credentials::bearer("tok"));
        let req = signer
            .prepare_at(EndpointId::V1PrivateGetTrades.endpoint(), &Params::new(), TS)
            .unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer tok"));
        assert!(req.header(HEADER_ACCESS_SIGN).is_none());
    }

    #[test]
    fn test_api_credentials_win_over_token() {
        let mut creds = Credentials::new("key-1", "s3cret");
        creds.token = Some("tok".to_string());
        let req = Signer::new("https://api.alephx.xyz", creds)
            .prepare_at(EndpointId::V1PrivateGetTrades.endpoint(), &Params::new(), TS)
            .unwrap();
        assert!(req.header("Authorization").is_none());
        assert!(req.header(HEADER_ACCESS_SIGN).is_some());
    }

    #[test]
    fn test_explicit_authorization_header_wins() {
        let mut creds = Credentials::new("key-1", "s3cret");
        creds.authorization = Some("Custom abc".to_string());
        let p = params(json!({"symbol": "CLEO-ALEO"}));
        let req = Signer::new("https://api.alephx.xyz", creds)
            .prepare_at(EndpointId::V1PrivatePostOrders.endpoint(), &p, TS)
            .unwrap();
        assert_eq!(req.header("Authorization"), Some("Custom abc"));
        assert_eq!(req.body.as_deref(), Some(r#"{"symbol":"CLEO-ALEO"}"#));
    }

    #[test]
    fn test_missing_path_param() {
        let err = hmac_signer()
            .prepare_at(EndpointId::V1PrivateGetOrdersId.endpoint(), &Params::new(), TS)
            .unwrap_err();
        assert!(matches!(err, AlephxError::MissingParam { .. }));
    }

    #[test]
    fn test_into_reqwest_builds_request() {
        let p = params(json!({"id": "abc"}));
        let prepared = hmac_signer()
            .prepare_at(EndpointId::V1PrivateGetOrdersId.endpoint(), &p, TS)
            .unwrap();
        let request = prepared.into_reqwest(&reqwest::Client::new()).build().unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().as_str(), "https://api.alephx.xyz/api/v1/orders/abc");
        assert_eq!(request.headers()[HEADER_ACCESS_KEY], "key-1");
    }
}
