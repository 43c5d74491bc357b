//! AlephX REST API Library
//!
//! A declarative registry of the AlephX exchange REST routes, plus the
//! pieces a client needs to use it:
//!
//! 1. **Endpoint registry**: every route with its path template, version and
//!    visibility tags, HTTP verb and rate-limit cost, addressable by a
//!    canonical id or by its snake_case / camelCase alias.
//! 2. **Request preparation**: path substitution, query/body encoding and
//!    HMAC-SHA256 signing of private routes. Requests are prepared, never sent.
//! 3. **Rate limiting**: a token bucket weighted by endpoint cost.
//! 4. **Response decoding**: markets, orders, trades, balances and status.

pub mod config;
pub mod endpoints;
pub mod errors;
pub mod exchange;
pub mod path;
pub mod requests;
pub mod services;
pub mod signer;
pub mod types;

pub use config::{Config, Credentials};
pub use endpoints::{lookup, ApiVersion, Endpoint, EndpointConfig, EndpointId, HttpMethod, Visibility};
pub use errors::{AlephxError, Result};
pub use exchange::{AlephxApi, Capability, Support};
pub use path::Params;
pub use requests::{CreateOrder, EndpointParams, OrderRef, OrderSide, OrderTradesFilter, OrderType};
pub use services::RateLimiter;
pub use signer::{PreparedRequest, Signer};
pub use types::{Balance, Balances, ExchangeStatus, Market, Order, StatusKind, Trade};
