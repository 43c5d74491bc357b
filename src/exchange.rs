//! Static description of the AlephX exchange
//!
//! Hosts, rate limit, the unified capabilities the integration supports and
//! the endpoint each of them is served by.

use crate::endpoints::EndpointId;
use serde::Serialize;
use std::fmt;

pub const EXCHANGE_ID: &str = "alephx";
pub const EXCHANGE_NAME: &str = "AlephX";
pub const COUNTRIES: &[&str] = &["CA"];
pub const API_VERSION: &str = "v1";
pub const PRO: bool = true;
pub const CERTIFIED: bool = false;

/// Base rate limit in milliseconds per unit of endpoint cost
pub const RATE_LIMIT_MS: u64 = 1000;

/// AlephX hosts
pub struct AlephxApi;

impl AlephxApi {
    pub const REST_URL: &'static str = "https://api.alephx.xyz";
    pub const TESTNET_REST_URL: &'static str = "https://api-testnet.alephx.xyz";
    pub const WWW_URL: &'static str = "https://demo.alephx.xyz";

    pub fn rest_url(sandbox: bool) -> &'static str {
        if sandbox {
            Self::TESTNET_REST_URL
        } else {
            Self::REST_URL
        }
    }
}

/// Exchange-specific currency ids mapped to unified codes
pub const COMMON_CURRENCIES: &[(&str, &str)] = &[("XBTC", "BTC"), ("XETH", "ETH"), ("XUSDC", "USDC")];

/// Unified currency code for an exchange asset id.
///
/// Ids are uppercased before the common-currency mapping, so `xETH` and
/// `XETH` both give `ETH`.
pub fn safe_currency_code(id: &str) -> String {
    let upper = id.to_uppercase();
    COMMON_CURRENCIES
        .iter()
        .find(|(exchange_id, _)| *exchange_id == upper)
        .map(|(_, code)| code.to_string())
        .unwrap_or(upper)
}

/// Level of support for a unified capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Support {
    Yes,
    No,
    Emulated,
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Support::Yes => write!(f, "yes"),
            Support::No => write!(f, "no"),
            Support::Emulated => write!(f, "emulated"),
        }
    }
}

/// Unified exchange capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Capability {
    FetchStatus,
    FetchMarkets,
    FetchBalance,
    CreateOrder,
    CancelOrder,
    FetchOrder,
    FetchOrders,
    FetchMyTrades,
    FetchOrderTrades,
    FetchTradingFee,
    CancelOrders,
    EditOrder,
    FetchTicker,
    FetchTickers,
    FetchOrderBook,
    FetchOhlcv,
    FetchTrades,
    FetchOpenOrders,
    FetchCurrencies,
    FetchDeposits,
    FetchWithdrawals,
    Withdraw,
}

impl Capability {
    pub const ALL: &'static [Capability] = &[
        Capability::FetchStatus,
        Capability::FetchMarkets,
        Capability::FetchBalance,
        Capability::CreateOrder,
        Capability::CancelOrder,
        Capability::FetchOrder,
        Capability::FetchOrders,
        Capability::FetchMyTrades,
        Capability::FetchOrderTrades,
        Capability::FetchTradingFee,
        Capability::CancelOrders,
        Capability::EditOrder,
        Capability::FetchTicker,
        Capability::FetchTickers,
        Capability::FetchOrderBook,
        Capability::FetchOhlcv,
        Capability::FetchTrades,
        Capability::FetchOpenOrders,
        Capability::FetchCurrencies,
        Capability::FetchDeposits,
        Capability::FetchWithdrawals,
        Capability::Withdraw,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Capability::FetchStatus => "fetchStatus",
            Capability::FetchMarkets => "fetchMarkets",
            Capability::FetchBalance => "fetchBalance",
            Capability::CreateOrder => "createOrder",
            Capability::CancelOrder => "cancelOrder",
            Capability::FetchOrder => "fetchOrder",
            Capability::FetchOrders => "fetchOrders",
            Capability::FetchMyTrades => "fetchMyTrades",
            Capability::FetchOrderTrades => "fetchOrderTrades",
            Capability::FetchTradingFee => "fetchTradingFee",
            Capability::CancelOrders => "cancelOrders",
            Capability::EditOrder => "editOrder",
            Capability::FetchTicker => "fetchTicker",
            Capability::FetchTickers => "fetchTickers",
            Capability::FetchOrderBook => "fetchOrderBook",
            Capability::FetchOhlcv => "fetchOHLCV",
            Capability::FetchTrades => "fetchTrades",
            Capability::FetchOpenOrders => "fetchOpenOrders",
            Capability::FetchCurrencies => "fetchCurrencies",
            Capability::FetchDeposits => "fetchDeposits",
            Capability::FetchWithdrawals => "fetchWithdrawals",
            Capability::Withdraw => "withdraw",
        }
    }

    pub fn support(&self) -> Support {
        match self {
            Capability::FetchTradingFee => Support::Emulated,
            other if other.endpoint().is_some() => Support::Yes,
            _ => Support::No,
        }
    }

    /// Endpoint that serves this capability, if supported natively
    pub fn endpoint(&self) -> Option<EndpointId> {
        match self {
            Capability::FetchStatus => Some(EndpointId::V1PublicGetSystemStatus),
            Capability::FetchMarkets => Some(EndpointId::V1PublicGetTradingPairs),
            Capability::FetchBalance => Some(EndpointId::V1PrivateGetAssetsBalances),
            Capability::CreateOrder => Some(EndpointId::V1PrivatePostOrders),
            Capability::CancelOrder => Some(EndpointId::V1PrivatePatchOrdersIdCancel),
            Capability::FetchOrder => Some(EndpointId::V1PrivateGetOrdersId),
            Capability::FetchOrders => Some(EndpointId::V1PrivateGetOrders),
            Capability::FetchMyTrades | Capability::FetchOrderTrades => Some(EndpointId::V1PrivateGetTrades),
            _ => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
