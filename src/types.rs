//! Unified records decoded from AlephX REST responses
//!
//! Each `parse_*` function first checks the body for an exchange error
//! payload, then decodes the raw exchange shape and converts it into the
//! unified record.

use crate::errors::{AlephxError, Result};
use crate::exchange::safe_currency_code;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Amount precision is fixed at six decimal places on every pair
const AMOUNT_DECIMALS: u32 = 6;

/// Default page size for order listings
pub const DEFAULT_ORDERS_LIMIT: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Precision {
    pub amount: Decimal,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketLimits {
    pub amount: MinMax,
    pub leverage: MinMax,
}

/// A spot trading pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Exchange symbol, e.g. `xETH-ALEO`
    pub id: String,
    /// Unified symbol, e.g. `ETH/ALEO`
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub base_id: String,
    pub quote_id: String,
    pub active: bool,
    pub spot: bool,
    pub precision: Precision,
    pub limits: MarketLimits,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fee {
    pub cost: Option<Decimal>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub client_order_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub last_trade_timestamp: Option<DateTime<Utc>>,
    pub symbol: Option<String>,
    pub order_type: Option<String>,
    pub time_in_force: String,
    pub post_only: bool,
    pub side: Option<String>,
    pub price: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub filled: Option<Decimal>,
    pub remaining: Option<Decimal>,
    pub average: Option<Decimal>,
    pub status: Option<String>,
    pub fee: Fee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    /// Our side's order id
    pub order: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub symbol: Option<String>,
    pub side: Option<String>,
    pub price: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub fee: Fee,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub free: Option<Decimal>,
    pub used: Option<Decimal>,
    pub total: Option<Decimal>,
}

/// Balances keyed by asset code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub assets: BTreeMap<String, Balance>,
}

impl Balances {
    pub fn get(&self, code: &str) -> Option<&Balance> {
        self.assets.get(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Ok,
    Maintenance,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKind::Ok => write!(f, "ok"),
            StatusKind::Maintenance => write!(f, "maintenance"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeStatus {
    pub status: StatusKind,
    /// Raw response body
    pub info: String,
}

/// Records that carry a creation timestamp, for since/limit filtering
pub trait Timestamped {
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

impl Timestamped for Order {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

impl Timestamped for Trade {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

/// Sort ascending by timestamp, drop records older than `since`, keep the first `limit`
pub fn filter_by_since_limit<T: Timestamped>(
    mut items: Vec<T>,
    since: Option<DateTime<Utc>>,
    limit: Option<usize>,
) -> Vec<T> {
    items.sort_by_key(|item| item.timestamp());
    if let Some(since) = since {
        items.retain(|item| item.timestamp().map(|ts| ts >= since).unwrap_or(false));
    }
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

// ---------------------------------------------------------------------------
// Raw exchange shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawTradingPair {
    symbol: String,
    #[serde(default)]
    is_active: bool,
    #[serde(default)]
    price_decimal_precision: Option<u32>,
    #[serde(default)]
    min_order_quantity: Option<Decimal>,
    #[serde(default)]
    max_order_quantity: Option<Decimal>,
    base_asset: String,
    quote_asset: String,
}

#[derive(Debug, Deserialize)]
struct RawOrder {
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "type")]
    order_type: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    base_quantity: Option<Decimal>,
    #[serde(default)]
    filled_quantity: Option<Decimal>,
    #[serde(default)]
    remained_quantity: Option<Decimal>,
    #[serde(default)]
    side: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    idempotency_key: Option<String>,
    #[serde(default)]
    inserted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    filled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    average_filled_price: Option<Decimal>,
    #[serde(default)]
    cumulative_fee: Option<Decimal>,
    #[serde(default)]
    fee_asset: Option<String>,
    #[serde(default)]
    time_in_force: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    id: String,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    base_quantity: Option<Decimal>,
    #[serde(default)]
    quote_quantity: Option<Decimal>,
    #[serde(default)]
    side: Option<String>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    buy_order_id: Option<String>,
    #[serde(default)]
    sell_order_id: Option<String>,
    #[serde(default)]
    inserted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    fee: Option<Decimal>,
    #[serde(default)]
    fee_asset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTradePage {
    #[serde(default)]
    data: Vec<RawTrade>,
}

#[derive(Debug, Deserialize)]
struct RawBalance {
    asset: String,
    #[serde(default)]
    available: Option<Decimal>,
    #[serde(default)]
    locked: Option<Decimal>,
    #[serde(default)]
    total: Option<Decimal>,
}

impl From<RawTradingPair> for Market {
    fn from(raw: RawTradingPair) -> Self {
        let base = safe_currency_code(&raw.base_asset);
        let quote = safe_currency_code(&raw.quote_asset);
        let one = Some(Decimal::ONE);
        Market {
            id: raw.symbol,
            symbol: format!("{}/{}", base, quote),
            base,
            quote,
            base_id: raw.base_asset,
            quote_id: raw.quote_asset,
            active: raw.is_active,
            spot: true,
            precision: Precision {
                amount: Decimal::new(1, AMOUNT_DECIMALS),
                price: raw
                    .price_decimal_precision
                    .and_then(|p| Decimal::try_new(1, p).ok()),
            },
            limits: MarketLimits {
                amount: MinMax {
                    min: raw.min_order_quantity,
                    max: raw.max_order_quantity,
                },
                leverage: MinMax { min: one, max: one },
            },
        }
    }
}

impl From<RawOrder> for Order {
    fn from(raw: RawOrder) -> Self {
        Order {
            id: raw
                .order_id
                .filter(|id| !id.is_empty())
                .or(raw.id)
                .unwrap_or_default(),
            client_order_id: raw.idempotency_key,
            timestamp: raw.inserted_at,
            last_trade_timestamp: raw.filled_at,
            symbol: raw.symbol,
            order_type: raw.order_type,
            time_in_force: raw.time_in_force.unwrap_or_else(|| "gtc".to_string()),
            post_only: true,
            side: raw.side.map(|s| s.to_lowercase()),
            price: raw.price,
            amount: raw.base_quantity,
            filled: raw.filled_quantity,
            remaining: raw.remained_quantity,
            average: raw.average_filled_price,
            status: raw.status,
            fee: Fee {
                cost: raw.cumulative_fee,
                currency: raw.fee_asset,
            },
        }
    }
}

impl From<RawTrade> for Trade {
    fn from(raw: RawTrade) -> Self {
        let order = if raw.side.as_deref() == Some("buy") {
            raw.buy_order_id
        } else {
            raw.sell_order_id
        };
        Trade {
            id: raw.id,
            order,
            timestamp: raw.inserted_at,
            symbol: raw.symbol,
            side: raw.side,
            price: raw.price,
            amount: raw.base_quantity,
            cost: raw.quote_quantity,
            fee: Fee {
                cost: raw.fee,
                currency: raw.fee_asset,
            },
        }
    }
}

fn check_error(body: &str) -> Result<()> {
    match AlephxError::from_response_body(body) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// `GET trading-pairs`
pub fn parse_markets(body: &str) -> Result<Vec<Market>> {
    check_error(body)?;
    let pairs: Vec<RawTradingPair> = serde_json::from_str(body)?;
    Ok(pairs.into_iter().map(Market::from).collect())
}

/// `POST orders`, `GET orders/{id}`, `PATCH orders/{id}/cancel`
pub fn parse_order(body: &str) -> Result<Order> {
    check_error(body)?;
    let raw: RawOrder = serde_json::from_str(body)?;
    Ok(raw.into())
}

/// `GET orders`
pub fn parse_orders(body: &str, since: Option<DateTime<Utc>>, limit: Option<usize>) -> Result<Vec<Order>> {
    check_error(body)?;
    let raw: Vec<RawOrder> = serde_json::from_str(body)?;
    let orders = raw.into_iter().map(Order::from).collect();
    Ok(filter_by_since_limit(orders, since, limit))
}

/// `GET trades`, a `{"data": [...]}` page
pub fn parse_trades(body: &str, since: Option<DateTime<Utc>>, limit: Option<usize>) -> Result<Vec<Trade>> {
    check_error(body)?;
    let page: RawTradePage = serde_json::from_str(body)?;
    let trades = page.data.into_iter().map(Trade::from).collect();
    Ok(filter_by_since_limit(trades, since, limit))
}

/// `GET assets/balances`
pub fn parse_balances(body: &str) -> Result<Balances> {
    check_error(body)?;
    let raw: Vec<RawBalance> = serde_json::from_str(body)?;
    let assets = raw
        .into_iter()
        .map(|b| {
            (
                b.asset,
                Balance {
                    free: b.available,
                    used: b.locked,
                    total: b.total,
                },
            )
        })
        .collect();
    Ok(Balances { assets })
}

/// `GET system/status`. The exchange answers `OK`, plain or JSON-quoted.
pub fn parse_status(body: &str) -> ExchangeStatus {
    let trimmed = body.trim();
    let text = serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string());
    let status = if text == "OK" {
        StatusKind::Ok
    } else {
        StatusKind::Maintenance
    };
    ExchangeStatus {
        status,
        info: body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    const ORDER_BODY: &str = r#"{
        "id": "0da4eb8d-c108-4e6c-8c45-0b42fabd3a72",
        "status": "partially_filled",
        "type": "limit",
        "symbol": "CLEO-ALEO",
        "account_id": "cb77b9ab-f94d-4013-85b7-644b0b9ba9a9",
        "settled_quantity": "0",
        "base_quantity": "0.1",
        "filled_quantity": "0.04",
        "side": "BUY",
        "price": "12.3",
        "remained_quantity": "0.06",
        "idempotency_key": "99888999-93ef-9831-9829-120a082bfcf2",
        "inserted_at": "2024-09-16T23:47:45.161888Z",
        "fee_asset": null,
        "filled_at": "2024-09-26T20:08:11.350542Z",
        "average_filled_price": "12.3",
        "canceled_at": null,
        "cumulative_fee": "0",
        "time_in_force": "gtc",
        "internal_status": "partially_filled"
    }"#;

    const TRADES_BODY: &str = r#"{"data": [
        {"id": "t2", "status": "unsettled", "symbol": "CLEO-ALEO", "base_quantity": "0.01",
         "side": "sell", "price": "12.3", "buy_order_id": "b2", "sell_order_id": "s2",
         "quote_quantity": "0.123", "inserted_at": "2024-09-27T15:18:06.603489Z",
         "aggressor_side": "sell", "fee": null, "fee_asset": null},
        {"id": "t1", "status": "unsettled", "symbol": "CLEO-ALEO", "base_quantity": "0.01",
         "side": "buy", "price": "12.3", "buy_order_id": "b1", "sell_order_id": "s1",
         "quote_quantity": "0.123", "inserted_at": "2024-09-26T15:18:06.603489Z",
         "aggressor_side": "sell", "fee": "0.001", "fee_asset": "ALEO"}
    ]}"#;

    #[test]
    fn test_parse_markets() {
        let body = r#"[{
            "id": "f178aed2-4d1e-4d1b-add8-4f19c584d25b",
            "symbol": "xETH-ALEO",
            "is_active": true,
            "price_decimal_precision": 6,
            "min_order_quantity": "0.0001",
            "max_order_quantity": "1000",
            "base_asset": "xETH",
            "quote_asset": "ALEO"
        }]"#;
        let markets = parse_markets(body).unwrap();
        assert_eq!(markets.len(), 1);
        let m = &markets[0];
        assert_eq!(m.id, "xETH-ALEO");
        assert_eq!(m.symbol, "ETH/ALEO");
        assert_eq!(m.base, "ETH");
        assert_eq!(m.base_id, "xETH");
        assert_eq!(m.quote, "ALEO");
        assert!(m.active && m.spot);
        assert_eq!(m.precision.amount, dec!(0.000001));
        assert_eq!(m.precision.price, Some(dec!(0.000001)));
        assert_eq!(m.limits.amount.min, Some(dec!(0.0001)));
        assert_eq!(m.limits.amount.max, Some(dec!(1000)));
        assert_eq!(m.limits.leverage.max, Some(dec!(1)));
    }

    #[test]
    fn test_parse_order_full() {
        let order = parse_order(ORDER_BODY).unwrap();
        assert_eq!(order.id, "0da4eb8d-c108-4e6c-8c45-0b42fabd3a72");
        assert_eq!(order.client_order_id.as_deref(), Some("99888999-93ef-9831-9829-120a082bfcf2"));
        assert_eq!(order.side.as_deref(), Some("buy"));
        assert_eq!(order.amount, Some(dec!(0.1)));
        assert_eq!(order.filled, Some(dec!(0.04)));
        assert_eq!(order.remaining, Some(dec!(0.06)));
        assert_eq!(order.fee.cost, Some(dec!(0)));
        assert!(order.fee.currency.is_none());
        assert!(order.post_only);
        let inserted = order.timestamp.unwrap();
        assert_eq!(inserted.date_naive().to_string(), "2024-09-16");
        assert!(order.last_trade_timestamp.unwrap() > inserted);
    }

    #[test]
    fn test_parse_created_order_uses_order_id() {
        let order = parse_order(r#"{"order_id": "52cfe5e2", "status": "pending_new"}"#).unwrap();
        assert_eq!(order.id, "52cfe5e2");
        assert_eq!(order.status.as_deref(), Some("pending_new"));
        assert_eq!(order.time_in_force, "gtc");
    }

    #[test]
    fn test_parse_order_empty_order_id_falls_back_to_id() {
        let order = parse_order(r#"{"order_id": "", "id": "0da4eb8d", "status": "canceled"}"#).unwrap();
        assert_eq!(order.id, "0da4eb8d");
    }

    #[test]
    fn test_parse_order_error_payload() {
        let err = parse_order(r#"{"error": {"reason": "Not Found", "message": "Not Found"}}"#).unwrap_err();
        assert!(matches!(err, AlephxError::OrderNotFound(_)));
    }

    #[test]
    fn test_parse_trades_sorted_and_order_side() {
        let trades = parse_trades(TRADES_BODY, None, None).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].id, "t1");
        assert_eq!(trades[0].order.as_deref(), Some("b1"));
        assert_eq!(trades[0].fee.cost, Some(dec!(0.001)));
        assert_eq!(trades[1].order.as_deref(), Some("s2"));
        assert_eq!(trades[1].cost, Some(dec!(0.123)));
    }

    #[test]
    fn test_parse_trades_since_limit() {
        let since = Utc.with_ymd_and_hms(2024, 9, 27, 0, 0, 0).unwrap();
        let trades = parse_trades(TRADES_BODY, Some(since), None).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].id, "t2");

        let trades = parse_trades(TRADES_BODY, None, Some(1)).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].id, "t1");
    }

    #[test]
    fn test_parse_orders_list() {
        let body = format!("[{}]", ORDER_BODY);
        let orders = parse_orders(&body, None, Some(DEFAULT_ORDERS_LIMIT)).unwrap();
        assert_eq!(orders.len(), 1);
    }

    #[test]
    fn test_parse_balances() {
        let body = r#"[
            {"total": "19.996900", "available": "14.756900", "asset": "CLEO", "locked": "5.240000"},
            {"total": "10.054720", "available": "-52.145280", "asset": "ALEO", "locked": "62.200000"}
        ]"#;
        let balances = parse_balances(body).unwrap();
        let cleo = balances.get("CLEO").unwrap();
        assert_eq!(cleo.free, Some(dec!(14.7569)));
        assert_eq!(cleo.used, Some(dec!(5.24)));
        assert_eq!(balances.get("ALEO").unwrap().free, Some(dec!(-52.14528)));
        assert!(balances.get("BTC").is_none());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("OK").status, StatusKind::Ok);
        assert_eq!(parse_status("\"OK\"\n").status, StatusKind::Ok);
        assert_eq!(parse_status("DEGRADED").status, StatusKind::Maintenance);
        assert_eq!(parse_status("").status, StatusKind::Maintenance);
    }

    #[test]
    fn test_malformed_body_is_json_error() {
        assert!(matches!(parse_balances("{"), Err(AlephxError::Json(_))));
    }
}
