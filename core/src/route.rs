//! Endpoint paths and query-string assembly.

use serde_json::Value;

use crate::error::ApiError;
use crate::types::RequestOptions;

pub const PING: &str = "ping";
pub const SIMPLE_PRICE: &str = "simple/price";
pub const SIMPLE_TOKEN_PRICE: &str = "simple/token_price";
pub const SUPPORTED_VS_CURRENCIES: &str = "simple/supported_vs_currencies";
pub const COINS: &str = "coins";
pub const COINS_LIST: &str = "coins/list";
pub const COINS_MARKETS: &str = "coins/markets";
pub const EXCHANGES: &str = "exchanges";
pub const EXCHANGES_LIST: &str = "exchanges/list";
pub const EVENTS: &str = "events";
pub const EVENT_COUNTRIES: &str = "events/countries";
pub const EVENT_TYPES: &str = "events/types";
pub const EXCHANGE_RATES: &str = "exchange_rates";
pub const GLOBAL: &str = "global";

/// Append `options` to `path` as a query string.
///
/// Pairs are written as `key=value` in insertion order and joined with `&`;
/// sequence values are comma-joined. Nothing is percent-encoded. An empty
/// mapping returns `path` unchanged.
pub fn build_route(path: &str, options: &RequestOptions) -> String {
    if options.is_empty() {
        return path.to_string();
    }
    let query = options
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

/// `build_route` for options given as untyped JSON.
///
/// Fails with `InvalidOptionsType` unless `options` is an object (or `null`).
pub fn build_route_from_json(path: &str, options: Value) -> Result<String, ApiError> {
    let options = RequestOptions::try_from(options)?;
    Ok(build_route(path, &options))
}
