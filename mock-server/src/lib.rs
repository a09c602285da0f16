//! In-process imitation of the CoinGecko v3 API, mounted under `/api/v3`.
//!
//! Endpoints with interesting parameters (`simple/price`, `coins/markets`,
//! `coins/{id}`) compute answers from a small static coin table. The rest
//! echo the path and raw query string they received so tests can see exactly
//! what went over the wire.

use std::collections::HashMap;

use axum::{
    extract::{OriginalUri, Path, Query, RawQuery},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

pub const API_PREFIX: &str = "/api/v3";

#[derive(Clone, Debug, Serialize)]
pub struct Coin {
    pub id: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub usd: f64,
    pub market_cap_usd: f64,
}

pub const COINS: &[Coin] = &[
    Coin {
        id: "bitcoin",
        symbol: "btc",
        name: "Bitcoin",
        usd: 60000.0,
        market_cap_usd: 1.18e12,
    },
    Coin {
        id: "ethereum",
        symbol: "eth",
        name: "Ethereum",
        usd: 3000.0,
        market_cap_usd: 3.6e11,
    },
    Coin {
        id: "tether",
        symbol: "usdt",
        name: "Tether",
        usd: 1.0,
        market_cap_usd: 1.1e11,
    },
];

/// Units of each supported currency per USD.
const VS_CURRENCIES: &[(&str, f64)] = &[("usd", 1.0), ("eur", 0.9), ("btc", 1.0 / 60000.0)];

type Params = Query<HashMap<String, String>>;
type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    let api = Router::new()
        .route("/ping", get(ping))
        .route("/simple/price", get(simple_price))
        .route("/simple/token_price/{id}", get(echo))
        .route("/simple/supported_vs_currencies", get(supported_vs_currencies))
        .route("/coins/list", get(coin_list))
        .route("/coins/markets", get(coin_markets))
        .route("/coins/{id}", get(coin))
        .route("/coins/{id}/tickers", get(echo))
        .route("/coins/{id}/history", get(echo))
        .route("/coins/{id}/market_chart", get(echo))
        .route("/coins/{id}/status_updates", get(echo))
        .route("/coins/{id}/contract/{address}", get(echo))
        .route("/exchanges", get(echo_list))
        .route("/exchanges/list", get(echo_list))
        .route("/exchanges/{id}", get(echo))
        .route("/exchanges/{id}/tickers", get(echo))
        .route("/exchanges/{id}/status_updates", get(echo))
        .route("/events", get(echo))
        .route("/events/countries", get(echo))
        .route("/events/types", get(echo))
        .route("/exchange_rates", get(echo))
        .route("/global", get(echo));
    Router::new().nest(API_PREFIX, api).fallback(not_found)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

fn find_coin(id: &str) -> Option<&'static Coin> {
    COINS.iter().find(|c| c.id == id)
}

fn rate(vs: &str) -> Option<f64> {
    VS_CURRENCIES.iter().find(|(code, _)| *code == vs).map(|(_, r)| *r)
}

fn split_csv(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

async fn not_found() -> (StatusCode, Json<Value>) {
    error(StatusCode::NOT_FOUND, "Incorrect path. Please check https://www.coingecko.com/api/")
}

async fn ping() -> Json<Value> {
    Json(json!({ "gecko_says": "(V3) To the Moon!" }))
}

async fn simple_price(Query(params): Params) -> ApiResult {
    let (Some(ids), Some(vs_currencies)) = (params.get("ids"), params.get("vs_currencies")) else {
        return Err(error(StatusCode::BAD_REQUEST, "missing 'ids' or 'vs_currencies'"));
    };
    let with_market_cap = params.get("include_market_cap").is_some_and(|v| v == "true");

    let mut prices = Map::new();
    for coin in split_csv(ids).filter_map(find_coin) {
        let mut quote = Map::new();
        for vs in split_csv(vs_currencies) {
            let Some(factor) = rate(vs) else { continue };
            quote.insert(vs.to_string(), json!(coin.usd * factor));
            if with_market_cap {
                quote.insert(format!("{vs}_market_cap"), json!(coin.market_cap_usd * factor));
            }
        }
        prices.insert(coin.id.to_string(), Value::Object(quote));
    }
    Ok(Json(Value::Object(prices)))
}

async fn supported_vs_currencies() -> Json<Value> {
    Json(json!(VS_CURRENCIES.iter().map(|(code, _)| *code).collect::<Vec<_>>()))
}

async fn coin_list() -> Json<Value> {
    let list: Vec<Value> = COINS
        .iter()
        .map(|c| json!({ "id": c.id, "symbol": c.symbol, "name": c.name }))
        .collect();
    Json(Value::Array(list))
}

async fn coin_markets(Query(params): Params) -> ApiResult {
    let Some(vs) = params.get("vs_currency") else {
        return Err(error(StatusCode::BAD_REQUEST, "missing 'vs_currency'"));
    };
    let Some(factor) = rate(vs) else {
        return Err(error(StatusCode::BAD_REQUEST, "invalid vs_currency"));
    };
    let per_page: usize = params.get("per_page").and_then(|v| v.parse().ok()).unwrap_or(100);
    let page: usize = params.get("page").and_then(|v| v.parse().ok()).unwrap_or(1).max(1);
    let wanted: Option<Vec<&str>> = params.get("ids").map(|ids| split_csv(ids).collect());

    let markets: Vec<Value> = COINS
        .iter()
        .filter(|c| wanted.as_ref().map_or(true, |ids| ids.contains(&c.id)))
        .skip(per_page.saturating_mul(page - 1))
        .take(per_page)
        .map(|c| {
            json!({
                "id": c.id,
                "symbol": c.symbol,
                "name": c.name,
                "current_price": c.usd * factor,
                "market_cap": c.market_cap_usd * factor,
            })
        })
        .collect();
    Ok(Json(Value::Array(markets)))
}

async fn coin(Path(id): Path<String>, Query(params): Params) -> ApiResult {
    let coin = find_coin(&id).ok_or_else(|| error(StatusCode::NOT_FOUND, "coin not found"))?;
    let mut body = json!({ "id": coin.id, "symbol": coin.symbol, "name": coin.name });
    if params.get("market_data").map_or(true, |v| v == "true") {
        body["market_data"] = json!({ "current_price": { "usd": coin.usd } });
    }
    Ok(Json(body))
}

/// Echo the request path and raw query back to the caller.
async fn echo(OriginalUri(uri): OriginalUri, RawQuery(query): RawQuery) -> Json<Value> {
    Json(json!({ "path": uri.path(), "query": query }))
}

/// Like `echo`, but shaped as a top-level array.
async fn echo_list(OriginalUri(uri): OriginalUri, RawQuery(query): RawQuery) -> Json<Value> {
    Json(json!([{ "path": uri.path(), "query": query }]))
}
