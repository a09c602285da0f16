//! Blocking client for the CoinGecko v3 market-data API.
//!
//! # Design
//! `CoinGeckoClient` holds only its validated `ClientConfig` and a
//! `Transport`; no state is mutated between calls, so one client can be
//! shared across threads. Every endpoint method follows the same pipeline:
//! seed the required query parameters, append the caller's options, build the
//! route (`build_route`), execute a GET (`send`), and decode the body into a
//! generic mapping (`decode_body`). Nothing is retried or cached.

use log::{debug, warn};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::route::{self, build_route};
use crate::types::{ApiResponse, OptionValue, RequestOptions};

/// Client for the public CoinGecko API. One method per endpoint.
///
/// Path identifiers (`id`, contract addresses) are inserted into the path
/// verbatim; callers escape them if needed.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl CoinGeckoClient<UreqTransport> {
    /// Client for `https://api.coingecko.com/api/v3/` with a 5 second timeout.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ApiError> {
        let config = config.validated()?;
        let transport = UreqTransport::new(config.timeout);
        Ok(Self { config, transport })
    }

    /// Client configured from `COINGECKO_API_URL` / `COINGECKO_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::with_config(ClientConfig::from_env()?)
    }
}

impl<T: Transport> CoinGeckoClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        let config = config.validated()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Describe a GET of `route` relative to the base URL.
    pub fn request(&self, route: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{}", self.config.base_url, route.trim_start_matches('/')),
            timeout: self.config.timeout,
        }
    }

    /// GET `route` and return the raw body of a 2xx reply.
    pub fn send(&self, route: &str) -> Result<String, ApiError> {
        let request = self.request(route);
        debug!("GET {}", request.url);
        let response = self
            .transport
            .execute(&request)
            .and_then(check_status)
            .map_err(|err| {
                warn!("GET {} failed: {err}", request.url);
                err
            })?;
        debug!("GET {} -> {} ({} bytes)", request.url, response.status, response.body.len());
        Ok(response.body)
    }

    /// GET any endpoint: build the route, send it and decode the body.
    pub fn get(&self, path: &str, options: &RequestOptions) -> Result<ApiResponse, ApiError> {
        let body = self.send(&build_route(path, options))?;
        decode_body(&body)
    }

    /// Check API server status.
    pub fn ping(&self) -> Result<ApiResponse, ApiError> {
        self.get(route::PING, &RequestOptions::new())
    }

    /// Current price of `ids` in `vs_currencies`.
    ///
    /// Optional: `include_market_cap`, `include_24hr_vol`,
    /// `include_24hr_change`, `include_last_updated_at`.
    pub fn simple_price(
        &self,
        ids: impl Into<OptionValue>,
        vs_currencies: impl Into<OptionValue>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let options = RequestOptions::new()
            .with("ids", ids)
            .with("vs_currencies", vs_currencies)
            .merged(options);
        self.get(route::SIMPLE_PRICE, &options)
    }

    /// Current price of tokens on asset platform `id`, by contract address.
    ///
    /// Optional: same `include_*` flags as `simple_price`.
    pub fn token_price(
        &self,
        id: &str,
        contract_addresses: impl Into<OptionValue>,
        vs_currencies: impl Into<OptionValue>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let options = RequestOptions::new()
            .with("contract_addresses", contract_addresses)
            .with("vs_currencies", vs_currencies)
            .merged(options);
        self.get(&format!("{}/{id}", route::SIMPLE_TOKEN_PRICE), &options)
    }

    pub fn supported_vs_currencies(&self) -> Result<ApiResponse, ApiError> {
        self.get(route::SUPPORTED_VS_CURRENCIES, &RequestOptions::new())
    }

    pub fn coin_list(&self) -> Result<ApiResponse, ApiError> {
        self.get(route::COINS_LIST, &RequestOptions::new())
    }

    /// Market data for coins priced in `vs_currency`.
    ///
    /// Optional: `ids`, `order`, `per_page` (1-250), `page`, `sparkline`,
    /// `price_change_percentage`.
    pub fn coin_markets(
        &self,
        vs_currency: impl Into<OptionValue>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let options = RequestOptions::new().with("vs_currency", vs_currency).merged(options);
        self.get(route::COINS_MARKETS, &options)
    }

    /// Current data for coin `id`.
    ///
    /// Optional: `localization`, `tickers`, `market_data`, `community_data`,
    /// `developer_data`, `sparkline`.
    pub fn coin(&self, id: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        self.get(&format!("{}/{id}", route::COINS), &options)
    }

    /// Optional: `exchange_ids`, `page`.
    pub fn coin_tickers(&self, id: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        self.get(&format!("{}/{id}/tickers", route::COINS), &options)
    }

    /// Historical snapshot of coin `id` on `date` (`dd-mm-yyyy`).
    ///
    /// Optional: `localization`.
    pub fn coin_history(
        &self,
        id: &str,
        date: impl Into<OptionValue>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let options = RequestOptions::new().with("date", date).merged(options);
        self.get(&format!("{}/{id}/history", route::COINS), &options)
    }

    /// Price, market cap and volume history for the last `days` (a number or `max`).
    pub fn market_chart(
        &self,
        id: &str,
        vs_currency: impl Into<OptionValue>,
        days: impl Into<OptionValue>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let options = RequestOptions::new()
            .with("vs_currency", vs_currency)
            .with("days", days)
            .merged(options);
        self.get(&format!("{}/{id}/market_chart", route::COINS), &options)
    }

    /// Optional: `per_page`, `page`.
    pub fn coin_status_updates(&self, id: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        self.get(&format!("{}/{id}/status_updates", route::COINS), &options)
    }

    /// Coin data for token `contract_address` on asset platform `id`.
    pub fn contract(&self, id: &str, contract_address: &str) -> Result<ApiResponse, ApiError> {
        self.get(
            &format!("{}/{id}/contract/{contract_address}", route::COINS),
            &RequestOptions::new(),
        )
    }

    pub fn exchanges(&self) -> Result<ApiResponse, ApiError> {
        self.get(route::EXCHANGES, &RequestOptions::new())
    }

    pub fn exchanges_list(&self) -> Result<ApiResponse, ApiError> {
        self.get(route::EXCHANGES_LIST, &RequestOptions::new())
    }

    pub fn exchange(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.get(&format!("{}/{id}", route::EXCHANGES), &RequestOptions::new())
    }

    /// Optional: `coins_ids`, `page`.
    pub fn exchanges_tickers(&self, id: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        self.get(&format!("{}/{id}/tickers", route::EXCHANGES), &options)
    }

    /// Optional: `per_page`, `page`.
    pub fn exchange_status_update(&self, id: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        self.get(&format!("{}/{id}/status_updates", route::EXCHANGES), &options)
    }

    /// Optional: `country_code`, `type`, `page`, `upcoming_events_only`,
    /// `from_date` and `to_date` (`yyyy-mm-dd`).
    pub fn events(&self, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        self.get(route::EVENTS, &options)
    }

    pub fn event_countries(&self) -> Result<ApiResponse, ApiError> {
        self.get(route::EVENT_COUNTRIES, &RequestOptions::new())
    }

    pub fn event_types(&self) -> Result<ApiResponse, ApiError> {
        self.get(route::EVENT_TYPES, &RequestOptions::new())
    }

    pub fn exchange_rates(&self) -> Result<ApiResponse, ApiError> {
        self.get(route::EXCHANGE_RATES, &RequestOptions::new())
    }

    /// Global market data (the `global` endpoint).
    pub fn global_data(&self) -> Result<ApiResponse, ApiError> {
        self.get(route::GLOBAL, &RequestOptions::new())
    }
}

/// Parse `body` as JSON and coerce the top level into a mapping.
///
/// Objects are returned as-is. Arrays are keyed by index (`"0"`, `"1"`, ...),
/// `null` is empty and any other scalar lands under `"0"`.
pub fn decode_body(body: &str) -> Result<ApiResponse, ApiError> {
    let value: Value = serde_json::from_str(body)?;
    Ok(match value {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item))
            .collect(),
        Value::Null => ApiResponse::new(),
        scalar => ApiResponse::from_iter([("0".to_string(), scalar)]),
    })
}

/// Map non-2xx replies to `TransportError::Status`.
fn check_status(response: HttpResponse) -> Result<HttpResponse, TransportError> {
    if (200..300).contains(&response.status) {
        return Ok(response);
    }
    Err(TransportError::Status {
        status: response.status,
        body: response.body,
    })
}
