//! End-to-end tests against the live mock server over real HTTP.
//!
//! # Design
//! Starts the mock server on a random port in a background runtime, then
//! drives every client operation through the default `ureq` transport.
//! Echo endpoints return the path and raw query they received, which pins
//! down the exact wire format.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use coingecko_core::{ApiError, ClientConfig, CoinGeckoClient, RequestOptions, TransportError};
use serde_json::{json, Value};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Address of a mock server shared by every test in this file.
fn server_addr() -> SocketAddr {
    static ADDR: OnceLock<SocketAddr> = OnceLock::new();
    *ADDR.get_or_init(|| {
        let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });
        addr
    })
}

fn client() -> CoinGeckoClient {
    init_logging();
    let config = ClientConfig::default().with_base_url(&format!("http://{}/api/v3", server_addr()));
    CoinGeckoClient::with_config(config).unwrap()
}

/// `(path, query)` as seen by an echo endpoint.
fn echoed(response: &serde_json::Map<String, Value>) -> (String, Value) {
    (
        response["path"].as_str().unwrap().to_string(),
        response["query"].clone(),
    )
}

#[test]
fn ping() {
    let response = client().ping().unwrap();
    assert_eq!(response["gecko_says"], "(V3) To the Moon!");
}

#[test]
fn simple_price_with_sequences() {
    let response = client()
        .simple_price(
            ["bitcoin", "ethereum"],
            ["usd", "eur"],
            RequestOptions::new().with("include_market_cap", true),
        )
        .unwrap();
    assert_eq!(response["bitcoin"]["usd"], 60000.0);
    assert_eq!(response["ethereum"]["eur"], 2700.0);
    assert!(response["bitcoin"].get("usd_market_cap").is_some());
}

#[test]
fn supported_vs_currencies_array_is_keyed_by_index() {
    let response = client().supported_vs_currencies().unwrap();
    assert_eq!(response.len(), 3);
    assert_eq!(response["0"], "usd");
    assert_eq!(response["2"], "btc");
}

#[test]
fn coin_list_and_markets() {
    let c = client();
    let list = c.coin_list().unwrap();
    assert_eq!(list["1"]["id"], "ethereum");

    let markets = c
        .coin_markets("usd", RequestOptions::new().with("per_page", "2").with("page", 1))
        .unwrap();
    assert_eq!(markets.len(), 2);
    assert_eq!(markets["0"]["id"], "bitcoin");

    let filtered = c
        .coin_markets("eur", RequestOptions::new().with("ids", ["tether"]))
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered["0"]["current_price"], 0.9);
}

#[test]
fn coin_and_missing_coin() {
    let c = client();
    let bitcoin = c.coin("bitcoin", RequestOptions::new().with("market_data", true)).unwrap();
    assert_eq!(bitcoin["market_data"]["current_price"]["usd"], 60000.0);

    let err = c.coin("dogecoin", RequestOptions::new()).unwrap_err();
    assert_eq!(err.status(), Some(404));
    match err {
        ApiError::Transport(TransportError::Status { body, .. }) => assert!(body.contains("coin not found")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn coin_sub_resources_hit_expected_routes() {
    let c = client();
    let cases = [
        (
            c.coin_tickers("bitcoin", RequestOptions::new().with("exchange_ids", ["binance", "kraken"]).with("page", 2)),
            "/api/v3/coins/bitcoin/tickers",
            json!("exchange_ids=binance,kraken&page=2"),
        ),
        (
            c.coin_history("bitcoin", "30-12-2017", RequestOptions::new().with("localization", false)),
            "/api/v3/coins/bitcoin/history",
            json!("date=30-12-2017&localization=false"),
        ),
        (
            c.market_chart("ethereum", "usd", 30, RequestOptions::new()),
            "/api/v3/coins/ethereum/market_chart",
            json!("vs_currency=usd&days=30"),
        ),
        (
            c.coin_status_updates("ethereum", RequestOptions::new().with("per_page", 5)),
            "/api/v3/coins/ethereum/status_updates",
            json!("per_page=5"),
        ),
        (
            c.contract("ethereum", "0xabc123"),
            "/api/v3/coins/ethereum/contract/0xabc123",
            Value::Null,
        ),
        (
            c.token_price("ethereum", ["0xabc123", "0xdef456"], "usd", RequestOptions::new()),
            "/api/v3/simple/token_price/ethereum",
            json!("contract_addresses=0xabc123,0xdef456&vs_currencies=usd"),
        ),
    ];
    for (result, path, query) in cases {
        let response = result.unwrap();
        assert_eq!(echoed(&response), (path.to_string(), query), "{path}");
    }
}

#[test]
fn exchange_routes() {
    let c = client();

    let exchanges = c.exchanges().unwrap();
    assert_eq!(exchanges["0"]["path"], "/api/v3/exchanges");
    let list = c.exchanges_list().unwrap();
    assert_eq!(list["0"]["path"], "/api/v3/exchanges/list");

    let cases = [
        (c.exchange("binance"), "/api/v3/exchanges/binance", Value::Null),
        (
            c.exchanges_tickers("binance", RequestOptions::new().with("coins_ids", ["bitcoin", "ethereum"])),
            "/api/v3/exchanges/binance/tickers",
            json!("coins_ids=bitcoin,ethereum"),
        ),
        (
            c.exchange_status_update("binance", RequestOptions::new().with("per_page", 10).with("page", 1)),
            "/api/v3/exchanges/binance/status_updates",
            json!("per_page=10&page=1"),
        ),
    ];
    for (result, path, query) in cases {
        assert_eq!(echoed(&result.unwrap()), (path.to_string(), query), "{path}");
    }
}

#[test]
fn events_and_global_routes() {
    let c = client();
    let events = c
        .events(
            RequestOptions::new()
                .with("country_code", "US")
                .with("upcoming_events_only", false)
                .with("from_date", "2019-01-01"),
        )
        .unwrap();
    assert_eq!(
        echoed(&events),
        (
            "/api/v3/events".to_string(),
            json!("country_code=US&upcoming_events_only=false&from_date=2019-01-01")
        )
    );

    for (result, path) in [
        (c.event_countries(), "/api/v3/events/countries"),
        (c.event_types(), "/api/v3/events/types"),
        (c.exchange_rates(), "/api/v3/exchange_rates"),
        (c.global_data(), "/api/v3/global"),
    ] {
        assert_eq!(echoed(&result.unwrap()), (path.to_string(), Value::Null), "{path}");
    }
}

#[test]
fn generic_get_reaches_unwrapped_endpoint() {
    let err = client().get("nfts/list", &RequestOptions::new()).unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn parallel_calls_share_one_client() {
    let c = client();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4).map(|_| scope.spawn(|| c.ping())).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap()["gecko_says"], "(V3) To the Moon!");
        }
    });
}

#[test]
fn silent_server_times_out() {
    init_logging();
    // Accepts connections (via the backlog) but never answers.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let config = ClientConfig::default()
        .with_base_url(&format!("http://{addr}/api/v3/"))
        .with_timeout(Duration::from_millis(300));
    let c = CoinGeckoClient::with_config(config).unwrap();

    let started = Instant::now();
    let err = c.ping().unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
    drop(listener);
}

#[test]
fn body_above_ureq_default_limit_is_read() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let blob = "x".repeat(12 * 1024 * 1024);
    let body = format!(r#"{{"blob":"{blob}"}}"#);

    let server = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let head = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(body.as_bytes()).unwrap();
    });

    let config = ClientConfig::default()
        .with_base_url(&format!("http://{addr}/api/v3/"))
        .with_timeout(Duration::from_secs(30));
    let response = CoinGeckoClient::with_config(config).unwrap().coin_list().unwrap();
    assert_eq!(response["blob"].as_str().unwrap().len(), blob.len());
    server.join().unwrap();
}

#[test]
fn refused_connection_is_transport_error() {
    init_logging();
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let config = ClientConfig::default().with_base_url(&format!("http://{addr}/api/v3/"));
    let c = CoinGeckoClient::with_config(config).unwrap();

    let err = c.global_data().unwrap_err();
    assert!(matches!(err, ApiError::Transport(TransportError::Network(_))), "{err:?}");
}
