//! Blocking client for the public CoinGecko v3 market-data API.
//!
//! # Overview
//! One method per endpoint on `CoinGeckoClient`. Each call builds a route
//! from the path and its query options, performs a single GET through a
//! `Transport`, and decodes the JSON body into a generic string-keyed mapping.
//!
//! # Design
//! - `CoinGeckoClient` is stateless apart from its immutable configuration
//!   and transport, so it can be shared between threads.
//! - Options are an ordered `RequestOptions` mapping of `OptionValue`s;
//!   sequences are comma-joined on the wire.
//! - The HTTP round trip sits behind the `Transport` trait (`ureq` by
//!   default) so tests can substitute a recording transport.
//! - No retries, caching, pagination or per-endpoint response types.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod route;
pub mod types;

pub use client::{decode_body, CoinGeckoClient};
pub use config::ClientConfig;
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use route::{build_route, build_route_from_json};
pub use types::{ApiResponse, OptionValue, RequestOptions};
