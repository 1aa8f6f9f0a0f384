//! Common test utilities for jimaku-dl integration tests

#[allow(dead_code)]
pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;

use jimaku_dl::{Config, JimakuProvider, RateLimitConfig};
use std::time::Duration;
use wiremock::MockServer;

/// API key the mock catalog expects
pub const API_KEY: &str = "test-api-key";

/// Rate limits small enough to keep throttling tests fast
pub fn fast_rate_limit() -> RateLimitConfig {
    RateLimitConfig {
        backoff_limit: 3,
        max_delay: Duration::from_millis(20),
        default_reset_after: Duration::from_millis(10),
    }
}

/// Provider configuration pointing at `server`
pub fn test_config(server: &MockServer) -> Config {
    Config {
        api_url: server.uri(),
        rate_limit: fast_rate_limit(),
        ..Config::new(API_KEY)
    }
}

/// Initialized provider talking to `server`
#[allow(clippy::unwrap_used)]
pub fn provider_with(config: Config) -> JimakuProvider {
    let mut provider = JimakuProvider::new(config).unwrap();
    provider.initialize().unwrap();
    provider
}

/// Initialized provider with the default test configuration
pub fn test_provider(server: &MockServer) -> JimakuProvider {
    provider_with(test_config(server))
}
