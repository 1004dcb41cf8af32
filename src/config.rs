//! Configuration parameters for the gas price indicator
use std::time::Duration;

use url::Url;

/// Gas oracle endpoint (Etherscan gas tracker)
pub const GAS_ORACLE_ENDPOINT: &str = "https://api.etherscan.io/api";

/// Fixed query selecting the gas oracle action
pub const GAS_ORACLE_QUERY: [(&str, &str); 2] = [("module", "gastracker"), ("action", "gasoracle")];

/// How often the oracle is polled after the startup fetch
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Give up on a single request after this long; reported as a transport failure
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Label text shown between enable and the first completed fetch
pub const LOADING_TEXT: &str = "Loading...";

pub const INDICATOR_NAME: &str = "eth-gas-price";

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub fn oracle_url() -> Result<Url, url::ParseError> {
    Url::parse_with_params(GAS_ORACLE_ENDPOINT, GAS_ORACLE_QUERY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_url_carries_fixed_query() {
        let url = oracle_url().unwrap();
        assert_eq!(url.host_str(), Some("api.etherscan.io"));
        assert_eq!(url.query(), Some("module=gastracker&action=gasoracle"));
    }
}
