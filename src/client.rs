use eyre::Result;
use reqwest::StatusCode;
use url::Url;

use crate::config::{REQUEST_TIMEOUT, USER_AGENT};
use crate::error::GasError;
use crate::quote::GasQuote;

/// Raw outcome of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Asynchronous HTTP GET capability. An `Err` means the exchange never
/// produced a status (DNS, TLS, connect, timeout).
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: &Url) -> impl Future<Output = Result<HttpReply>> + Send;
}

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<HttpReply> {
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();
        Ok(HttpReply { status, body })
    }
}

/// Gas oracle endpoint bound to a transport.
pub struct GasOracle<T> {
    transport: T,
    url: Url,
}

impl<T: Transport> GasOracle<T> {
    pub fn new(transport: T, url: Url) -> Self {
        Self { transport, url }
    }

    /// One request, one quote. Every failure is logged here and turned into a
    /// sentinel quote; nothing is retried.
    pub async fn fetch_once(&self) -> GasQuote {
        let reply = match self.transport.get(&self.url).await {
            Ok(reply) => reply,
            Err(e) => {
                let err = GasError::Transport(e.to_string());
                tracing::warn!(url = %self.url, "HTTP Error: {}", err);
                return GasQuote::from(&err);
            }
        };

        if reply.status != StatusCode::OK {
            tracing::warn!(status = %reply.status, "HTTP Error: {}", reply.status.as_u16());
            return GasQuote::from(&GasError::Status(reply.status));
        }

        let text = String::from_utf8_lossy(&reply.body);
        match GasQuote::from_response(&text) {
            Ok(quote) => {
                tracing::debug!(safe = quote.safe(), fast = quote.fast(), "gas price updated");
                quote
            }
            Err(err @ GasError::Parse(_)) => {
                tracing::warn!("Error parsing API response: {}", err);
                tracing::warn!("Response text: {}", text);
                GasQuote::from(&err)
            }
            Err(err) => {
                tracing::warn!("Unexpected API response: {}", text);
                GasQuote::from(&err)
            }
        }
    }
}
