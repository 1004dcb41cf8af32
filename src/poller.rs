use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use crate::client::{GasOracle, Transport};
use crate::quote::GasQuote;

type UpdateFn = Arc<dyn Fn(GasQuote) + Send + Sync>;

/// Fetches a quote on start and then once per interval until stopped.
///
/// Ticks are aligned to the moment `start` was called, not to fetch
/// completion, so a slow fetch can overlap the next one. Each fetch runs as
/// its own task and delivers its quote whenever it completes.
pub struct GasPricePoller<T> {
    oracle: Arc<GasOracle<T>>,
    period: Duration,
    timer: Option<CancellationToken>,
}

impl<T: Transport> GasPricePoller<T> {
    pub fn new(oracle: GasOracle<T>, period: Duration) -> Self {
        Self {
            oracle: Arc::new(oracle),
            period,
            timer: None,
        }
    }

    /// Registers the repeating timer. Must be called from within a tokio
    /// runtime. A running timer is replaced, never duplicated.
    pub fn start<F>(&mut self, on_update: F)
    where
        F: Fn(GasQuote) + Send + Sync + 'static,
    {
        if self.timer.is_some() {
            tracing::debug!("poller already running, replacing timer");
            self.stop();
        }

        let token = CancellationToken::new();
        tokio::spawn(run_timer(
            Arc::clone(&self.oracle),
            self.period,
            Arc::new(on_update),
            token.clone(),
        ));
        self.timer = Some(token);
        tracing::info!(interval_secs = self.period.as_secs(), "gas price poller started");
    }

    /// Cancels the timer. Fetches already in flight still complete and
    /// deliver their quote.
    pub fn stop(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
            tracing::info!("gas price poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }
}

impl<T> Drop for GasPricePoller<T> {
    fn drop(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }
}

async fn run_timer<T: Transport>(
    oracle: Arc<GasOracle<T>>,
    period: Duration,
    on_update: UpdateFn,
    token: CancellationToken,
) {
    // first tick completes immediately: that is the startup fetch
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {
                let oracle = Arc::clone(&oracle);
                let on_update = Arc::clone(&on_update);
                tokio::spawn(async move {
                    let quote = oracle.fetch_once().await;
                    on_update(quote);
                });
            }
        }
    }
    tracing::debug!("gas price timer cancelled");
}
