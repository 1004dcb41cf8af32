use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::watch;

use crate::client::{GasOracle, Transport};
use crate::config::{INDICATOR_NAME, LOADING_TEXT};
use crate::poller::GasPricePoller;
use crate::quote::GasQuote;

/// Somewhere to show the current text. Implementations must be cheap; they
/// are called from the fetch tasks.
pub trait Label: Send + Sync + 'static {
    fn set_text(&self, text: &str);

    fn set_quote(&self, quote: &GasQuote) {
        self.set_text(&quote.label());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelClass {
    Loading,
    Ok,
    Error,
}

impl LabelClass {
    fn of(quote: &GasQuote) -> Self {
        if quote.is_available() {
            LabelClass::Ok
        } else {
            LabelClass::Error
        }
    }
}

fn emit(line: &str) {
    let mut out = io::stdout().lock();
    if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
        tracing::error!("Failed to write label: {}", e);
    }
}

/// Plain text, one line per update (i3blocks, polybar, scripts).
pub struct PlainLabel;

impl Label for PlainLabel {
    fn set_text(&self, text: &str) {
        emit(text);
    }
}

/// Waybar custom module payload (`return-type: json`).
#[derive(Debug, Serialize)]
pub struct WaybarPayload<'a> {
    pub text: &'a str,
    pub tooltip: String,
    pub class: LabelClass,
    pub alt: LabelClass,
}

impl<'a> WaybarPayload<'a> {
    pub fn new(text: &'a str, class: LabelClass) -> Self {
        let tooltip = match class {
            LabelClass::Loading => format!("{}\nWaiting for the gas oracle", INDICATOR_NAME),
            LabelClass::Ok => format!("{}\nGas price in Gwei", INDICATOR_NAME),
            LabelClass::Error => {
                format!("{}\nLast fetch failed, retrying on next tick", INDICATOR_NAME)
            }
        };
        Self {
            text,
            tooltip,
            class,
            alt: class,
        }
    }
}

pub struct WaybarLabel;

impl WaybarLabel {
    fn publish(&self, text: &str, class: LabelClass) {
        match serde_json::to_string(&WaybarPayload::new(text, class)) {
            Ok(line) => emit(&line),
            Err(e) => tracing::error!("Failed to encode waybar payload: {}", e),
        }
    }
}

impl Label for WaybarLabel {
    fn set_text(&self, text: &str) {
        self.publish(text, LabelClass::Loading);
    }

    fn set_quote(&self, quote: &GasQuote) {
        self.publish(&quote.label(), LabelClass::of(quote));
    }
}

/// Snapshot shown by the terminal panel.
#[derive(Debug, Clone)]
pub struct PanelState {
    pub text: String,
    pub class: LabelClass,
    pub updated: Option<Instant>,
}

impl PanelState {
    pub fn age(&self) -> Option<Duration> {
        self.updated.map(|at| at.elapsed())
    }
}

pub struct PanelLabel {
    tx: watch::Sender<PanelState>,
}

impl PanelLabel {
    pub fn new() -> (Self, watch::Receiver<PanelState>) {
        let (tx, rx) = watch::channel(PanelState {
            text: String::new(),
            class: LabelClass::Loading,
            updated: None,
        });
        (Self { tx }, rx)
    }
}

impl Label for PanelLabel {
    fn set_text(&self, text: &str) {
        self.tx.send_replace(PanelState {
            text: text.to_string(),
            class: LabelClass::Loading,
            updated: None,
        });
    }

    fn set_quote(&self, quote: &GasQuote) {
        self.tx.send_replace(PanelState {
            text: quote.label(),
            class: LabelClass::of(quote),
            updated: Some(Instant::now()),
        });
    }
}

impl<L: Label> Label for Arc<L> {
    fn set_text(&self, text: &str) {
        L::set_text(self, text)
    }

    fn set_quote(&self, quote: &GasQuote) {
        L::set_quote(self, quote)
    }
}

/// Binds a poller to a label with an enable/disable lifecycle, which the
/// host may cycle any number of times.
pub struct Indicator<T, L> {
    poller: GasPricePoller<T>,
    label: Arc<L>,
}

impl<T: Transport, L: Label> Indicator<T, L> {
    pub fn new(oracle: GasOracle<T>, label: L, period: Duration) -> Self {
        Self {
            poller: GasPricePoller::new(oracle, period),
            label: Arc::new(label),
        }
    }

    pub fn enable(&mut self) {
        if self.poller.is_running() {
            return;
        }
        self.label.set_text(LOADING_TEXT);
        let label = Arc::clone(&self.label);
        self.poller.start(move |quote| label.set_quote(&quote));
        tracing::info!(indicator = INDICATOR_NAME, "indicator enabled");
    }

    pub fn disable(&mut self) {
        if self.poller.is_running() {
            self.poller.stop();
            tracing::info!(indicator = INDICATOR_NAME, "indicator disabled");
        }
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.poller.is_running()
    }
}
