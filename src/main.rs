mod client;
mod config;
mod display;
mod error;
mod poller;
mod quote;
mod ui;

use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use eyre::Result;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{Stdout, stdout},
    time::Duration,
};
use tokio::time;
use tracing_subscriber::EnvFilter;

use client::{GasOracle, ReqwestTransport};
use config::{POLL_INTERVAL, oracle_url};
use display::{Indicator, Label, PanelLabel, PlainLabel, WaybarLabel};
use ui::Panel;

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// One plain text line per update
    Plain,
    /// One waybar JSON object per update
    Waybar,
    /// Full-screen terminal panel
    Panel,
}

#[derive(Parser, Debug)]
#[command(name = "gasbar", version)]
#[command(about = "Ethereum gas price indicator for status bars")]
struct Args {
    /// Where the gas price label is shown
    #[arg(short, long, value_enum, env = "GASBAR_OUTPUT", default_value_t = Output::Plain)]
    output: Output,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.output);

    let oracle = GasOracle::new(ReqwestTransport::new()?, oracle_url()?);

    match args.output {
        Output::Plain => run_bar(Indicator::new(oracle, PlainLabel, POLL_INTERVAL)).await,
        Output::Waybar => run_bar(Indicator::new(oracle, WaybarLabel, POLL_INTERVAL)).await,
        Output::Panel => run_panel(oracle).await,
    }
}

// stdout carries the label, so logs go to stderr. The panel owns the whole
// terminal and stays quiet unless RUST_LOG asks otherwise.
fn init_logging(output: Output) {
    let default = if output == Output::Panel { "off" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run_bar<L: Label>(mut indicator: Indicator<ReqwestTransport, L>) -> Result<()> {
    indicator.enable();
    tokio::signal::ctrl_c().await?;
    indicator.disable();
    Ok(())
}

async fn run_panel(oracle: GasOracle<ReqwestTransport>) -> Result<()> {
    let (label, state) = PanelLabel::new();
    let mut indicator = Indicator::new(oracle, label, POLL_INTERVAL);
    let mut panel = Panel::new();
    let mut terminal = setup_terminal()?;

    indicator.enable();

    let result = async {
        loop {
            terminal.draw(|frame| panel.render(frame, &state.borrow()))?;

            if event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        panel.quit();
                    }
                }
            }

            if panel.should_quit {
                break;
            }

            time::sleep(Duration::from_millis(100)).await;
        }
        Ok::<_, eyre::Report>(())
    }
    .await;

    indicator.disable();
    cleanup_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<CrosstermTerminal> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut CrosstermTerminal) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
