use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info, warn};
use url::Url;

use crate::errors::EngineError;
use crate::market::market_source::BookSource;
use crate::market::monotonic_clock::MonotonicClock;
use crate::types::book_snapshot::BookSnapshot;
use crate::types::instrument::Instrument;

/// Binance USDⓈ-M futures `<symbol>@bookTicker` stream.
///
/// Snapshots are stamped with local receive time from a clock that outlives
/// reconnects, so timestamps stay monotonic across sessions.
#[derive(Debug)]
pub struct BinanceBookTicker {
    websocket_url: String,
    clock: MonotonicClock,
}

impl Default for BinanceBookTicker {
    fn default() -> Self {
        Self::new("wss://fstream.binance.com/")
    }
}

/// Decimals arrive as strings.
#[derive(Debug, Deserialize)]
struct BookTickerMessage {
    #[serde(rename = "e")]
    event_type: String,
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "b")]
    bid_price: String,
    #[serde(rename = "B")]
    bid_quantity: String,
    #[serde(rename = "a")]
    ask_price: String,
    #[serde(rename = "A")]
    ask_quantity: String,
}

impl BinanceBookTicker {
    pub fn new(websocket_url: impl Into<String>) -> Self {
        Self {
            websocket_url: websocket_url.into(),
            clock: MonotonicClock::new(),
        }
    }

    fn stream_url(&self, instrument: &Instrument) -> Result<Url> {
        let base = Url::parse(&self.websocket_url)
            .with_context(|| format!("invalid websocket url {}", self.websocket_url))?;

        base.join(&format!("ws/{}@bookTicker", instrument.stream_name()))
            .context("failed to build bookTicker stream url")
    }

    /// `None` for frames that are not book tickers for `instrument`.
    fn parse_snapshot_from_text(
        instrument: &Instrument,
        text: &str,
        local_ts_ns: u64,
    ) -> Option<Result<BookSnapshot, EngineError>> {
        let message: BookTickerMessage = serde_json::from_str(text).ok()?;
        if message.event_type != "bookTicker" || message.symbol != instrument.symbol() {
            return None;
        }

        Some(Self::parse_book_ticker(&message, local_ts_ns))
    }

    fn parse_book_ticker(
        message: &BookTickerMessage,
        local_ts_ns: u64,
    ) -> Result<BookSnapshot, EngineError> {
        BookSnapshot::from_raw(
            local_ts_ns,
            parse_decimal("b", &message.bid_price)?,
            parse_decimal("B", &message.bid_quantity)?,
            parse_decimal("a", &message.ask_price)?,
            parse_decimal("A", &message.ask_quantity)?,
        )
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<f64, EngineError> {
    raw.parse::<f64>()
        .map_err(|_| EngineError::MalformedSnapshot {
            reason: format!("field {field} is not a number: {raw:?}"),
        })
}

#[async_trait]
impl BookSource for BinanceBookTicker {
    async fn subscribe(&self, instrument: &Instrument, channel: Sender<BookSnapshot>) -> Result<()> {
        let url = self.stream_url(instrument)?;
        let (mut stream, _http_response) = connect_async(url.as_str()).await?;

        info!(%url, "Binance bookTicker websocket connected");

        while let Some(message) = stream.next().await {
            let local_ts_ns = self.clock.now_ns();

            let message_text: Option<String> = match message? {
                Message::Text(text) => Some(text),
                Message::Binary(binary) => String::from_utf8(binary).ok(),
                Message::Ping(_) | Message::Pong(_) => None,
                Message::Close(frame) => {
                    error!("Binance websocket closed: {:?}", frame);
                    break;
                }
                _ => None,
            };

            let Some(text) = message_text else { continue };

            match BinanceBookTicker::parse_snapshot_from_text(instrument, &text, local_ts_ns) {
                Some(Ok(snapshot)) => {
                    if channel.send(snapshot).await.is_err() {
                        error!("Failed to send book snapshot");

                        break;
                    }
                }
                Some(Err(error)) => warn!(%error, "dropping malformed bookTicker"),
                None => {}
            }
        }

        Ok(())
    }
}
