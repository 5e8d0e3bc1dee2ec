pub mod binance_book_ticker;
pub mod market_source;
pub mod monotonic_clock;
pub mod window_tracker;
