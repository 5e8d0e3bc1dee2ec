pub mod ema;
pub mod microprice_signal;
