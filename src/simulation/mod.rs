pub mod quote_simulator;
pub mod simulated_quote;
