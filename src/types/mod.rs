pub mod book_snapshot;
pub mod engine_settings;
pub mod instrument;
pub mod policy_grid;
pub mod price;
pub mod side;
