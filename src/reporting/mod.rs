pub mod fill_report;
pub mod reporter;
