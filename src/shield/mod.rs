pub mod policy;
pub mod shield_state;
