pub mod session;
pub mod timeseries;
