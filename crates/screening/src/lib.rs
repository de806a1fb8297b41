pub mod audit;
pub mod config;
pub mod cuil;
pub mod debtors;
pub mod error;
pub mod padron;
pub mod telemetry;
