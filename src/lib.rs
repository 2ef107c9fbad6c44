pub mod client;
pub mod config;
pub mod consent;
pub mod domain;
pub mod form;
pub mod routes;
pub mod sheets;
pub mod startup;
pub mod telemetry;
pub mod waitlist_client;
