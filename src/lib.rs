//! Prometheus exporter for BMC telemetry gathered through `ipmitool`.
//!
//! The [`parser`] module turns raw `ipmitool` output into typed records,
//! [`collector`] maps those records onto gauges and [`server`] exposes the
//! result over HTTP.

pub mod app;
pub mod collector;
pub mod config;
pub mod metrics;
pub mod parser;
pub mod server;
pub mod system;

#[cfg(test)]
mod testing;
