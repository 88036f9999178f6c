//! Clock sync server for the WMR500 weather station, with an optional MQTT
//! status poller running alongside it.

pub mod clock;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod poller;
pub mod rest;
pub mod tls;
