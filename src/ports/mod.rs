//! Port traits: the narrow interfaces the domain calls out through.

pub mod alert_port;
pub mod config_port;
pub mod data_port;
