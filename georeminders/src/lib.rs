//! georeminders library
//!
//! Location-based reminder engine: reminders are persisted, a geofence is
//! registered around each one, and entering a region delivers a
//! notification for the matching reminder.

pub mod app;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod platform;
pub mod services;
