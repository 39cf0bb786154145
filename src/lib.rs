//! GalaxyWrite - A publishing platform for blogs and case studies
//!
//! This library provides the core functionality for the GalaxyWrite backend.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
