//! CLI command implementations

pub mod utils;

pub mod activity;
pub mod article;
pub mod auth;
pub mod buyer;
pub mod completions;
pub mod config;
pub mod dashboard;
pub mod delivery;
pub mod distribution;
pub mod farmer;
pub mod harvest;
pub mod maintenance;
pub mod officer;
pub mod sales;
pub mod team;
