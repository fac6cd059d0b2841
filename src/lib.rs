//! MAO: Municipal Agriculture Office console
//!
//! A command-line console for the office's abaca supply-chain backend:
//! farmer, buyer and officer verification, harvest and sales review,
//! deliveries, seedling distribution, and site content.

pub mod cli;
pub mod core;
pub mod entities;
