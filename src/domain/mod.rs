//! Core domain types and logic.

pub mod ohlcv;
pub mod calendar;
pub mod price_series;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod indicator;
pub mod indicator_helpers;
pub mod indicator_store;
pub mod strategy;
pub mod strategies;
pub mod backtest;
pub mod metrics;
pub mod sweep;
pub mod universe;
pub mod config_validation;
pub mod error;
