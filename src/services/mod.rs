// src/services/mod.rs
pub mod gold;
pub mod history;
pub mod loan;
pub mod pricing;
pub mod settings;
pub mod storage;
pub mod volatility;
