#![allow(dead_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod services;
pub mod storage;
pub mod types;
