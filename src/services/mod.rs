#![allow(dead_code)]

pub mod content_adapter;
pub mod content_library;
pub mod curriculum;
pub mod difficulty;
pub mod llm_provider;
