//! TalentIQ scoring service: hybrid candidate scoring behind an Axum API.

pub mod config;
pub mod errors;
pub mod llm_client;
pub mod routes;
pub mod scoring;
pub mod state;
