//! Integration tests for contentcal

mod api_service;
mod cli;
mod config_integration;
mod pipeline_scenarios;
