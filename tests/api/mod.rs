//! HTTP endpoint tests

mod health_tests;
mod static_tests;
