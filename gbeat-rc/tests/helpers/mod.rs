//! Test helpers for gbeat-rc integration tests
//!
//! In-process stand-ins for the services gbeat-rc talks to:
//! - FakeErrorGenerator: records rhythm triggers
//! - FakeSpotify: accounts + Web API subset with canned responses

#![allow(dead_code)]

pub mod fake_services;

pub use fake_services::{FakeErrorGenerator, FakeSpotify};
