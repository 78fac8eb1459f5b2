//! # ldif-import
//!
//! The async side of the importer: configuration, the store gateway, the
//! reconciliation engine and the CLI. Parsing and derivation live in
//! `ldif-import-core`.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                 apps/ldif-import (THE BINARY)              │
//! │                                                            │
//! │  ┌───────────┐    ┌──────────────┐    ┌────────────────┐   │
//! │  │   CLI     │───▶│    Engine    │───▶│    Gateway     │   │
//! │  │  (clap)   │    │ (Pass 0..4)  │    │ (reqwest/exec) │   │
//! │  └───────────┘    └──────┬───────┘    └────────────────┘   │
//! │                          ▼                                 │
//! │                 ┌──────────────────┐                       │
//! │                 │ ldif-import-core │                       │
//! │                 │   (THE LOGIC)    │                       │
//! │                 └──────────────────┘                       │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod report;
