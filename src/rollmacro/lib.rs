//! # Rollmacro Architecture
//!
//! Rollmacro keeps per-entity libraries of dice macros (tab → header → macro),
//! substitutes named variables into formulas before they reach a dice roller,
//! and lets a formula like `:hp-3` edit those variables instead of rolling.
//!
//! It is a **UI-agnostic library** with a thin CLI client. A browser add-on, a
//! chat bot or the bundled terminal client all talk to the same API.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, entity scoped                 │
//! │  - Resolves id prefixes, supplies configured defaults       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Load, apply an engine, save; returns CmdResult           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Engines (variables/, importer, tree, roll, tables, sync)   │
//! │  - Pure functions over text and Rust types, no I/O          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DataStore trait: FileStore, InMemoryStore                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr, never exits the
//! process and never talks to the network. The remote dice service sits behind
//! the [`roll::DiceRoller`] trait for hosts to implement.
//!
//! ## Module Overview
//!
//! - [`variables`]: variable text parsing, `{token}` expansion, change commands
//! - [`importer`]: free-form macro text → [`model::Tab`]
//! - [`tree`]: id-addressed edits of the macro tree
//! - [`roll`]: chat command parsing, formula routing, roller responses
//! - [`tables`]: original roll tables
//! - [`sync`]: variable ↔ character sheet mapping
//! - [`config`]: host settings
//! - [`api`], [`commands`], [`store`], [`model`], [`error`]

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod importer;
pub mod model;
pub mod roll;
pub mod store;
pub mod sync;
pub mod tables;
pub mod tree;
pub mod variables;
