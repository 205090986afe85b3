//! Shared building blocks for the recipe catalog server.

pub mod storage;
