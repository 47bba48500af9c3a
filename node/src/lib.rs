// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod api;
pub mod codec;
pub mod config;
pub mod engine;
pub mod errors;
pub mod hasher;
pub mod mover;
pub mod pipeline;
pub mod server;
pub mod store;
pub mod telemetry;
