// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! vaultline-kernel: the event model and deterministic view reconstruction
//! behind the Vaultline backup pipeline.

pub mod codec;
pub mod config;
pub mod error;
pub mod event;
pub mod replay;
pub mod verify;
pub mod view;

pub use codec::{CodecId, CodecNames};
pub use event::{parse_line, LedgerEvent, Payload, RawEvent};
pub use replay::{replay, Replayer};
pub use view::Views;

#[cfg(test)]
pub mod tests;
