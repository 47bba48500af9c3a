// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration constants.

/// Default number of records returned by a bounded ledger tail.
pub const DEFAULT_TAIL_LIMIT: usize = 200;

/// Upper bound on records a single query may ask for.
pub const MAX_TAIL_LIMIT: usize = 10_000;

/// Payload keys that may carry a file identifier, in priority order.
///
/// Older producers used `filepath`, `name` or `rel_path` instead of `file`;
/// the first non-empty string wins.
pub const FILE_KEY_ALIASES: [&str; 4] = ["file", "filepath", "name", "rel_path"];

/// Suffix that marks an event as an error for the global counter.
pub const ERROR_SUFFIX: &str = "_error";

/// Reset kinds shared by every attack domain.
pub const SYSTEM_RESET_KINDS: [&str; 2] = ["system_start", "start_normal_mode"];
