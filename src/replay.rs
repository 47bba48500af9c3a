//! Single-pass ledger replay.

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

use crate::codec::CodecNames;
use crate::event::{parse_line, RawEvent};
use crate::verify::view_fingerprint;
use crate::view::Views;

/// Folds a stream of events into [`Views`].
///
/// The replayer holds no I/O. Callers feed it from a ledger reader, a test
/// fixture or a line buffer; the result depends only on the order of the
/// events it was given.
#[derive(Clone, Debug, Default)]
pub struct Replayer {
    views: Views,
}

impl Replayer {
    pub fn new(codecs: CodecNames) -> Self {
        Self {
            views: Views::new(codecs),
        }
    }

    pub fn apply(&mut self, event: &RawEvent) {
        self.views.apply(event);
    }

    /// Parses and applies one raw line. Malformed lines are skipped.
    pub fn apply_line(&mut self, line: &str) -> bool {
        match parse_line(line) {
            Some(ev) => {
                self.views.apply(&ev);
                true
            }
            None => false,
        }
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn finish(self) -> Views {
        self.views
    }
}

/// Replays an event stream with the registered codec names.
pub fn replay<I>(events: I) -> Views
where
    I: IntoIterator<Item = RawEvent>,
{
    replay_with(CodecNames::registered(), events)
}

pub fn replay_with<I>(codecs: CodecNames, events: I) -> Views
where
    I: IntoIterator<Item = RawEvent>,
{
    let mut replayer = Replayer::new(codecs);
    for ev in events {
        replayer.apply(&ev);
    }
    replayer.finish()
}

/// Replays newline-separated ledger text.
pub fn replay_text(text: &str) -> Views {
    let mut replayer = Replayer::default();
    for line in text.lines() {
        replayer.apply_line(line);
    }
    replayer.finish()
}

/// Replays `text` and returns the fingerprint of the resulting views.
pub fn replay_and_hash(text: &str) -> [u8; 32] {
    view_fingerprint(&replay_text(text))
}
