// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Derived views folded from the ledger.
//!
//! Every accumulator sees every event; each ignores the kinds it does not
//! recognize. The `*_error` counter is independent of all of them.

mod ordered;

pub mod attack;
pub mod evaluation;
pub mod summary;

pub use attack::{AttackDomain, AttackMachine, AttackPhase, CorruptReport, HeaderReport, RansomReport};
pub use evaluation::{evaluate, CodecEvaluation, Evaluation};
pub use summary::{FileDetail, GlobalCounters, Summary, SummaryView};

use crate::codec::CodecNames;
use crate::event::{LedgerEvent, RawEvent};

#[derive(Clone, Debug)]
pub struct Views {
    codecs: CodecNames,
    summary: SummaryView,
    ransom: AttackMachine,
    header: AttackMachine,
    corrupt: AttackMachine,
    last_kind: Option<String>,
    applied: u64,
}

impl Views {
    pub fn new(codecs: CodecNames) -> Self {
        Self {
            codecs,
            summary: SummaryView::default(),
            ransom: AttackMachine::new(AttackDomain::Ransomware),
            header: AttackMachine::new(AttackDomain::HeaderCorruption),
            corrupt: AttackMachine::new(AttackDomain::ByteCorruption),
            last_kind: None,
            applied: 0,
        }
    }

    pub fn apply(&mut self, event: &RawEvent) {
        self.summary.apply(&LedgerEvent::decode(event, &self.codecs));
        if event.is_error() {
            self.summary.count_error();
        }
        self.ransom.apply(event);
        self.header.apply(event);
        self.corrupt.apply(event);
        self.last_kind = Some(event.kind.clone());
        self.applied += 1;
    }

    /// Number of events folded so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn summary_view(&self) -> &SummaryView {
        &self.summary
    }

    pub fn summary(&self) -> Summary {
        self.summary.report()
    }

    pub fn ransom(&self) -> RansomReport {
        self.ransom.state().ransom_report(self.last_kind.clone())
    }

    pub fn header(&self) -> HeaderReport {
        self.header.state().header_report()
    }

    pub fn corrupt(&self) -> CorruptReport {
        self.corrupt.state().corrupt_report()
    }

    pub fn evaluation(&self) -> Evaluation {
        evaluate(&self.summary)
    }
}

impl Default for Views {
    fn default() -> Self {
        Self::new(CodecNames::registered())
    }
}
