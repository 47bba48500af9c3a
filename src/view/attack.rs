// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Attack Status Machines
//!
//! One machine per simulated-attack domain. Each domain owns a kind table
//! that classifies an event into an [`AttackSignal`]; the machine itself is
//! shared.
//!
//! # Transitions
//! - `Reset`    -> Idle, every counter zeroed, prior state discarded
//! - `Start`    -> Running, optional declared total and detail
//! - `Unit`     -> Running, success or fail += 1
//! - `Reverse`  -> reversed += 1 (status unchanged)
//! - `ReverseComplete` -> reversed overwritten by the final count, if any
//! - `Complete` -> Done, supplied final counts overwrite running ones
//! - `Failed`   -> Error
//!
//! A completion count that disagrees with the incremental count is not
//! reconciled: the last value seen wins.

use crate::config::SYSTEM_RESET_KINDS;
use crate::event::{str_field, u64_field, unit_ok, Payload, RawEvent};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPhase {
    #[default]
    Idle,
    Running,
    Done,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackDomain {
    Ransomware,
    HeaderCorruption,
    ByteCorruption,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttackSignal {
    Reset,
    Start {
        total: Option<u64>,
        detail: Option<String>,
    },
    Unit {
        ok: bool,
    },
    Reverse,
    ReverseComplete {
        reversed: Option<u64>,
    },
    Complete {
        success: Option<u64>,
        fail: Option<u64>,
        detail: Option<String>,
    },
    Failed,
}

impl AttackDomain {
    /// Maps an event to this domain's signal, or `None` if the domain does
    /// not recognize the kind.
    pub fn classify(self, kind: &str, p: &Payload) -> Option<AttackSignal> {
        if SYSTEM_RESET_KINDS.contains(&kind) {
            return Some(AttackSignal::Reset);
        }
        match self {
            AttackDomain::Ransomware => classify_ransom(kind, p),
            AttackDomain::HeaderCorruption => classify_header(kind, p),
            AttackDomain::ByteCorruption => classify_corrupt(kind, p),
        }
    }
}

fn classify_ransom(kind: &str, p: &Payload) -> Option<AttackSignal> {
    let signal = match kind {
        "ransom_reset" => AttackSignal::Reset,
        "ransom_scan_start" | "simulate_ransomware_start" => AttackSignal::Start {
            total: u64_field(p, "total"),
            detail: None,
        },
        "ransom_encrypt_start" | "encrypt_start" => AttackSignal::Start {
            total: None,
            detail: None,
        },
        "ransom_encrypt_done" | "encrypt_end" | "simulate_ransomware_file" => {
            AttackSignal::Unit { ok: unit_ok(p) }
        }
        "ransom_decrypt_done" | "decrypt_end" => AttackSignal::Reverse,
        // A failed decrypt_file leaves every counter alone.
        "decrypt_file" if unit_ok(p) => AttackSignal::Reverse,
        "decrypt_done" => AttackSignal::ReverseComplete {
            reversed: u64_field(p, "total_success"),
        },
        "ransom_simulation_end" | "simulate_ransomware_done" | "encryption_complete"
        | "simulation_end" => AttackSignal::Complete {
            success: u64_field(p, "count").or_else(|| u64_field(p, "total_success")),
            fail: u64_field(p, "total_fail"),
            detail: None,
        },
        "simulate_ransomware_error" | "ransom_error" | "decrypt_error" => AttackSignal::Failed,
        _ => return None,
    };
    Some(signal)
}

fn classify_header(kind: &str, p: &Payload) -> Option<AttackSignal> {
    let signal = match kind {
        "header_reset" => AttackSignal::Reset,
        "hdr_corrupt_start" => AttackSignal::Start {
            total: u64_field(p, "total"),
            detail: str_field(p, "mode").map(str::to_string),
        },
        "hdr_file" => AttackSignal::Unit { ok: unit_ok(p) },
        "hdr_done" => AttackSignal::Complete {
            success: u64_field(p, "success"),
            fail: u64_field(p, "fail"),
            detail: str_field(p, "mode").map(str::to_string),
        },
        "hdr_corrupt_error" => AttackSignal::Failed,
        _ => return None,
    };
    Some(signal)
}

fn classify_corrupt(kind: &str, p: &Payload) -> Option<AttackSignal> {
    let signal = match kind {
        "corrupt_reset" => AttackSignal::Reset,
        "simulate_corrupt_start" => AttackSignal::Start {
            total: u64_field(p, "total"),
            detail: str_field(p, "folder").map(str::to_string),
        },
        "simulate_corrupt_file" => AttackSignal::Unit { ok: unit_ok(p) },
        "simulate_corrupt_done" => AttackSignal::Complete {
            success: u64_field(p, "total_success"),
            fail: u64_field(p, "total_fail"),
            detail: str_field(p, "folder").map(str::to_string),
        },
        "simulate_corrupt_error" => AttackSignal::Failed,
        _ => return None,
    };
    Some(signal)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttackState {
    pub phase: AttackPhase,
    /// Declared upfront by a start event, raised to cover processed units.
    pub total: u64,
    pub success: u64,
    pub fail: u64,
    /// Reversible actions (decryptions); only the ransomware domain emits them.
    pub reversed: u64,
    /// Domain detail: header `mode` or corruption `folder`.
    pub detail: Option<String>,
}

/// A single domain's accumulator.
#[derive(Clone, Debug, PartialEq)]
pub struct AttackMachine {
    domain: AttackDomain,
    state: AttackState,
}

impl AttackMachine {
    pub fn new(domain: AttackDomain) -> Self {
        Self {
            domain,
            state: AttackState::default(),
        }
    }

    pub fn domain(&self) -> AttackDomain {
        self.domain
    }

    pub fn state(&self) -> &AttackState {
        &self.state
    }

    pub fn apply(&mut self, event: &RawEvent) {
        let Some(signal) = self.domain.classify(&event.kind, &event.payload) else {
            return;
        };

        let s = &mut self.state;
        match signal {
            AttackSignal::Reset => *s = AttackState::default(),
            AttackSignal::Start { total, detail } => {
                s.phase = AttackPhase::Running;
                if let Some(total) = total {
                    s.total = total;
                }
                if detail.is_some() {
                    s.detail = detail;
                }
            }
            AttackSignal::Unit { ok } => {
                s.phase = AttackPhase::Running;
                if ok {
                    s.success += 1;
                } else {
                    s.fail += 1;
                }
                s.total = s.total.max(s.success + s.fail);
            }
            AttackSignal::Reverse => s.reversed += 1,
            AttackSignal::ReverseComplete { reversed } => {
                if let Some(reversed) = reversed {
                    s.reversed = reversed;
                }
            }
            AttackSignal::Complete {
                success,
                fail,
                detail,
            } => {
                s.phase = AttackPhase::Done;
                if let Some(success) = success {
                    s.success = success;
                }
                if let Some(fail) = fail {
                    s.fail = fail;
                }
                if detail.is_some() {
                    s.detail = detail;
                }
            }
            AttackSignal::Failed => s.phase = AttackPhase::Error,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RansomReport {
    pub status: AttackPhase,
    pub running: bool,
    pub total: u64,
    pub encrypted: u64,
    pub decrypted: u64,
    pub total_success: u64,
    pub total_fail: u64,
    /// Kind of the last event in the ledger, whichever domain it belongs to.
    pub last_event: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeaderReport {
    pub status: AttackPhase,
    pub total: u64,
    pub total_success: u64,
    pub total_fail: u64,
    pub mode: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorruptReport {
    pub status: AttackPhase,
    pub total: u64,
    pub total_success: u64,
    pub total_fail: u64,
    pub folder: String,
    pub mode: String,
}

impl AttackState {
    pub fn ransom_report(&self, last_event: Option<String>) -> RansomReport {
        RansomReport {
            status: self.phase,
            running: self.phase == AttackPhase::Running,
            total: self.total,
            encrypted: self.success,
            decrypted: self.reversed,
            total_success: self.success,
            total_fail: self.fail,
            last_event,
        }
    }

    pub fn header_report(&self) -> HeaderReport {
        HeaderReport {
            status: self.phase,
            total: self.total,
            total_success: self.success,
            total_fail: self.fail,
            mode: self.detail.clone().unwrap_or_else(|| "unknown".to_string()),
        }
    }

    pub fn corrupt_report(&self) -> CorruptReport {
        CorruptReport {
            status: self.phase,
            total: self.total,
            total_success: self.success,
            total_fail: self.fail,
            folder: self.detail.clone().unwrap_or_else(|| "unknown".to_string()),
            mode: "corrupt_simulation".to_string(),
        }
    }
}
