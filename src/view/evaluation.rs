// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Per-codec comparison over the recorded backup outcomes.

use super::summary::SummaryView;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodecEvaluation {
    /// Backup outcomes recorded for this codec.
    pub count: usize,
    pub ratio_avg: Option<f64>,
    pub ratio_median: Option<f64>,
    pub ratio_min: Option<f64>,
    pub ratio_max: Option<f64>,
    pub duration_avg_ms: Option<f64>,
    pub duration_median_ms: Option<f64>,
}

pub type Evaluation = BTreeMap<String, CodecEvaluation>;

pub fn evaluate(summary: &SummaryView) -> Evaluation {
    let mut ratios: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut durations: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for ((_, algo), outcome) in summary.backups() {
        *counts.entry(algo.clone()).or_default() += 1;
        if let Some(r) = outcome.ratio.filter(|r| r.is_finite()) {
            ratios.entry(algo.clone()).or_default().push(r);
        }
        if let Some(d) = outcome.duration_ms.filter(|d| d.is_finite()) {
            durations.entry(algo.clone()).or_default().push(d);
        }
    }

    counts
        .into_iter()
        .map(|(algo, count)| {
            let mut r = ratios.remove(&algo).unwrap_or_default();
            let mut d = durations.remove(&algo).unwrap_or_default();
            r.sort_by(f64::total_cmp);
            d.sort_by(f64::total_cmp);
            let eval = CodecEvaluation {
                count,
                ratio_avg: mean(&r),
                ratio_median: median(&r),
                ratio_min: r.first().copied(),
                ratio_max: r.last().copied(),
                duration_avg_ms: mean(&d),
                duration_median_ms: median(&d),
            };
            (algo, eval)
        })
        .collect()
}

fn mean(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    Some(sorted.iter().sum::<f64>() / sorted.len() as f64)
}

fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    }
}
