use crate::engine::{format_opt, ReplaySession};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::path::Path;

/// Per-codec ratio and duration statistics over every recorded backup.
pub fn run(ledger_path: &Path) -> anyhow::Result<()> {
    let session = ReplaySession::open(ledger_path)?;
    let eval = session.views.evaluation();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Codec", "Count", "Ratio avg", "Ratio median", "Ratio min", "Ratio max", "ms avg",
            "ms median",
        ]);

    for (codec, e) in &eval {
        table.add_row(vec![
            codec.clone(),
            e.count.to_string(),
            format_opt(e.ratio_avg, 3),
            format_opt(e.ratio_median, 3),
            format_opt(e.ratio_min, 3),
            format_opt(e.ratio_max, 3),
            format_opt(e.duration_avg_ms, 3),
            format_opt(e.duration_median_ms, 3),
        ]);
    }

    println!("\nCodec Evaluation\n");
    println!("{table}\n");
    Ok(())
}
