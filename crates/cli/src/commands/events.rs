use crate::engine::format_ts;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::path::Path;
use vaultline_persistence::EventLedger;

pub fn run(ledger_path: &Path, tail: usize) -> anyhow::Result<()> {
    let ledger = EventLedger::open(ledger_path)?;
    let events = ledger.tail(tail)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Timestamp", "Event", "Data"]);

    for ev in &events {
        table.add_row(vec![
            format_ts(Some(ev.ts)),
            ev.kind.clone(),
            serde_json::to_string(&ev.payload)?,
        ]);
    }

    println!("\nLast {} event(s)\n", events.len());
    println!("{table}\n");
    Ok(())
}
