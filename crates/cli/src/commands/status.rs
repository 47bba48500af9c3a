use crate::engine::{format_ts, ReplaySession};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::path::Path;
use vaultline_kernel::verify::fingerprint_hex;

pub fn run(ledger_path: &Path) -> anyhow::Result<()> {
    let session = ReplaySession::open(ledger_path)?;
    let views = &session.views;

    println!("\nLedger: {}", session.ledger_path.display());
    println!("Events: {} applied, {} skipped", session.events, session.skipped);
    println!("Span:   {} .. {}", format_ts(session.first_ts), format_ts(session.last_ts));
    println!("View fingerprint: {}\n", fingerprint_hex(views));

    let ransom = views.ransom();
    let header = views.header();
    let corrupt = views.corrupt();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Attack", "Status", "Total", "Success", "Fail", "Detail"]);
    table.add_row(vec![
        "ransomware".to_string(),
        format!("{:?}", ransom.status),
        ransom.total.to_string(),
        ransom.encrypted.to_string(),
        ransom.total_fail.to_string(),
        format!("decrypted={}", ransom.decrypted),
    ]);
    table.add_row(vec![
        "header".to_string(),
        format!("{:?}", header.status),
        header.total.to_string(),
        header.total_success.to_string(),
        header.total_fail.to_string(),
        format!("mode={}", header.mode),
    ]);
    table.add_row(vec![
        "corrupt".to_string(),
        format!("{:?}", corrupt.status),
        corrupt.total.to_string(),
        corrupt.total_success.to_string(),
        corrupt.total_fail.to_string(),
        format!("folder={}", corrupt.folder),
    ]);
    println!("{table}\n");
    Ok(())
}
