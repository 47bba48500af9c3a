use crate::engine::{format_opt, ReplaySession};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::path::Path;

pub fn run(ledger_path: &Path, json: bool) -> anyhow::Result<()> {
    let session = ReplaySession::open(ledger_path)?;
    let summary = session.views.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let g = &summary.global;
    let mut global = Table::new();
    global
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Files", "Backup Pairs", "Restores", "Restores OK", "Errors"]);
    global.add_row(vec![
        g.total_files.to_string(),
        g.total_backup_pairs.to_string(),
        g.total_restore.to_string(),
        g.total_restore_ok.to_string(),
        g.errors.to_string(),
    ]);
    println!("\nGlobal\n");
    println!("{global}\n");

    let mut files = Table::new();
    files
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["File", "Size", "SHA-256", "Ratios", "Restore OK"]);

    for f in &summary.files {
        let ratios = f
            .ratios
            .iter()
            .map(|(algo, r)| format!("{algo}={}", format_opt(*r, 2)))
            .collect::<Vec<_>>()
            .join(" ");
        let sha = f.sha.get(..12).unwrap_or(&f.sha);
        files.add_row(vec![
            f.file.clone(),
            f.size.to_string(),
            sha.to_string(),
            ratios,
            format!(
                "{}/{} ({}%)",
                f.restore_ok,
                f.restore_total,
                format_opt(f.restore_ok_pct, 1)
            ),
        ]);
    }
    println!("Files\n");
    println!("{files}\n");
    Ok(())
}
