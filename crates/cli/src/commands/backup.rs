use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::path::Path;
use vaultline_node::config::NodeConfig;
use vaultline_node::engine::Engine;

pub fn run(cfg: &NodeConfig, source: Option<&Path>) -> anyhow::Result<()> {
    let source = source.unwrap_or(&cfg.source_root).to_path_buf();
    let engine = Engine::open(cfg.clone()).context("Failed to open engine")?;
    engine
        .cancel_on_interrupt()
        .context("Failed to install Ctrl-C handler")?;

    println!("Backing up {} ...", source.display());
    let report = engine.backup_tree(&source)?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Files", "Artifacts", "Errors", "Cancelled"]);
    table.add_row(vec![
        report.files.to_string(),
        report.artifacts.to_string(),
        report.errors.to_string(),
        report.cancelled.to_string(),
    ]);
    println!("{table}\n");

    if report.cancelled {
        println!("⚠️  Interrupted. Finished artifacts are kept.");
    } else if report.errors > 0 {
        println!("⚠️  {} backup(s) failed. See `vaultline events` for details.", report.errors);
    } else {
        println!("✅ Artifacts written to {}", engine.store().root().display());
    }
    Ok(())
}
