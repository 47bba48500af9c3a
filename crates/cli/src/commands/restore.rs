use anyhow::Context;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use vaultline_node::config::NodeConfig;
use vaultline_node::engine::Engine;

pub fn run(cfg: &NodeConfig) -> anyhow::Result<()> {
    let engine = Engine::open(cfg.clone()).context("Failed to open engine")?;
    engine
        .cancel_on_interrupt()
        .context("Failed to install Ctrl-C handler")?;

    println!("Restoring {} -> {} ...", cfg.artifact_root.display(), cfg.restore_root.display());
    let report = engine.restore_tree()?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Artifacts", "Matched", "Mismatched", "Errors"]);
    table.add_row(vec![
        report.artifacts.to_string(),
        report.matched.to_string(),
        report.mismatched.to_string(),
        report.errors.to_string(),
    ]);
    println!("{table}\n");

    if report.cancelled {
        println!("⚠️  Interrupted after {} artifact(s).", report.artifacts);
    } else if report.mismatched == 0 && report.errors == 0 {
        println!("✅ INTEGRITY VERIFIED: every restored file matches its original hash.");
    } else {
        println!(
            "❌ INTEGRITY FAILURE: {} mismatched, {} failed.",
            report.mismatched, report.errors
        );
    }
    Ok(())
}
