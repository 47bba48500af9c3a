use anyhow::Context;
use std::path::Path;
use vaultline_node::config::NodeConfig;
use vaultline_node::engine::Engine;
use vaultline_node::mover::DirectoryMirror;

pub fn run(cfg: &NodeConfig, to: Option<&Path>) -> anyhow::Result<()> {
    let dst = to.unwrap_or(&cfg.mirror_root);
    let engine = Engine::open(cfg.clone()).context("Failed to open engine")?;

    let mirror = DirectoryMirror::new(dst);
    let report = engine
        .transfer(&mirror)
        .with_context(|| format!("Transfer to {} failed", dst.display()))?;

    println!("✅ Mirrored {} file(s) to {}", report.count, report.dst.display());
    Ok(())
}
