use anyhow::Context;
use vaultline_node::config::NodeConfig;
use vaultline_node::engine::Engine;

/// Appends `system_start`. The ledger itself is never truncated.
pub fn run(cfg: &NodeConfig) -> anyhow::Result<()> {
    let engine = Engine::open(cfg.clone()).context("Failed to open engine")?;
    engine.reset()?;
    println!("Attack views reset. History kept in {}", cfg.ledger_path.display());
    Ok(())
}
