//! Parse every saved replay into battle records.
//!
//! Usage: `combat_observer [config.yaml]`

use std::path::PathBuf;

use combatgen_core::{CombatConfig, controller::BridgeFactory, observe_all};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    combatgen_core::init_tracing();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = CombatConfig::load(config_path.as_deref())?;

    let mut factory = BridgeFactory::new(config.bridge_command.clone());
    let written = observe_all(&mut factory, &config)?;

    tracing::info!(files = written.len(), "done");
    Ok(())
}
