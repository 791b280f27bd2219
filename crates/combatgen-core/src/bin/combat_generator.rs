//! Play the combat scenario once and save its replay.
//!
//! Usage: `combat_generator [config.yaml]`

use std::path::PathBuf;

use combatgen_core::{CombatConfig, controller::BridgeFactory, generate_replay};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    combatgen_core::init_tracing();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = CombatConfig::load(config_path.as_deref())?;

    let mut factory = BridgeFactory::new(config.bridge_command.clone());
    let replay = generate_replay(&mut factory, &config)?;

    tracing::info!(path = %replay.display(), "done");
    Ok(())
}
