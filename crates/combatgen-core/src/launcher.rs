use std::{fs, path::PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::CombatConfig,
    controller::{
        Controller, ControllerError, ControllerFactory, CreateGame, Difficulty, InterfaceOptions,
        JoinGame, PlayerSetup, Race,
    },
};

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error("failed to write replay to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Player slots of the combat scenario: two scripted armies and the local
/// participant who configures the map.
pub fn scenario_players() -> Vec<PlayerSetup> {
    vec![
        PlayerSetup::Computer {
            race: Race::Random,
            difficulty: Difficulty::VeryEasy,
        },
        PlayerSetup::Computer {
            race: Race::Random,
            difficulty: Difficulty::VeryEasy,
        },
        PlayerSetup::Participant,
    ]
}

/// Play the combat scenario to completion and save its replay.
///
/// Returns the path the replay was written to.
pub fn generate_replay<F>(factory: &mut F, config: &CombatConfig) -> Result<PathBuf, LauncherError>
where
    F: ControllerFactory,
{
    let mut controller = factory.start()?;

    info!(map = %config.map_path.display(), "starting map");
    controller.create_game(&CreateGame {
        map_path: config.map_path.clone(),
        players: scenario_players(),
        realtime: false,
    })?;

    info!("joining game");
    // Only the replay matters here, so no observation layers are requested.
    controller.join_game(&JoinGame {
        race: Race::Random,
        options: InterfaceOptions::default(),
    })?;

    info!("stepping through game");
    warn!("the map settings still have to be configured manually in game");
    let mut steps = 0u64;
    let mut response = controller.observe()?;
    while !response.is_game_over() {
        controller.step(config.step_size)?;
        response = controller.observe()?;
        steps += 1;
    }

    let replay_path = config.replay_path();
    info!(steps, path = %replay_path.display(), "game completed, saving replay");
    let data = controller.save_replay()?;
    fs::create_dir_all(&config.replay_dir).map_err(|source| LauncherError::Write {
        path: replay_path.clone(),
        source,
    })?;
    fs::write(&replay_path, data).map_err(|source| LauncherError::Write {
        path: replay_path.clone(),
        source,
    })?;
    controller.quit()?;

    Ok(replay_path)
}
