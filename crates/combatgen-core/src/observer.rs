use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};

use crate::{
    config::CombatConfig,
    controller::{
        Controller, ControllerError, ControllerFactory, InterfaceOptions, Size2D,
        SpatialCameraSetup, StartReplay,
    },
    record::{RecordError, Simulation, write_simulation},
    segment::{RoundSegmenter, SegmentError},
};

#[derive(Debug, Error)]
pub enum ObserverError {
    #[error(transparent)]
    Controller(#[from] ControllerError),

    #[error(transparent)]
    Segment(#[from] SegmentError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("failed to scan '{path}': {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("replay '{replay}' is not inside '{dir}' or lacks suffix '{suffix}'")]
    OutsideReplayDir {
        replay: PathBuf,
        dir: PathBuf,
        suffix: String,
    },
}

/// Recursively collect files under `dir` whose name ends with `suffix`, sorted.
///
/// A missing directory yields no files.
pub fn discover_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, ObserverError> {
    let mut found = Vec::new();
    if dir.exists() {
        walk(dir, suffix, &mut found)?;
    }
    found.sort();
    Ok(found)
}

fn walk(dir: &Path, suffix: &str, found: &mut Vec<PathBuf>) -> Result<(), ObserverError> {
    let scan_err = |source| ObserverError::Scan {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        let path = entry.path();
        // Symlinked directories are not followed.
        if entry.file_type().map_err(scan_err)?.is_dir() {
            walk(&path, suffix, found)?;
        } else if path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(suffix))
        {
            found.push(path);
        }
    }
    Ok(())
}

/// Map `replays/<rel>/<name><replay_suffix>` to `parsed/<rel>/<name><parsed_suffix>`.
pub fn parsed_path_for(
    replay: &Path,
    replay_dir: &Path,
    parsed_dir: &Path,
    replay_suffix: &str,
    parsed_suffix: &str,
) -> Result<PathBuf, ObserverError> {
    let outside = || ObserverError::OutsideReplayDir {
        replay: replay.to_path_buf(),
        dir: replay_dir.to_path_buf(),
        suffix: replay_suffix.to_string(),
    };
    let relative = replay.strip_prefix(replay_dir).map_err(|_| outside())?;
    let name = relative
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(replay_suffix))
        .ok_or_else(outside)?;
    Ok(parsed_dir
        .join(relative)
        .with_file_name(format!("{name}{parsed_suffix}")))
}

/// Options the observer starts every replay with.
pub fn replay_interface(config: &CombatConfig) -> InterfaceOptions {
    InterfaceOptions {
        // Raw units give the unit count and the army baseline.
        raw: true,
        // Score statistics do not apply to this map.
        score: false,
        feature_layer: Some(SpatialCameraSetup {
            width: config.camera_width,
            resolution: Size2D::square(config.screen_resolution),
            minimap_resolution: Size2D::square(config.minimap_resolution),
        }),
    }
}

/// Replay one file through `controller` and segment it into battles.
pub fn observe_replay<C>(
    controller: &mut C,
    replay: &Path,
    config: &CombatConfig,
) -> Result<Simulation, ObserverError>
where
    C: Controller + ?Sized,
{
    info!("starting replay");
    controller.start_replay(&StartReplay {
        replay_path: replay.to_path_buf(),
        map_path: config.map_path.clone(),
        observed_player_id: config.observed_player_id,
        options: replay_interface(config),
        disable_fog: true,
    })?;

    let mut segmenter = RoundSegmenter::new(replay.to_string_lossy());
    let mut response = controller.observe()?;
    while !response.is_game_over() {
        controller.step(config.step_size)?;
        response = controller.observe()?;

        let events = segmenter.push(&response.observation)?;
        if let Some(round) = events.opened {
            info!("parsing round {round}");
        }
        if let Some((round, outcome)) = events.resolved {
            debug!(round, %outcome, game_loop = response.observation.game_loop, "round resolved");
        }
    }

    if let Some(round) = segmenter.open_round() {
        debug!(round, "replay ended before the round was decided");
    }
    Ok(segmenter.finish())
}

/// Parse every replay under `config.replay_dir`, one fresh controller each.
///
/// Returns the parsed files written, in replay order.
pub fn observe_all<F>(factory: &mut F, config: &CombatConfig) -> Result<Vec<PathBuf>, ObserverError>
where
    F: ControllerFactory,
{
    let replays = discover_files(&config.replay_dir, &config.replay_suffix)?;
    let mut written = Vec::with_capacity(replays.len());

    for replay in replays {
        info!(replay = %replay.display(), "going to parse replay");
        let parsed = parsed_path_for(
            &replay,
            &config.replay_dir,
            &config.parsed_dir,
            &config.replay_suffix,
            &config.parsed_suffix,
        )?;

        let mut controller = factory.start()?;
        let simulation = observe_replay(&mut controller, &replay, config)?;
        controller.quit()?;

        info!(
            battles = simulation.len(),
            decided = simulation.decided().count(),
            path = %parsed.display(),
            "replay completed, saving parsed replay"
        );
        write_simulation(&parsed, &simulation)?;
        written.push(parsed);
    }

    Ok(written)
}
