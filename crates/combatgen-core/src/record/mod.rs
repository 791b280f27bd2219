mod battle;
mod codec;
pub mod error;
pub mod frame;
mod io;
mod observation;
mod outcome;

pub use battle::{Battle, Simulation};
pub use codec::{FORMAT_VERSION, MAGIC, decode_simulation, encode_simulation};
pub use error::RecordError;
pub use io::{read_simulation, write_simulation};
pub use observation::{
    FeatureLayers, ImageData, Observation, PLAYER_RELATIVE, PlayerCommon, RawUnit,
};
pub use outcome::Outcome;

#[cfg(test)]
mod tests;
