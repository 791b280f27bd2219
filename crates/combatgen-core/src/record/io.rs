use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::Path,
};

use crate::record::{
    RecordError, Simulation, decode_simulation, encode_simulation,
    frame::{read_frame, write_frame},
};

/// Write a simulation to disk as a single length-prefixed record.
pub fn write_simulation(path: impl AsRef<Path>, simulation: &Simulation) -> Result<(), RecordError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let payload = encode_simulation(simulation)?;
    let mut writer = BufWriter::new(File::create(path)?);
    write_frame(&mut writer, &payload)?;
    Ok(())
}

/// Read a simulation record written by [`write_simulation`].
pub fn read_simulation(path: impl AsRef<Path>) -> Result<Simulation, RecordError> {
    let mut reader = BufReader::new(File::open(path)?);
    let payload = read_frame(&mut reader)?;
    decode_simulation(&payload)
}
