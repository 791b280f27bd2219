//! Binary payload codec for simulation records (payload inside a frame).
//!
//! All integers are little-endian. Strings and blobs carry a u32 length prefix.

use std::collections::BTreeMap;

use crate::record::{
    Battle, FeatureLayers, ImageData, Observation, Outcome, PlayerCommon, RawUnit, RecordError,
    Simulation,
};

pub const MAGIC: [u8; 4] = *b"SC2C";
pub const FORMAT_VERSION: u32 = 1;

pub fn encode_simulation(simulation: &Simulation) -> Result<Vec<u8>, RecordError> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    put_u32(&mut out, FORMAT_VERSION);
    put_len(&mut out, "battle list", simulation.battles.len())?;
    for battle in &simulation.battles {
        encode_battle(&mut out, battle)?;
    }
    Ok(out)
}

pub fn decode_simulation(bytes: &[u8]) -> Result<Simulation, RecordError> {
    let mut c = Cursor::new(bytes);

    let magic = c.read_array::<4>()?;
    if magic != MAGIC {
        return Err(RecordError::BadMagic {
            found: magic,
            expected: MAGIC,
        });
    }
    let version = c.read_u32()?;
    if version != FORMAT_VERSION {
        return Err(RecordError::BadVersion(version));
    }

    let count = c.read_u32()? as usize;
    let mut battles = Vec::with_capacity(count.min(1024));
    for index in 0..count {
        battles.push(decode_battle(&mut c, index)?);
    }

    if c.remaining() != 0 {
        return Err(RecordError::TrailingBytes {
            count: c.remaining(),
        });
    }
    Ok(Simulation { battles })
}

fn encode_battle(out: &mut Vec<u8>, battle: &Battle) -> Result<(), RecordError> {
    put_str(out, "replay_file", &battle.replay_file)?;
    put_u32(out, battle.round_num);
    out.push(battle.outcome.wire_value());
    encode_observation(out, &battle.initial_observation)
}

fn decode_battle(c: &mut Cursor<'_>, index: usize) -> Result<Battle, RecordError> {
    let replay_file = c.read_string()?;
    let round_num = c.read_u32()?;
    let value = c.read_u8()?;
    let outcome = Outcome::from_wire(value).ok_or(RecordError::BadOutcome { index, value })?;
    let initial_observation = decode_observation(c)?;
    Ok(Battle {
        replay_file,
        round_num,
        initial_observation,
        outcome,
    })
}

fn encode_observation(out: &mut Vec<u8>, obs: &Observation) -> Result<(), RecordError> {
    put_u32(out, obs.game_loop);
    put_u32(out, obs.player_common.minerals);
    put_u32(out, obs.player_common.vespene);

    put_len(out, "unit list", obs.units.len())?;
    for unit in &obs.units {
        out.extend_from_slice(&unit.tag.to_le_bytes());
        put_u32(out, unit.unit_type);
        put_u32(out, unit.owner);
        for v in [unit.x, unit.y, unit.health, unit.shield] {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    let renders = &obs.feature_layers.renders;
    put_len(out, "render list", renders.len())?;
    for (name, image) in renders {
        put_str(out, "render name", name)?;
        put_u32(out, image.width);
        put_u32(out, image.height);
        out.push(image.bits_per_pixel);
        put_len(out, "render data", image.data.len())?;
        out.extend_from_slice(&image.data);
    }
    Ok(())
}

fn decode_observation(c: &mut Cursor<'_>) -> Result<Observation, RecordError> {
    let game_loop = c.read_u32()?;
    let minerals = c.read_u32()?;
    let vespene = c.read_u32()?;

    let unit_count = c.read_u32()? as usize;
    let mut units = Vec::with_capacity(unit_count.min(4096));
    for _ in 0..unit_count {
        units.push(RawUnit {
            tag: c.read_u64()?,
            unit_type: c.read_u32()?,
            owner: c.read_u32()?,
            x: c.read_f32()?,
            y: c.read_f32()?,
            health: c.read_f32()?,
            shield: c.read_f32()?,
        });
    }

    let render_count = c.read_u32()? as usize;
    let mut renders = BTreeMap::new();
    for _ in 0..render_count {
        let name = c.read_string()?;
        let width = c.read_u32()?;
        let height = c.read_u32()?;
        let bits_per_pixel = c.read_u8()?;
        let data = c.read_blob()?.to_vec();
        renders.insert(
            name,
            ImageData {
                width,
                height,
                bits_per_pixel,
                data,
            },
        );
    }

    Ok(Observation {
        game_loop,
        player_common: PlayerCommon { minerals, vespene },
        units,
        feature_layers: FeatureLayers { renders },
    })
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_len(out: &mut Vec<u8>, what: &'static str, len: usize) -> Result<(), RecordError> {
    let len32 = u32::try_from(len).map_err(|_| RecordError::TooLong { what, len })?;
    put_u32(out, len32);
    Ok(())
}

fn put_str(out: &mut Vec<u8>, what: &'static str, s: &str) -> Result<(), RecordError> {
    put_len(out, what, s.len())?;
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

struct Cursor<'a> {
    b: &'a [u8],
    off: usize,
}

impl<'a> Cursor<'a> {
    fn new(b: &'a [u8]) -> Self {
        Self { b, off: 0 }
    }

    fn remaining(&self) -> usize {
        self.b.len() - self.off
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], RecordError> {
        if self.remaining() < n {
            return Err(RecordError::Truncated { offset: self.off });
        }
        let s = &self.b[self.off..self.off + n];
        self.off += n;
        Ok(s)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], RecordError> {
        let mut a = [0u8; N];
        a.copy_from_slice(self.take(N)?);
        Ok(a)
    }

    fn read_u8(&mut self) -> Result<u8, RecordError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, RecordError> {
        Ok(u32::from_le_bytes(self.read_array::<4>()?))
    }

    fn read_u64(&mut self) -> Result<u64, RecordError> {
        Ok(u64::from_le_bytes(self.read_array::<8>()?))
    }

    fn read_f32(&mut self) -> Result<f32, RecordError> {
        Ok(f32::from_le_bytes(self.read_array::<4>()?))
    }

    fn read_blob(&mut self) -> Result<&'a [u8], RecordError> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    fn read_string(&mut self) -> Result<String, RecordError> {
        let bytes = self.read_blob()?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}
