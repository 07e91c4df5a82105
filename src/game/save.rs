//! Canonical binary save/load (§4.I "Persistence", exact layout in §6).
//!
//! Every field is written with an explicit big-endian encoding via
//! `byteorder` rather than relying on in-memory struct layout, so the format
//! is stable across compiler versions and platforms.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::game::agent::{AgentId, AgentState, Arena, Colonist};
use crate::game::errors::SaveError;
use crate::game::grid::{Cell, Inventory, TileCosts, TileType, World};

const MAGIC: u32 = 0x434f_4c59; // "COLY"
const VERSION: u32 = 1;

impl From<io::Error> for SaveError {
    fn from(e: io::Error) -> Self {
        SaveError::Io(e.to_string())
    }
}

fn tile_to_u8(t: TileType) -> u8 {
    match t {
        TileType::Empty => 0,
        TileType::Floor => 1,
        TileType::Wall => 2,
        TileType::Farm => 3,
        TileType::Stockpile => 4,
    }
}

fn tile_from_u8(b: u8) -> Result<TileType, SaveError> {
    match b {
        0 => Ok(TileType::Empty),
        1 => Ok(TileType::Floor),
        2 => Ok(TileType::Wall),
        3 => Ok(TileType::Farm),
        4 => Ok(TileType::Stockpile),
        _ => Err(SaveError::Corrupt),
    }
}

fn state_to_u8(s: AgentState) -> u8 {
    match s {
        AgentState::Idle => 0,
        AgentState::Walking => 1,
        AgentState::Working => 2,
    }
}

fn state_from_u8(b: u8) -> Result<AgentState, SaveError> {
    match b {
        0 => Ok(AgentState::Idle),
        1 => Ok(AgentState::Walking),
        2 => Ok(AgentState::Working),
        _ => Err(SaveError::Corrupt),
    }
}

/// Writes `world` and `agents` to `writer` in the canonical format. Plan
/// history is never persisted (§6: "undo stack is session-scoped").
pub fn save<W: Write>(writer: &mut W, world: &World, agents: &Arena<Colonist>) -> Result<(), SaveError> {
    writer.write_u32::<BigEndian>(MAGIC)?;
    writer.write_u32::<BigEndian>(VERSION)?;
    writer.write_u32::<BigEndian>(world.width() as u32)?;
    writer.write_u32::<BigEndian>(world.height() as u32)?;
    writer.write_u64::<BigEndian>(world.seed)?;
    writer.write_i32::<BigEndian>(world.inventory.wood)?;
    writer.write_f32::<BigEndian>(world.inventory.food)?;

    for cell in world.cells() {
        write_cell(writer, cell)?;
    }

    writer.write_u32::<BigEndian>(agents.len() as u32)?;
    for (id, agent) in agents.iter() {
        write_agent(writer, id, agent)?;
    }

    Ok(())
}

fn write_cell<W: Write>(writer: &mut W, cell: &Cell) -> Result<(), SaveError> {
    writer.write_u8(tile_to_u8(cell.built))?;
    writer.write_u8(tile_to_u8(cell.planned))?;
    writer.write_u8(cell.plan_priority)?;
    writer.write_f32::<BigEndian>(cell.work_remaining)?;
    let reserved = cell.reserved_by.map(|id| id.index() as i32).unwrap_or(-1);
    writer.write_i32::<BigEndian>(reserved)?;
    Ok(())
}

fn write_agent<W: Write>(writer: &mut W, id: AgentId, agent: &Colonist) -> Result<(), SaveError> {
    writer.write_u32::<BigEndian>(id.index() as u32)?;
    writer.write_f32::<BigEndian>(agent.pos.0)?;
    writer.write_f32::<BigEndian>(agent.pos.1)?;
    writer.write_u8(state_to_u8(agent.state))?;
    let (tx, ty) = agent.target.unwrap_or((-1, -1));
    writer.write_i32::<BigEndian>(tx)?;
    writer.write_i32::<BigEndian>(ty)?;
    Ok(())
}

/// Loaded agents are reinserted into a fresh arena in save order; saved
/// `reserved_by` indices are remapped through `index_map` once every agent has
/// a new id, since reservations are written before the agent section.
pub struct Loaded {
    pub world: World,
    pub agents: Arena<Colonist>,
}

/// Reads a world previously written by [`save`]. `costs` is supplied by the
/// caller's `GameConfig` rather than persisted, since build costs are a
/// tunable, not per-save state.
pub fn load<R: Read>(reader: &mut R, costs: TileCosts) -> Result<Loaded, SaveError> {
    let magic = reader.read_u32::<BigEndian>()?;
    if magic != MAGIC {
        return Err(SaveError::Corrupt);
    }
    let version = reader.read_u32::<BigEndian>()?;
    if version != VERSION {
        return Err(SaveError::Corrupt);
    }

    let width = reader.read_u32::<BigEndian>()? as i32;
    let height = reader.read_u32::<BigEndian>()? as i32;
    if width <= 0 || height <= 0 {
        return Err(SaveError::Corrupt);
    }
    let seed = reader.read_u64::<BigEndian>()?;
    let wood = reader.read_i32::<BigEndian>()?;
    let food = reader.read_f32::<BigEndian>()?;

    let mut world = World::new(width, height, seed, Inventory { wood, food }, costs);

    let cell_count = (width as usize) * (height as usize);
    // Saved `reserved_by` values are old-arena indices; agents haven't been
    // reinserted yet, so stash them and patch in a second pass below.
    let mut raw_reservations = Vec::with_capacity(cell_count);
    for i in 0..cell_count {
        let x = (i % width as usize) as i32;
        let y = (i / width as usize) as i32;
        let (built, planned, priority, work_remaining, reserved_raw) = read_cell(reader)?;
        raw_reservations.push(reserved_raw);
        let cell = world.cell_mut(x, y).expect("index within bounds");
        cell.built = built;
        cell.planned = planned;
        cell.plan_priority = priority;
        cell.work_remaining = work_remaining;
    }

    let agent_count = reader.read_u32::<BigEndian>()?;
    let mut agents: Arena<Colonist> = Arena::new();
    let mut index_map = std::collections::HashMap::new();
    for _ in 0..agent_count {
        let (old_index, pos, state, target) = read_agent(reader)?;
        let mut colonist = Colonist::new(pos);
        colonist.state = state;
        colonist.target = target;
        let new_id = agents.insert(colonist);
        index_map.insert(old_index, new_id);
    }

    for (i, raw) in raw_reservations.into_iter().enumerate() {
        if raw < 0 {
            continue;
        }
        let x = (i % width as usize) as i32;
        let y = (i / width as usize) as i32;
        if let Some(&id) = index_map.get(&(raw as u32)) {
            world.cell_mut(x, y).expect("index within bounds").reserved_by = Some(id);
        }
    }

    Ok(Loaded { world, agents })
}

fn read_cell<R: Read>(reader: &mut R) -> Result<(TileType, TileType, u8, f32, i32), SaveError> {
    let built = tile_from_u8(reader.read_u8()?)?;
    let planned = tile_from_u8(reader.read_u8()?)?;
    let priority = reader.read_u8()?;
    let work_remaining = reader.read_f32::<BigEndian>()?;
    let reserved_raw = reader.read_i32::<BigEndian>()?;
    Ok((built, planned, priority, work_remaining, reserved_raw))
}

fn read_agent<R: Read>(reader: &mut R) -> Result<(u32, (f32, f32), AgentState, Option<(i32, i32)>), SaveError> {
    let old_index = reader.read_u32::<BigEndian>()?;
    let x = reader.read_f32::<BigEndian>()?;
    let y = reader.read_f32::<BigEndian>()?;
    let state = state_from_u8(reader.read_u8()?)?;
    let tx = reader.read_i32::<BigEndian>()?;
    let ty = reader.read_i32::<BigEndian>()?;
    let target = if tx < 0 || ty < 0 { None } else { Some((tx, ty)) };
    Ok((old_index, (x, y), state, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::TileType;

    #[test]
    fn roundtrip_empty_world() {
        let world = World::new(4, 4, 7, Inventory { wood: 10, food: 1.5 }, TileCosts::default());
        let agents: Arena<Colonist> = Arena::new();

        let mut buf = Vec::new();
        save(&mut buf, &world, &agents).unwrap();
        let loaded = load(&mut &buf[..], TileCosts::default()).unwrap();

        assert_eq!(loaded.world.width(), 4);
        assert_eq!(loaded.world.height(), 4);
        assert_eq!(loaded.world.seed, 7);
        assert_eq!(loaded.world.inventory.wood, 10);
        assert_eq!(loaded.world.inventory.food, 1.5);
        assert_eq!(loaded.agents.len(), 0);
    }

    #[test]
    fn roundtrip_preserves_plans_and_reservation() {
        let mut world = World::new(3, 3, 1, Inventory { wood: 20, food: 0.0 }, TileCosts::default());
        world.place_plan(1, 1, TileType::Wall, 2).unwrap();
        let mut agents: Arena<Colonist> = Arena::new();
        let id = agents.insert(Colonist::new((1.0, 1.0)));
        world.cell_mut(1, 1).unwrap().reserved_by = Some(id);
        agents.get_mut(id).unwrap().target = Some((1, 1));
        agents.get_mut(id).unwrap().state = AgentState::Working;

        let mut buf = Vec::new();
        save(&mut buf, &world, &agents).unwrap();
        let loaded = load(&mut &buf[..], TileCosts::default()).unwrap();

        let cell = loaded.world.cell(1, 1).unwrap();
        assert_eq!(cell.planned, TileType::Wall);
        assert_eq!(cell.plan_priority, 2);
        assert_eq!(loaded.agents.len(), 1);
        let (new_id, agent) = loaded.agents.iter().next().unwrap();
        assert_eq!(agent.state, AgentState::Working);
        assert_eq!(agent.target, Some((1, 1)));
        assert_eq!(cell.reserved_by, Some(new_id));
    }

    #[test]
    fn bad_magic_is_rejected_as_corrupt() {
        let world = World::new(2, 2, 1, Inventory::default(), TileCosts::default());
        let agents: Arena<Colonist> = Arena::new();
        let mut buf = Vec::new();
        save(&mut buf, &world, &agents).unwrap();
        buf[0] = 0xff;

        let err = load(&mut &buf[..], TileCosts::default()).unwrap_err();
        assert_eq!(err, SaveError::Corrupt);
    }

    #[test]
    fn bad_version_is_rejected_as_corrupt() {
        let world = World::new(2, 2, 1, Inventory::default(), TileCosts::default());
        let agents: Arena<Colonist> = Arena::new();
        let mut buf = Vec::new();
        save(&mut buf, &world, &agents).unwrap();
        // Version is the second u32 field, right after magic.
        buf[4..8].copy_from_slice(&99u32.to_be_bytes());

        let err = load(&mut &buf[..], TileCosts::default()).unwrap_err();
        assert_eq!(err, SaveError::Corrupt);
    }
}
