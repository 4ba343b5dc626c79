// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Binary world snapshots.
//!
//! Layout (stable contract, byte-deterministic for equal in-memory state
//! given identical insertion order):
//! - Header: 8-byte magic, 4-byte version, 4-byte flags (reserved, always
//!   zero), 8-byte content hash placeholder (always written zero; the real
//!   hash lives in the trailer).
//! - Entity table: count, then `(index, generation)` pairs sorted by index.
//! - Archetype table: count, then per archetype: id, signature bit-count,
//!   signature bits (little-endian `u64` words), ordered component type ids,
//!   entity-id list (in chunk/row order).
//! - Per-column data: for each (archetype, component type), length-prefixed
//!   contiguous raw bytes of all live rows.
//! - Trailer: content hash recomputed over everything between the header's
//!   hash field and the trailer.
//!
//! This is a byte-level format, not a structured one: restoring a snapshot
//! assumes every component type it references has already been registered
//! in this process (via [`crate::component::ComponentTypeRegistry`]), the
//! same way the teacher's own save format assumed its asset types were
//! already known to the loader.

use std::hash::{Hash, Hasher};

use crate::archetype::ArchetypeCreator;
use crate::component::{ComponentTypeId, ComponentTypeRegistry};
use crate::config::EcsConfig;
use crate::entity::{EntityId, EntityLocation};
use crate::error::{EcsError, Result};
use crate::signature::ArchetypeSignature;
use crate::world::World;

const MAGIC: &[u8; 8] = b"ECSSNAP1";
const VERSION: u32 = 1;
const HEADER_LEN: usize = MAGIC.len() + 4 + 4 + 8;

fn checksum(bytes: &[u8]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.bytes.len() {
            return Err(EcsError::SnapshotCorrupt("truncated payload".to_string()));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.read_bytes(8)?;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }
}

/// Serialize every live entity in `world` to bytes.
pub fn save(world: &World) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    // Header.
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags, reserved
    buf.extend_from_slice(&0u64.to_le_bytes()); // content hash placeholder

    // Entity table: every live entity, sorted by index.
    let live: Vec<EntityId> = world.entities().read().iter_live().collect();
    buf.extend_from_slice(&(live.len() as u32).to_le_bytes());
    for entity in &live {
        buf.extend_from_slice(&entity.index().to_le_bytes());
        buf.extend_from_slice(&entity.generation().to_le_bytes());
    }

    // Archetype table.
    let archetypes = world.index().all_sorted();
    buf.extend_from_slice(&(archetypes.len() as u32).to_le_bytes());

    for archetype in &archetypes {
        buf.extend_from_slice(&archetype.id().to_le_bytes());

        let signature = archetype.signature();
        buf.extend_from_slice(&(signature.bit_count() as u32).to_le_bytes());
        for word in signature.words() {
            buf.extend_from_slice(&word.to_le_bytes());
        }

        let component_order = archetype.component_order();
        buf.extend_from_slice(&(component_order.len() as u32).to_le_bytes());
        for component_id in component_order {
            buf.extend_from_slice(&component_id.as_u32().to_le_bytes());
        }

        let entity_count = archetype.entity_count();
        buf.extend_from_slice(&(entity_count as u32).to_le_bytes());
        for chunk_index in 0..archetype.chunk_count() {
            for row in 0..archetype.chunk_row_count(chunk_index) {
                buf.extend_from_slice(&archetype.get_entity(chunk_index, row).to_bits().to_le_bytes());
            }
        }
    }

    // Per-column data, length prefixed, same archetype/column order as above.
    for archetype in &archetypes {
        let component_order = archetype.component_order();
        for col in 0..component_order.len() {
            let mut column_bytes = Vec::new();
            archetype.for_each_chunk(|chunk| {
                column_bytes.extend_from_slice(chunk.column(col).live_bytes());
            });
            buf.extend_from_slice(&(column_bytes.len() as u32).to_le_bytes());
            buf.extend_from_slice(&column_bytes);
        }
    }

    let sum = checksum(&buf[HEADER_LEN..]);
    buf.extend_from_slice(&sum.to_le_bytes());
    Ok(buf)
}

/// Rebuild a [`World`] from bytes produced by [`save`]. `config` governs the
/// fresh world's tunables (chunk capacity, pool sizes); it is not itself
/// part of the snapshot.
///
/// Archetype ids are reassigned during load in first-encountered order, not
/// restored verbatim — only entity ids and component data are guaranteed to
/// round-trip exactly.
pub fn load(bytes: &[u8], config: EcsConfig) -> Result<World> {
    if bytes.len() < HEADER_LEN + 8 {
        return Err(EcsError::SnapshotCorrupt("truncated header".to_string()));
    }
    let (payload, trailer) = bytes.split_at(bytes.len() - 8);
    let expected = u64::from_le_bytes(trailer.try_into().unwrap());
    if checksum(&payload[HEADER_LEN..]) != expected {
        return Err(EcsError::SnapshotCorrupt("checksum mismatch".to_string()));
    }

    let mut reader = Reader::new(payload);
    let magic = reader.read_bytes(MAGIC.len())?;
    if magic != MAGIC {
        return Err(EcsError::SnapshotCorrupt("bad magic".to_string()));
    }
    let version = reader.read_u32()?;
    if version != VERSION {
        return Err(EcsError::SnapshotCorrupt(format!("unsupported snapshot version {version}")));
    }
    let _flags = reader.read_u32()?;
    let _hash_placeholder = reader.read_u64()?;

    let world = World::new(config);

    let entity_count_total = reader.read_u32()?;
    for _ in 0..entity_count_total {
        let index = reader.read_u32()?;
        let generation = reader.read_u32()?;
        world
            .entities()
            .write()
            .restore(EntityId::from_parts(index, generation));
    }

    struct ArchetypeLoad {
        archetype_id: crate::archetype::ArchetypeId,
        ids: Vec<ComponentTypeId>,
        entities: Vec<EntityId>,
    }

    let archetype_count = reader.read_u32()?;
    let mut loads = Vec::with_capacity(archetype_count as usize);
    for _ in 0..archetype_count {
        let _saved_archetype_id = reader.read_u64()?;

        let bit_count = reader.read_u32()? as usize;
        let word_count = bit_count / 64;
        let mut words = Vec::with_capacity(word_count);
        for _ in 0..word_count {
            words.push(reader.read_u64()?);
        }
        let signature = ArchetypeSignature::from_words(&words);

        let component_count = reader.read_u32()?;
        let mut ids = Vec::with_capacity(component_count as usize);
        for _ in 0..component_count {
            ids.push(ComponentTypeId(reader.read_u32()?));
        }

        let entity_count = reader.read_u32()? as usize;
        let mut entities = Vec::with_capacity(entity_count);
        for _ in 0..entity_count {
            entities.push(EntityId::from_bits(reader.read_u64()?));
        }

        let archetype_id = world.index().get_or_create_signature(&signature);
        loads.push(ArchetypeLoad {
            archetype_id,
            ids,
            entities,
        });
    }

    for load in &loads {
        let archetype = world.index().get(load.archetype_id);
        let entity_count = load.entities.len();

        let mut columns = Vec::with_capacity(load.ids.len());
        for &id in &load.ids {
            let size = ComponentTypeRegistry::info_of(id).size;
            let len = reader.read_u32()? as usize;
            if len != size * entity_count {
                return Err(EcsError::SnapshotCorrupt(format!(
                    "column length {len} does not match expected {} ({entity_count} rows of {size} bytes)",
                    size * entity_count
                )));
            }
            columns.push(reader.read_bytes(len)?);
        }

        for (row, &entity) in load.entities.iter().enumerate() {
            let (chunk_index, row_index) = archetype.insert_entity(entity, |component_id| {
                let col = load
                    .ids
                    .iter()
                    .position(|&id| id == component_id)
                    .expect("every archetype column was written by `save`");
                let size = ComponentTypeRegistry::info_of(component_id).size;
                // SAFETY: `columns[col]` holds exactly `entity_count` rows
                // of `size` bytes each, written in the same row order as
                // `load.entities`.
                unsafe { columns[col].as_ptr().add(row * size) }
            });
            world.records().write().insert(
                entity,
                EntityLocation {
                    archetype_id: load.archetype_id,
                    chunk_index: chunk_index as u32,
                    row_index: row_index as u32,
                },
            );
        }
    }

    Ok(world)
}
