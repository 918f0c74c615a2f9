//! # Block Type Module
//!
//! This module defines every block and item identifier known to the world.
//! It provides conversion from numeric ids and from lowercase names.

use std::fmt;

use num_derive::FromPrimitive;

use super::BlockTypeSize;
use crate::engine_state::dimension::Dimension;

/// Enumerates all block and item types.
///
/// Terrain, ore, structural and portal blocks can be placed in the world. Food and
/// tools share the same identifier space because an inventory slot may hold either,
/// but the catalog marks them non-placeable.
///
/// Air is not a variant: an empty voxel is simply absent from its chunk.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
pub enum BlockType {
    GRASS,
    DIRT,
    STONE,
    COBBLESTONE,
    LOG,
    WOOD,
    LEAVES,
    GLASS,
    SAND,
    BEDROCK,
    COAL_ORE,
    IRON_ORE,
    GOLD_ORE,
    DIAMOND_ORE,
    EMERALD_ORE,
    OBSIDIAN,
    NETHERRACK,
    SOUL_SAND,
    GLOWSTONE,
    MAGMA,
    END_STONE,
    PURPUR,
    PORTAL_NETHER,
    PORTAL_END,
    APPLE,
    RAW_BEEF,
    COOKED_BEEF,
    IRON_SWORD,
    DIAMOND_PICKAXE,
}

/// Lowercase name to block type.
static BLOCK_NAMES: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "grass" => BlockType::GRASS,
    "dirt" => BlockType::DIRT,
    "stone" => BlockType::STONE,
    "cobblestone" => BlockType::COBBLESTONE,
    "log" => BlockType::LOG,
    "wood" => BlockType::WOOD,
    "leaves" => BlockType::LEAVES,
    "glass" => BlockType::GLASS,
    "sand" => BlockType::SAND,
    "bedrock" => BlockType::BEDROCK,
    "coal_ore" => BlockType::COAL_ORE,
    "iron_ore" => BlockType::IRON_ORE,
    "gold_ore" => BlockType::GOLD_ORE,
    "diamond_ore" => BlockType::DIAMOND_ORE,
    "emerald_ore" => BlockType::EMERALD_ORE,
    "obsidian" => BlockType::OBSIDIAN,
    "netherrack" => BlockType::NETHERRACK,
    "soul_sand" => BlockType::SOUL_SAND,
    "glowstone" => BlockType::GLOWSTONE,
    "magma" => BlockType::MAGMA,
    "end_stone" => BlockType::END_STONE,
    "purpur" => BlockType::PURPUR,
    "portal_nether" => BlockType::PORTAL_NETHER,
    "portal_end" => BlockType::PORTAL_END,
    "apple" => BlockType::APPLE,
    "raw_beef" => BlockType::RAW_BEEF,
    "cooked_beef" => BlockType::COOKED_BEEF,
    "iron_sword" => BlockType::IRON_SWORD,
    "diamond_pickaxe" => BlockType::DIAMOND_PICKAXE,
};

impl BlockType {
    /// Number of identifiers.
    pub const COUNT: usize = 29;

    /// Converts a `BlockTypeSize` to a `BlockType`, or `None` for an unknown id.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(id)
    }

    /// Compact numeric id, the inverse of `from_id`.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Looks up a block type by its lowercase name, e.g. `"soul_sand"`.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_NAMES.get(name).copied()
    }

    /// Lowercase name, the inverse of `from_name`.
    pub fn name(self) -> &'static str {
        match self {
            BlockType::GRASS => "grass",
            BlockType::DIRT => "dirt",
            BlockType::STONE => "stone",
            BlockType::COBBLESTONE => "cobblestone",
            BlockType::LOG => "log",
            BlockType::WOOD => "wood",
            BlockType::LEAVES => "leaves",
            BlockType::GLASS => "glass",
            BlockType::SAND => "sand",
            BlockType::BEDROCK => "bedrock",
            BlockType::COAL_ORE => "coal_ore",
            BlockType::IRON_ORE => "iron_ore",
            BlockType::GOLD_ORE => "gold_ore",
            BlockType::DIAMOND_ORE => "diamond_ore",
            BlockType::EMERALD_ORE => "emerald_ore",
            BlockType::OBSIDIAN => "obsidian",
            BlockType::NETHERRACK => "netherrack",
            BlockType::SOUL_SAND => "soul_sand",
            BlockType::GLOWSTONE => "glowstone",
            BlockType::MAGMA => "magma",
            BlockType::END_STONE => "end_stone",
            BlockType::PURPUR => "purpur",
            BlockType::PORTAL_NETHER => "portal_nether",
            BlockType::PORTAL_END => "portal_end",
            BlockType::APPLE => "apple",
            BlockType::RAW_BEEF => "raw_beef",
            BlockType::COOKED_BEEF => "cooked_beef",
            BlockType::IRON_SWORD => "iron_sword",
            BlockType::DIAMOND_PICKAXE => "diamond_pickaxe",
        }
    }

    /// The dimension a portal block leads to when broken.
    pub fn portal_destination(self) -> Option<Dimension> {
        match self {
            BlockType::PORTAL_NETHER => Some(Dimension::Nether),
            BlockType::PORTAL_END => Some(Dimension::End),
            _ => None,
        }
    }

    /// Iterates every block type in id order.
    pub fn all() -> impl Iterator<Item = BlockType> {
        (0..Self::COUNT as BlockTypeSize).filter_map(Self::from_id)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_round_trip() {
        let all: Vec<BlockType> = BlockType::all().collect();
        assert_eq!(all.len(), BlockType::COUNT);
        for (index, block_type) in all.iter().enumerate() {
            assert_eq!(block_type.id() as usize, index);
            assert_eq!(BlockType::from_id(block_type.id()), Some(*block_type));
        }
        assert_eq!(BlockType::from_id(BlockType::COUNT as BlockTypeSize), None);
    }

    #[test]
    fn every_block_has_a_name() {
        for block_type in BlockType::all() {
            assert_eq!(BlockType::from_name(block_type.name()), Some(block_type));
        }
        assert_eq!(BlockType::from_name("air"), None);
        assert_eq!(BlockType::SOUL_SAND.to_string(), "soul_sand");
    }

    #[test]
    fn name_table_and_name_lookup_agree() {
        assert_eq!(BLOCK_NAMES.len(), BlockType::COUNT);
        for (name, block_type) in BLOCK_NAMES.entries() {
            assert_eq!(block_type.name(), *name);
        }
    }

    #[test]
    fn only_portals_have_destinations() {
        assert_eq!(BlockType::PORTAL_NETHER.portal_destination(), Some(Dimension::Nether));
        assert_eq!(BlockType::PORTAL_END.portal_destination(), Some(Dimension::End));
        let others = BlockType::all()
            .filter(|b| b.portal_destination().is_some())
            .count();
        assert_eq!(others, 2);
    }
}
