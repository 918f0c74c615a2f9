//! # Block Module
//!
//! Block identifiers, their static catalog metadata, and the six block faces.

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Packed `0xRRGGBB` colour.
pub type Rgb = u32;

/// Immutable metadata for one block or item type.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Human readable label for the HUD.
    pub label: &'static str,
    /// Base face colour.
    pub color: Rgb,
    /// Secondary colour used for texture noise.
    pub alt_color: Rgb,
    /// Whether faces behind this block stay visible.
    pub transparent: bool,
    /// Light colour emitted by the block, if any.
    pub emissive: Option<Rgb>,
    /// Consumables and tools; placing one is a no-op.
    pub non_placeable: bool,
}

impl BlockInfo {
    const fn solid(label: &'static str, color: Rgb, alt_color: Rgb) -> Self {
        BlockInfo {
            label,
            color,
            alt_color,
            transparent: false,
            emissive: None,
            non_placeable: false,
        }
    }

    const fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }

    const fn emissive(mut self, light: Rgb) -> Self {
        self.emissive = Some(light);
        self
    }

    const fn item(mut self) -> Self {
        self.non_placeable = true;
        self
    }
}

/// The block catalog, indexed by `BlockType as usize`.
pub static BLOCK_CATALOG: [BlockInfo; BlockType::COUNT] = [
    BlockInfo::solid("Grass", 0x5d9948, 0x4d7c0f),
    BlockInfo::solid("Dirt", 0x866043, 0x78350f),
    BlockInfo::solid("Stone", 0x888888, 0x777777),
    BlockInfo::solid("Cobblestone", 0x777777, 0x555555),
    BlockInfo::solid("Log", 0x664d33, 0x451a03),
    BlockInfo::solid("Wood Planks", 0xa07e4d, 0x92400e),
    BlockInfo::solid("Leaves", 0x3d6e1f, 0x2d4d12).transparent(),
    BlockInfo::solid("Glass", 0xe0f2fe, 0xbae6fd).transparent(),
    BlockInfo::solid("Sand", 0xe3d081, 0xd1b464),
    BlockInfo::solid("Bedrock", 0x222222, 0x111111),
    BlockInfo::solid("Coal Ore", 0x333333, 0x888888),
    BlockInfo::solid("Iron Ore", 0xd1b4a1, 0x888888),
    BlockInfo::solid("Gold Ore", 0xfacc15, 0x888888),
    BlockInfo::solid("Diamond Ore", 0x22d3ee, 0x888888),
    BlockInfo::solid("Emerald Ore", 0x10b981, 0x888888),
    BlockInfo::solid("Obsidian", 0x1e1b4b, 0x000000),
    BlockInfo::solid("Netherrack", 0x7f1d1d, 0x450a0a),
    BlockInfo::solid("Soul Sand", 0x451a03, 0x2a1202),
    BlockInfo::solid("Glowstone", 0xfef08a, 0xeab308).emissive(0xfef08a),
    BlockInfo::solid("Magma Block", 0xf97316, 0xea580c).emissive(0xf97316),
    BlockInfo::solid("End Stone", 0xfef9c3, 0xeab308),
    BlockInfo::solid("Purpur", 0xd8b4fe, 0xa855f7),
    BlockInfo::solid("Nether Portal", 0x7e22ce, 0x4c1d95)
        .transparent()
        .emissive(0x7e22ce),
    BlockInfo::solid("End Portal", 0x000000, 0x1e1b4b)
        .transparent()
        .emissive(0x1e1b4b),
    BlockInfo::solid("Apple", 0xef4444, 0xdc2626).item(),
    BlockInfo::solid("Raw Beef", 0xfca5a5, 0xef4444).item(),
    BlockInfo::solid("Cooked Beef", 0x7c2d12, 0x451a03).item(),
    BlockInfo::solid("Iron Sword", 0xd1d5db, 0x9ca3af).item(),
    BlockInfo::solid("Diamond Pickaxe", 0x22d3ee, 0x0891b2).item(),
];

impl BlockType {
    /// Catalog entry for this type.
    pub fn info(self) -> &'static BlockInfo {
        &BLOCK_CATALOG[self as usize]
    }

    pub fn is_transparent(self) -> bool {
        self.info().transparent
    }

    pub fn is_placeable(self) -> bool {
        !self.info().non_placeable
    }

    pub fn emissive(self) -> Option<Rgb> {
        self.info().emissive
    }
}
