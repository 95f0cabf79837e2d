pub use super::name::WadName;
use serde::Deserialize;

pub type LightLevel = i16;
pub type LinedefFlags = u16;
pub type SectorId = u16;
pub type SectorTag = u16;
pub type SectorType = u16;
pub type SidedefId = i16;
pub type SpecialType = u16;
pub type ThingFlags = u16;
pub type ThingType = u16;
pub type VertexId = u16;
pub type WadCoord = i16;
pub type SegId = u16;
pub type LinedefId = u16;
pub type ChildId = u16;

/// Sidedef index meaning "no sidedef".
pub const NO_SIDEDEF: SidedefId = -1;

pub const THING_SKILL_EASY: ThingFlags = 0x0001;
pub const THING_SKILL_MEDIUM: ThingFlags = 0x0002;
pub const THING_SKILL_HARD: ThingFlags = 0x0004;
pub const THING_MULTIPLAYER: ThingFlags = 0x0010;

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadThing {
    pub x: WadCoord,
    pub y: WadCoord,
    pub angle: WadCoord,
    pub thing_type: ThingType,
    pub flags: ThingFlags,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct WadVertex {
    pub x: WadCoord,
    pub y: WadCoord,
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadLinedef {
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
    pub flags: LinedefFlags,
    pub special_type: SpecialType,
    pub sector_tag: SectorTag,
    pub right_side: SidedefId,
    pub left_side: SidedefId,
}

impl WadLinedef {
    pub fn is_two_sided(&self) -> bool {
        self.flags & 0x0004 != 0
    }

    pub fn upper_unpegged(&self) -> bool {
        self.flags & 0x0008 != 0
    }

    pub fn lower_unpegged(&self) -> bool {
        self.flags & 0x0010 != 0
    }
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadSidedef {
    pub x_offset: WadCoord,
    pub y_offset: WadCoord,
    pub upper_texture: WadName,
    pub lower_texture: WadName,
    pub middle_texture: WadName,
    pub sector: SectorId,
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadSector {
    pub floor_height: WadCoord,
    pub ceiling_height: WadCoord,
    pub floor_texture: WadName,
    pub ceiling_texture: WadName,
    pub light: LightLevel,
    pub sector_type: SectorType,
    pub tag: SectorTag,
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadSubsector {
    pub num_segs: u16,
    pub first_seg: SegId,
}

#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadSeg {
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
    pub angle: u16,
    pub linedef: LinedefId,
    pub direction: u16,
    pub offset: u16,
}

/// A BSP node. The partition runs from `(line_x, line_y)` along `(step_x, step_y)`; `right` is
/// the child in front of it and `left` the one behind. Children with the high bit set are
/// subsectors, see `util::parse_child_id`.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct WadNode {
    pub line_x: WadCoord,
    pub line_y: WadCoord,
    pub step_x: WadCoord,
    pub step_y: WadCoord,
    pub right_y_max: WadCoord,
    pub right_y_min: WadCoord,
    pub right_x_min: WadCoord,
    pub right_x_max: WadCoord,
    pub left_y_max: WadCoord,
    pub left_y_min: WadCoord,
    pub left_x_min: WadCoord,
    pub left_x_max: WadCoord,
    pub right: ChildId,
    pub left: ChildId,
}
