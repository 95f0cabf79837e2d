use super::types::{ChildId, WadCoord, WadName, WadVertex};
use math::{Pnt2d, Pnt2f};

/// High bit of a node child id, set when the child is a subsector.
pub const CHILD_IS_SUBSECTOR: ChildId = 0x8000;

/// `-` marks a wall section with no texture; an empty name is treated the same.
pub fn is_untextured(name: &WadName) -> bool {
    let name = name.trimmed();
    name.is_empty() || name == b"-"
}

pub fn is_sky_flat(name: &WadName) -> bool {
    name == b"F_SKY1\0\0"
}

pub fn from_wad_height(x: WadCoord) -> f32 {
    f32::from(x) / 100.0
}

/// Map-space point to the renderer's horizontal world plane.
pub fn from_map_point(point: Pnt2d) -> Pnt2f {
    Pnt2f::new(-(point.y / 100.0) as f32, -(point.x / 100.0) as f32)
}

pub fn to_map_point(vertex: WadVertex) -> Pnt2d {
    Pnt2d::new(f64::from(vertex.x), f64::from(vertex.y))
}

pub fn parse_child_id(id: ChildId) -> (usize, bool) {
    ((id & !CHILD_IS_SUBSECTOR) as usize, id & CHILD_IS_SUBSECTOR != 0)
}
