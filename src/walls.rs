use super::vertex::StaticVertex;
use log::{debug, warn};
use math::prelude::*;
use math::{Pnt2d, Vec2f};
use std::cmp;
use wad::types::{WadCoord, WadName, WadSeg, WadSidedef};
use wad::util::{from_map_point, from_wad_height, is_sky_flat, is_untextured};
use wad::Level;

/// Size in pixels of the wall textures a level refers to.
pub trait TextureSizes {
    fn texture_size(&self, name: &WadName) -> Option<Vec2f>;
}

impl<F> TextureSizes for F
where
    F: Fn(&WadName) -> Option<Vec2f>,
{
    fn texture_size(&self, name: &WadName) -> Option<Vec2f> {
        self(name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WallSection {
    Middle,
    Lower,
    Upper,
}

/// Order in which a `WallQuad`'s vertices form its two triangles.
pub const QUAD_INDICES: [usize; 6] = [0, 1, 2, 2, 3, 0];

/// One textured section of a seg's wall. The vertices are bottom-start, bottom-end, top-end and
/// top-start along the seg.
#[derive(Clone, Debug, PartialEq)]
pub struct WallQuad {
    pub seg: usize,
    pub sector: usize,
    pub section: WallSection,
    pub texture: WadName,
    pub vertices: [StaticVertex; 4],
}

impl WallQuad {
    pub fn triangle_vertices<'a>(&'a self) -> impl Iterator<Item = StaticVertex> + 'a {
        QUAD_INDICES.iter().map(move |&index| self.vertices[index])
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Peg {
    Top,
    Bottom,
    // Lower sections hang from the higher of the two ceilings.
    BottomLower { ceiling: WadCoord },
}

struct SegWall<'a> {
    index: usize,
    seg: &'a WadSeg,
    side: &'a WadSidedef,
    vertices: (Pnt2d, Pnt2d),
}

/// Wall quads of every seg in `level`. Each seg gets a middle section between its floor and
/// ceiling; on two-sided lines this shrinks to the opening, with a lower section below it where
/// the floor behind is higher and an upper one above it where the ceiling behind is lower.
/// Lower and upper sections between two sky flats are left open, as are untextured sections.
pub fn wall_quads<T: TextureSizes>(level: &Level, textures: &T) -> Vec<WallQuad> {
    let mut quads = Vec::with_capacity(level.segs.len());
    for (index, seg) in level.segs.iter().enumerate() {
        seg_quads(level, textures, index, seg, &mut quads);
    }
    debug!(
        "Built {} wall quads for {} segs.",
        quads.len(),
        level.segs.len()
    );
    quads
}

fn seg_quads<T: TextureSizes>(
    level: &Level,
    textures: &T,
    index: usize,
    seg: &WadSeg,
    quads: &mut Vec<WallQuad>,
) {
    let line = if let Some(line) = level.seg_linedef(seg) {
        line
    } else {
        warn!("No linedef found for seg {}, skipping seg.", index);
        return;
    };
    let side = if let Some(side) = level.seg_sidedef(seg) {
        side
    } else {
        warn!("No sidedef found for seg {}, skipping seg.", index);
        return;
    };
    let (sector, vertices) = match (level.sidedef_sector(side), level.seg_vertices(seg)) {
        (Some(sector), Some(vertices)) => (sector, vertices),
        _ => {
            warn!("Seg {} has no sector or vertices, skipping seg.", index);
            return;
        }
    };
    let wall = SegWall {
        index,
        seg,
        side,
        vertices,
    };

    let (floor, ceiling) = (sector.floor_height, sector.ceiling_height);
    let unpeg_lower = line.lower_unpegged();
    let middle_peg = if unpeg_lower { Peg::Bottom } else { Peg::Top };
    let back_sector = if line.is_two_sided() {
        let back_sector = level.seg_back_sector(seg);
        if back_sector.is_none() {
            warn!("Two-sided linedef {} has no back sector.", seg.linedef);
        }
        back_sector
    } else {
        None
    };
    let back_sector = match back_sector {
        None => {
            quads.extend(wall.quad(
                textures,
                WallSection::Middle,
                side.middle_texture,
                (floor, ceiling),
                middle_peg,
            ));
            return;
        }
        Some(back_sector) => back_sector,
    };

    let (back_floor, back_ceiling) = (back_sector.floor_height, back_sector.ceiling_height);
    quads.extend(wall.quad(
        textures,
        WallSection::Middle,
        side.middle_texture,
        (cmp::max(floor, back_floor), cmp::min(ceiling, back_ceiling)),
        middle_peg,
    ));
    if floor < back_floor
        && !(is_sky_flat(&sector.floor_texture) && is_sky_flat(&back_sector.floor_texture))
    {
        quads.extend(wall.quad(
            textures,
            WallSection::Lower,
            side.lower_texture,
            (floor, back_floor),
            if unpeg_lower {
                Peg::BottomLower {
                    ceiling: cmp::max(ceiling, back_ceiling),
                }
            } else {
                Peg::Top
            },
        ));
    }
    if ceiling > back_ceiling
        && !(is_sky_flat(&sector.ceiling_texture) && is_sky_flat(&back_sector.ceiling_texture))
    {
        quads.extend(wall.quad(
            textures,
            WallSection::Upper,
            side.upper_texture,
            (back_ceiling, ceiling),
            if line.upper_unpegged() {
                Peg::Top
            } else {
                Peg::Bottom
            },
        ));
    }
}

impl<'a> SegWall<'a> {
    fn quad<T: TextureSizes>(
        &self,
        textures: &T,
        section: WallSection,
        texture: WadName,
        (low, high): (WadCoord, WadCoord),
        peg: Peg,
    ) -> Option<WallQuad> {
        if low >= high || is_untextured(&texture) {
            return None;
        }
        let size = match textures.texture_size(&texture) {
            Some(size) if size.x > 0.0 && size.y > 0.0 => size,
            _ => {
                warn!(
                    "No such wall texture '{}', skipping {:?} section of seg {}.",
                    texture, section, self.index
                );
                return None;
            }
        };

        let (start, end) = self.vertices;
        let height = f32::from(high) - f32::from(low);
        let s1 = (f32::from(self.seg.offset) + f32::from(self.side.x_offset)) / size.x;
        let s2 = s1 + (end - start).magnitude() as f32 / size.x;
        let shift = match peg {
            Peg::Top => 0.0,
            Peg::Bottom => -height,
            Peg::BottomLower { ceiling } => f32::from(ceiling) - f32::from(high),
        };
        let t1 = (f32::from(self.side.y_offset) + shift) / size.y;
        let t2 = t1 + height / size.y;

        let (low, high) = (from_wad_height(low), from_wad_height(high));
        let vertex = |point: Pnt2d, height: f32, a_tile_uv: [f32; 2]| {
            let xz = from_map_point(point);
            StaticVertex {
                a_pos: [xz[0], height, xz[1]],
                a_tile_uv,
            }
        };
        Some(WallQuad {
            seg: self.index,
            sector: usize::from(self.side.sector),
            section,
            texture,
            vertices: [
                vertex(start, low, [s1, t2]),
                vertex(end, low, [s2, t2]),
                vertex(end, high, [s2, t1]),
                vertex(start, high, [s1, t1]),
            ],
        })
    }
}
