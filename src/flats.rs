use super::config::BuildConfig;
use super::containment::classify;
use super::errors::{ErrorKind, Result};
use super::loops::{extract_loops, DirectedEdge};
use super::merge::merge_holes;
use super::triangulate::triangulate_points;
use super::vertex::StaticVertex;
use log::{debug, warn};
use math::Pnt2d;
use vec_map::VecMap;
use wad::types::{WadName, WadSector, WadSidedef};
use wad::util::{from_map_point, from_wad_height, is_sky_flat};
use wad::Level;

/// A floor or a ceiling, as a flat triangle list (three vertices per triangle).
#[derive(Clone, Debug, PartialEq)]
pub struct FlatSurface {
    pub texture: WadName,
    pub height: f32,
    pub is_sky: bool,
    pub vertices: Vec<StaticVertex>,
}

impl FlatSurface {
    pub fn num_triangles(&self) -> usize {
        self.vertices.len() / 3
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectorFlats {
    pub sector: usize,
    pub floor: FlatSurface,
    pub ceiling: FlatSurface,
}

/// Map-space triangles of one sector, with whatever went wrong along the way.
#[derive(Clone, Debug, Default)]
pub struct SectorTriangles {
    /// Counter-clockwise triangles of all regions which made it through.
    pub triangles: Vec<[Pnt2d; 3]>,
    pub regions: usize,
    pub dropped_regions: usize,
    /// Recovered failures; each cost part or all of the surface.
    pub problems: Vec<ErrorKind>,
}

/// Boundary edges of every sector, keyed by sector id. The sector on a linedef's right side
/// gets the edge from start to end, the one on its left the reverse, so every sector lies to the
/// right of its edges. Linedefs with the same sector on both sides are not boundaries.
pub fn sector_edges(level: &Level) -> VecMap<Vec<DirectedEdge>> {
    let mut edges = VecMap::<Vec<DirectedEdge>>::with_capacity(level.sectors.len());
    for (i_linedef, linedef) in level.linedefs.iter().enumerate() {
        let (start, end) = match (
            level.vertex(linedef.start_vertex),
            level.vertex(linedef.end_vertex),
        ) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                warn!("Linedef {} has a missing vertex, skipped.", i_linedef);
                continue;
            }
        };
        let sector_of = |side: Option<&WadSidedef>| {
            side.map(|side| usize::from(side.sector))
                .filter(|&sector| sector < level.sectors.len())
        };
        let right = sector_of(level.right_sidedef(linedef));
        let left = sector_of(level.left_sidedef(linedef));
        if right.is_none() {
            warn!("Linedef {} has no usable right side.", i_linedef);
        }
        if right == left {
            continue;
        }
        if let Some(right) = right {
            edges
                .entry(right)
                .or_insert_with(Vec::new)
                .push(DirectedEdge::new(start, end));
        }
        if let Some(left) = left {
            edges
                .entry(left)
                .or_insert_with(Vec::new)
                .push(DirectedEdge::new(end, start));
        }
    }
    edges
}

/// Runs the polygon pipeline over one sector's edges: loops, their nesting, hole merging and ear
/// clipping. Each region is merged and triangulated on its own, so a failure only drops that
/// region. Only a containment relation which is not a forest is fatal.
pub fn triangulate_sector(edges: &[DirectedEdge]) -> Result<SectorTriangles> {
    let extraction = extract_loops(edges);
    let mut result = SectorTriangles::default();
    if let Some(problem) = extraction.error() {
        result.problems.push(problem);
    }

    let loops = extraction.loops;
    let forest = classify(&loops)?;
    for region in forest.regions() {
        result.regions += 1;
        let triangles =
            merge_holes(&loops, &region).and_then(|merged| triangulate_points(&merged));
        match triangles {
            Ok(triangles) => result.triangles.extend(triangles),
            Err(error) => {
                if !error.kind().is_malformed_geometry() {
                    return Err(error);
                }
                result.dropped_regions += 1;
                result.problems.push(error.kind().clone());
            }
        }
    }
    debug!(
        "{} loops, {} regions ({} dropped), {} triangles.",
        loops.len(),
        result.regions,
        result.dropped_regions,
        result.triangles.len()
    );
    Ok(result)
}

/// World-space floor and ceiling of `sector` from its map-space triangles. The ceiling has every
/// triangle reversed so it faces down into the sector.
pub fn sector_flats(
    sector_id: usize,
    sector: &WadSector,
    triangles: &[[Pnt2d; 3]],
    config: &BuildConfig,
) -> SectorFlats {
    let surface = |texture: WadName, height, reversed: bool| {
        let is_sky = is_sky_flat(&texture);
        let height = from_wad_height(height);
        let mut vertices = Vec::new();
        if !is_sky || config.mesh_sky_flats {
            vertices.reserve(triangles.len() * 3);
            for triangle in triangles {
                if reversed {
                    vertices.extend(triangle.iter().rev().map(|&p| flat_vertex(p, height, config)));
                } else {
                    vertices.extend(triangle.iter().map(|&p| flat_vertex(p, height, config)));
                }
            }
        }
        FlatSurface {
            texture,
            height,
            is_sky,
            vertices,
        }
    };
    SectorFlats {
        sector: sector_id,
        floor: surface(sector.floor_texture, sector.floor_height, false),
        ceiling: surface(sector.ceiling_texture, sector.ceiling_height, true),
    }
}

fn flat_vertex(point: Pnt2d, height: f32, config: &BuildConfig) -> StaticVertex {
    let xz = from_map_point(point);
    StaticVertex {
        a_pos: [xz[0], height, xz[1]],
        a_tile_uv: [
            (point.x / f64::from(config.flat_size)) as f32,
            (point.y / f64::from(config.flat_size)) as f32,
        ],
    }
}
