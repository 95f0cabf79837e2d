use super::bsp::BspIndex;
use super::config::BuildConfig;
use super::errors::{Diagnostic, Result};
use super::flats::{sector_edges, sector_flats, triangulate_sector, SectorFlats};
use cgmath::Deg;
use log::{info, warn};
use math::{Line2d, Pnt2d, Pnt3f};
use vec_map::VecMap;
use wad::types::{ThingFlags, ThingType, WadVertex};
use wad::types::{THING_MULTIPLAYER, THING_SKILL_EASY, THING_SKILL_HARD, THING_SKILL_MEDIUM};
use wad::util::{from_map_point, from_wad_height, to_map_point};
use wad::Level;

// Distance, in map units, a point may sit on the wrong side of a subsector's seg and still count
// as inside it.
const SEG_TOLERANCE: f64 = 1.0;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub sectors: usize,
    pub regions: usize,
    pub dropped_regions: usize,
    pub triangles: usize,
}

#[derive(Clone, Debug)]
struct SubsectorInfo {
    sector: Option<usize>,
    walls: Vec<Line2d>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlacedThing {
    pub thing: usize,
    pub thing_type: ThingType,
    pub sector: usize,
    pub pos: Pnt3f,
    pub yaw: Deg<f32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placement {
    pub placed: Vec<PlacedThing>,
    /// Indices of things not inside any sector.
    pub unplaced: Vec<usize>,
    /// Indices of things rejected by the `ThingFilter`.
    pub filtered: Vec<usize>,
}

/// Picks things by their flags: a thing is kept when it has any of the `include` bits and none of
/// the `exclude` ones. The default keeps every single player thing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ThingFilter {
    pub include: ThingFlags,
    pub exclude: ThingFlags,
}

impl ThingFilter {
    /// Single player things of a skill level from 1 to 5.
    pub fn skill(skill: u8) -> Self {
        let include = match skill {
            0..=2 => THING_SKILL_EASY,
            3 => THING_SKILL_MEDIUM,
            _ => THING_SKILL_HARD,
        };
        ThingFilter {
            include,
            exclude: THING_MULTIPLAYER,
        }
    }

    pub fn accepts(&self, flags: ThingFlags) -> bool {
        flags & self.include != 0 && flags & self.exclude == 0
    }
}

impl Default for ThingFilter {
    fn default() -> Self {
        ThingFilter {
            include: THING_SKILL_EASY | THING_SKILL_MEDIUM | THING_SKILL_HARD,
            exclude: THING_MULTIPLAYER,
        }
    }
}

/// Everything derived from a level's tables: the BSP index and the floor and ceiling meshes.
/// Built once per level and never modified; loading another level builds a new one.
#[derive(Clone, Debug)]
pub struct LevelGeometry {
    bsp: BspIndex,
    subsectors: Vec<SubsectorInfo>,
    floor_heights: Vec<f32>,
    flats: VecMap<SectorFlats>,
    diagnostics: Vec<Diagnostic>,
    stats: BuildStats,
}

impl LevelGeometry {
    pub fn build(level: &Level, config: &BuildConfig) -> Result<LevelGeometry> {
        info!("Building level geometry...");
        level.validate()?;
        let bsp = BspIndex::build(&level.nodes, &level.subsectors)?;

        let subsectors = (0..level.subsectors.len())
            .map(|index| SubsectorInfo {
                sector: level.ssector_sector_id(index).map(usize::from),
                walls: level
                    .ssector(index)
                    .and_then(|subsector| level.ssector_segs(subsector))
                    .unwrap_or(&[])
                    .iter()
                    .filter_map(|seg| level.seg_vertices(seg))
                    .map(|(start, end)| Line2d::from_two_points(start, end))
                    .collect(),
            })
            .collect::<Vec<_>>();

        let mut edges = sector_edges(level);
        let mut flats = VecMap::with_capacity(level.sectors.len());
        let mut diagnostics = Vec::new();
        let mut stats = BuildStats::default();
        for (sector_id, sector) in level.sectors.iter().enumerate() {
            let boundary = edges.remove(sector_id).unwrap_or_else(Vec::new);
            if boundary.is_empty() {
                warn!("Sector {} has no boundary edges.", sector_id);
            }
            let triangles = triangulate_sector(&boundary)?;
            for kind in triangles.problems {
                warn!("Sector {}: {}", sector_id, kind);
                diagnostics.push(Diagnostic {
                    sector: sector_id,
                    kind,
                });
            }
            stats.sectors += 1;
            stats.regions += triangles.regions;
            stats.dropped_regions += triangles.dropped_regions;
            stats.triangles += triangles.triangles.len();
            flats.insert(
                sector_id,
                sector_flats(sector_id, sector, &triangles.triangles, config),
            );
        }

        info!("Level geometry built:");
        info!("    {:5} sectors", stats.sectors);
        info!("    {:5} regions", stats.regions);
        info!("    {:5} triangles", stats.triangles);
        info!("    {:5} dropped regions", stats.dropped_regions);
        info!("    {:5} diagnostics", diagnostics.len());

        Ok(LevelGeometry {
            bsp,
            subsectors,
            floor_heights: level
                .sectors
                .iter()
                .map(|sector| from_wad_height(sector.floor_height))
                .collect(),
            flats,
            diagnostics,
            stats,
        })
    }

    /// Replaces `self` with the geometry of `level`. On failure `self` is left untouched.
    pub fn rebuild(&mut self, level: &Level, config: &BuildConfig) -> Result<()> {
        *self = Self::build(level, config)?;
        Ok(())
    }

    pub fn bsp(&self) -> &BspIndex {
        &self.bsp
    }

    pub fn flats(&self, sector: usize) -> Option<&SectorFlats> {
        self.flats.get(sector)
    }

    pub fn all_flats<'a>(&'a self) -> impl Iterator<Item = &'a SectorFlats> + 'a {
        self.flats.values()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn subsector_sector(&self, subsector: usize) -> Option<usize> {
        self.subsectors.get(subsector).and_then(|info| info.sector)
    }

    /// The sector containing `point`, or `None` if the point is outside the map.
    pub fn sector_at(&self, point: Pnt2d) -> Result<Option<usize>> {
        let subsector = self.bsp.locate(point)?;
        Ok(self.subsectors.get(subsector).and_then(|info| {
            if info
                .walls
                .iter()
                .all(|wall| wall.signed_distance(point) <= SEG_TOLERANCE)
            {
                info.sector
            } else {
                None
            }
        }))
    }

    /// World-space floor height under `point`.
    pub fn floor_height_at(&self, point: Pnt2d) -> Result<Option<f32>> {
        Ok(self
            .sector_at(point)?
            .and_then(|sector| self.floor_heights.get(sector).cloned()))
    }

    /// Puts every thing of `level` which passes `filter` on the floor of the sector it stands in,
    /// in world space.
    pub fn place_things(&self, level: &Level, filter: ThingFilter) -> Result<Placement> {
        let mut placement = Placement::default();
        for (index, thing) in level.things.iter().enumerate() {
            if !filter.accepts(thing.flags) {
                placement.filtered.push(index);
                continue;
            }
            let point = to_map_point(WadVertex {
                x: thing.x,
                y: thing.y,
            });
            let sector = match self.sector_at(point)? {
                Some(sector) => sector,
                None => {
                    warn!("Thing {} at {:?} is outside the map.", index, point);
                    placement.unplaced.push(index);
                    continue;
                }
            };
            let xz = from_map_point(point);
            let height = self.floor_heights.get(sector).cloned().unwrap_or(0.0);
            placement.placed.push(PlacedThing {
                thing: index,
                thing_type: thing.thing_type,
                sector,
                pos: Pnt3f::new(xz[0], height, xz[1]),
                yaw: Deg(f32::round(f32::from(thing.angle) / 45.0) * 45.0),
            });
        }
        info!(
            "Placed {} things, {} outside the map, {} filtered out.",
            placement.placed.len(),
            placement.unplaced.len(),
            placement.filtered.len()
        );
        Ok(placement)
    }
}
