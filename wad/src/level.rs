use super::errors::{Error, Result};
use super::types::{SectorId, VertexId, WadLinedef, WadNode, WadSector, WadSeg, WadSidedef};
use super::types::{WadSubsector, WadThing, WadVertex, NO_SIDEDEF};
use super::util::{parse_child_id, to_map_point};
use log::info;
use math::Pnt2d;

/// The raw tables of one level, as handed over by the loader. Nothing here is ever mutated
/// after construction; switching levels means building a new `Level`.
#[derive(Clone, Debug, Default)]
pub struct Level {
    pub things: Vec<WadThing>,
    pub linedefs: Vec<WadLinedef>,
    pub sidedefs: Vec<WadSidedef>,
    pub vertices: Vec<WadVertex>,
    pub segs: Vec<WadSeg>,
    pub subsectors: Vec<WadSubsector>,
    pub nodes: Vec<WadNode>,
    pub sectors: Vec<WadSector>,
}

impl Level {
    /// Checks every cross-table reference, so later lookups can only fail on logic errors.
    pub fn validate(&self) -> Result<()> {
        let num_vertices = self.vertices.len();
        for (i_linedef, linedef) in self.linedefs.iter().enumerate() {
            check_index("linedefs", i_linedef, "start_vertex", linedef.start_vertex, num_vertices)?;
            check_index("linedefs", i_linedef, "end_vertex", linedef.end_vertex, num_vertices)?;
            if linedef.right_side == NO_SIDEDEF {
                return Err(Error::missing_right_side(i_linedef));
            }
            let sides = [
                ("right_side", linedef.right_side),
                ("left_side", linedef.left_side),
            ];
            for &(field, side) in &sides {
                if side != NO_SIDEDEF && (side < 0 || side as usize >= self.sidedefs.len()) {
                    return Err(Error::dangling_reference(
                        "linedefs",
                        i_linedef,
                        field,
                        i64::from(side),
                        self.sidedefs.len(),
                    ));
                }
            }
        }
        for (i_sidedef, sidedef) in self.sidedefs.iter().enumerate() {
            check_index("sidedefs", i_sidedef, "sector", sidedef.sector, self.sectors.len())?;
        }
        for (i_seg, seg) in self.segs.iter().enumerate() {
            check_index("segs", i_seg, "start_vertex", seg.start_vertex, num_vertices)?;
            check_index("segs", i_seg, "end_vertex", seg.end_vertex, num_vertices)?;
            check_index("segs", i_seg, "linedef", seg.linedef, self.linedefs.len())?;
        }
        for (i_subsector, subsector) in self.subsectors.iter().enumerate() {
            let end = usize::from(subsector.first_seg) + usize::from(subsector.num_segs);
            if end > self.segs.len() {
                return Err(Error::dangling_reference(
                    "subsectors",
                    i_subsector,
                    "first_seg + num_segs",
                    end as i64,
                    self.segs.len(),
                ));
            }
        }
        for (i_node, node) in self.nodes.iter().enumerate() {
            for &(field, child) in &[("right", node.right), ("left", node.left)] {
                let (index, is_leaf) = parse_child_id(child);
                let len = if is_leaf {
                    self.subsectors.len()
                } else {
                    self.nodes.len()
                };
                if index >= len {
                    return Err(Error::dangling_reference(
                        "nodes",
                        i_node,
                        field,
                        index as i64,
                        len,
                    ));
                }
            }
        }

        info!("Validated level tables:");
        info!("    {:4} things", self.things.len());
        info!("    {:4} linedefs", self.linedefs.len());
        info!("    {:4} sidedefs", self.sidedefs.len());
        info!("    {:4} vertices", self.vertices.len());
        info!("    {:4} segs", self.segs.len());
        info!("    {:4} subsectors", self.subsectors.len());
        info!("    {:4} nodes", self.nodes.len());
        info!("    {:4} sectors", self.sectors.len());
        Ok(())
    }

    pub fn vertex(&self, id: VertexId) -> Option<Pnt2d> {
        self.vertices.get(id as usize).map(|&v| to_map_point(v))
    }

    pub fn seg_linedef(&self, seg: &WadSeg) -> Option<&WadLinedef> {
        self.linedefs.get(seg.linedef as usize)
    }

    pub fn seg_vertices(&self, seg: &WadSeg) -> Option<(Pnt2d, Pnt2d)> {
        if let (Some(v1), Some(v2)) = (self.vertex(seg.start_vertex), self.vertex(seg.end_vertex)) {
            Some((v1, v2))
        } else {
            None
        }
    }

    pub fn seg_sidedef(&self, seg: &WadSeg) -> Option<&WadSidedef> {
        self.seg_linedef(seg).and_then(|line| {
            if seg.direction == 0 {
                self.right_sidedef(line)
            } else {
                self.left_sidedef(line)
            }
        })
    }

    pub fn seg_back_sidedef(&self, seg: &WadSeg) -> Option<&WadSidedef> {
        self.seg_linedef(seg).and_then(|line| {
            if seg.direction == 0 {
                self.left_sidedef(line)
            } else {
                self.right_sidedef(line)
            }
        })
    }

    pub fn seg_sector_id(&self, seg: &WadSeg) -> Option<SectorId> {
        self.seg_sidedef(seg).map(|side| side.sector)
    }

    pub fn seg_sector(&self, seg: &WadSeg) -> Option<&WadSector> {
        self.seg_sidedef(seg)
            .and_then(|side| self.sidedef_sector(side))
    }

    pub fn seg_back_sector(&self, seg: &WadSeg) -> Option<&WadSector> {
        self.seg_back_sidedef(seg)
            .and_then(|side| self.sidedef_sector(side))
    }

    pub fn sidedef_sector(&self, sidedef: &WadSidedef) -> Option<&WadSector> {
        self.sector(sidedef.sector)
    }

    pub fn left_sidedef(&self, linedef: &WadLinedef) -> Option<&WadSidedef> {
        match linedef.left_side {
            NO_SIDEDEF => None,
            index => self.sidedefs.get(index as usize),
        }
    }

    pub fn right_sidedef(&self, linedef: &WadLinedef) -> Option<&WadSidedef> {
        match linedef.right_side {
            NO_SIDEDEF => None,
            index => self.sidedefs.get(index as usize),
        }
    }

    pub fn sector(&self, id: SectorId) -> Option<&WadSector> {
        self.sectors.get(id as usize)
    }

    pub fn ssector(&self, index: usize) -> Option<WadSubsector> {
        self.subsectors.get(index).cloned()
    }

    pub fn ssector_segs(&self, ssector: WadSubsector) -> Option<&[WadSeg]> {
        let start = ssector.first_seg as usize;
        let end = start + ssector.num_segs as usize;
        self.segs.get(start..end)
    }

    /// The sector a subsector belongs to, taken from its first seg.
    pub fn ssector_sector_id(&self, index: usize) -> Option<SectorId> {
        self.ssector(index)
            .and_then(|ssector| self.ssector_segs(ssector))
            .and_then(|segs| segs.first())
            .and_then(|seg| self.seg_sector_id(seg))
    }
}

fn check_index<IndexT: Into<i64> + Copy>(
    table: &'static str,
    index: usize,
    field: &'static str,
    value: IndexT,
    target_len: usize,
) -> Result<()> {
    let value = value.into();
    if value < 0 || value as usize >= target_len {
        Err(Error::dangling_reference(
            table, index, field, value, target_len,
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Level;
    use crate::types::{WadLinedef, WadSector, WadSeg, WadSidedef, WadSubsector, WadVertex};
    use crate::types::NO_SIDEDEF;
    use crate::{ErrorKind, WadName};
    use math::Pnt2d;

    fn sector() -> WadSector {
        WadSector {
            floor_height: 0,
            ceiling_height: 128,
            floor_texture: WadName::default(),
            ceiling_texture: WadName::default(),
            light: 160,
            sector_type: 0,
            tag: 0,
        }
    }

    fn side(sector: u16) -> WadSidedef {
        WadSidedef {
            x_offset: 0,
            y_offset: 0,
            upper_texture: WadName::default(),
            lower_texture: WadName::default(),
            middle_texture: WadName::default(),
            sector,
        }
    }

    fn line(start_vertex: u16, end_vertex: u16, right_side: i16, left_side: i16) -> WadLinedef {
        WadLinedef {
            start_vertex,
            end_vertex,
            flags: 0,
            special_type: 0,
            sector_tag: 0,
            right_side,
            left_side,
        }
    }

    fn two_sector_level() -> Level {
        Level {
            vertices: vec![
                WadVertex { x: 0, y: 0 },
                WadVertex { x: 64, y: 0 },
                WadVertex { x: 64, y: 64 },
            ],
            linedefs: vec![line(0, 1, 0, NO_SIDEDEF), line(1, 2, 1, 0)],
            sidedefs: vec![side(0), side(1)],
            sectors: vec![sector(), sector()],
            segs: vec![
                WadSeg {
                    start_vertex: 0,
                    end_vertex: 1,
                    angle: 0,
                    linedef: 0,
                    direction: 0,
                    offset: 0,
                },
                WadSeg {
                    start_vertex: 2,
                    end_vertex: 1,
                    angle: 0,
                    linedef: 1,
                    direction: 1,
                    offset: 0,
                },
            ],
            subsectors: vec![
                WadSubsector {
                    num_segs: 1,
                    first_seg: 0,
                },
                WadSubsector {
                    num_segs: 1,
                    first_seg: 1,
                },
            ],
            ..Level::default()
        }
    }

    #[test]
    fn navigates_tables() {
        let level = two_sector_level();
        level.validate().unwrap();
        assert_eq!(level.vertex(2), Some(Pnt2d::new(64.0, 64.0)));
        assert_eq!(level.vertex(3), None);
        assert_eq!(level.ssector_sector_id(0), Some(0));
        // Second seg runs against its linedef, so it takes the left side.
        assert_eq!(level.ssector_sector_id(1), Some(0));
        assert_eq!(level.ssector_sector_id(2), None);
        let (v1, v2) = level.seg_vertices(&level.segs[1]).unwrap();
        assert_eq!((v1, v2), (Pnt2d::new(64.0, 64.0), Pnt2d::new(64.0, 0.0)));

        let (two_sided, one_sided) = (&level.segs[1], &level.segs[0]);
        assert!(std::ptr::eq(level.seg_sector(two_sided).unwrap(), &level.sectors[0]));
        assert!(std::ptr::eq(level.seg_back_sector(two_sided).unwrap(), &level.sectors[1]));
        assert!(level.seg_sector(one_sided).is_some());
        assert!(level.seg_back_sidedef(one_sided).is_none());
        assert!(level.seg_back_sector(one_sided).is_none());
    }

    #[test]
    fn rejects_dangling_references() {
        let mut level = two_sector_level();
        level.sidedefs[1].sector = 7;
        match level.validate() {
            Err(error) => match *error.kind() {
                ErrorKind::CorruptLevel(ref message) => assert!(message.contains("sidedefs[1]")),
                ref kind => panic!("unexpected error kind {:?}", kind),
            },
            Ok(()) => panic!("dangling sector accepted"),
        }

        let mut level = two_sector_level();
        level.linedefs[0].right_side = NO_SIDEDEF;
        assert!(level.validate().is_err());

        let mut level = two_sector_level();
        level.subsectors[1].num_segs = 4;
        assert!(level.validate().is_err());
    }
}
