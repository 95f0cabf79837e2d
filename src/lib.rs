pub mod bsp;
pub mod config;
pub mod containment;
pub mod flats;
pub mod loops;
pub mod merge;
pub mod triangulate;
pub mod walls;

mod errors;
mod level;
mod vertex;

pub use self::bsp::{BspIndex, BspNode, BspVisitor, Child, Order, Side, Subsector};
pub use self::config::BuildConfig;
pub use self::containment::{classify, ContainmentForest, ContainmentNode, Region};
pub use self::errors::{Diagnostic, Error, ErrorKind, Result};
pub use self::flats::{FlatSurface, SectorFlats};
pub use self::level::{BuildStats, LevelGeometry, PlacedThing, Placement, ThingFilter};
pub use self::loops::{extract_loops, DirectedEdge, Extraction, Loop, Winding};
pub use self::merge::{merge, merge_holes};
pub use self::triangulate::triangulate;
pub use self::vertex::StaticVertex;
pub use self::walls::{wall_quads, TextureSizes, WallQuad, WallSection};
