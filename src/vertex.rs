/// Vertex shared by floor, ceiling and wall meshes. Positions are in world space; texture
/// coordinates are in tiles, so a renderer only scales them by the texture it binds.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StaticVertex {
    pub a_pos: [f32; 3],
    pub a_tile_uv: [f32; 2],
}
