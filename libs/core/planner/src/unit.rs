use imagec_domain_model::{PlaneId, TileId};

/// Size of the objectId block reserved per tile-ordinal within an
/// (image, pipeline). Tile workers fill disjoint subranges starting at
/// `WorkUnit::object_id_start`, giving globally increasing ids without the
/// workers needing to coordinate (§5: "the Planner assigns globally
/// increasing objectId ranges ... based on the tile row-major order").
/// A single tile producing more objects than this would silently collide
/// with the next tile's range; no pipeline in this engine's tile sizes
/// comes close.
pub const OBJECT_ID_BLOCK_SIZE: u64 = 1_000_000;

/// The atomic execution grain: one (image, pipeline, plane, tile). The
/// image itself is identified by the caller's own image-processing loop,
/// not carried here, since a `WorkUnit` sequence is always planned and
/// executed within the context of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub pipeline_uid: String,
    pub plane: PlaneId,
    pub tile: TileId,
    /// First objectId this unit may mint; see `OBJECT_ID_BLOCK_SIZE`.
    pub object_id_start: u64,
}
