//! Opaque ID newtypes for routing architecture entities.
//!
//! Architecture files refer to switches, segments, and tile types by name.
//! Resolution replaces those names with these dense ids, which index the
//! corresponding tables of an [`Architecture`](crate::Architecture).

aion_common::define_id!(
    /// Index into [`Architecture::switches`](crate::Architecture::switches).
    SwitchId
);

aion_common::define_id!(
    /// Index into [`Architecture::segments`](crate::Architecture::segments).
    SegmentId
);

aion_common::define_id!(
    /// Index into [`Architecture::tile_types`](crate::Architecture::tile_types).
    /// Id 0 is always the empty tile.
    TileTypeId
);

impl TileTypeId {
    /// The built-in empty tile type that fills unused grid cells.
    pub const EMPTY: TileTypeId = TileTypeId(0);
}
