//! Opaque ID newtypes for routing-graph entities.

aion_common::define_id!(
    /// Index of a node in an [`RrGraph`](crate::RrGraph).
    RrNodeId
);

aion_common::define_id!(
    /// Index of an edge in an [`RrGraph`](crate::RrGraph).
    RrEdgeId
);

aion_common::define_id!(
    /// Index into the deduplicated node resistance/capacitance table.
    RcIndex
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let node = RrNodeId::from_index(4);
        let edge = RrEdgeId::from_index(4);
        assert_eq!(node.index(), edge.index());
        assert!(RrNodeId::from_raw(1) < RrNodeId::from_raw(2));
    }

    #[test]
    fn serde_as_plain_integer() {
        let json = serde_json::to_string(&RcIndex::from_raw(9)).unwrap();
        assert_eq!(json, "9");
    }
}
