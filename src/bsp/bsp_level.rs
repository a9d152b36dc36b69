// src/bsp/bsp_level.rs

use log::{error, info};

use crate::bsp::config::BspConfig;
use crate::bsp::error::{BspError, Result};
use crate::bsp::hedge::{create_hedges, HEdgeStore};
use crate::bsp::hedge_tip::VertexFans;
use crate::bsp::line_info::annotate_lines;
use crate::bsp::partitioner::Partitioner;
use crate::bsp::tree::{assemble_tree, BspTree, BuildStats};
use crate::map::{MapData, Vertex};

/// Builds the BSP tree of one map.
///
/// The map itself is never modified. On success the level holds the tree and
/// the full vertex array (the map's vertices followed by the ones created by
/// splits) until the caller takes them. A failed build leaves neither.
pub struct BspLevel {
    map: MapData,
    config: BspConfig,
    tree: Option<BspTree>,
    vertices: Option<Vec<Vertex>>,
}

impl BspLevel {
    pub fn new(map: MapData) -> Self {
        Self::with_config(map, BspConfig::default())
    }

    pub fn with_config(map: MapData, config: BspConfig) -> Self {
        BspLevel {
            map,
            config,
            tree: None,
            vertices: None,
        }
    }

    pub fn map(&self) -> &MapData {
        &self.map
    }

    pub fn config(&self) -> &BspConfig {
        &self.config
    }

    pub fn build(&mut self) -> Result<&BspTree> {
        self.release();

        let (tree, vertices) = self.compile().map_err(|e| {
            error!("BSP build failed: {}", e);
            e
        })?;

        let stats = tree.stats();
        info!("Built BSP tree:");
        info!("    {:4} nodes", stats.nodes);
        info!("    {:4} leaves", stats.leaves);
        info!("    {:4} half-edges ({} along partitions)", stats.hedges, stats.partition_hedges);
        info!("    {:4} vertices ({} new)", stats.vertices, stats.new_vertices);
        info!("    {:4} max depth", stats.max_depth);

        self.vertices = Some(vertices);
        Ok(self.tree.insert(tree))
    }

    fn compile(&self) -> Result<(BspTree, Vec<Vertex>)> {
        self.config.validate()?;
        let notes = annotate_lines(&self.map)?;

        let mut hedges = HEdgeStore::new();
        let mut fans = VertexFans::with_vertex_count(self.map.vertices.len());
        let set = create_hedges(&notes.lines, &self.map.vertices, &mut hedges, &mut fans);
        if set.is_empty() {
            return Err(BspError::NoHalfEdges);
        }

        let output = Partitioner::new(&self.config, hedges, self.map.vertices.clone(), fans).run(set)?;
        let stats = BuildStats {
            vertices: output.vertices.len(),
            new_vertices: output.new_vertices,
            max_depth: output.max_depth,
            ..BuildStats::default()
        };
        let tree = assemble_tree(output.tree, output.leaves, output.hedges, notes.lines, stats)?;
        Ok((tree, output.vertices))
    }

    pub fn tree(&self) -> Option<&BspTree> {
        self.tree.as_ref()
    }

    /// Hands the finished tree over to the caller.
    pub fn take_tree(&mut self) -> Option<BspTree> {
        self.tree.take()
    }

    /// Hands the final vertex array over to the caller.
    pub fn take_vertices(&mut self) -> Option<Vec<Vertex>> {
        self.vertices.take()
    }

    /// Drops whatever the last build left behind.
    pub fn release(&mut self) {
        self.tree = None;
        self.vertices = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::SideDef;

    fn square() -> MapData {
        let mut map = MapData::new();
        map.add_room(&[(0.0, 0.0), (0.0, 64.0), (64.0, 64.0), (64.0, 0.0)]);
        map
    }

    #[test]
    fn test_build_and_take() {
        let mut level = BspLevel::new(square());
        let stats = *level.build().unwrap().stats();
        assert_eq!(stats.leaves, 1);
        assert_eq!(stats.vertices, 4);

        let vertices = level.take_vertices().unwrap();
        assert_eq!(vertices.len(), 4);
        assert!(level.take_vertices().is_none());
        assert!(level.tree().is_some());
        assert!(level.take_tree().is_some());
        assert!(level.tree().is_none());
    }

    #[test]
    fn test_failed_build_leaves_nothing() {
        let mut level = BspLevel::new(square());
        level.build().unwrap();

        let mut broken = square();
        let side = broken.add_sidedef(SideDef::for_sector(0));
        broken.add_linedef(0, 17, Some(side), None);
        let config = level.config().clone();
        let mut level = BspLevel::with_config(broken, config);
        assert!(matches!(level.build(), Err(BspError::MissingVertex { vertex: 17, .. })));
        assert!(level.tree().is_none());
        assert!(level.take_vertices().is_none());
    }

    #[test]
    fn test_no_usable_lines() {
        let mut map = MapData::new();
        let a = map.add_vertex(0.0, 0.0);
        let b = map.add_vertex(0.0, 0.0);
        let sector = map.add_sector(Default::default());
        let side = map.add_sidedef(SideDef::for_sector(sector));
        map.add_linedef(a, b, Some(side), None);
        assert!(matches!(BspLevel::new(map).build(), Err(BspError::NoHalfEdges)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = BspConfig {
            epsilon: -1.0,
            ..BspConfig::default()
        };
        let mut level = BspLevel::with_config(square(), config);
        assert!(matches!(level.build(), Err(BspError::InvalidConfig(_))));
        assert_eq!(level.map().linedefs.len(), 4);
    }

    #[test]
    fn test_release() {
        let mut level = BspLevel::new(square());
        level.build().unwrap();
        level.release();
        assert!(level.tree().is_none());
        assert!(level.take_vertices().is_none());
    }
}
