//! Rig topology: nodes, rope segments and the ropes threading through them.

use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::errors::RigError;
use crate::geometry::Vec2;

/// Role of a node in the rig.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    /// Fixed point in the environment, also used for haul points.
    Anchor,
    /// Pulley fixed to the environment.
    PulleyAnchor,
    /// The hanging load.
    Load,
    /// Pulley that moves with the rope, typically attached to the load.
    PulleyFree,
    /// Free junction without a pulley.
    Free,
}

impl NodeKind {
    /// Whether the node is fixed and therefore exempt from force balance.
    #[must_use]
    pub const fn is_anchored(self) -> bool {
        matches!(self, Self::Anchor | Self::PulleyAnchor)
    }

    /// Whether the node must satisfy force balance.
    #[must_use]
    pub const fn is_free(self) -> bool {
        !self.is_anchored()
    }

    /// Whether the full load weight acts on the node.
    #[must_use]
    pub const fn carries_load(self) -> bool {
        matches!(self, Self::Load | Self::PulleyFree)
    }
}

/// A point of the rig.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: String,
    /// Role of the node.
    pub kind: NodeKind,
    /// Position in diagram coordinates.
    pub position: Vec2,
    /// Number of sheaves, for display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheaves: Option<u32>,
}

impl Node {
    /// Create a node without a sheave count.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Vec2) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            sheaves: None,
        }
    }

    /// Attach a descriptive sheave count.
    #[must_use]
    pub fn with_sheaves(mut self, sheaves: u32) -> Self {
        self.sheaves = Some(sheaves);
        self
    }
}

/// A straight rope strand between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Unique identifier.
    pub id: String,
    /// Id of the first endpoint.
    pub a: String,
    /// Id of the second endpoint.
    pub b: String,
}

impl Segment {
    /// Create a segment joining nodes `a` and `b`.
    #[must_use]
    pub fn new(id: impl Into<String>, a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            a: a.into(),
            b: b.into(),
        }
    }
}

/// Segment ids of one continuous rope, ordered from the haul end to the
/// termination.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rope {
    /// Ordered segment ids.
    pub segments: Vec<String>,
}

impl Rope {
    /// Create a rope from segment ids in haul-to-termination order.
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Container for a rig whose ids have all been resolved.
///
/// Segments become edges of an undirected multigraph, so two strands between
/// the same pair of pulleys are kept apart. Node and segment order follow
/// insertion order and define the layout of the equilibrium system.
#[derive(Clone, Debug, Default)]
pub struct Rig {
    /// Underlying graph storage for nodes and segments.
    graph: UnGraph<Node, Segment>,
    /// Lookup from node id to graph index.
    node_ids: HashMap<String, NodeIndex>,
    /// Lookup from segment id to graph index.
    segment_ids: HashMap<String, EdgeIndex>,
    /// Ropes resolved to segment indices.
    ropes: Vec<Vec<EdgeIndex>>,
}

impl Rig {
    /// Create an empty rig.
    ///
    /// # Examples
    /// ```
    /// use rigx::Rig;
    ///
    /// let rig = Rig::new();
    /// assert_eq!(rig.node_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a rig from node, segment and rope lists.
    ///
    /// # Errors
    ///
    /// Returns a [`RigError`] when an id is duplicated or does not resolve.
    pub fn from_parts(
        nodes: &[Node],
        segments: &[Segment],
        ropes: &[Rope],
    ) -> Result<Self, RigError> {
        let mut rig = Self::new();
        for node in nodes {
            rig.add_node(node.clone())?;
        }
        for segment in segments {
            rig.add_segment(segment.clone())?;
        }
        for rope in ropes {
            rig.add_rope(rope)?;
        }
        Ok(rig)
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Return the number of ropes.
    #[must_use]
    pub fn rope_count(&self) -> usize {
        self.ropes.len()
    }

    /// Add a node.
    ///
    /// # Errors
    ///
    /// Returns [`RigError::DuplicateNode`] when the id is already taken.
    pub fn add_node(&mut self, node: Node) -> Result<NodeIndex, RigError> {
        if self.node_ids.contains_key(&node.id) {
            return Err(RigError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_ids.insert(id, index);
        Ok(index)
    }

    /// Add a segment between two existing nodes.
    ///
    /// # Errors
    ///
    /// Returns [`RigError::UnknownNode`] when an endpoint is missing and
    /// [`RigError::DuplicateSegment`] when the id is already taken.
    pub fn add_segment(&mut self, segment: Segment) -> Result<EdgeIndex, RigError> {
        if self.segment_ids.contains_key(&segment.id) {
            return Err(RigError::DuplicateSegment(segment.id));
        }
        let a = self.resolve_endpoint(&segment, &segment.a)?;
        let b = self.resolve_endpoint(&segment, &segment.b)?;
        let id = segment.id.clone();
        let index = self.graph.add_edge(a, b, segment);
        self.segment_ids.insert(id, index);
        Ok(index)
    }

    /// Thread a rope through existing segments and return its position.
    ///
    /// # Errors
    ///
    /// Returns [`RigError::UnknownSegment`] when a listed segment is missing.
    pub fn add_rope(&mut self, rope: &Rope) -> Result<usize, RigError> {
        let position = self.ropes.len();
        let resolved = rope
            .segments
            .iter()
            .map(|id| {
                self.segment_ids
                    .get(id)
                    .copied()
                    .ok_or_else(|| RigError::UnknownSegment {
                        rope: position,
                        segment: id.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.ropes.push(resolved);
        Ok(position)
    }

    /// Update the position of an existing node.
    ///
    /// # Errors
    ///
    /// Returns [`RigError::UnknownNodeId`] when `id` is not part of this rig.
    pub fn move_node(&mut self, id: &str, position: Vec2) -> Result<(), RigError> {
        let index = self
            .node_ids
            .get(id)
            .copied()
            .ok_or_else(|| RigError::UnknownNodeId(id.to_string()))?;
        self.graph[index].position = position;
        Ok(())
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_ids.get(id).map(|&index| &self.graph[index])
    }

    /// Look up a segment by id.
    #[must_use]
    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segment_ids.get(id).map(|&index| &self.graph[index])
    }

    /// Iterate nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Iterate segments in insertion order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.graph.edge_weights()
    }

    /// Node indices in insertion order.
    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// Node stored at `index`.
    pub(crate) fn node_at(&self, index: NodeIndex) -> &Node {
        &self.graph[index]
    }

    /// Ropes as ordered segment indices.
    pub(crate) fn ropes(&self) -> &[Vec<EdgeIndex>] {
        &self.ropes
    }

    /// Segments meeting at `node`, each paired with the unit direction from
    /// `node` toward the segment's other endpoint.
    pub(crate) fn incident(&self, node: NodeIndex) -> impl Iterator<Item = (EdgeIndex, Vec2)> + '_ {
        let origin = self.graph[node].position;
        self.graph.edges(node).map(move |edge| {
            let other = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            (edge.id(), origin.direction_to(self.graph[other].position))
        })
    }

    /// Resolve a segment endpoint id.
    fn resolve_endpoint(&self, segment: &Segment, id: &str) -> Result<NodeIndex, RigError> {
        self.node_ids
            .get(id)
            .copied()
            .ok_or_else(|| RigError::UnknownNode {
                segment: segment.id.clone(),
                node: id.to_string(),
            })
    }
}
