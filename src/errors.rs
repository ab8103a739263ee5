//! Error types produced while assembling rigs or loading configuration.

use thiserror::Error;

/// Error returned when a rig description references ids that do not resolve.
///
/// The solver itself never fails; malformed graphs are caught once while the
/// [`Rig`](crate::Rig) is being assembled.
///
/// # Examples
///
/// ```
/// use rigx::{vec2, Node, NodeKind, Rig, RigError, Segment};
///
/// let nodes = [Node::new("anchor", NodeKind::Anchor, vec2(0.0, 0.0))];
/// let segments = [Segment::new("s1", "anchor", "load")];
/// let error = Rig::from_parts(&nodes, &segments, &[]).expect_err("dangling id rejected");
/// assert_eq!(
///     error,
///     RigError::UnknownNode {
///         segment: "s1".to_string(),
///         node: "load".to_string(),
///     }
/// );
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RigError {
    /// Returned when a segment endpoint names a node that is not part of the rig.
    #[error("segment {segment:?} references unknown node {node:?}")]
    UnknownNode {
        /// Identifier of the offending segment.
        segment: String,
        /// The id that could not be resolved.
        node: String,
    },
    /// Returned when a rope lists a segment that is not part of the rig.
    #[error("rope {rope} references unknown segment {segment:?}")]
    UnknownSegment {
        /// Position of the rope in the supplied list.
        rope: usize,
        /// The id that could not be resolved.
        segment: String,
    },
    /// Returned when two nodes share an id.
    #[error("node id {0:?} is used more than once")]
    DuplicateNode(String),
    /// Returned when two segments share an id.
    #[error("segment id {0:?} is used more than once")]
    DuplicateSegment(String),
    /// Returned when editing a node that does not exist.
    #[error("node {0:?} does not exist in this rig")]
    UnknownNodeId(String),
}

/// Error returned when loading solver configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration is not valid JSON for the expected schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A parameter is outside its meaningful range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
