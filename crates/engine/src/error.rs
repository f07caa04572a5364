use crate::bilateral::Side;

pub type Result<T> = std::result::Result<T, SamplingError>;

/// Errors reported by the sampling engine.
///
/// Projection failures (a probe crossing the surface fewer than twice) are not errors;
/// they degrade to the surface point and are only counted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplingError {
    /// The mesh cannot be sampled: no vertices, no triangles or bad indices.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// The requested side of the mesh has no vertices to sample from.
    #[error("the {0} side of the mesh has no vertices")]
    EmptySide(Side),

    #[error("no candidate points were supplied")]
    NoCandidates,

    /// Component extraction found more islands than a bilateral split can assign.
    #[error("mesh has {0} connected components, a bilateral split needs one or two")]
    TooManyComponents(usize),

    #[error("invalid sampler configuration: {0}")]
    InvalidConfig(String),
}
