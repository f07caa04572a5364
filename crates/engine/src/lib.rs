//! Mesh-constrained point sampling.
//!
//! Points are generated inside closed triangle meshes (brain regions) and spread out
//! greedily so that they neither cluster nor overlap. A region can be sampled as a
//! whole, per bilateral side, or as mirrored left/right pairs.

mod bilateral;
mod bvh;
mod cloud;
mod components;
mod config;
mod error;
mod index;
mod sampler;
mod volume;

pub use bilateral::{BilateralPointGenerator, Side};
pub use cloud::UniformPointCloud;
pub use components::{
    extract_components, order_by_axis, split_bilateral, BilateralSplit,
    UNBALANCED_COMPONENT_RATIO,
};
pub use config::{InterpolationBand, SamplerConfig, SurfaceSampling};
pub use error::{Result, SamplingError};
pub use index::SpatialMeshIndex;
pub use sampler::{ProbeDirection, SurfacePointSampler, SurfaceRegion, SurfaceSample};
pub use volume::VolumePointGenerator;

pub use brainmesh_mesh as mesh;
