use brainmesh_mesh::{Axis, IndexedMesh, Vector3};

use crate::cloud::UniformPointCloud;
use crate::config::{InterpolationBand, SamplerConfig};
use crate::error::{Result, SamplingError};
use crate::index::SpatialMeshIndex;
use crate::sampler::{SurfacePointSampler, SurfaceRegion};

/// One half of a bilaterally symmetric mesh, or the whole of it.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Side {
    /// Vertices strictly above the midpoint of the split axis.
    Left,
    /// Vertices at or below the midpoint of the split axis.
    Right,
    Central,
}

impl Side {
    pub const ALL: [Side; 3] = [Side::Left, Side::Right, Side::Central];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
            Side::Central => 2,
        }
    }

    /// Interprets a free-form side selector by its first character: `l` is the left
    /// side, `r` the right side and anything else (including nothing) the whole mesh.
    pub fn from_selector(selector: &str) -> Self {
        match selector.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('l') => Side::Left,
            Some('r') => Side::Right,
            _ => Side::Central,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Central => "central",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct SideState {
    region: SurfaceRegion,
    cloud: UniformPointCloud,
}

/// Generates well spaced points inside a mesh, per side or as mirrored left/right pairs.
///
/// The mesh is split at the midpoint of its bounding box along `axis`. Each side, and
/// the mesh as a whole, keeps its own point cloud so that spacing is enforced among
/// the points generated for it.
#[derive(Debug)]
pub struct BilateralPointGenerator<'m> {
    mesh: &'m IndexedMesh,
    axis: Axis,
    index: SpatialMeshIndex,
    sampler: SurfacePointSampler,
    band: InterpolationBand,
    batch_size: usize,
    sides: [SideState; 3],
}

impl<'m> BilateralPointGenerator<'m> {
    pub fn new(mesh: &'m IndexedMesh, axis: Axis, config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        if mesh.points().is_empty() {
            return Err(SamplingError::InvalidMesh("mesh has no vertices".to_string()));
        }
        if mesh.facets().is_empty() {
            return Err(SamplingError::InvalidMesh("mesh has no triangles".to_string()));
        }
        let index = SpatialMeshIndex::new(mesh)?;

        let bounds = *index.bounds();
        let mid = bounds.midpoint(axis);
        let a = axis.index();
        let regions = [
            SurfaceRegion::select(mesh, |p| p[a] > mid)?,
            SurfaceRegion::select(mesh, |p| p[a] <= mid)?,
            SurfaceRegion::whole(mesh)?,
        ];
        let sides = regions.map(|region| {
            let target = region.centroid().unwrap_or_else(|| bounds.center());
            let cloud = UniformPointCloud::new(target, &config);
            SideState { region, cloud }
        });

        log::info!(
            "bilateral split along {} at {}: {} left / {} right vertices, {} triangles",
            axis,
            mid,
            sides[Side::Left.index()].region.vertices().len(),
            sides[Side::Right.index()].region.vertices().len(),
            index.triangle_count()
        );

        Ok(Self {
            mesh,
            axis,
            index,
            sampler: SurfacePointSampler::new(&config),
            band: config.bilateral_band,
            batch_size: config.batch_size,
            sides,
        })
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn index(&self) -> &SpatialMeshIndex {
        &self.index
    }

    /// Vertex indices belonging to `side`.
    pub fn partition(&self, side: Side) -> &[u32] {
        self.sides[side.index()].region.vertices()
    }

    /// Points generated so far for `side`.
    pub fn cloud(&self, side: Side) -> &UniformPointCloud {
        &self.sides[side.index()].cloud
    }

    /// Number of generated candidates that could not be moved inside the mesh.
    pub fn fallback_count(&self) -> usize {
        self.sampler.fallback_count()
    }

    /// Generates one point inside the mesh, drawn from the surface of `side` and spaced
    /// against the previous points of that side.
    pub fn generate_point(&mut self, side: Side) -> Result<Vector3> {
        let state = &mut self.sides[side.index()];
        if state.region.is_empty() {
            return Err(SamplingError::EmptySide(side));
        }
        let candidates = candidate_batch(
            &mut self.sampler,
            self.mesh,
            &self.index,
            &state.region,
            self.band,
            self.batch_size,
        );
        state.cloud.insert_point(&candidates)
    }

    /// Same as [`generate_point`](Self::generate_point) with the side given as a
    /// selector string, see [`Side::from_selector`].
    pub fn generate_point_for(&mut self, selector: &str) -> Result<Vector3> {
        self.generate_point(Side::from_selector(selector))
    }

    /// Generates a `(left, right)` pair. Both points are picked from one batch of
    /// candidates drawn from the whole mesh, each by its own side's cloud.
    pub fn generate_mirrored_pair(&mut self) -> Result<(Vector3, Vector3)> {
        for side in [Side::Left, Side::Right] {
            if self.sides[side.index()].region.is_empty() {
                return Err(SamplingError::EmptySide(side));
            }
        }
        let candidates = candidate_batch(
            &mut self.sampler,
            self.mesh,
            &self.index,
            &self.sides[Side::Central.index()].region,
            self.band,
            self.batch_size,
        );
        let left = self.sides[Side::Left.index()].cloud.insert_point(&candidates)?;
        let right = self.sides[Side::Right.index()].cloud.insert_point(&candidates)?;
        Ok((left, right))
    }
}

fn candidate_batch(
    sampler: &mut SurfacePointSampler,
    mesh: &IndexedMesh,
    index: &SpatialMeshIndex,
    region: &SurfaceRegion,
    band: InterpolationBand,
    count: usize,
) -> Vec<Vector3> {
    (0..count)
        .filter_map(|_| sampler.sample_inside(mesh, index, region, band))
        .collect()
}
