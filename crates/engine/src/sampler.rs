use brainmesh_mesh::{Axis, IndexedMesh, Triangle, Vector3};
use cgmath::InnerSpace;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{InterpolationBand, SamplerConfig, SurfaceSampling};
use crate::error::{Result, SamplingError};
use crate::index::SpatialMeshIndex;

// How far past the bounding box the probe segment starts and ends, as a fraction of
// the box diagonal.
const PROBE_MARGIN: f64 = 0.05;

// Distance a surface sample is moved inwards before an axis probe is cast through it,
// as a fraction of the box diagonal. Well above the index's crossing merge resolution.
const INWARD_OFFSET: f64 = 1e-6;

// Below this |normal . axis| an axis probe through a surface sample runs along the
// surface instead of through the volume.
const TANGENT_EPSILON: f64 = 1e-9;

const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

fn unit_or_zero(v: Vector3) -> Vector3 {
    let m = v.magnitude();
    if m > 0.0 && m.is_finite() {
        v / m
    } else {
        ZERO
    }
}

/// Direction of the probe that carries a surface sample into the volume.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ProbeDirection {
    /// Parallel to an axis, spanning the whole bounding box.
    Axis(Axis),
    /// Along the surface normal at the sample, one box diagonal to either side.
    Normal,
}

/// A point on the mesh surface and the outward unit normal there. The normal is zero
/// where the surface around the point is degenerate.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct SurfaceSample {
    pub point: Vector3,
    pub normal: Vector3,
}

/// A subset of a mesh surface that samples are drawn from: the whole mesh or one side
/// of it.
#[derive(Debug, Clone)]
pub struct SurfaceRegion {
    vertices: Vec<u32>,
    // Area weighted normal of each entry of `vertices`, over every facet touching it.
    vertex_normals: Vec<Vector3>,
    facets: Vec<u32>,
    // Facet areas, used to pick triangles in proportion to their size. `None` when the
    // region has no facet with a positive area.
    facet_weights: Option<WeightedIndex<f64>>,
    centroid: Option<Vector3>,
}

impl SurfaceRegion {
    /// Every vertex and every facet of the mesh.
    pub fn whole(mesh: &IndexedMesh) -> Result<Self> {
        Self::select(mesh, |_| true)
    }

    /// The vertices for which `keep` holds, and the facets whose first vertex is one of
    /// them. Fails if a facet references a missing vertex.
    pub fn select<F: Fn(&Vector3) -> bool>(mesh: &IndexedMesh, keep: F) -> Result<Self> {
        if let Some(facet) = mesh.invalid_facet() {
            return Err(SamplingError::InvalidMesh(format!(
                "facet {facet} references a vertex outside of the {} mesh points",
                mesh.vertex_count()
            )));
        }
        let points = mesh.points();
        let vertices: Vec<u32> = (0..points.len() as u32)
            .filter(|&i| keep(&points[i as usize]))
            .collect();

        let mut normal_sums = vec![ZERO; points.len()];
        for (i, f) in mesh.facets().iter().enumerate() {
            let n = mesh.triangle(i).normal();
            for v in f.indices() {
                normal_sums[v as usize] += n;
            }
        }
        let vertex_normals = vertices
            .iter()
            .map(|&i| unit_or_zero(normal_sums[i as usize]))
            .collect();

        let facets: Vec<u32> = mesh
            .facets()
            .iter()
            .enumerate()
            .filter(|(_, f)| keep(&points[f.p0 as usize]))
            .map(|(i, _)| i as u32)
            .collect();
        let facet_weights =
            WeightedIndex::new(facets.iter().map(|&f| mesh.triangle(f as usize).area())).ok();
        let centroid = if vertices.is_empty() {
            None
        } else {
            let sum = vertices
                .iter()
                .fold(ZERO, |acc, &i| acc + points[i as usize]);
            Some(sum / vertices.len() as f64)
        };
        Ok(Self {
            vertices,
            vertex_normals,
            facets,
            facet_weights,
            centroid,
        })
    }

    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    pub fn facets(&self) -> &[u32] {
        &self.facets
    }

    /// Mean position of the region's vertices.
    pub fn centroid(&self) -> Option<Vector3> {
        self.centroid
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Draws random surface points and moves them inside the mesh volume.
#[derive(Debug)]
pub struct SurfacePointSampler {
    rng: StdRng,
    mode: SurfaceSampling,
    probe: ProbeDirection,
    fallbacks: usize,
}

impl SurfacePointSampler {
    /// A sampler probing along the configured axis.
    pub fn new(config: &SamplerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            mode: config.surface_sampling,
            probe: ProbeDirection::Axis(config.probe_axis),
            fallbacks: 0,
        }
    }

    pub fn with_probe(mut self, probe: ProbeDirection) -> Self {
        self.probe = probe;
        self
    }

    pub fn probe(&self) -> ProbeDirection {
        self.probe
    }

    /// Number of projections that returned the surface point unchanged.
    pub fn fallback_count(&self) -> usize {
        self.fallbacks
    }

    /// Picks one of the `subset` vertices uniformly at random.
    pub fn sample_vertex(&mut self, points: &[Vector3], subset: &[u32]) -> Option<Vector3> {
        if subset.is_empty() {
            return None;
        }
        let i = subset[self.rng.gen_range(0..subset.len())];
        points.get(i as usize).copied()
    }

    /// Picks a uniformly distributed point on the triangle.
    pub fn sample_on_triangle(&mut self, triangle: &Triangle) -> Vector3 {
        let mut u: f64 = self.rng.gen();
        let mut v: f64 = self.rng.gen();
        // Reflect samples from the far half of the parallelogram back into the triangle.
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        triangle.p0 + (triangle.p1 - triangle.p0) * u + (triangle.p2 - triangle.p0) * v
    }

    /// Picks a raw point on the surface of `region` according to the sampling mode.
    /// Returns `None` if the region is empty.
    pub fn sample_on_surface(
        &mut self,
        mesh: &IndexedMesh,
        region: &SurfaceRegion,
    ) -> Option<SurfaceSample> {
        match (self.mode, &region.facet_weights) {
            (SurfaceSampling::Triangle, Some(weights)) => {
                let facet = region.facets[weights.sample(&mut self.rng)];
                let triangle = mesh.triangle(facet as usize);
                Some(SurfaceSample {
                    point: self.sample_on_triangle(&triangle),
                    normal: unit_or_zero(triangle.normal()),
                })
            }
            // Vertex mode, or a region whose facets are all degenerate.
            _ => {
                if region.vertices.is_empty() {
                    return None;
                }
                let k = self.rng.gen_range(0..region.vertices.len());
                let point = *mesh.points().get(region.vertices[k] as usize)?;
                Some(SurfaceSample {
                    point,
                    normal: region.vertex_normals[k],
                })
            }
        }
    }

    /// Moves `surface_point` inside the volume.
    ///
    /// A probe parallel to the probe axis (Z for a sampler probing along normals) is
    /// cast through the point across the whole bounding box, and the result is placed
    /// at a random fraction `t` from `band` between the first two crossings. If the
    /// probe crosses the surface fewer than twice the surface point is returned
    /// unchanged.
    pub fn project_inside(
        &mut self,
        index: &SpatialMeshIndex,
        surface_point: Vector3,
        band: InterpolationBand,
    ) -> Vector3 {
        let axis = match self.probe {
            ProbeDirection::Axis(axis) => axis,
            ProbeDirection::Normal => Axis::Z,
        };
        let crossings = axis_crossings(index, axis, surface_point);
        if crossings.len() < 2 {
            return self.fall_back(surface_point, crossings.len());
        }
        self.place_between(crossings[0], crossings[1], band)
    }

    /// Moves a surface sample inside the volume with the sampler's probe.
    ///
    /// An axis probe is cast through a point just inside the surface, so that it
    /// never runs along the sampled face or edge. The result lies between the two
    /// crossings enclosing that point. A normal probe spans one box diagonal to each
    /// side of the sample and uses its first two crossings. Samples that cannot be
    /// moved are returned unchanged and counted as fallbacks.
    pub fn project_sample(
        &mut self,
        index: &SpatialMeshIndex,
        sample: &SurfaceSample,
        band: InterpolationBand,
    ) -> Vector3 {
        match self.probe {
            ProbeDirection::Axis(axis) => self.project_along_axis(index, axis, sample, band),
            ProbeDirection::Normal => self.project_along_normal(index, sample, band),
        }
    }

    fn project_along_axis(
        &mut self,
        index: &SpatialMeshIndex,
        axis: Axis,
        sample: &SurfaceSample,
        band: InterpolationBand,
    ) -> Vector3 {
        if sample.normal == ZERO {
            return self.project_inside(index, sample.point, band);
        }
        let offset = sample.normal * (INWARD_OFFSET * index.diagonal());
        // The normal is expected to point outwards, but the winding of a loaded mesh
        // is not trusted: the crossing parity decides which offset is inside.
        for start in [sample.point - offset, sample.point + offset] {
            let crossings = axis_crossings(index, axis, start);
            if let Some((p, q)) = enclosing_crossings(&crossings, axis, start) {
                return self.place_between(p, q, band);
            }
        }
        if sample.normal[axis.index()].abs() < TANGENT_EPSILON {
            return self.fall_back(sample.point, 0);
        }
        self.project_inside(index, sample.point, band)
    }

    fn project_along_normal(
        &mut self,
        index: &SpatialMeshIndex,
        sample: &SurfaceSample,
        band: InterpolationBand,
    ) -> Vector3 {
        if sample.normal == ZERO {
            return self.fall_back(sample.point, 0);
        }
        let reach = sample.normal * index.diagonal();
        let crossings = index.intersect_segment(sample.point + reach, sample.point - reach);
        if crossings.len() < 2 {
            return self.fall_back(sample.point, crossings.len());
        }
        let (p, q) = (crossings[0], crossings[1]);
        // Crossings closer than the sample offset span no volume.
        if (q - p).magnitude() <= INWARD_OFFSET * index.diagonal() {
            return self.fall_back(sample.point, crossings.len());
        }
        self.place_between(p, q, band)
    }

    fn place_between(&mut self, p: Vector3, q: Vector3, band: InterpolationBand) -> Vector3 {
        let t = self.rng.gen_range(band.min..=band.max);
        p + (q - p) * t
    }

    fn fall_back(&mut self, surface_point: Vector3, crossings: usize) -> Vector3 {
        self.fallbacks += 1;
        log::debug!(
            "probe through {:?} found no chord ({} crossing(s)), keeping the surface point",
            surface_point,
            crossings
        );
        surface_point
    }

    /// Convenience for `sample_on_surface` followed by `project_sample`.
    pub fn sample_inside(
        &mut self,
        mesh: &IndexedMesh,
        index: &SpatialMeshIndex,
        region: &SurfaceRegion,
        band: InterpolationBand,
    ) -> Option<Vector3> {
        let sample = self.sample_on_surface(mesh, region)?;
        Some(self.project_sample(index, &sample, band))
    }
}

/// Crossings of the axis-parallel line through `point` with the surface, ordered by
/// increasing coordinate on `axis`.
fn axis_crossings(index: &SpatialMeshIndex, axis: Axis, point: Vector3) -> Vec<Vector3> {
    let a = axis.index();
    let bounds = index.bounds();
    let margin = (PROBE_MARGIN * index.diagonal()).max(1e-6);
    let mut from = point;
    let mut to = point;
    from[a] = bounds.min[a] - margin;
    to[a] = bounds.max[a] + margin;
    index.intersect_segment(from, to)
}

/// The pair of consecutive crossings around `start`, if an odd number of crossings
/// lies beyond it (`start` is inside the mesh).
fn enclosing_crossings(
    crossings: &[Vector3],
    axis: Axis,
    start: Vector3,
) -> Option<(Vector3, Vector3)> {
    let a = axis.index();
    let below = crossings.iter().take_while(|c| c[a] < start[a]).count();
    let above = crossings.len() - below;
    if below == 0 || above % 2 == 0 {
        return None;
    }
    Some((crossings[below - 1], crossings[below]))
}
