use brainmesh_mesh::{IndexedMesh, Vector3};

use crate::config::{InterpolationBand, SamplerConfig};
use crate::error::{Result, SamplingError};
use crate::index::SpatialMeshIndex;
use crate::sampler::{ProbeDirection, SurfacePointSampler, SurfaceRegion};

/// Generates independent random points anywhere inside a mesh, without spacing.
///
/// Surface samples are carried inside along the surface normal, so every face of the
/// mesh is crossed rather than grazed.
#[derive(Debug)]
pub struct VolumePointGenerator<'m> {
    mesh: &'m IndexedMesh,
    index: SpatialMeshIndex,
    region: SurfaceRegion,
    sampler: SurfacePointSampler,
    band: InterpolationBand,
}

impl<'m> VolumePointGenerator<'m> {
    pub fn new(mesh: &'m IndexedMesh, config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        if mesh.points().is_empty() {
            return Err(SamplingError::InvalidMesh("mesh has no vertices".to_string()));
        }
        let index = SpatialMeshIndex::new(mesh)?;
        Ok(Self {
            mesh,
            index,
            region: SurfaceRegion::whole(mesh)?,
            sampler: SurfacePointSampler::new(&config).with_probe(ProbeDirection::Normal),
            band: config.volume_band,
        })
    }

    pub fn index(&self) -> &SpatialMeshIndex {
        &self.index
    }

    pub fn fallback_count(&self) -> usize {
        self.sampler.fallback_count()
    }

    pub fn generate_point(&mut self) -> Result<Vector3> {
        self.sampler
            .sample_inside(self.mesh, &self.index, &self.region, self.band)
            .ok_or_else(|| SamplingError::InvalidMesh("mesh has no vertices".to_string()))
    }

    pub fn generate_points(&mut self, count: usize) -> Result<Vec<Vector3>> {
        let points = (0..count)
            .map(|_| self.generate_point())
            .collect::<Result<Vec<_>>>()?;
        log::debug!(
            "generated {} volume points, {} fallbacks so far",
            points.len(),
            self.fallback_count()
        );
        Ok(points)
    }
}
