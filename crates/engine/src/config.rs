use brainmesh_mesh::Axis;

use crate::error::{Result, SamplingError};

/// The fraction range `t` is drawn from when placing a point between the entry and
/// exit crossings of a probe.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct InterpolationBand {
    pub min: f64,
    pub max: f64,
}

impl InterpolationBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Band used by the bilateral generator. Staying near the middle of the chord keeps
    /// points away from the surface on concave meshes.
    pub const BILATERAL: InterpolationBand = InterpolationBand::new(0.4, 0.6);

    /// Band used for full-volume sampling.
    pub const VOLUME: InterpolationBand = InterpolationBand::new(0.1, 0.9);

    fn validate(&self, name: &str) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min) || !(0.0..=1.0).contains(&self.max) {
            return Err(SamplingError::InvalidConfig(format!(
                "{name} band [{}, {}] must lie within [0, 1]",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(SamplingError::InvalidConfig(format!(
                "{name} band [{}, {}] is reversed",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// How a raw point on the mesh surface is picked.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default)]
pub enum SurfaceSampling {
    /// A vertex chosen uniformly at random. Densely tessellated areas receive more
    /// samples.
    #[default]
    Vertex,
    /// A uniformly distributed point on the surface: a triangle chosen by area, then a
    /// random barycentric point on it.
    Triangle,
}

/// Tunables shared by the point generators.
#[derive(Debug, PartialEq, Clone)]
pub struct SamplerConfig {
    /// Target distance between a new point and its nearest accepted neighbor.
    pub desired_spacing: f64,
    /// Number of candidates generated for each requested point.
    pub batch_size: usize,
    pub bilateral_band: InterpolationBand,
    pub volume_band: InterpolationBand,
    /// Share of the best-spaced candidates that compete on distance to the target.
    pub top_fraction: f64,
    /// Slope applied to candidates that are closer than `desired_spacing`.
    pub crowding_penalty: f64,
    /// Direction of the probe used to move surface samples inside the volume.
    pub probe_axis: Axis,
    pub surface_sampling: SurfaceSampling,
    /// Seed for the sampler's random number generator. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            desired_spacing: 15.0,
            batch_size: 100,
            bilateral_band: InterpolationBand::BILATERAL,
            volume_band: InterpolationBand::VOLUME,
            top_fraction: 0.1,
            crowding_penalty: 5.0,
            probe_axis: Axis::Z,
            surface_sampling: SurfaceSampling::Vertex,
            seed: None,
        }
    }
}

impl SamplerConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_spacing(mut self, desired_spacing: f64) -> Self {
        self.desired_spacing = desired_spacing;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.desired_spacing.is_finite() && self.desired_spacing > 0.0) {
            return Err(SamplingError::InvalidConfig(format!(
                "desired spacing must be positive, got {}",
                self.desired_spacing
            )));
        }
        if self.batch_size == 0 {
            return Err(SamplingError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        if !(self.top_fraction > 0.0 && self.top_fraction <= 1.0) {
            return Err(SamplingError::InvalidConfig(format!(
                "top fraction must be in (0, 1], got {}",
                self.top_fraction
            )));
        }
        if !(self.crowding_penalty.is_finite() && self.crowding_penalty >= 0.0) {
            return Err(SamplingError::InvalidConfig(format!(
                "crowding penalty must be non-negative, got {}",
                self.crowding_penalty
            )));
        }
        self.bilateral_band.validate("bilateral")?;
        self.volume_band.validate("volume")
    }
}
