use std::collections::HashMap;

use brainmesh_mesh::Vector3;
use cgmath::InnerSpace;
use smallvec::SmallVec;

use crate::config::SamplerConfig;
use crate::error::{Result, SamplingError};

type Cell = [i64; 3];

/// Accepted points binned into a uniform grid of cubic cells, answering exact nearest
/// neighbor queries. Any number of points may share a cell or a coordinate.
#[derive(Debug)]
struct PointGrid {
    cell_size: f64,
    cells: HashMap<Cell, SmallVec<[u32; 4]>>,
    // Smallest and largest occupied cell on each axis.
    occupied: Option<(Cell, Cell)>,
}

impl PointGrid {
    fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1e-9),
            cells: HashMap::new(),
            occupied: None,
        }
    }

    fn cell_of(&self, p: Vector3) -> Cell {
        [
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        ]
    }

    fn insert(&mut self, p: Vector3, id: u32) {
        let cell = self.cell_of(p);
        self.cells.entry(cell).or_default().push(id);
        self.occupied = Some(match self.occupied {
            None => (cell, cell),
            Some((lo, hi)) => (
                [lo[0].min(cell[0]), lo[1].min(cell[1]), lo[2].min(cell[2])],
                [hi[0].max(cell[0]), hi[1].max(cell[1]), hi[2].max(cell[2])],
            ),
        });
    }

    /// Distance from `p` to the closest of `points`, which must be the points inserted
    /// so far in insertion order.
    ///
    /// Cells are visited in growing cubic shells around the cell of `p`. Once the
    /// shells would cost more cell lookups than there are points, the remaining search
    /// is a plain scan.
    fn nearest(&self, p: Vector3, points: &[Vector3]) -> Option<f64> {
        let (lo, hi) = self.occupied?;
        let center = self.cell_of(p);
        // Shells that reach past the occupied cells find nothing new. The scan below
        // takes over long before the cap.
        let last_shell = (0..3)
            .map(|a| center[a].abs_diff(lo[a]).max(center[a].abs_diff(hi[a])))
            .max()
            .unwrap_or(0)
            .min(1 << 20) as i64;

        let mut best = f64::INFINITY;
        let mut lookups = 0usize;
        for shell in 0..=last_shell {
            // Points outside the shells visited so far are at least this far away.
            if best <= (shell - 1) as f64 * self.cell_size {
                break;
            }
            let side = 2 * shell + 1;
            let inner = (2 * shell - 1).max(0);
            lookups += (side * side * side - inner * inner * inner) as usize;
            if lookups > points.len() {
                return points
                    .iter()
                    .map(|q| (p - q).magnitude())
                    .min_by(f64::total_cmp);
            }
            for dx in -shell..=shell {
                for dy in -shell..=shell {
                    // Inside the shell's side walls only the top and bottom cells count.
                    let wall = dx.abs() == shell || dy.abs() == shell;
                    let step = if wall || shell == 0 { 1 } else { 2 * shell };
                    for dz in (-shell..=shell).step_by(step as usize) {
                        let cell = [center[0] + dx, center[1] + dy, center[2] + dz];
                        for &id in self.cells.get(&cell).into_iter().flatten() {
                            best = best.min((p - points[id as usize]).magnitude());
                        }
                    }
                }
            }
        }
        best.is_finite().then_some(best)
    }
}

/// A candidate under evaluation.
#[derive(Debug, Clone, Copy)]
struct Scored {
    index: usize,
    energy: f64,
    distance_to_target: f64,
}

/// A growing set of accepted points that picks new points which are well spaced from
/// the existing ones while staying close to a fixed target.
pub struct UniformPointCloud {
    target: Vector3,
    points: Vec<Vector3>,
    grid: PointGrid,
    desired_spacing: f64,
    crowding_penalty: f64,
    top_fraction: f64,
}

impl std::fmt::Debug for UniformPointCloud {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniformPointCloud")
            .field("target", &self.target)
            .field("points", &self.points.len())
            .field("desired_spacing", &self.desired_spacing)
            .finish()
    }
}

impl UniformPointCloud {
    pub fn new(target: Vector3, config: &SamplerConfig) -> Self {
        Self {
            target,
            points: Vec::new(),
            grid: PointGrid::new(config.desired_spacing),
            desired_spacing: config.desired_spacing,
            crowding_penalty: config.crowding_penalty,
            top_fraction: config.top_fraction,
        }
    }

    pub fn target(&self) -> Vector3 {
        self.target
    }

    /// Accepted points, in insertion order.
    pub fn points(&self) -> &[Vector3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance from `p` to the closest accepted point, or `None` for an empty cloud.
    pub fn nearest_distance(&self, p: Vector3) -> Option<f64> {
        self.grid.nearest(p, &self.points)
    }

    /// Spacing score of a candidate at distance `d` from its nearest neighbor. Being
    /// too close costs `crowding_penalty` times more than being too far.
    fn energy(&self, d: f64) -> f64 {
        let diff = d - self.desired_spacing;
        if diff >= 0.0 {
            diff
        } else {
            -self.crowding_penalty * diff
        }
    }

    /// Chooses one of `candidates`, adds it to the cloud and returns it.
    ///
    /// With no accepted points yet the candidate closest to the target wins. Otherwise
    /// candidates are ranked by spacing energy and, among the best `top_fraction` of
    /// them (at least one), the one closest to the target wins.
    pub fn insert_point(&mut self, candidates: &[Vector3]) -> Result<Vector3> {
        if candidates.is_empty() {
            return Err(SamplingError::NoCandidates);
        }

        let mut scored: Vec<Scored> = candidates
            .iter()
            .enumerate()
            .map(|(index, &p)| Scored {
                index,
                energy: self.nearest_distance(p).map_or(0.0, |d| self.energy(d)),
                distance_to_target: (p - self.target).magnitude(),
            })
            .collect();

        let shortlist = if self.points.is_empty() {
            scored.len()
        } else {
            scored.sort_by(|a, b| a.energy.total_cmp(&b.energy));
            ((scored.len() as f64 * self.top_fraction) as usize).clamp(1, scored.len())
        };

        let best = scored[..shortlist]
            .iter()
            .min_by(|a, b| a.distance_to_target.total_cmp(&b.distance_to_target))
            .map(|s| s.index)
            .ok_or(SamplingError::NoCandidates)?;

        let chosen = candidates[best];
        self.grid.insert(chosen, self.points.len() as u32);
        self.points.push(chosen);
        Ok(chosen)
    }
}
