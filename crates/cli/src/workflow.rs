//! Turning point requests for named regions into positions.
//!
//! Requests are processed in order and never abort the batch: every failure becomes a
//! message, and the messages are reported together once all requests have run.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use anyhow::{bail, Context};
use brainmesh::{BilateralPointGenerator, SamplerConfig, Side};
use brainmesh_mesh::{Axis, IndexedMesh, Vector3};

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Selector {
    Side(Side),
    /// Left/right pairs; each pair counts once towards the request.
    Mirrored,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Request {
    pub region: String,
    pub selector: Selector,
    pub count: usize,
}

impl std::str::FromStr for Request {
    type Err = anyhow::Error;

    /// Parses `NAME:COUNT` or `NAME:SIDE:COUNT`.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let Some((head, count)) = s.rsplit_once(':') else {
            bail!("request `{s}` is not NAME[:SIDE]:COUNT");
        };
        let count: usize = count
            .parse()
            .with_context(|| format!("bad point count in request `{s}`"))?;
        let (region, selector) = match head.rsplit_once(':') {
            Some((region, side)) if side.eq_ignore_ascii_case("mirrored") => {
                (region, Selector::Mirrored)
            }
            Some((region, side)) => (region, Selector::Side(Side::from_selector(side))),
            None => (head, Selector::Side(Side::Central)),
        };
        if region.is_empty() {
            bail!("request `{s}` names no region");
        }
        Ok(Request {
            region: region.to_string(),
            selector,
            count,
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Placement {
    pub region: String,
    pub side: Side,
    pub position: Vector3,
}

#[derive(Debug, Default)]
pub struct Report {
    pub placements: Vec<Placement>,
    pub errors: Vec<String>,
}

impl Report {
    pub fn write_csv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "region,side,x,y,z")?;
        for p in &self.placements {
            writeln!(
                out,
                "{},{},{},{},{}",
                p.region, p.side, p.position.x, p.position.y, p.position.z
            )?;
        }
        Ok(())
    }
}

/// Runs every request against the loaded regions.
///
/// One generator is built per region on first use and kept for the following requests,
/// so spacing holds across requests for the same region and side.
pub fn run_requests(
    regions: &BTreeMap<String, IndexedMesh>,
    requests: &[Request],
    axis: Axis,
    config: &SamplerConfig,
) -> Report {
    let mut report = Report::default();
    let mut generators: HashMap<&str, BilateralPointGenerator> = HashMap::new();
    let mut broken: Vec<&str> = Vec::new();
    let mut missing: Vec<&str> = Vec::new();

    for request in requests {
        let name = request.region.as_str();
        let Some((region_name, mesh)) = regions.get_key_value(name) else {
            if !missing.contains(&name) {
                missing.push(name);
            }
            continue;
        };
        if broken.contains(&name) {
            continue;
        }
        let generator = match generators.entry(region_name.as_str()) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(e) => {
                match BilateralPointGenerator::new(mesh, axis, config.clone()) {
                    Ok(g) => e.insert(g),
                    Err(err) => {
                        report.errors.push(format!("brain region '{name}': {err}"));
                        broken.push(name);
                        continue;
                    }
                }
            }
        };

        for _ in 0..request.count {
            let result = match request.selector {
                Selector::Side(side) => generator.generate_point(side).map(|p| vec![(side, p)]),
                Selector::Mirrored => generator
                    .generate_mirrored_pair()
                    .map(|(l, r)| vec![(Side::Left, l), (Side::Right, r)]),
            };
            match result {
                Ok(points) => report
                    .placements
                    .extend(points.into_iter().map(|(side, position)| Placement {
                        region: name.to_string(),
                        side,
                        position,
                    })),
                Err(err) => {
                    // The same failure would repeat for every remaining point.
                    report.errors.push(format!("brain region '{name}': {err}"));
                    break;
                }
            }
        }
    }

    for (name, generator) in &generators {
        if generator.fallback_count() > 0 {
            log::info!(
                "brain region '{}': {} point(s) stayed on the surface",
                name,
                generator.fallback_count()
            );
        }
    }
    if !missing.is_empty() {
        report
            .errors
            .push(format!("missing brain region(s): {}", missing.join(", ")));
    }
    report
}

#[cfg(test)]
mod tests {
    use brainmesh_test_data::{region_sphere, unit_cube};

    use super::*;

    fn regions() -> BTreeMap<String, IndexedMesh> {
        BTreeMap::from([
            ("cube".to_string(), unit_cube()),
            ("sphere".to_string(), region_sphere()),
        ])
    }

    fn config() -> SamplerConfig {
        SamplerConfig::default().with_seed(8).with_spacing(0.3)
    }

    #[test]
    fn parse_requests() {
        assert_eq!(
            Request {
                region: "cube".to_string(),
                selector: Selector::Side(Side::Central),
                count: 3
            },
            "cube:3".parse().unwrap()
        );
        assert_eq!(
            Selector::Side(Side::Left),
            "cube:L:1".parse::<Request>().unwrap().selector
        );
        assert_eq!(
            Selector::Side(Side::Right),
            "cube:right:1".parse::<Request>().unwrap().selector
        );
        assert_eq!(
            Selector::Mirrored,
            "cube:Mirrored:2".parse::<Request>().unwrap().selector
        );
        assert_eq!(
            Selector::Side(Side::Central),
            "cube:both:2".parse::<Request>().unwrap().selector
        );
        assert!("cube".parse::<Request>().is_err());
        assert!("cube:many".parse::<Request>().is_err());
        assert!(":4".parse::<Request>().is_err());
    }

    #[test]
    fn points_per_side() {
        let requests = vec![
            "cube:left:3".parse().unwrap(),
            "cube:right:2".parse().unwrap(),
            "sphere:4".parse().unwrap(),
        ];
        let report = run_requests(&regions(), &requests, Axis::X, &config());
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert_eq!(9, report.placements.len());

        let count = |region: &str, side: Side| {
            report
                .placements
                .iter()
                .filter(|p| p.region == region && p.side == side)
                .count()
        };
        assert_eq!(3, count("cube", Side::Left));
        assert_eq!(2, count("cube", Side::Right));
        assert_eq!(4, count("sphere", Side::Central));
        for p in report.placements.iter().filter(|p| p.region == "cube") {
            let v = p.position;
            assert!([v.x, v.y, v.z].iter().all(|c| *c > 0.0 && *c < 1.0), "{p:?}");
            assert_eq!(p.side == Side::Left, v.x > 0.5, "{p:?}");
        }
    }

    #[test]
    fn mirrored_requests_produce_pairs() {
        let requests = vec!["sphere:mirrored:3".parse().unwrap()];
        let report = run_requests(&regions(), &requests, Axis::X, &config());
        assert!(report.errors.is_empty());
        let sides: Vec<Side> = report.placements.iter().map(|p| p.side).collect();
        assert_eq!(
            vec![Side::Left, Side::Right, Side::Left, Side::Right, Side::Left, Side::Right],
            sides
        );
    }

    #[test]
    fn failures_are_collected() {
        let flat = IndexedMesh::from_parts(
            vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 1.0, 1.0),
            ],
            vec![brainmesh_mesh::Facet::new(0, 1, 2)],
        );
        let mut regions = regions();
        regions.insert("flat".to_string(), flat);
        regions.insert("empty".to_string(), IndexedMesh::new());

        let requests: Vec<Request> = [
            "thalamus:2",
            "flat:left:5",
            "cube:left:1",
            "empty:1",
            "empty:2",
            "striatum:left:1",
            "thalamus:1",
        ]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
        let report = run_requests(&regions, &requests, Axis::X, &config());

        // Valid requests still run.
        assert_eq!(1, report.placements.len());
        assert_eq!(
            vec![
                "brain region 'flat': the left side of the mesh has no vertices".to_string(),
                "brain region 'empty': invalid mesh: mesh has no vertices".to_string(),
                "missing brain region(s): thalamus, striatum".to_string(),
            ],
            report.errors
        );
    }

    #[test]
    fn csv_output() {
        let report = Report {
            placements: vec![Placement {
                region: "cube".to_string(),
                side: Side::Left,
                position: Vector3::new(1.0, 0.5, 0.25),
            }],
            errors: vec![],
        };
        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();
        assert_eq!(
            "region,side,x,y,z\ncube,left,1,0.5,0.25\n",
            String::from_utf8(out).unwrap()
        );
    }
}
