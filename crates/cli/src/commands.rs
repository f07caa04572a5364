use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context};
use brainmesh::{
    extract_components, split_bilateral, BilateralSplit, SamplingError, VolumePointGenerator,
};
use brainmesh_mesh::{DefaultMesh, IndexedMesh, TriangleMesh};

use crate::args;
use crate::workflow::{run_requests, Request};

fn load_mesh<P: AsRef<Path>>(path: P) -> anyhow::Result<DefaultMesh> {
    let path = path.as_ref();
    let mesh = brainmesh_stl::read_stl::<DefaultMesh, _>(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    log::debug!(
        "loaded {}: {} triangles, {} vertices",
        path.display(),
        mesh.triangle_count(),
        mesh.vertex_count()
    );
    Ok(mesh)
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    })
}

pub fn scatter_command(args: args::ScatterArgs) -> anyhow::Result<()> {
    let config = args.sampling.config();
    let requests = args
        .requests
        .iter()
        .map(|r| r.parse::<Request>())
        .collect::<anyhow::Result<Vec<_>>>()?;

    // A region that fails to load is reported with the missing regions.
    let mut regions = BTreeMap::new();
    let mut errors = Vec::new();
    for (name, path) in &args.regions {
        match load_mesh(path) {
            Ok(mesh) => {
                regions.insert(name.clone(), mesh);
            }
            Err(err) => errors.push(format!("couldn't load brain region '{name}': {err:#}")),
        }
    }

    let report = run_requests(&regions, &requests, args.axis.into(), &config);
    let mut out = open_output(args.output.as_deref())?;
    report.write_csv(&mut out)?;
    out.flush()?;

    errors.extend(report.errors);
    if !errors.is_empty() {
        for e in &errors {
            log::error!("{e}");
        }
        bail!("{} request(s) failed:\n{}", errors.len(), errors.join("\n"));
    }
    Ok(())
}

pub fn volume_command(args: args::VolumeArgs) -> anyhow::Result<()> {
    let mesh = load_mesh(&args.stl_path)?;
    let mut generator = VolumePointGenerator::new(&mesh, args.sampling.config())?;
    let points = generator.generate_points(args.count)?;

    let mut out = open_output(args.output.as_deref())?;
    writeln!(out, "x,y,z")?;
    for p in points {
        writeln!(out, "{},{},{}", p.x, p.y, p.z)?;
    }
    out.flush()?;
    if generator.fallback_count() > 0 {
        log::warn!(
            "{} point(s) stayed on the surface, is the mesh closed?",
            generator.fallback_count()
        );
    }
    Ok(())
}

fn describe(label: &str, mesh: &IndexedMesh) -> String {
    let centroid = match mesh.centroid() {
        Some(c) => format!("({}, {}, {})", c.x, c.y, c.z),
        None => "-".to_string(),
    };
    format!(
        "{label}: {} triangles, {} vertices, centroid {centroid}",
        mesh.triangle_count(),
        mesh.vertex_count(),
    )
}

pub fn components_command(args: args::ComponentsArgs) -> anyhow::Result<()> {
    let mesh = load_mesh(&args.stl_path)?;
    let lines = match split_bilateral(&mesh, args.axis.into()) {
        Ok(BilateralSplit::Single(m)) => vec![describe("single component", &m)],
        Ok(BilateralSplit::Pair { lower, higher }) => {
            vec![describe("lower", &lower), describe("higher", &higher)]
        }
        Err(SamplingError::TooManyComponents(n)) => {
            log::warn!("{n} components, no bilateral split is possible");
            extract_components(&mesh)?
                .iter()
                .enumerate()
                .map(|(i, c)| describe(&format!("component {i}"), c))
                .collect()
        }
        Err(err) => return Err(err.into()),
    };
    for line in lines {
        println!("{line}");
    }
    Ok(())
}
