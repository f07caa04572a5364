use brainmesh::mesh::{Axis, IndexedMesh, Vector3};
use brainmesh::{
    split_bilateral, BilateralPointGenerator, BilateralSplit, SamplerConfig, Side,
    SurfaceSampling, VolumePointGenerator,
};
use brainmesh_test_data::{region_sphere, two_cubes, unit_cube};
use cgmath::InnerSpace;

fn nearest_neighbor_distances(points: &[Vector3]) -> Vec<f64> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            points
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, q)| (p - q).magnitude())
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

#[test]
fn sphere_points_are_contained() {
    let mesh = region_sphere();
    for mode in [SurfaceSampling::Vertex, SurfaceSampling::Triangle] {
        let config = SamplerConfig {
            surface_sampling: mode,
            ..SamplerConfig::default().with_seed(17).with_spacing(10.0)
        };
        let mut g = BilateralPointGenerator::new(&mesh, Axis::X, config).unwrap();
        let trials = 200;
        for i in 0..trials {
            let side = Side::ALL[i % 3];
            let r = g.generate_point(side).unwrap().magnitude();
            assert!(r < 50.0, "{mode:?}: radius {r}");
        }
        assert_eq!(0, g.fallback_count(), "{mode:?}");
    }
}

#[test]
fn partitions_cover_every_vertex() {
    let mesh = region_sphere();
    for axis in Axis::ALL {
        let g = BilateralPointGenerator::new(&mesh, axis, SamplerConfig::default()).unwrap();
        let left = g.partition(Side::Left);
        let right = g.partition(Side::Right);
        assert_eq!(mesh.vertex_count(), left.len() + right.len());
        assert_eq!(mesh.vertex_count(), g.partition(Side::Central).len());

        let mid = g.index().bounds().midpoint(axis);
        let mut seen = vec![false; mesh.vertex_count()];
        for &i in left {
            assert!(mesh.points()[i as usize][axis.index()] > mid);
            seen[i as usize] = true;
        }
        for &i in right {
            assert!(mesh.points()[i as usize][axis.index()] <= mid);
            assert!(!seen[i as usize], "vertex {i} is on both sides");
            seen[i as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}

#[test]
fn clouds_spread_out() {
    let mesh = region_sphere();
    let spacing = 15.0;
    for seed in 0..4 {
        let config = SamplerConfig {
            surface_sampling: SurfaceSampling::Triangle,
            ..SamplerConfig::default().with_seed(seed).with_spacing(spacing)
        };
        let mut g = BilateralPointGenerator::new(&mesh, Axis::X, config).unwrap();
        for _ in 0..40 {
            g.generate_point(Side::Central).unwrap();
        }
        let mut nn = nearest_neighbor_distances(g.cloud(Side::Central).points());
        nn.sort_by(f64::total_cmp);
        let median = nn[nn.len() / 2];
        assert!(
            median > 0.5 * spacing && median < 1.5 * spacing,
            "seed {seed}: median nearest neighbor distance {median}"
        );
    }
}

#[test]
fn unit_cube_scenario() {
    let mesh = unit_cube();
    let config = SamplerConfig::default().with_seed(5).with_spacing(0.25);
    let mut g = BilateralPointGenerator::new(&mesh, Axis::X, config).unwrap();

    let left = g.partition(Side::Left).to_vec();
    let right = g.partition(Side::Right).to_vec();
    assert_eq!(4, left.len());
    assert_eq!(4, right.len());
    assert!(left.iter().all(|&i| mesh.points()[i as usize].x > 0.5));
    assert!(right.iter().all(|&i| mesh.points()[i as usize].x <= 0.5));

    let trials = 1000;
    let mut on_left = 0;
    for _ in 0..trials {
        let p = g.generate_point_for("left").unwrap();
        assert!(p.x > 0.0 && p.x < 1.0, "{p:?}");
        assert!(p.y > 0.0 && p.y < 1.0, "{p:?}");
        assert!(p.z > 0.0 && p.z < 1.0, "{p:?}");
        if p.x > 0.5 {
            on_left += 1;
        }
    }
    assert!(on_left * 100 >= trials * 95, "{on_left}/{trials} on the left");
    assert_eq!(trials, g.cloud(Side::Left).len());
}

#[test]
fn unit_cube_scenario_with_triangle_sampling() {
    let mesh = unit_cube();
    let config = SamplerConfig {
        surface_sampling: SurfaceSampling::Triangle,
        ..SamplerConfig::default().with_seed(5).with_spacing(0.25)
    };
    let mut g = BilateralPointGenerator::new(&mesh, Axis::X, config).unwrap();
    for _ in 0..1000 {
        let p = g.generate_point_for("left").unwrap();
        assert!(
            [p.x, p.y, p.z].iter().all(|c| *c > 0.0 && *c < 1.0),
            "{p:?} is not strictly inside"
        );
        assert!(p.x > 0.5, "{p:?}");
    }
    assert_eq!(0, g.fallback_count());
}

#[test]
fn each_shell_of_a_split_mesh_gets_its_own_generator() {
    let mesh = two_cubes(3.0);
    let (lower, higher) = match split_bilateral(&mesh, Axis::X).unwrap() {
        BilateralSplit::Pair { lower, higher } => (lower, higher),
        BilateralSplit::Single(_) => panic!("two cubes should split in two"),
    };

    let sample = |m: &IndexedMesh| {
        let mut g = VolumePointGenerator::new(m, SamplerConfig::default().with_seed(3)).unwrap();
        g.generate_points(50).unwrap()
    };
    for p in sample(&lower) {
        assert!(p.x > 0.0 && p.x < 1.0, "{p:?}");
    }
    for p in sample(&higher) {
        assert!(p.x > 4.0 && p.x < 5.0, "{p:?}");
    }
}
