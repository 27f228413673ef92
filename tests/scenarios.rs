//! End-to-end scenarios (Scenario E1-E6, SPEC_FULL.md section 8).

mod support;

use getme_mesh::{
    BasicGetmeSimultaneousConfig, GetmeConfig, GetmeSequentialConfig, GetmeSimultaneousConfig,
    PolygonTransformationSet, SmartLaplaceConfig, basic_getme_simultaneous, getme, getme_sequential,
    getme_simultaneous, smart_laplace,
};
use support::{init_logging, mixed_sample_mesh};

const TIGHT_TOLERANCE: f64 = 1e-13;

#[test]
fn e1_element_mean_ratios_and_mesh_quality() {
    init_logging();
    let mesh = mixed_sample_mesh();
    let expected_mean_ratios = [
        0.629_836_657_297_77,
        0.989_743_318_610_79,
        0.914_163_448_527_70,
        1.0,
        0.708_566_239_459_99,
        0.780_445_560_631_32,
        0.974_278_579_257_49,
    ];
    let qualities = mesh.polygon_qualities();
    for (actual, expected) in qualities.iter().zip(expected_mean_ratios) {
        assert!((actual - expected).abs() < 1e-14, "actual={actual} expected={expected}");
    }

    let quality = mesh.quality();
    assert!((quality.q_min() - 0.629_836_657_297_77).abs() < TIGHT_TOLERANCE);
    assert!((quality.q_min_star().unwrap() - 0.629_836_657_297_77).abs() < TIGHT_TOLERANCE);
    assert!((quality.q_mean() - 0.856_719_114_826_44).abs() < TIGHT_TOLERANCE);
    assert_eq!(quality.n_invalid(), Some(0));
}

#[test]
fn e2_basic_getme_simultaneous_five_iterations() {
    init_logging();
    let mesh = mixed_sample_mesh();
    let mut config =
        BasicGetmeSimultaneousConfig::new(0.0, 5, PolygonTransformationSet::GETMeBookExamples).unwrap();
    config.max_iterations = 5;
    let result = basic_getme_simultaneous(mesh, &config).unwrap();

    assert_eq!(result.iterations, 5);
    let node_9 = result.mesh.nodes()[9];
    let node_10 = result.mesh.nodes()[10];
    assert!((node_9.x - 6.285_297_014_697_523_1).abs() < 1e-9);
    assert!((node_9.y - 1.826_704_003_984_736).abs() < 1e-9);
    assert!((node_10.x - 3.327_464_670_193_912_8).abs() < 1e-9);
    assert!((node_10.y - 1.875_503_321_745_196).abs() < 1e-9);
}

#[test]
fn e3_getme_simultaneous_terminates_in_three_iterations() {
    init_logging();
    let mesh = mixed_sample_mesh();
    let mut config = GetmeSimultaneousConfig::new(5, PolygonTransformationSet::GETMeBookExamples).unwrap();
    config.q_mean_improvement_threshold = 0.01;
    let result = getme_simultaneous(mesh, &config).unwrap();

    assert_eq!(result.iterations, 3);
    let node_9 = result.mesh.nodes()[9];
    let node_10 = result.mesh.nodes()[10];
    assert!((node_9.x - 6.229_531_198_893_093_7).abs() < 1e-9);
    assert!((node_9.y - 1.809_184_659_288_301_9).abs() < 1e-9);
    assert!((node_10.x - 3.246_059_218_510_826_1).abs() < 1e-9);
    assert!((node_10.y - 1.720_768_369_571_148_9).abs() < 1e-9);
}

#[test]
fn e4_getme_sequential_terminates_in_thirty_eight_hundred_iterations() {
    init_logging();
    let mesh = mixed_sample_mesh();
    let config = GetmeSequentialConfig::new(5, PolygonTransformationSet::GETMeBookExamples).unwrap();
    let result = getme_sequential(&mesh, &config).unwrap();

    assert_eq!(result.iterations, 3800);
    let node_9 = result.mesh.nodes()[9];
    let node_10 = result.mesh.nodes()[10];
    assert!((node_9.x - 6.206_052_365_341_307_1).abs() < 1e-9);
    assert!((node_9.y - 1.911_267_710_321_855_8).abs() < 1e-9);
    assert!((node_10.x - 3.977_206_808_516_157_8).abs() < 1e-9);
    assert!((node_10.y - 1.562_734_935_341_390_4).abs() < 1e-9);
}

#[test]
fn e5_combined_getme_runs_both_phases() {
    init_logging();
    let mesh = mixed_sample_mesh();
    let config = GetmeConfig::new(5, PolygonTransformationSet::GETMeBookExamples).unwrap();
    let result = getme(mesh, &config).unwrap();

    assert_eq!(result.simultaneous_iterations, 10);
    assert_eq!(result.sequential_iterations, 3800);
    let node_9 = result.mesh.nodes()[9];
    let node_10 = result.mesh.nodes()[10];
    assert!((node_9.x - 6.335_672_052_839_740_3).abs() < 1e-9);
    assert!((node_9.y - 1.874_462_590_969_424_8).abs() < 1e-9);
    assert!((node_10.x - 3.978_771_248_399_411_3).abs() < 1e-9);
    assert!((node_10.y - 1.562_733_518_280_937_2).abs() < 1e-9);
}

#[test]
fn e6_smart_laplace_two_iterations() {
    init_logging();
    let mesh = mixed_sample_mesh();
    let node_9_before = mesh.nodes()[9];
    let config = SmartLaplaceConfig { q_mean_improvement_threshold: 0.0, max_iterations: 2 };
    let result = smart_laplace(mesh, &config).unwrap();

    assert_eq!(result.iterations, 2);
    // Node 9's accepted candidate would decrease the attached polygons'
    // quality sum, so smart Laplace rejects it and leaves it in place.
    assert_eq!(result.mesh.nodes()[9], node_9_before);
}
