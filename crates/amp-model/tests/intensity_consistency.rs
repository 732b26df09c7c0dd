mod common;

use num_complex::Complex64;

use amp_core::kin::DalitzPoint;
use amp_dyn::LineshapeRegistry;
use amp_model::{assemble_model, load_model, AmplitudeModel, PolarizationMatrix};

fn fixture_model() -> (amp_model::ModelDefinition, AmplitudeModel) {
    let definition = common::fixture_definition();
    let model = assemble_model(&definition, &LineshapeRegistry::with_builtins())
        .expect("fixture assembles");
    (definition, model)
}

#[test]
fn interior_intensity_is_finite_and_positive() {
    let (definition, model) = fixture_model();
    let point = common::interior_point(&definition);
    let intensity = model.unpolarized_intensity(&point).expect("intensity");
    assert!(intensity.is_finite());
    assert!(intensity > 0.0);
}

#[test]
fn intensity_vanishes_exactly_on_the_pair_threshold() {
    let (definition, model) = fixture_model();
    let point = common::pair_threshold_point(&definition);
    let intensity = model.unpolarized_intensity(&point).expect("intensity");
    assert!(intensity.abs() < 1e-12, "intensity = {intensity}");
}

#[test]
fn unpolarized_intensity_equals_the_explicit_helicity_grid_sum() {
    let (definition, model) = fixture_model();
    let point = common::interior_point(&definition);
    let direct: f64 = model
        .helicity_grid()
        .iter()
        .map(|config| {
            model
                .total_amplitude(&point, config)
                .expect("amplitude")
                .norm_sqr()
        })
        .sum();
    let intensity = model.unpolarized_intensity(&point).expect("intensity");
    assert!((intensity - direct).abs() <= 1e-12 * direct.max(1.0));
}

#[test]
fn identity_polarization_reproduces_the_unpolarized_intensity() {
    let (definition, model) = fixture_model();
    let point = common::interior_point(&definition);
    let unpolarized = model.unpolarized_intensity(&point).expect("intensity");

    let identity = PolarizationMatrix::identity(2);
    let polarized = model.polarized_intensity(&point, &identity).expect("polarized");
    assert!((polarized - unpolarized).abs() <= 1e-10 * unpolarized.max(1.0));

    let normalized = PolarizationMatrix::identity_normalized(2);
    let averaged = model.polarized_intensity(&point, &normalized).expect("polarized");
    assert!((averaged - unpolarized / 2.0).abs() <= 1e-10 * unpolarized.max(1.0));
}

#[test]
fn polarization_matrix_of_the_wrong_dimension_is_rejected() {
    let (definition, model) = fixture_model();
    let point = common::interior_point(&definition);
    let too_big = PolarizationMatrix::identity(3);
    let err = model.polarized_intensity(&point, &too_big).unwrap_err();
    assert_eq!(err.info().code, "polarization-dimension");
}

#[test]
fn non_hermitian_polarization_is_rejected() {
    let (definition, model) = fixture_model();
    let point = common::interior_point(&definition);
    let skewed = PolarizationMatrix::from_rows(vec![
        vec![Complex64::new(0.5, 0.0), Complex64::new(0.2, 0.1)],
        vec![Complex64::new(0.0, 0.0), Complex64::new(0.5, 0.0)],
    ])
    .expect("square");
    let err = model.polarized_intensity(&point, &skewed).unwrap_err();
    assert_eq!(err.info().code, "polarization-not-hermitian");
}

#[test]
fn parallel_grid_evaluation_matches_the_sequential_path() {
    let (definition, model) = fixture_model();
    let points: Vec<DalitzPoint> = [
        (8.0, 21.8985),
        (7.0, 22.5),
        (9.5, 20.4),
        (11.0, 19.0),
    ]
    .iter()
    .map(|&(sigma1, sigma2)| DalitzPoint::from_two(&definition.kinematics, sigma1, sigma2))
    .collect();
    let parallel = model.unpolarized_intensity_grid(&points).expect("grid");
    for (point, value) in points.iter().zip(&parallel) {
        let sequential = model.unpolarized_intensity(point).expect("intensity");
        assert_eq!(*value, sequential);
    }
}

#[test]
fn unpolarized_intensity_is_invariant_under_the_reference_choice() {
    // The same single chain evaluated against two different reference
    // topologies: once aligned trivially, once through Wigner rotations.
    // Summing over all external helicities removes the basis dependence.
    let aligned_value = common::swapped_spectator_value();
    let mut trivial_value = aligned_value.clone();
    trivial_value["reference_topology"] = serde_json::json!([[2, 3], 1]);

    let registry = LineshapeRegistry::with_builtins();
    let rotated = assemble_model(
        &load_model(&serde_json::from_value(aligned_value).expect("document")).expect("loads"),
        &registry,
    )
    .expect("assembles");
    let trivial_definition =
        load_model(&serde_json::from_value(trivial_value).expect("document")).expect("loads");
    let trivial = assemble_model(&trivial_definition, &registry).expect("assembles");

    let point = DalitzPoint::from_two(&trivial_definition.kinematics, 8.0, 21.8985);
    let with_rotation = rotated.unpolarized_intensity(&point).expect("intensity");
    let without = trivial.unpolarized_intensity(&point).expect("intensity");
    assert!(
        (with_rotation - without).abs() <= 1e-9 * without.max(1.0),
        "rotated = {with_rotation}, trivial = {without}"
    );
}
