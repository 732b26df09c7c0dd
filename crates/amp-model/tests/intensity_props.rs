mod common;

use proptest::prelude::*;

use amp_core::kin::DalitzPoint;
use amp_dyn::LineshapeRegistry;
use amp_model::{assemble_model, PolarizationMatrix};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn intensities_are_finite_and_non_negative_inside_the_dalitz_region(
        sigma1 in 1.0f64..20.0,
        sigma2 in 2.0f64..26.0,
    ) {
        let definition = common::fixture_definition();
        let point = DalitzPoint::from_two(&definition.kinematics, sigma1, sigma2);
        prop_assume!(definition.kinematics.is_physical(&point).expect("physical"));

        let model = assemble_model(&definition, &LineshapeRegistry::with_builtins())
            .expect("assembles");
        let intensity = model.unpolarized_intensity(&point).expect("intensity");
        prop_assert!(intensity.is_finite());
        prop_assert!(intensity >= 0.0);
    }

    #[test]
    fn averaged_polarization_halves_the_unpolarized_intensity(
        sigma1 in 4.0f64..16.0,
        sigma2 in 16.0f64..25.0,
    ) {
        let definition = common::fixture_definition();
        let point = DalitzPoint::from_two(&definition.kinematics, sigma1, sigma2);
        prop_assume!(definition.kinematics.is_physical(&point).expect("physical"));

        let model = assemble_model(&definition, &LineshapeRegistry::with_builtins())
            .expect("assembles");
        let unpolarized = model.unpolarized_intensity(&point).expect("intensity");
        let averaged = model
            .polarized_intensity(&point, &PolarizationMatrix::identity_normalized(2))
            .expect("polarized");
        prop_assert!((averaged - unpolarized / 2.0).abs() <= 1e-9 * unpolarized.max(1.0));
    }
}
