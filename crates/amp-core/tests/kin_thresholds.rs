use amp_core::{breakup_momentum_sq, kallen, AmpError, DalitzPoint, Kinematics};

fn three_body() -> Kinematics {
    Kinematics::from_lists(
        &[
            "Lb".to_string(),
            "L".to_string(),
            "K".to_string(),
            "pi".to_string(),
        ],
        &[0, 1, 2, 3],
        &[5.62, 1.12, 0.49, 0.14],
        &[
            "1/2".to_string(),
            "1/2".to_string(),
            "0".to_string(),
            "0".to_string(),
        ],
    )
    .expect("kinematics")
}

#[test]
fn kallen_vanishes_exactly_at_thresholds() {
    // Integer mass squares are exact in binary floating point.
    assert_eq!(kallen(9.0, 1.0, 4.0), 0.0);
    assert_eq!(kallen(1.0, 1.0, 4.0), 0.0);
    assert_eq!(kallen(16.0, 4.0, 4.0), 16.0 * 16.0 - 2.0 * 16.0 * 8.0);
}

#[test]
fn breakup_momentum_vanishes_exactly_at_both_thresholds() {
    let (ma, mb) = (1.12, 0.49);
    let upper = (ma + mb) * (ma + mb);
    let lower = (ma - mb) * (ma - mb);
    assert_eq!(breakup_momentum_sq(upper, ma, mb), 0.0);
    assert_eq!(breakup_momentum_sq(lower, ma, mb), 0.0);
    assert!(breakup_momentum_sq(upper + 0.5, ma, mb) > 0.0);
}

#[test]
fn list_misalignment_is_rejected() {
    let err = Kinematics::from_lists(
        &["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()],
        &[0, 1, 2, 3],
        &[1.0, 0.2, 0.2],
        &["0".to_string(), "0".to_string(), "0".to_string(), "0".to_string()],
    )
    .expect_err("misaligned lists");
    assert!(matches!(err, AmpError::Kinematics(_)));
    assert_eq!(err.info().code, "kinematics-length-mismatch");
}

#[test]
fn index_gaps_are_rejected() {
    let err = Kinematics::from_lists(
        &["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()],
        &[0, 1, 2, 4],
        &[1.0, 0.2, 0.2, 0.2],
        &["0".to_string(), "0".to_string(), "0".to_string(), "0".to_string()],
    )
    .expect_err("index gap");
    assert_eq!(err.info().code, "kinematics-index-coverage");
}

#[test]
fn closure_completes_third_invariant() {
    let kin = three_body();
    let point = DalitzPoint::from_two(&kin, 8.0, 21.8985);
    let total = point.sigma1 + point.sigma2 + point.sigma3;
    assert!((total - kin.closure_sum()).abs() < 1e-12);

    let rebuilt = DalitzPoint::from_invariants(&kin, point.sigma1, point.sigma2, point.sigma3)
        .expect("closure holds");
    assert_eq!(rebuilt, point);

    let err = DalitzPoint::from_invariants(&kin, 8.0, 21.0, 1.0).expect_err("broken closure");
    assert_eq!(err.info().code, "dalitz-closure");
}

#[test]
fn interior_point_is_physical_and_corners_are_not() {
    let kin = three_body();
    let interior = DalitzPoint::from_two(&kin, 8.0, 21.8985);
    assert!(kin.is_physical(&interior).expect("query"));
    let cosine = kin.cos_decay_angle(&interior, 3).expect("angle");
    assert!(cosine.abs() <= 1.0);

    let outside = DalitzPoint::from_two(&kin, 0.1, 21.8985);
    assert!(!kin.is_physical(&outside).expect("query"));
}
