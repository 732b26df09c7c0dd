//! Wigner rotation matrices and Clebsch-Gordan coefficients.
//!
//! All angular-momentum arguments are doubled integers (see [`crate::spin`]),
//! so half-integer spins are handled without rounding. Selection-rule
//! violations yield an exact `0.0` rather than an error; these are pure
//! closed-form evaluations used in the innermost amplitude sums.

fn factorial(n: i32) -> f64 {
    debug_assert!(n >= 0, "factorial of negative argument");
    (1..=i64::from(n)).map(|k| k as f64).product()
}

/// Halves a doubled angular-momentum combination that must be even.
fn half(doubled: i32) -> i32 {
    debug_assert!(doubled % 2 == 0, "odd doubled combination");
    doubled / 2
}

fn same_parity(a: i32, b: i32) -> bool {
    (a - b) % 2 == 0
}

/// Wigner small-d matrix element `d^j_{m' m}(beta)` with doubled indices.
///
/// Convention: `d^j_{m' m}(beta) = <j m'| exp(-i beta J_y) |j m>`.
pub fn wigner_small_d(two_j: i32, two_mp: i32, two_m: i32, beta: f64) -> f64 {
    if two_j < 0
        || two_mp.abs() > two_j
        || two_m.abs() > two_j
        || !same_parity(two_j, two_m)
        || !same_parity(two_j, two_mp)
    {
        return 0.0;
    }
    let j_plus_m = half(two_j + two_m);
    let j_minus_m = half(two_j - two_m);
    let j_plus_mp = half(two_j + two_mp);
    let j_minus_mp = half(two_j - two_mp);
    let k = half(two_mp - two_m);

    let prefactor = (factorial(j_plus_mp)
        * factorial(j_minus_mp)
        * factorial(j_plus_m)
        * factorial(j_minus_m))
    .sqrt();

    let half_beta = 0.5 * beta;
    let cos_half = half_beta.cos();
    let sin_half = half_beta.sin();

    let s_min = 0.max(-k);
    let s_max = j_plus_m.min(j_minus_mp);
    let mut sum = 0.0;
    for s in s_min..=s_max {
        let sign = if (k + s) % 2 == 0 { 1.0 } else { -1.0 };
        let denominator = factorial(j_plus_m - s)
            * factorial(s)
            * factorial(k + s)
            * factorial(j_minus_mp - s);
        let cos_power = half(2 * two_j + two_m - two_mp) - 2 * s;
        let sin_power = k + 2 * s;
        sum += sign * cos_half.powi(cos_power) * sin_half.powi(sin_power) / denominator;
    }
    prefactor * sum
}

/// Clebsch-Gordan coefficient `<j1 m1 j2 m2 | j m>` with doubled indices.
///
/// Racah's closed form; zero whenever a selection rule fails.
pub fn clebsch_gordan(
    two_j1: i32,
    two_m1: i32,
    two_j2: i32,
    two_m2: i32,
    two_j: i32,
    two_m: i32,
) -> f64 {
    if two_m1 + two_m2 != two_m
        || two_m1.abs() > two_j1
        || two_m2.abs() > two_j2
        || two_m.abs() > two_j
        || two_j < (two_j1 - two_j2).abs()
        || two_j > two_j1 + two_j2
        || !same_parity(two_j1 + two_j2, two_j)
        || !same_parity(two_j1, two_m1)
        || !same_parity(two_j2, two_m2)
    {
        return 0.0;
    }

    let j1_plus_m1 = half(two_j1 + two_m1);
    let j1_minus_m1 = half(two_j1 - two_m1);
    let j2_plus_m2 = half(two_j2 + two_m2);
    let j2_minus_m2 = half(two_j2 - two_m2);
    let j_plus_m = half(two_j + two_m);
    let j_minus_m = half(two_j - two_m);
    let j1_plus_j2_minus_j = half(two_j1 + two_j2 - two_j);
    let j1_minus_j2_plus_j = half(two_j1 - two_j2 + two_j);
    let j2_minus_j1_plus_j = half(two_j2 - two_j1 + two_j);
    let j_minus_j2_plus_m1 = half(two_j - two_j2 + two_m1);
    let j_minus_j1_minus_m2 = half(two_j - two_j1 - two_m2);

    let triangle = factorial(j1_plus_j2_minus_j) * factorial(j1_minus_j2_plus_j)
        * factorial(j2_minus_j1_plus_j)
        / factorial(half(two_j1 + two_j2 + two_j) + 1);
    let prefactor = ((f64::from(two_j) + 1.0)
        * triangle
        * factorial(j_plus_m)
        * factorial(j_minus_m)
        * factorial(j1_minus_m1)
        * factorial(j1_plus_m1)
        * factorial(j2_minus_m2)
        * factorial(j2_plus_m2))
    .sqrt();

    let k_min = 0.max(-j_minus_j2_plus_m1).max(-j_minus_j1_minus_m2);
    let k_max = j1_plus_j2_minus_j.min(j1_minus_m1).min(j2_plus_m2);
    let mut sum = 0.0;
    for k in k_min..=k_max {
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        let denominator = factorial(k)
            * factorial(j1_plus_j2_minus_j - k)
            * factorial(j1_minus_m1 - k)
            * factorial(j2_plus_m2 - k)
            * factorial(j_minus_j2_plus_m1 + k)
            * factorial(j_minus_j1_minus_m2 + k);
        sum += sign / denominator;
    }
    prefactor * sum
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn trivial_rotation_is_identity() {
        assert!((wigner_small_d(0, 0, 0, 0.7) - 1.0).abs() < TOLERANCE);
        assert!((wigner_small_d(3, 1, 1, 0.0) - 1.0).abs() < TOLERANCE);
        assert!((wigner_small_d(3, 1, 3, 0.0)).abs() < TOLERANCE);
    }

    #[test]
    fn spin_half_elements_match_half_angle_forms() {
        let beta = 0.83;
        assert!((wigner_small_d(1, 1, 1, beta) - (beta / 2.0).cos()).abs() < TOLERANCE);
        assert!((wigner_small_d(1, 1, -1, beta) + (beta / 2.0).sin()).abs() < TOLERANCE);
        assert!((wigner_small_d(1, -1, 1, beta) - (beta / 2.0).sin()).abs() < TOLERANCE);
    }

    #[test]
    fn coupling_of_two_spin_halves() {
        let inv_sqrt2 = std::f64::consts::FRAC_1_SQRT_2;
        assert!((clebsch_gordan(1, 1, 1, -1, 2, 0) - inv_sqrt2).abs() < TOLERANCE);
        assert!((clebsch_gordan(1, 1, 1, -1, 0, 0) - inv_sqrt2).abs() < TOLERANCE);
        assert!((clebsch_gordan(1, -1, 1, 1, 0, 0) + inv_sqrt2).abs() < TOLERANCE);
        assert!(clebsch_gordan(1, 1, 1, 1, 2, 0).abs() < TOLERANCE);
    }
}
