use super::critical::CriticalProperties;
use crate::GAS_CONSTANT;
use ndarray::Array1;
use roots::Roots;
use std::f64::consts::SQRT_2;

/// Solves the compressibility cubic
/// Z³ + (B−1)Z² + (A−3B²−2B)Z + (B³+B²−AB) = 0
/// and selects a root.
///
/// With several real roots the smallest non-negative one wins; if all roots
/// are negative the largest is returned. The boolean marks the degenerate
/// double-root branch.
pub(crate) fn solve_z(a: f64, b: f64) -> (f64, bool) {
    let c2 = b - 1.0;
    let c1 = a - 3.0 * b * b - 2.0 * b;
    let c0 = b * b * b + b * b - a * b;
    match roots::find_roots_cubic(1.0, c2, c1, c0) {
        Roots::One([z]) => (z, false),
        Roots::Two([z1, z2]) => (select_root(&[z1, z2]), true),
        Roots::Three([z1, z2, z3]) => (select_root(&[z1, z2, z3]), false),
        _ => unreachable!(),
    }
}

fn select_root(zs: &[f64]) -> f64 {
    let smallest = zs
        .iter()
        .copied()
        .filter(|&z| z >= 0.0)
        .fold(f64::INFINITY, f64::min);
    if smallest.is_finite() {
        smallest
    } else {
        zs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Composition-dependent, temperature-independent mixture constants.
pub(crate) struct RealFluidConstants {
    /// mixture covolume in m³/kmol
    pub b_mix: f64,
}

pub(crate) fn mixture_constants(crit: &CriticalProperties, x: &Array1<f64>) -> RealFluidConstants {
    let b_mix = x
        .iter()
        .zip(crit.b.iter())
        .map(|(xi, bi)| xi * bi)
        .sum::<f64>();
    RealFluidConstants { b_mix }
}

/// Temperature-dependent attraction sums of the mixture.
struct Attraction {
    a_mix: f64,
    da_dt: f64,
    d2a_dt2: f64,
    /// Σ_j X_j a_kj α_kj per species
    a_i: Array1<f64>,
    da_dt_i: Array1<f64>,
}

fn mix_attraction(crit: &CriticalProperties, x: &Array1<f64>, t: f64) -> Attraction {
    let n = x.len();
    let mut a_mix = 0.0;
    let mut da_dt = 0.0;
    let mut d2a_dt2 = 0.0;
    let mut a_i = Array1::zeros(n);
    let mut da_dt_i = Array1::zeros(n);
    for i in 0..n {
        for j in 0..n {
            let a = crit.a_ij[(i, j)];
            let c = crit.c_ij[(i, j)];
            let sqt = (t / crit.tc_ij[(i, j)]).sqrt();
            let s = 1.0 + c * (1.0 - sqt);
            let aa = a * s * s;
            let daa = -a * c * s * sqt / t;
            let d2aa = a * c * sqt * (c * sqt + s) / (2.0 * t * t);
            a_i[i] += x[j] * aa;
            da_dt_i[i] += x[j] * daa;
            let w = x[i] * x[j];
            a_mix += w * aa;
            da_dt += w * daa;
            d2a_dt2 += w * d2aa;
        }
    }
    Attraction {
        a_mix,
        da_dt,
        d2a_dt2,
        a_i,
        da_dt_i,
    }
}

/// Molar volume from (T, p) via the compressibility cubic.
///
/// Returns the volume in m³/kmol and the degenerate-branch flag.
pub(crate) fn volume_from_pt(
    crit: &CriticalProperties,
    consts: &RealFluidConstants,
    x: &Array1<f64>,
    t: f64,
    p: f64,
) -> (f64, bool) {
    let rt = GAS_CONSTANT * t;
    let a_mix = mix_attraction(crit, x, t).a_mix;
    let a = a_mix * p / (rt * rt);
    let b = consts.b_mix * p / rt;
    let (z, degenerate) = solve_z(a, b);
    (z * rt / p, degenerate)
}

/// Peng-Robinson departure state at fixed (T, V, X), molar basis.
///
/// All departures are differences between the real fluid and the ideal gas
/// at the same temperature and molar volume; the phase blends them linearly
/// with its blend factor.
pub(crate) struct RealFluidState {
    /// molar volume in m³/kmol
    pub v: f64,
    /// Peng-Robinson pressure at (T, V) in Pa
    pub p_pr: f64,
    pub dp_dt: f64,
    pub dp_dv: f64,
    /// partial molar volumes −(∂p/∂N)/(∂p/∂V) in m³/kmol
    pub dv_dn: Array1<f64>,
    /// molar departures, J/kmol and J/kmol/K
    pub h_dep: f64,
    pub u_dep: f64,
    pub s_dep: f64,
    pub cp_dep: f64,
    pub cv_dep: f64,
    /// partial molar departures
    pub h_dep_i: Array1<f64>,
    pub s_dep_i: Array1<f64>,
    /// residual chemical potentials (∂A_res/∂N) in J/kmol
    pub mu_res: Array1<f64>,
}

pub(crate) fn evaluate_real_fluid(
    crit: &CriticalProperties,
    consts: &RealFluidConstants,
    x: &Array1<f64>,
    t: f64,
    v: f64,
) -> RealFluidState {
    let n = x.len();
    let r = GAS_CONSTANT;
    let rt = r * t;
    let at = mix_attraction(crit, x, t);
    let b = consts.b_mix;

    let vmb = v - b;
    let den = v * v + 2.0 * b * v - b * b;
    let p_pr = rt / vmb - at.a_mix / den;
    let dp_dt = r / vmb - at.da_dt / den;
    let dp_dv = -rt / (vmb * vmb) + 2.0 * at.a_mix * (v + b) / (den * den);

    // K1 = ln[(V+(1−√2)b)/(V+(1+√2)b)] / (b√8) and its covolume derivative
    let sqrt8 = 2.0 * SQRT_2;
    let k1 = ((v + (1.0 - SQRT_2) * b) / (v + (1.0 + SQRT_2) * b)).ln() / (b * sqrt8);
    let dk1_db = -k1 / b - v / (b * den);

    // composition derivatives of pressure and volume
    let mut dp_dn = Array1::zeros(n);
    let mut dv_dn = Array1::zeros(n);
    for k in 0..n {
        let bk = crit.b[k];
        dp_dn[k] = rt / vmb + rt * bk / (vmb * vmb) - 2.0 * at.a_i[k] / den
            + 2.0 * at.a_mix * bk * vmb / (den * den);
        dv_dn[k] = -dp_dn[k] / dp_dv;
    }

    // molar departures
    let a_tt = at.a_mix - t * at.da_dt;
    let h_dep = p_pr * v - rt + a_tt * k1;
    let u_dep = a_tt * k1;
    let s_dep = r * (vmb / v).ln() - at.da_dt * k1;
    let cv_dep = -t * at.d2a_dt2 * k1;
    let cp_dep = cv_dep - t * dp_dt * dp_dt / dp_dv - r;

    // partial molar departures; the volume dependence enters through
    // (∂H/∂V)·v̄ and (∂S/∂V)·v̄
    let dh_dv = p_pr + v * dp_dv + a_tt / den;
    let ds_dv = r / vmb - at.da_dt / den;
    let ln_vmb_v = (vmb / v).ln();
    let mut h_dep_i = Array1::zeros(n);
    let mut s_dep_i = Array1::zeros(n);
    let mut mu_res = Array1::zeros(n);
    for k in 0..n {
        let bk = crit.b[k];
        h_dep_i[k] = v * dp_dn[k] - rt
            + 2.0 * (at.a_i[k] - t * at.da_dt_i[k]) * k1
            + a_tt * dk1_db * bk
            + dh_dv * dv_dn[k];
        s_dep_i[k] = -r + r * ln_vmb_v - r * bk / vmb
            - 2.0 * at.da_dt_i[k] * k1
            - at.da_dt * dk1_db * bk
            + ds_dv * dv_dn[k];
        mu_res[k] = -rt * ln_vmb_v + rt * bk / vmb + 2.0 * at.a_i[k] * k1
            + at.a_mix * dk1_db * bk;
    }

    RealFluidState {
        v,
        p_pr,
        dp_dt,
        dp_dv,
        dv_dn,
        h_dep,
        u_dep,
        s_dep,
        cp_dep,
        cv_dep,
        h_dep_i,
        s_dep_i,
        mu_res,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thermo::critical::{builtin_critical_record, CriticalProperties};
    use approx::assert_relative_eq;
    use ndarray::arr1;

    fn residual(a: f64, b: f64, z: f64) -> f64 {
        z * z * z + (b - 1.0) * z * z + (a - 3.0 * b * b - 2.0 * b) * z
            + (b * b * b + b * b - a * b)
    }

    #[test]
    fn supercritical_hydrogen_has_single_compressed_root() {
        // pure H2 at 60 K and 50 bar, well above its critical temperature
        let crit = CriticalProperties::from_records(
            vec![builtin_critical_record("H2").unwrap()],
            None,
        );
        let x = arr1(&[1.0]);
        let consts = mixture_constants(&crit, &x);
        let (v, degenerate) = volume_from_pt(&crit, &consts, &x, 60.0, 5.0e6);
        assert!(!degenerate);
        let z = 5.0e6 * v / (GAS_CONSTANT * 60.0);
        assert!(z > 0.5 && z < 0.95, "z = {}", z);
    }

    #[test]
    fn selected_root_satisfies_the_cubic() {
        for &(a, b) in &[(0.5276, 0.1666), (0.02, 0.005), (1.2, 0.08)] {
            let (z, _) = solve_z(a, b);
            assert!(z >= 0.0);
            assert!(residual(a, b, z).abs() < 1e-9, "a={} b={} z={}", a, b, z);
        }
    }

    #[test]
    fn subcritical_selection_prefers_smallest_nonnegative() {
        // three-real-root region: any other real root must be larger
        let (a, b) = (1.2, 0.08);
        let (z, _) = solve_z(a, b);
        for probe in &[z * 0.2, z * 0.5, z * 0.9] {
            // no sign change of the cubic below the selected root
            assert!(
                residual(a, b, *probe).signum() == residual(a, b, 0.0).signum()
                    || residual(a, b, *probe).abs() < 1e-12
            );
        }
    }

    #[test]
    fn departures_vanish_for_vanishing_attraction_and_covolume() {
        // synthetic species with negligible a and b behaves ideally
        let mut rec = builtin_critical_record("H2").unwrap();
        rec.tc = 1e-6;
        rec.vc = 1e-9;
        let crit = CriticalProperties::from_records(vec![rec], None);
        let x = arr1(&[1.0]);
        let consts = mixture_constants(&crit, &x);
        let v = 24.0; // m³/kmol
        let st = evaluate_real_fluid(&crit, &consts, &x, 300.0, v);
        assert_relative_eq!(st.p_pr, GAS_CONSTANT * 300.0 / v, max_relative = 1e-6);
        assert!(st.h_dep.abs() < 1.0);
        assert!(st.cp_dep.abs() < 1e-3);
        assert_relative_eq!(st.dv_dn[0], v, max_relative = 1e-6);
    }

    #[test]
    fn partial_molar_departures_close_the_mixture_sums() {
        let crit = CriticalProperties::from_records(
            vec![
                builtin_critical_record("H2").unwrap(),
                builtin_critical_record("N2").unwrap(),
            ],
            None,
        );
        let x = arr1(&[0.3, 0.7]);
        let consts = mixture_constants(&crit, &x);
        let st = evaluate_real_fluid(&crit, &consts, &x, 150.0, 1.5);
        let h_sum: f64 = (0..2).map(|k| x[k] * st.h_dep_i[k]).sum();
        let s_sum: f64 = (0..2).map(|k| x[k] * st.s_dep_i[k]).sum();
        let v_sum: f64 = (0..2).map(|k| x[k] * st.dv_dn[k]).sum();
        assert_relative_eq!(h_sum, st.h_dep, max_relative = 1e-10);
        assert_relative_eq!(s_sum, st.s_dep, max_relative = 1e-10);
        assert_relative_eq!(v_sum, st.v, max_relative = 1e-10);
    }
}
