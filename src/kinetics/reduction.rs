use super::Kinetics;
use crate::GasResult;

/// Adaptive reaction activator.
///
/// Decides, per state, which reactions are dynamically negligible by
/// accumulating their temperature and species contributions against unit
/// error budgets scaled by (rel_tol, abs_tol). The resulting mask feeds
/// [`Kinetics::subset`].
pub struct AdaptiveActivator {
    pub rel_tol: f64,
    pub abs_tol: f64,
}

impl AdaptiveActivator {
    pub fn new(rel_tol: f64, abs_tol: f64) -> Self {
        Self { rel_tol, abs_tol }
    }

    /// Scans reactions in index order and deactivates each one whose
    /// accumulated contributions stay within all budgets.
    ///
    /// This is a greedy O(Nr·nnz) heuristic over the input order, not a
    /// global optimum.
    pub fn activation_mask(&self, kin: &mut Kinetics) -> GasResult<Vec<bool>> {
        let q = kin.net_rates_of_progress()?;
        let (t, rho, cv, y, u, w) = {
            let mut th = kin.thermo().borrow_mut();
            (
                th.temperature(),
                th.density(),
                th.cv_mass()?,
                th.mass_fractions().clone(),
                th.partial_molar_int_energies()?,
                th.molecular_weights().clone(),
            )
        };
        let cols = kin.net_stoich_columns();
        let nr = kin.n_reactions();

        // per-reaction temperature change rate through −u/(ρ·cv), scaled
        // by the temperature budget
        let t_den = rho * cv * (self.rel_tol * t + self.abs_tol);

        let mut mask = vec![true; nr];
        let mut dt_err = 0.0;
        let mut dy_err = vec![0.0; y.len()];
        for j in 0..nr {
            let mut du = 0.0;
            for &(i, nu) in &cols[j] {
                du += u[i] * nu * q[j];
            }
            let dt_j = -du / t_den;

            // non-finite contributions (vanishing budgets) keep a reaction
            // active, as does any budget overrun
            let dt_new = dt_err + dt_j;
            if !(dt_new.abs() <= 1.0) {
                continue;
            }
            let mut within = true;
            for &(i, nu) in &cols[j] {
                let dy_ij = w[i] * nu * q[j] / (rho * (self.rel_tol * y[i] + self.abs_tol));
                if !((dy_err[i] + dy_ij).abs() <= 1.0) {
                    within = false;
                    break;
                }
            }
            if !within {
                continue;
            }

            mask[j] = false;
            dt_err = dt_new;
            for &(i, nu) in &cols[j] {
                dy_err[i] += w[i] * nu * q[j] / (rho * (self.rel_tol * y[i] + self.abs_tol));
            }
        }
        Ok(mask)
    }
}
