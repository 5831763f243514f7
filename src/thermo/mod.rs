//! Phase state and blended real-fluid thermodynamics.
//!
//! [`ThermoPhase`] owns the (T, ρ, Y) state of a homogeneous gas mixture and
//! evaluates its thermodynamic properties with a blend of the ideal-gas
//! model and the Peng-Robinson departure, weighted by a blend factor
//! β ∈ [0, 1].

mod critical;
mod cubic;
mod nasa;

pub use critical::{builtin_critical_record, CriticalProperties, CriticalRecord, DEFAULT_K_IJ};
pub use nasa::{Nasa7, SpeciesThermo};

use crate::{GasError, GasResult, GAS_CONSTANT, SMALL_NUMBER};
use cubic::{RealFluidConstants, RealFluidState};
use indexmap::IndexMap;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A single species of the phase.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Species {
    pub name: String,
    /// molecular weight in kg/kmol
    pub molarweight: f64,
    pub thermo: Nasa7,
    /// critical constants; the built-in table is consulted when absent
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical: Option<CriticalRecord>,
}

impl Species {
    pub fn new(name: &str, molarweight: f64, thermo: Nasa7) -> Self {
        Self {
            name: name.to_string(),
            molarweight,
            thermo,
            critical: None,
        }
    }
}

struct RealFluidCache {
    tlast: f64,
    rholast: f64,
    ylast: Array1<f64>,
    consts: RealFluidConstants,
    state: RealFluidState,
}

/// State and thermodynamic properties of a homogeneous gas mixture.
pub struct ThermoPhase {
    species: Vec<Species>,
    species_index: IndexMap<String, usize>,
    mw: Array1<f64>,
    ref_pressure: f64,
    blend: f64,
    crit: Option<CriticalProperties>,
    ref_thermo: SpeciesThermo,

    temperature: f64,
    density: f64,
    ideal_density: f64,
    massfracs: Array1<f64>,
    molefracs: Array1<f64>,
    mean_mw: f64,

    real: Option<RealFluidCache>,
    last_cubic_degenerate: bool,
}

impl ThermoPhase {
    /// Creates a phase from its species, a reference pressure in Pa and the
    /// blend factor β (0 = ideal gas, 1 = full Peng-Robinson).
    ///
    /// The initial state is pure first species at 300 K and the ideal
    /// density corresponding to the reference pressure.
    pub fn new(species: Vec<Species>, ref_pressure: f64, blend: f64) -> GasResult<Self> {
        if species.is_empty() {
            return Err(GasError::NotReady("ThermoPhase::new".into()));
        }
        assert!((0.0..=1.0).contains(&blend));

        let n = species.len();
        let mut species_index = IndexMap::with_capacity(n);
        let mut mw = Array1::zeros(n);
        for (k, s) in species.iter().enumerate() {
            species_index.insert(s.name.clone(), k);
            mw[k] = s.molarweight;
        }

        let records: Option<Vec<CriticalRecord>> = species
            .iter()
            .map(|s| {
                s.critical
                    .clone()
                    .or_else(|| builtin_critical_record(&s.name))
            })
            .collect();
        let crit = match records {
            Some(r) => Some(CriticalProperties::from_records(r, None)),
            None if blend > 0.0 => {
                let missing = species
                    .iter()
                    .find(|s| {
                        s.critical.is_none() && builtin_critical_record(&s.name).is_none()
                    })
                    .unwrap();
                return Err(GasError::NotReady(format!(
                    "critical properties for `{}`",
                    missing.name
                )));
            }
            None => None,
        };

        let ref_thermo = SpeciesThermo::new(species.iter().map(|s| s.thermo.clone()).collect());

        let mut massfracs = Array1::zeros(n);
        massfracs[0] = 1.0;
        let mut phase = Self {
            species,
            species_index,
            mw,
            ref_pressure,
            blend,
            crit,
            ref_thermo,
            temperature: 300.0,
            density: 1.0,
            ideal_density: 1.0,
            massfracs: Array1::zeros(n),
            molefracs: Array1::zeros(n),
            mean_mw: 1.0,
            real: None,
            last_cubic_degenerate: false,
        };
        phase.set_mass_fractions(massfracs.as_slice().unwrap());
        phase.density = ref_pressure * phase.mean_mw / (GAS_CONSTANT * phase.temperature);
        phase.ideal_density = phase.density;
        Ok(phase)
    }

    /// Creates a phase from a JSON list of species records.
    pub fn from_json(json: &str, ref_pressure: f64, blend: f64) -> GasResult<Self> {
        let species: Vec<Species> = serde_json::from_str(json)?;
        Self::new(species, ref_pressure, blend)
    }

    /// Replaces the binary interaction parameters of the mixing rules.
    pub fn set_binary_interaction(&mut self, k_ij: Array2<f64>) {
        if let Some(crit) = self.crit.take() {
            let records = crit.records().to_vec();
            self.crit = Some(CriticalProperties::from_records(records, Some(k_ij)));
            self.real = None;
        }
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species_index.get(name).copied()
    }

    /// Molecular weights in kg/kmol.
    pub fn molecular_weights(&self) -> &Array1<f64> {
        &self.mw
    }

    pub fn ref_pressure(&self) -> f64 {
        self.ref_pressure
    }

    pub fn blend_factor(&self) -> f64 {
        self.blend
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Mass density in kg/m³.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Pressure in Pa, evaluated from the ideal-density snapshot so that it
    /// round-trips exactly with [`ThermoPhase::set_pressure`].
    pub fn pressure(&self) -> f64 {
        GAS_CONSTANT * self.temperature * self.ideal_density / self.mean_mw
    }

    pub fn mean_molecular_weight(&self) -> f64 {
        self.mean_mw
    }

    pub fn mass_fractions(&self) -> &Array1<f64> {
        &self.massfracs
    }

    pub fn mole_fractions(&self) -> &Array1<f64> {
        &self.molefracs
    }

    /// Molar concentrations in kmol/m³.
    pub fn concentrations(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.n_species(), |k| {
            self.density * self.massfracs[k] / self.mw[k]
        })
    }

    /// Total molar concentration in kmol/m³.
    pub fn molar_density(&self) -> f64 {
        self.density / self.mean_mw
    }

    /// True if the last cubic solve hit the degenerate double-root branch.
    pub fn last_cubic_degenerate(&self) -> bool {
        self.last_cubic_degenerate
    }

    /// Sets temperature, mass density and mass fractions.
    pub fn set_state(&mut self, t: f64, density: f64, y: &[f64]) {
        self.set_mass_fractions(y);
        self.temperature = t;
        self.density = density;
        self.ideal_density = density;
    }

    /// Sets temperature, pressure and mass fractions.
    pub fn set_state_tpy(&mut self, t: f64, p: f64, y: &[f64]) -> GasResult<()> {
        self.set_mass_fractions(y);
        self.temperature = t;
        self.set_pressure(p)
    }

    /// Sets temperature, pressure and mole fractions.
    pub fn set_state_tpx(&mut self, t: f64, p: f64, x: &[f64]) -> GasResult<()> {
        self.set_mole_fractions(x);
        self.temperature = t;
        self.set_pressure(p)
    }

    pub fn set_temperature(&mut self, t: f64) {
        self.temperature = t;
    }

    pub fn set_density(&mut self, density: f64) {
        self.density = density;
        self.ideal_density = density;
    }

    /// Sets the pressure at the current temperature and composition.
    ///
    /// The density becomes (1−β)·ρ_ideal + β·ρ_PR, with ρ_PR obtained from
    /// the compressibility cubic; the ideal density is retained so that
    /// [`ThermoPhase::pressure`] returns `p` exactly.
    pub fn set_pressure(&mut self, p: f64) -> GasResult<()> {
        let rho_ideal = p * self.mean_mw / (GAS_CONSTANT * self.temperature);
        let rho = if self.blend == 0.0 {
            rho_ideal
        } else {
            let crit = self
                .crit
                .as_ref()
                .ok_or_else(|| GasError::NotReady("set_pressure".into()))?;
            let consts = cubic::mixture_constants(crit, &self.molefracs);
            let (v, degenerate) =
                cubic::volume_from_pt(crit, &consts, &self.molefracs, self.temperature, p);
            self.last_cubic_degenerate = degenerate;
            let rho_pr = self.mean_mw / v;
            (1.0 - self.blend) * rho_ideal + self.blend * rho_pr
        };
        self.density = rho;
        self.ideal_density = rho_ideal;
        Ok(())
    }

    /// Sets the composition from mass fractions (normalized on input).
    pub fn set_mass_fractions(&mut self, y: &[f64]) {
        assert_eq!(y.len(), self.n_species());
        let sum: f64 = y.iter().map(|v| v.max(0.0)).sum();
        for k in 0..y.len() {
            self.massfracs[k] = y[k].max(0.0) / sum;
        }
        let inv_mw: f64 = (0..y.len()).map(|k| self.massfracs[k] / self.mw[k]).sum();
        self.mean_mw = 1.0 / inv_mw;
        for k in 0..y.len() {
            self.molefracs[k] = self.massfracs[k] * self.mean_mw / self.mw[k];
        }
    }

    /// Sets the composition from mole fractions (normalized on input).
    pub fn set_mole_fractions(&mut self, x: &[f64]) {
        assert_eq!(x.len(), self.n_species());
        let sum: f64 = x.iter().map(|v| v.max(0.0)).sum();
        self.mean_mw = (0..x.len()).map(|k| x[k].max(0.0) / sum * self.mw[k]).sum();
        for k in 0..x.len() {
            self.molefracs[k] = x[k].max(0.0) / sum;
            self.massfracs[k] = self.molefracs[k] * self.mw[k] / self.mean_mw;
        }
    }

    /// Sets the state to the composition implied by the dimensionless
    /// chemical potentials μ/RT, holding the temperature.
    ///
    /// Exponents below −600 give a vanishing partial pressure; exponents
    /// above 300 are continued with a capped quadratic blow-up.
    pub fn set_to_equil_state(&mut self, mu_rt: &[f64]) -> GasResult<()> {
        assert_eq!(mu_rt.len(), self.n_species());
        self.update_ref();
        let mut pp = vec![0.0; self.n_species()];
        let mut psum = 0.0;
        for k in 0..pp.len() {
            let tmp = mu_rt[k] - self.ref_thermo.g0_rt()[k];
            if tmp < -600.0 {
                pp[k] = 0.0;
            } else if tmp > 300.0 {
                let tmp2 = tmp / 300.0;
                pp[k] = self.ref_pressure * 300f64.exp() * tmp2 * tmp2;
            } else {
                pp[k] = self.ref_pressure * tmp.exp();
            }
            psum += pp[k];
        }
        let x: Vec<f64> = pp.iter().map(|p| p / psum).collect();
        self.set_mole_fractions(&x);
        self.set_pressure(psum)
    }

    fn update_ref(&mut self) {
        self.ref_thermo.update(self.temperature);
    }

    /// Refreshes the real-fluid cache.
    ///
    /// A composition change re-runs the mixture constants and the
    /// thermodynamic state; a (T, ρ) change with unchanged composition
    /// re-runs only the latter.
    fn update_real_fluid(&mut self) -> GasResult<()> {
        let crit = self
            .crit
            .as_ref()
            .ok_or_else(|| GasError::NotReady("real-fluid properties".into()))?;
        let (t, rho) = (self.temperature, self.density);
        let fresh = match &self.real {
            Some(c) => {
                if c.tlast == t && c.rholast == rho && c.ylast == self.massfracs {
                    return Ok(());
                }
                c.ylast != self.massfracs
            }
            None => true,
        };
        let v = self.mean_mw / rho;
        let consts = if fresh {
            cubic::mixture_constants(crit, &self.molefracs)
        } else {
            self.real.take().unwrap().consts
        };
        let state = cubic::evaluate_real_fluid(crit, &consts, &self.molefracs, t, v);
        self.real = Some(RealFluidCache {
            tlast: t,
            rholast: rho,
            ylast: self.massfracs.clone(),
            consts,
            state,
        });
        Ok(())
    }

    fn real(&mut self) -> GasResult<&RealFluidState> {
        self.update_real_fluid()?;
        Ok(&self.real.as_ref().unwrap().state)
    }

    /// Molar enthalpy in J/kmol.
    pub fn enthalpy_mole(&mut self) -> GasResult<f64> {
        self.update_ref();
        let rt = GAS_CONSTANT * self.temperature;
        let ideal = rt * self.mean_x(self.ref_thermo.h0_rt());
        if self.blend == 0.0 {
            return Ok(ideal);
        }
        let blend = self.blend;
        Ok(ideal + blend * self.real()?.h_dep)
    }

    /// Molar internal energy in J/kmol.
    pub fn intenergy_mole(&mut self) -> GasResult<f64> {
        self.update_ref();
        let rt = GAS_CONSTANT * self.temperature;
        let ideal = rt * (self.mean_x(self.ref_thermo.h0_rt()) - 1.0);
        if self.blend == 0.0 {
            return Ok(ideal);
        }
        let blend = self.blend;
        Ok(ideal + blend * self.real()?.u_dep)
    }

    /// Molar entropy in J/kmol/K.
    pub fn entropy_mole(&mut self) -> GasResult<f64> {
        self.update_ref();
        let xlogx: f64 = self
            .molefracs
            .iter()
            .filter(|&&x| x > 0.0)
            .map(|&x| x * x.ln())
            .sum();
        let ideal = GAS_CONSTANT
            * (self.mean_x(self.ref_thermo.s0_r())
                - xlogx
                - (self.pressure() / self.ref_pressure).ln());
        if self.blend == 0.0 {
            return Ok(ideal);
        }
        let blend = self.blend;
        Ok(ideal + blend * self.real()?.s_dep)
    }

    /// Molar Gibbs energy in J/kmol.
    pub fn gibbs_mole(&mut self) -> GasResult<f64> {
        Ok(self.enthalpy_mole()? - self.temperature * self.entropy_mole()?)
    }

    /// Molar isobaric heat capacity in J/kmol/K.
    pub fn cp_mole(&mut self) -> GasResult<f64> {
        self.update_ref();
        let ideal = GAS_CONSTANT * self.mean_x(self.ref_thermo.cp0_r());
        if self.blend == 0.0 {
            return Ok(ideal);
        }
        let blend = self.blend;
        Ok(ideal + blend * self.real()?.cp_dep)
    }

    /// Molar isochoric heat capacity in J/kmol/K.
    pub fn cv_mole(&mut self) -> GasResult<f64> {
        self.update_ref();
        let ideal = GAS_CONSTANT * (self.mean_x(self.ref_thermo.cp0_r()) - 1.0);
        if self.blend == 0.0 {
            return Ok(ideal);
        }
        let blend = self.blend;
        Ok(ideal + blend * self.real()?.cv_dep)
    }

    /// Specific isobaric heat capacity in J/kg/K.
    pub fn cp_mass(&mut self) -> GasResult<f64> {
        Ok(self.cp_mole()? / self.mean_mw)
    }

    /// Specific isochoric heat capacity in J/kg/K.
    pub fn cv_mass(&mut self) -> GasResult<f64> {
        Ok(self.cv_mole()? / self.mean_mw)
    }

    /// Partial molar enthalpies in J/kmol.
    pub fn partial_molar_enthalpies(&mut self) -> GasResult<Array1<f64>> {
        self.update_ref();
        let rt = GAS_CONSTANT * self.temperature;
        let mut h = self.ref_thermo.h0_rt() * rt;
        if self.blend > 0.0 {
            let blend = self.blend;
            let dep = self.real()?.h_dep_i.clone();
            h = h + dep * blend;
        }
        Ok(h)
    }

    /// Partial molar entropies in J/kmol/K.
    pub fn partial_molar_entropies(&mut self) -> GasResult<Array1<f64>> {
        self.update_ref();
        let logp = (self.pressure() / self.ref_pressure).ln();
        let mut s = Array1::from_shape_fn(self.n_species(), |k| {
            let x = self.molefracs[k].max(SMALL_NUMBER);
            GAS_CONSTANT * (self.ref_thermo.s0_r()[k] - x.ln() - logp)
        });
        if self.blend > 0.0 {
            let blend = self.blend;
            let dep = self.real()?.s_dep_i.clone();
            s = s + dep * blend;
        }
        Ok(s)
    }

    /// Partial molar internal energies in J/kmol.
    pub fn partial_molar_int_energies(&mut self) -> GasResult<Array1<f64>> {
        let h = self.partial_molar_enthalpies()?;
        let pv = self.partial_molar_pv()?;
        Ok(h - pv)
    }

    fn partial_molar_pv(&mut self) -> GasResult<Array1<f64>> {
        let rt = GAS_CONSTANT * self.temperature;
        if self.blend == 0.0 {
            return Ok(Array1::from_elem(self.n_species(), rt));
        }
        let blend = self.blend;
        let st = self.real()?;
        let p_pr = st.p_pr;
        Ok(Array1::from_shape_fn(st.dv_dn.len(), |k| {
            (1.0 - blend) * rt + blend * p_pr * st.dv_dn[k]
        }))
    }

    /// Partial molar heat capacities in J/kmol/K (reference values).
    pub fn partial_molar_cp(&mut self) -> GasResult<Array1<f64>> {
        self.update_ref();
        Ok(self.ref_thermo.cp0_r() * GAS_CONSTANT)
    }

    /// Partial molar volumes in m³/kmol.
    pub fn partial_molar_volumes(&mut self) -> GasResult<Array1<f64>> {
        let v = self.mean_mw / self.density;
        if self.blend == 0.0 {
            return Ok(Array1::from_elem(self.n_species(), v));
        }
        let blend = self.blend;
        let dv_dn = self.real()?.dv_dn.clone();
        Ok(dv_dn * blend + (1.0 - blend) * v)
    }

    /// Chemical potentials in J/kmol, including the RT·ln X mixing term.
    pub fn chemical_potentials(&mut self) -> GasResult<Array1<f64>> {
        self.update_ref();
        let rt = GAS_CONSTANT * self.temperature;
        let logp = (self.pressure() / self.ref_pressure).ln();
        let mut mu = Array1::from_shape_fn(self.n_species(), |k| {
            let x = self.molefracs[k].max(SMALL_NUMBER);
            rt * (self.ref_thermo.g0_rt()[k] + x.ln() + logp)
        });
        if self.blend > 0.0 {
            let blend = self.blend;
            let res = self.real()?.mu_res.clone();
            mu = mu + res * blend;
        }
        Ok(mu)
    }

    /// Standard chemical potentials g⁰(T) at the reference pressure, J/kmol.
    pub fn standard_chemical_potentials(&mut self) -> Array1<f64> {
        self.update_ref();
        self.ref_thermo.g0_rt() * (GAS_CONSTANT * self.temperature)
    }

    /// Dimensionless standard-state enthalpies h⁰/RT at the current T.
    pub fn standard_enthalpies_rt(&mut self) -> Array1<f64> {
        self.update_ref();
        self.ref_thermo.h0_rt().clone()
    }

    /// Dimensionless standard-state entropies s/R at the current (T, p).
    pub fn standard_entropies_r(&mut self) -> Array1<f64> {
        self.update_ref();
        let logp = (self.pressure() / self.ref_pressure).ln();
        self.ref_thermo.s0_r() - logp
    }

    /// Dimensionless standard-state Gibbs energies g/RT at the current (T, p).
    pub fn standard_gibbs_rt(&mut self) -> Array1<f64> {
        self.update_ref();
        let logp = (self.pressure() / self.ref_pressure).ln();
        self.ref_thermo.g0_rt() + logp
    }

    /// Dimensionless heat capacities cp⁰/R at the current T.
    pub fn standard_cp_r(&mut self) -> Array1<f64> {
        self.update_ref();
        self.ref_thermo.cp0_r().clone()
    }

    /// Standard-state molar volumes RT/p in m³/kmol.
    pub fn standard_molar_volumes(&mut self) -> Array1<f64> {
        let v = GAS_CONSTANT * self.temperature / self.pressure();
        Array1::from_elem(self.n_species(), v)
    }

    /// Dimensionless reference-state enthalpies at (T, p₀).
    pub fn enthalpy_rt_ref(&mut self) -> Array1<f64> {
        self.update_ref();
        self.ref_thermo.h0_rt().clone()
    }

    /// Dimensionless reference-state entropies at (T, p₀).
    pub fn entropy_r_ref(&mut self) -> Array1<f64> {
        self.update_ref();
        self.ref_thermo.s0_r().clone()
    }

    /// Dimensionless reference-state Gibbs energies at (T, p₀).
    pub fn gibbs_rt_ref(&mut self) -> Array1<f64> {
        self.update_ref();
        self.ref_thermo.g0_rt().clone()
    }

    /// Dimensionless reference-state heat capacities at (T, p₀).
    pub fn cp_r_ref(&mut self) -> Array1<f64> {
        self.update_ref();
        self.ref_thermo.cp0_r().clone()
    }

    /// Mode-resolved (translational, rotational, vibrational) heat
    /// capacities are only defined for mode-resolved parameterizations.
    pub fn mode_heat_capacities(&self, _k: usize) -> GasResult<[f64; 3]> {
        Err(GasError::Unsupported("mode_heat_capacities".into()))
    }

    fn mean_x(&self, prop: &Array1<f64>) -> f64 {
        self.molefracs
            .iter()
            .zip(prop.iter())
            .map(|(x, p)| x * p)
            .sum()
    }
}
