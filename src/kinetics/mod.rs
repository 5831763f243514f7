//! Gas-phase kinetics: rates of progress for the six reaction kinds,
//! reduced snapshots, adaptive activation and the quasi-steady-state
//! closure.

mod qss;
mod rates;
mod reaction;
mod reduction;
mod stoich;
mod third_body;

pub use rates::{ChebyshevRate, FalloffParams, PlogRate};
pub use reaction::{Arrhenius, Reaction, ReactionKind, ThirdBody};
pub use reduction::AdaptiveActivator;

use crate::{GasError, GasResult, SharedThermo, BIG_NUMBER, GAS_CONSTANT, SMALL_NUMBER};
use indexmap::IndexMap;
use ndarray::Array1;
use qss::QssClosure;
use rates::{ArrheniusTable, FalloffMgr};
use stoich::StoichManager;
use third_body::ThirdBodyCalc;

/// Default scale applied to the total concentration when forming the
/// bath-gas concentrations of quasi-steady species.
pub const DEFAULT_RELATIVE_QSS_DENSITY: f64 = 1e-12;

/// Rate-of-progress engine over a shared [`crate::ThermoPhase`].
pub struct Kinetics {
    thermo: SharedThermo,
    reactions: Vec<Reaction>,

    // per-kind rate installations; falloff tables use local indexing
    rates: ArrheniusTable,
    falloff_low: ArrheniusTable,
    falloff_high: ArrheniusTable,
    falloff: FalloffMgr,
    fall_indx: Vec<usize>,
    plog: Vec<(usize, PlogRate)>,
    cheb: Vec<(usize, ChebyshevRate)>,

    concm_3b: ThirdBodyCalc,
    concm_falloff: ThirdBodyCalc,

    reactant_stoich: StoichManager,
    rev_product_stoich: StoichManager,
    irrev_product_stoich: StoichManager,

    rev_index: Vec<usize>,
    irrev_index: Vec<usize>,
    dn: Vec<f64>,

    // dense per-reaction caches
    kf: Vec<f64>,
    klow: Vec<f64>,
    khigh: Vec<f64>,
    /// reciprocal equilibrium constants, zero for irreversible reactions
    rkc: Vec<f64>,
    ropf: Vec<f64>,
    ropr: Vec<f64>,
    ropnet: Vec<f64>,
    perturb: Vec<f64>,
    conc: Vec<f64>,
    conc_bath: Vec<f64>,

    last_temp: f64,
    last_pres: f64,
    rop_ok: bool,

    skip_undeclared_third_bodies: bool,
    relative_qss_density: f64,
    qss: Option<QssClosure>,
    warnings: Vec<String>,
}

impl Kinetics {
    pub fn new(thermo: SharedThermo) -> Self {
        let ns = thermo.borrow().n_species();
        Self {
            thermo,
            reactions: Vec::new(),
            rates: ArrheniusTable::default(),
            falloff_low: ArrheniusTable::default(),
            falloff_high: ArrheniusTable::default(),
            falloff: FalloffMgr::default(),
            fall_indx: Vec::new(),
            plog: Vec::new(),
            cheb: Vec::new(),
            concm_3b: ThirdBodyCalc::default(),
            concm_falloff: ThirdBodyCalc::default(),
            reactant_stoich: StoichManager::new(),
            rev_product_stoich: StoichManager::new(),
            irrev_product_stoich: StoichManager::new(),
            rev_index: Vec::new(),
            irrev_index: Vec::new(),
            dn: Vec::new(),
            kf: Vec::new(),
            klow: Vec::new(),
            khigh: Vec::new(),
            rkc: Vec::new(),
            ropf: Vec::new(),
            ropr: Vec::new(),
            ropnet: Vec::new(),
            perturb: Vec::new(),
            conc: vec![0.0; ns],
            conc_bath: vec![0.0; ns],
            last_temp: -1.0,
            last_pres: -1.0,
            rop_ok: false,
            skip_undeclared_third_bodies: false,
            relative_qss_density: DEFAULT_RELATIVE_QSS_DENSITY,
            qss: None,
            warnings: Vec::new(),
        }
    }

    pub fn n_reactions(&self) -> usize {
        self.reactions.len()
    }

    pub fn n_species(&self) -> usize {
        self.conc.len()
    }

    pub fn reaction(&self, i: usize) -> &Reaction {
        &self.reactions[i]
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn thermo(&self) -> &SharedThermo {
        &self.thermo
    }

    /// Warnings accumulated during installation (e.g. quasi-steady
    /// assumption violations).
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Silently drop third-body efficiencies of species the phase does not
    /// declare, instead of failing.
    pub fn set_skip_undeclared_third_bodies(&mut self, skip: bool) {
        self.skip_undeclared_third_bodies = skip;
    }

    pub fn set_relative_qss_density(&mut self, scale: f64) {
        self.relative_qss_density = scale;
        self.invalidate_cache();
    }

    /// Per-reaction rate multiplier, applied after third-body and falloff
    /// processing.
    pub fn set_multiplier(&mut self, i: usize, f: f64) {
        self.perturb[i] = f;
        self.rop_ok = false;
    }

    pub fn multiplier(&self, i: usize) -> f64 {
        self.perturb[i]
    }

    fn resolve_side(
        &self,
        equation: &str,
        side: &IndexMap<String, f64>,
    ) -> GasResult<Vec<(usize, f64)>> {
        let th = self.thermo.borrow();
        side.iter()
            .map(|(name, nu)| {
                th.species_index(name)
                    .map(|k| (k, *nu))
                    .ok_or_else(|| GasError::UndeclaredSpecies(equation.to_string(), name.clone()))
            })
            .collect()
    }

    fn resolve_third_body(&self, reaction: &Reaction) -> GasResult<(f64, Vec<(usize, f64)>)> {
        let tb = reaction.third_body.clone().unwrap_or_default();
        let th = self.thermo.borrow();
        let mut overrides = Vec::new();
        for (name, eff) in &tb.efficiencies {
            match th.species_index(name) {
                Some(k) => overrides.push((k, eff - tb.default_efficiency)),
                None if self.skip_undeclared_third_bodies => {}
                None => {
                    return Err(GasError::UndeclaredSpecies(
                        reaction.to_string(),
                        name.clone(),
                    ))
                }
            }
        }
        Ok((tb.default_efficiency, overrides))
    }

    /// Installs a reaction, growing all per-reaction tables by one.
    pub fn add_reaction(&mut self, reaction: Reaction) -> GasResult<()> {
        let i = self.reactions.len();
        let equation = reaction.to_string();
        let reac = self.resolve_side(&equation, &reaction.reactants)?;
        let prod = self.resolve_side(&equation, &reaction.products)?;

        match &reaction.kind {
            ReactionKind::Elementary { rate } => {
                if reaction.third_body.is_some() {
                    return Err(GasError::InvalidKind(
                        i,
                        "an elementary reaction cannot carry third-body efficiencies".into(),
                    ));
                }
                self.rates.install(i, *rate);
            }
            ReactionKind::ThreeBody { rate } => {
                let (default_eff, overrides) = self.resolve_third_body(&reaction)?;
                self.rates.install(i, *rate);
                self.concm_3b.install(i, default_eff, overrides);
            }
            ReactionKind::Falloff { low, high, blend }
            | ReactionKind::ChemicallyActivated { low, high, blend } => {
                let (default_eff, overrides) = self.resolve_third_body(&reaction)?;
                let chemact = matches!(reaction.kind, ReactionKind::ChemicallyActivated { .. });
                let local = self.fall_indx.len();
                self.fall_indx.push(i);
                self.falloff_low.install(local, *low);
                self.falloff_high.install(local, *high);
                self.falloff.install(*blend, chemact);
                self.concm_falloff.install(local, default_eff, overrides);
                self.klow.push(0.0);
                self.khigh.push(0.0);
            }
            ReactionKind::Plog { rate } => {
                if reaction.third_body.is_some() {
                    return Err(GasError::InvalidKind(
                        i,
                        "a pressure-log reaction cannot carry third-body efficiencies".into(),
                    ));
                }
                self.plog.push((i, rate.clone()));
            }
            ReactionKind::Chebyshev { rate } => {
                if reaction.third_body.is_some() {
                    return Err(GasError::InvalidKind(
                        i,
                        "a Chebyshev reaction cannot carry third-body efficiencies".into(),
                    ));
                }
                self.cheb.push((i, rate.clone()));
            }
        }

        self.reactant_stoich.add(&reac);
        if reaction.reversible {
            self.rev_product_stoich.add(&prod);
            self.irrev_product_stoich.add(&[]);
            self.rev_index.push(i);
        } else {
            self.rev_product_stoich.add(&[]);
            self.irrev_product_stoich.add(&prod);
            self.irrev_index.push(i);
        }
        let dn: f64 = prod.iter().map(|(_, nu)| nu).sum::<f64>()
            - reac.iter().map(|(_, nu)| nu).sum::<f64>();
        self.dn.push(dn);

        self.kf.push(0.0);
        self.rkc.push(0.0);
        self.ropf.push(0.0);
        self.ropr.push(0.0);
        self.ropnet.push(0.0);
        self.perturb.push(1.0);
        self.reactions.push(reaction);
        self.invalidate_cache();
        Ok(())
    }

    /// Replaces the rate data of reaction `i` in place, preserving all
    /// indices. The kind and the stoichiometry must not change.
    pub fn modify_reaction(&mut self, i: usize, reaction: Reaction) -> GasResult<()> {
        use std::mem::discriminant;
        let old = &self.reactions[i];
        if discriminant(&reaction.kind) != discriminant(&old.kind) {
            return Err(GasError::InvalidKind(
                i,
                format!(
                    "cannot replace a {} rate with a {} rate in place",
                    old.kind.name(),
                    reaction.kind.name()
                ),
            ));
        }
        if reaction.reactants != old.reactants
            || reaction.products != old.products
            || reaction.reversible != old.reversible
        {
            return Err(GasError::InvalidKind(
                i,
                "in-place modification cannot change the stoichiometry".into(),
            ));
        }
        if reaction.third_body != old.third_body {
            return Err(GasError::InvalidKind(
                i,
                "in-place modification cannot change third-body efficiencies".into(),
            ));
        }
        match &reaction.kind {
            ReactionKind::Elementary { rate } | ReactionKind::ThreeBody { rate } => {
                self.rates.replace(i, *rate);
            }
            ReactionKind::Falloff { low, high, blend }
            | ReactionKind::ChemicallyActivated { low, high, blend } => {
                let local = self.fall_indx.iter().position(|&g| g == i).unwrap();
                self.falloff_low.replace(local, *low);
                self.falloff_high.replace(local, *high);
                self.falloff.replace(local, *blend);
            }
            ReactionKind::Plog { rate } => {
                if let Some(entry) = self.plog.iter_mut().find(|e| e.0 == i) {
                    entry.1 = rate.clone();
                }
            }
            ReactionKind::Chebyshev { rate } => {
                if let Some(entry) = self.cheb.iter_mut().find(|e| e.0 == i) {
                    entry.1 = rate.clone();
                }
            }
        }
        self.reactions[i] = reaction;
        self.invalidate_cache();
        Ok(())
    }

    /// Perturbs the stored T and P sentinels so the next update recomputes
    /// unconditionally.
    fn invalidate_cache(&mut self) {
        self.last_temp += 0.13579;
        self.last_pres += 0.13579;
        self.rop_ok = false;
    }

    fn update_rates_t(&mut self) -> GasResult<()> {
        let (t, p) = {
            let th = self.thermo.borrow();
            (th.temperature(), th.pressure())
        };
        let log_t = t.ln();
        if t != self.last_temp {
            self.rates.update(t, log_t, &mut self.kf);
            self.falloff_low.update(t, log_t, &mut self.klow);
            self.falloff_high.update(t, log_t, &mut self.khigh);
            self.falloff.update_temp(t);
            self.update_kc(t)?;
            self.rop_ok = false;
        }
        if t != self.last_temp || p != self.last_pres {
            let log_p = p.ln();
            let log10_p = p.log10();
            for (i, rate) in &self.plog {
                self.kf[*i] = rate.rate(t, log_t, log_p);
            }
            for (i, rate) in &self.cheb {
                self.kf[*i] = rate.rate(t, log10_p);
            }
            self.rop_ok = false;
            self.last_pres = p;
        }
        self.last_temp = t;
        Ok(())
    }

    fn update_kc(&mut self, t: f64) -> GasResult<()> {
        let (grt, p0) = {
            let mut th = self.thermo.borrow_mut();
            (th.gibbs_rt_ref(), th.ref_pressure())
        };
        let mut dg = vec![0.0; self.n_reactions()];
        let g = grt.as_slice().unwrap();
        self.rev_product_stoich.increment_reactions(g, &mut dg);
        self.reactant_stoich.decrement_reactions(g, &mut dg);
        let log_c0 = (p0 / (GAS_CONSTANT * t)).ln();
        for &i in &self.rev_index {
            self.rkc[i] = (dg[i] - self.dn[i] * log_c0).exp().min(BIG_NUMBER);
        }
        for &i in &self.irrev_index {
            self.rkc[i] = 0.0;
        }
        Ok(())
    }

    fn update_rates_c(&mut self) {
        let conc = self.thermo.borrow().concentrations();
        self.conc.copy_from_slice(conc.as_slice().unwrap());
        self.conc_bath.copy_from_slice(&self.conc);
        if let Some(q) = &self.qss {
            let ctot: f64 = self.conc.iter().sum();
            let scale = ctot * self.relative_qss_density;
            for &s in &q.species {
                self.conc_bath[s] = scale;
                self.conc[s] = 1.0;
            }
        }
        let ctot_bath: f64 = self.conc_bath.iter().sum();
        self.concm_3b.update(&self.conc_bath, ctot_bath);
        self.concm_falloff.update(&self.conc_bath, ctot_bath);
        self.rop_ok = false;
    }

    /// Reduced-pressure falloff processing: pr = k_low·[M]/(k_high+ε) is
    /// blended and scattered into `ropf` at the falloff indices.
    fn process_falloff(&self, ropf: &mut [f64]) {
        let nfall = self.fall_indx.len();
        if nfall == 0 {
            return;
        }
        let mut pr: Vec<f64> = (0..nfall)
            .map(|n| self.klow[n] / (self.khigh[n] + SMALL_NUMBER))
            .collect();
        self.concm_falloff.multiply_local(&mut pr);
        self.falloff.pr_to_falloff(&mut pr);
        for n in 0..nfall {
            let k = pr[n]
                * if self.falloff.chemact(n) {
                    self.klow[n]
                } else {
                    self.khigh[n]
                };
            ropf[self.fall_indx[n]] = k;
        }
    }

    fn check_finite(&self, name: &str, values: &[f64]) -> GasResult<()> {
        for (i, v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(GasError::NonFinite(name.to_string(), i));
            }
        }
        Ok(())
    }

    /// Recomputes forward, reverse and net rates of progress if stale.
    ///
    /// A non-finite intermediate aborts the update and leaves the caches
    /// invalid.
    pub fn update_rop(&mut self) -> GasResult<()> {
        let result = self.update_rop_inner();
        if result.is_err() {
            self.invalidate_cache();
        }
        result
    }

    fn update_rop_inner(&mut self) -> GasResult<()> {
        self.update_rates_c();
        self.update_rates_t()?;
        if self.rop_ok {
            return Ok(());
        }
        let nr = self.n_reactions();

        self.ropf.copy_from_slice(&self.kf);
        self.concm_3b.multiply(&mut self.ropf);
        let mut ropf = std::mem::take(&mut self.ropf);
        self.process_falloff(&mut ropf);
        self.ropf = ropf;
        for j in 0..nr {
            self.ropf[j] *= self.perturb[j];
        }
        self.check_finite("forward rate constants", &self.ropf)?;

        self.ropr.copy_from_slice(&self.ropf);
        for j in 0..nr {
            self.ropr[j] *= self.rkc[j];
        }
        self.reactant_stoich.multiply(&self.conc, &mut self.ropf);
        self.rev_product_stoich.multiply(&self.conc, &mut self.ropr);

        if self.qss.is_some() {
            let q = self.qss.as_ref().unwrap();
            let c = q.concentrations(&self.ropf, &self.ropr)?;
            q.scale_rates(&c, &mut self.ropf, &mut self.ropr);
        }

        for j in 0..nr {
            self.ropnet[j] = self.ropf[j] - self.ropr[j];
        }
        self.check_finite("ropf", &self.ropf)?;
        self.check_finite("ropr", &self.ropr)?;
        self.check_finite("ropnet", &self.ropnet)?;
        self.rop_ok = true;
        Ok(())
    }

    /// Effective forward rate constants k_f·[M]·falloff·perturbation.
    pub fn fwd_rate_constants(&mut self) -> GasResult<Array1<f64>> {
        self.update_rates_c();
        self.update_rates_t()?;
        let mut kf = self.kf.clone();
        self.concm_3b.multiply(&mut kf);
        self.process_falloff(&mut kf);
        for j in 0..kf.len() {
            kf[j] *= self.perturb[j];
        }
        self.check_finite("forward rate constants", &kf)?;
        Ok(Array1::from(kf))
    }

    /// Concentration equilibrium constants Kc = exp(−Δg⁰/RT + Δn·ln c⁰).
    pub fn equilibrium_constants(&mut self) -> GasResult<Array1<f64>> {
        self.update_rates_t()?;
        let (grt, p0, t) = {
            let mut th = self.thermo.borrow_mut();
            (th.gibbs_rt_ref(), th.ref_pressure(), th.temperature())
        };
        let mut dg = vec![0.0; self.n_reactions()];
        let g = grt.as_slice().unwrap();
        self.rev_product_stoich.increment_reactions(g, &mut dg);
        self.irrev_product_stoich.increment_reactions(g, &mut dg);
        self.reactant_stoich.decrement_reactions(g, &mut dg);
        let log_c0 = (p0 / (GAS_CONSTANT * t)).ln();
        Ok(Array1::from_shape_fn(self.n_reactions(), |j| {
            (-dg[j] + self.dn[j] * log_c0).exp()
        }))
    }

    pub fn fwd_rates_of_progress(&mut self) -> GasResult<Array1<f64>> {
        self.update_rop()?;
        Ok(Array1::from(self.ropf.clone()))
    }

    pub fn rev_rates_of_progress(&mut self) -> GasResult<Array1<f64>> {
        self.update_rop()?;
        Ok(Array1::from(self.ropr.clone()))
    }

    pub fn net_rates_of_progress(&mut self) -> GasResult<Array1<f64>> {
        self.update_rop()?;
        Ok(Array1::from(self.ropnet.clone()))
    }

    /// Net species production rates Σ_j ν_kj·q_j in kmol/m³/s.
    pub fn net_production_rates(&mut self) -> GasResult<Array1<f64>> {
        self.update_rop()?;
        let mut wdot = vec![0.0; self.n_species()];
        self.rev_product_stoich.increment_species(&self.ropnet, &mut wdot);
        self.irrev_product_stoich.increment_species(&self.ropnet, &mut wdot);
        self.reactant_stoich.decrement_species(&self.ropnet, &mut wdot);
        Ok(Array1::from(wdot))
    }

    /// Species creation rates in kmol/m³/s.
    pub fn creation_rates(&mut self) -> GasResult<Array1<f64>> {
        self.update_rop()?;
        let mut cdot = vec![0.0; self.n_species()];
        self.rev_product_stoich.increment_species(&self.ropf, &mut cdot);
        self.irrev_product_stoich.increment_species(&self.ropf, &mut cdot);
        self.reactant_stoich.increment_species(&self.ropr, &mut cdot);
        Ok(Array1::from(cdot))
    }

    /// Species destruction rates in kmol/m³/s.
    pub fn destruction_rates(&mut self) -> GasResult<Array1<f64>> {
        self.update_rop()?;
        let mut ddot = vec![0.0; self.n_species()];
        self.reactant_stoich.increment_species(&self.ropf, &mut ddot);
        self.rev_product_stoich.increment_species(&self.ropr, &mut ddot);
        Ok(Array1::from(ddot))
    }

    fn reaction_delta(&self, prop: &[f64]) -> Vec<f64> {
        let mut delta = vec![0.0; self.n_reactions()];
        self.rev_product_stoich.increment_reactions(prop, &mut delta);
        self.irrev_product_stoich.increment_reactions(prop, &mut delta);
        self.reactant_stoich.decrement_reactions(prop, &mut delta);
        delta
    }

    /// ΔG per reaction from the actual chemical potentials, J/kmol.
    pub fn delta_gibbs(&mut self) -> GasResult<Array1<f64>> {
        let mu = self.thermo.borrow_mut().chemical_potentials()?;
        Ok(Array1::from(self.reaction_delta(mu.as_slice().unwrap())))
    }

    /// ΔH per reaction from the partial molar enthalpies, J/kmol.
    pub fn delta_enthalpy(&mut self) -> GasResult<Array1<f64>> {
        let h = self.thermo.borrow_mut().partial_molar_enthalpies()?;
        Ok(Array1::from(self.reaction_delta(h.as_slice().unwrap())))
    }

    /// ΔS per reaction from the partial molar entropies, J/kmol/K.
    pub fn delta_entropy(&mut self) -> GasResult<Array1<f64>> {
        let s = self.thermo.borrow_mut().partial_molar_entropies()?;
        Ok(Array1::from(self.reaction_delta(s.as_slice().unwrap())))
    }

    /// Standard-state ΔG⁰ per reaction at (T, p₀), J/kmol.
    pub fn delta_standard_gibbs(&mut self) -> GasResult<Array1<f64>> {
        let g = self.thermo.borrow_mut().standard_chemical_potentials();
        Ok(Array1::from(self.reaction_delta(g.as_slice().unwrap())))
    }

    /// Standard-state ΔH⁰ per reaction at (T, p₀), J/kmol.
    pub fn delta_standard_enthalpy(&mut self) -> GasResult<Array1<f64>> {
        let (h, t) = {
            let mut th = self.thermo.borrow_mut();
            (th.enthalpy_rt_ref(), th.temperature())
        };
        let h = h * (GAS_CONSTANT * t);
        Ok(Array1::from(self.reaction_delta(h.as_slice().unwrap())))
    }

    /// Standard-state ΔS⁰ per reaction at (T, p₀), J/kmol/K.
    pub fn delta_standard_entropy(&mut self) -> GasResult<Array1<f64>> {
        let s = self.thermo.borrow_mut().entropy_r_ref() * GAS_CONSTANT;
        Ok(Array1::from(self.reaction_delta(s.as_slice().unwrap())))
    }

    /// Signed (product − reactant) stoichiometry columns.
    pub(crate) fn net_stoich_columns(&self) -> Vec<Vec<(usize, f64)>> {
        (0..self.n_reactions())
            .map(|j| {
                let mut col: IndexMap<usize, f64> = IndexMap::new();
                for (k, nu) in self.rev_product_stoich.column(j) {
                    *col.entry(k).or_insert(0.0) += nu;
                }
                for (k, nu) in self.irrev_product_stoich.column(j) {
                    *col.entry(k).or_insert(0.0) += nu;
                }
                for (k, nu) in self.reactant_stoich.column(j) {
                    *col.entry(k).or_insert(0.0) -= nu;
                }
                col.into_iter().filter(|(_, nu)| *nu != 0.0).collect()
            })
            .collect()
    }

    /// Reduced snapshot containing only the reactions with a true mask
    /// entry, all per-reaction state gathered and re-indexed consistently.
    /// The snapshot shares the thermo handle; it does not copy the phase.
    pub fn subset(&self, mask: &[bool]) -> GasResult<Kinetics> {
        assert_eq!(mask.len(), self.n_reactions());
        let active: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, &a)| a)
            .map(|(j, _)| j)
            .collect();
        // forward index map: the new index of old reaction j is the number
        // of active reactions before j
        let mut fwd = vec![0; self.n_reactions()];
        let mut count = 0;
        for (j, &a) in mask.iter().enumerate() {
            fwd[j] = count;
            if a {
                count += 1;
            }
        }

        let mut sub = Kinetics::new(self.thermo.clone());
        sub.skip_undeclared_third_bodies = self.skip_undeclared_third_bodies;
        sub.relative_qss_density = self.relative_qss_density;
        for &j in &active {
            sub.add_reaction(self.reactions[j].clone())?;
        }
        for &j in &active {
            sub.perturb[fwd[j]] = self.perturb[j];
        }
        if let Some(q) = &self.qss {
            sub.declare_qss_indices(q.species.clone())?;
        }
        Ok(sub)
    }

    /// Flags species as quasi-steady; their concentrations are eliminated
    /// algebraically during [`Kinetics::update_rop`].
    pub fn declare_qss(&mut self, names: &[&str]) -> GasResult<()> {
        let mut indices = Vec::with_capacity(names.len());
        {
            let th = self.thermo.borrow();
            for name in names {
                indices.push(th.species_index(name).ok_or_else(|| {
                    GasError::UndeclaredSpecies("quasi-steady set".into(), name.to_string())
                })?);
            }
        }
        self.declare_qss_indices(indices)
    }

    fn declare_qss_indices(&mut self, species: Vec<usize>) -> GasResult<()> {
        let views: Vec<(Vec<usize>, Vec<usize>, bool)> = (0..self.n_reactions())
            .map(|j| {
                let reac: Vec<usize> = self.reactant_stoich.column(j).map(|(k, _)| k).collect();
                let prod: Vec<usize> = self
                    .rev_product_stoich
                    .column(j)
                    .chain(self.irrev_product_stoich.column(j))
                    .map(|(k, _)| k)
                    .collect();
                (reac, prod, self.reactions[j].reversible)
            })
            .collect();
        let (closure, warnings) = QssClosure::build(species, &views);
        self.warnings.extend(warnings);
        self.qss = Some(closure);
        self.invalidate_cache();
        Ok(())
    }
}
