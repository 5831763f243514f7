/// Efficiency-weighted bath-gas concentrations for three-body and falloff
/// reactions.
///
/// Each entry stores a default efficiency plus sparse per-species
/// overrides as (species, efficiency − default), so the enhanced [M] is
/// default·C_total + Σ δε·c_k.
#[derive(Clone, Default)]
pub(crate) struct ThirdBodyCalc {
    /// target index of each entry (global reaction or falloff-local)
    target: Vec<usize>,
    default_eff: Vec<f64>,
    overrides: Vec<Vec<(usize, f64)>>,
    /// enhanced [M] per entry in kmol/m³
    concm: Vec<f64>,
}

impl ThirdBodyCalc {
    pub fn install(&mut self, target: usize, default_eff: f64, overrides: Vec<(usize, f64)>) {
        self.target.push(target);
        self.default_eff.push(default_eff);
        self.overrides.push(overrides);
        self.concm.push(0.0);
    }

    pub fn update(&mut self, conc: &[f64], ctot: f64) {
        for n in 0..self.target.len() {
            let mut sum = self.default_eff[n] * ctot;
            for &(k, delta) in &self.overrides[n] {
                sum += delta * conc[k];
            }
            self.concm[n] = sum;
        }
    }

    /// rop[target[n]] *= [M]ₙ
    pub fn multiply(&self, rop: &mut [f64]) {
        for n in 0..self.target.len() {
            rop[self.target[n]] *= self.concm[n];
        }
    }

    /// out[n] *= [M]ₙ in entry-local indexing.
    pub fn multiply_local(&self, out: &mut [f64]) {
        for n in 0..self.concm.len() {
            out[n] *= self.concm[n];
        }
    }

    pub fn concm(&self) -> &[f64] {
        &self.concm
    }
}
