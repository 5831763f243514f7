use super::reaction::Arrhenius;
use crate::SMALL_NUMBER;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Dense evaluation of an indexed set of Arrhenius expressions.
#[derive(Clone, Default)]
pub(crate) struct ArrheniusTable {
    entries: Vec<(usize, Arrhenius)>,
}

impl ArrheniusTable {
    pub fn install(&mut self, idx: usize, rate: Arrhenius) {
        self.entries.push((idx, rate));
    }

    pub fn replace(&mut self, idx: usize, rate: Arrhenius) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.0 == idx) {
            entry.1 = rate;
        }
    }

    pub fn update(&self, t: f64, log_t: f64, out: &mut [f64]) {
        for (i, rate) in &self.entries {
            out[*i] = rate.rate(t, log_t);
        }
    }
}

/// Pressure-interpolated Arrhenius table.
///
/// Between two tabulated pressures ln k is interpolated linearly in ln p;
/// outside the table the nearest entry applies. Multiple expressions at the
/// same pressure are summed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlogRate {
    /// (pressure in Pa, Arrhenius expressions) sorted by pressure
    pub rates: Vec<(f64, Vec<Arrhenius>)>,
}

impl PlogRate {
    pub fn new(mut rates: Vec<(f64, Vec<Arrhenius>)>) -> Self {
        debug_assert!(!rates.is_empty());
        rates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        Self { rates }
    }

    fn sum_at(&self, i: usize, t: f64, log_t: f64) -> f64 {
        self.rates[i].1.iter().map(|r| r.rate(t, log_t)).sum()
    }

    /// Rate coefficient at (T, p), with `log_p` = ln p.
    pub fn rate(&self, t: f64, log_t: f64, log_p: f64) -> f64 {
        let n = self.rates.len();
        if n == 1 || log_p <= self.rates[0].0.ln() {
            return self.sum_at(0, t, log_t);
        }
        if log_p >= self.rates[n - 1].0.ln() {
            return self.sum_at(n - 1, t, log_t);
        }
        let mut hi = 1;
        while self.rates[hi].0.ln() < log_p {
            hi += 1;
        }
        let (lp_lo, lp_hi) = (self.rates[hi - 1].0.ln(), self.rates[hi].0.ln());
        let k_lo = self.sum_at(hi - 1, t, log_t).max(SMALL_NUMBER);
        let k_hi = self.sum_at(hi, t, log_t).max(SMALL_NUMBER);
        let f = (log_p - lp_lo) / (lp_hi - lp_lo);
        (k_lo.ln() * (1.0 - f) + k_hi.ln() * f).exp()
    }
}

/// Bivariate Chebyshev expansion of log10 k over reduced reciprocal
/// temperature and reduced log10 pressure.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChebyshevRate {
    pub tmin: f64,
    pub tmax: f64,
    /// pressure limits in Pa
    pub pmin: f64,
    pub pmax: f64,
    /// coefficient matrix, temperature order × pressure order
    pub coeffs: Array2<f64>,
}

impl ChebyshevRate {
    /// Rate coefficient at (T, p), with `log10_p` = log10 p.
    pub fn rate(&self, t: f64, log10_p: f64) -> f64 {
        let tr = ((2.0 / t - 1.0 / self.tmin - 1.0 / self.tmax)
            / (1.0 / self.tmax - 1.0 / self.tmin))
            .clamp(-1.0, 1.0);
        let pr = ((2.0 * log10_p - self.pmin.log10() - self.pmax.log10())
            / (self.pmax.log10() - self.pmin.log10()))
        .clamp(-1.0, 1.0);
        let (nt, np) = self.coeffs.dim();
        let cheb_t = chebyshev_values(tr, nt);
        let cheb_p = chebyshev_values(pr, np);
        let mut log_k = 0.0;
        for i in 0..nt {
            for j in 0..np {
                log_k += self.coeffs[(i, j)] * cheb_t[i] * cheb_p[j];
            }
        }
        10f64.powf(log_k)
    }
}

fn chebyshev_values(x: f64, n: usize) -> Vec<f64> {
    let mut v = vec![0.0; n];
    if n > 0 {
        v[0] = 1.0;
    }
    if n > 1 {
        v[1] = x;
    }
    for i in 2..n {
        v[i] = 2.0 * x * v[i - 1] - v[i - 2];
    }
    v
}

fn sri_default_d() -> f64 {
    1.0
}

/// Blending function between the low- and high-pressure limits.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "form", rename_all = "kebab-case")]
pub enum FalloffParams {
    Lindemann,
    Troe {
        a: f64,
        t3: f64,
        t1: f64,
        #[serde(default)]
        #[serde(skip_serializing_if = "Option::is_none")]
        t2: Option<f64>,
    },
    Sri {
        a: f64,
        b: f64,
        c: f64,
        #[serde(default = "sri_default_d")]
        d: f64,
        #[serde(default)]
        e: f64,
    },
}

impl Default for FalloffParams {
    fn default() -> Self {
        FalloffParams::Lindemann
    }
}

impl FalloffParams {
    /// Number of temperature-dependent work slots of this form.
    pub(crate) fn work_size(&self) -> usize {
        match self {
            FalloffParams::Lindemann => 0,
            FalloffParams::Troe { .. } => 1,
            FalloffParams::Sri { .. } => 2,
        }
    }

    /// Fills the temperature-dependent terms of the blend into `work`.
    pub(crate) fn update_temp(&self, t: f64, work: &mut [f64]) {
        match *self {
            FalloffParams::Lindemann => {}
            FalloffParams::Troe { a, t3, t1, t2 } => {
                let mut fcent = (1.0 - a) * (-t / t3).exp() + a * (-t / t1).exp();
                if let Some(t2) = t2 {
                    fcent += (-t2 / t).exp();
                }
                work[0] = fcent.max(SMALL_NUMBER).log10();
            }
            FalloffParams::Sri { a, b, c, d, e } => {
                work[0] = (a * (-b / t).exp() + (-t / c).exp()).max(SMALL_NUMBER);
                work[1] = d * t.powf(e);
            }
        }
    }

    /// Blending factor F at reduced pressure `pr`.
    pub(crate) fn blend_factor(&self, pr: f64, work: &[f64]) -> f64 {
        match self {
            FalloffParams::Lindemann => 1.0,
            FalloffParams::Troe { .. } => {
                let log_fcent = work[0];
                let lpr = pr.max(SMALL_NUMBER).log10();
                let c = -0.4 - 0.67 * log_fcent;
                let n = 0.75 - 1.27 * log_fcent;
                let f1 = (lpr + c) / (n - 0.14 * (lpr + c));
                10f64.powf(log_fcent / (1.0 + f1 * f1))
            }
            FalloffParams::Sri { .. } => {
                let lpr = pr.max(SMALL_NUMBER).log10();
                let x = 1.0 / (1.0 + lpr * lpr);
                work[0].powf(x) * work[1]
            }
        }
    }
}

/// Per-reaction falloff blending with a shared pre-allocated work buffer.
#[derive(Clone, Default)]
pub(crate) struct FalloffMgr {
    /// (blend, work offset, chemically activated)
    entries: Vec<(FalloffParams, usize, bool)>,
    work: Vec<f64>,
}

impl FalloffMgr {
    pub fn install(&mut self, blend: FalloffParams, chemact: bool) {
        let offset = self.work.len();
        self.work.resize(offset + blend.work_size(), 0.0);
        self.entries.push((blend, offset, chemact));
    }

    /// Replaces the blend of local entry `n` and rebuilds the work layout.
    pub fn replace(&mut self, n: usize, blend: FalloffParams) {
        self.entries[n].0 = blend;
        let mut offset = 0;
        for entry in &mut self.entries {
            entry.1 = offset;
            offset += entry.0.work_size();
        }
        self.work = vec![0.0; offset];
    }

    pub fn update_temp(&mut self, t: f64) {
        let FalloffMgr { entries, work } = self;
        for (blend, offset, _) in entries.iter() {
            blend.update_temp(t, &mut work[*offset..*offset + blend.work_size()]);
        }
    }

    /// True if local entry `n` is chemically activated.
    pub fn chemact(&self, n: usize) -> bool {
        self.entries[n].2
    }

    /// In place: pr[n] ← F·pr/(1+pr), or F/(1+pr) for chemically activated
    /// entries.
    pub fn pr_to_falloff(&self, pr: &mut [f64]) {
        for (n, (blend, offset, chemact)) in self.entries.iter().enumerate() {
            let f = blend.blend_factor(pr[n], &self.work[*offset..]);
            pr[n] = if *chemact {
                f / (1.0 + pr[n])
            } else {
                f * pr[n] / (1.0 + pr[n])
            };
        }
    }
}
