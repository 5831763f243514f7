use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// NASA 7-coefficient polynomial parameterization on two temperature ranges.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Nasa7 {
    /// lower bound of the low-temperature range in Kelvin
    pub tmin: f64,
    /// switch temperature between the two ranges in Kelvin
    pub tmid: f64,
    /// upper bound of the high-temperature range in Kelvin
    pub tmax: f64,
    /// coefficients of the low-temperature range
    pub low: [f64; 7],
    /// coefficients of the high-temperature range
    pub high: [f64; 7],
}

impl Nasa7 {
    pub fn new(tmin: f64, tmid: f64, tmax: f64, low: [f64; 7], high: [f64; 7]) -> Self {
        Self {
            tmin,
            tmid,
            tmax,
            low,
            high,
        }
    }

    /// A constant-cp parameterization, useful for model species.
    pub fn constant_cp(cp0_r: f64, h0_rt_at_298: f64, s0_r_at_298: f64) -> Self {
        let t0 = 298.15;
        let a5 = (h0_rt_at_298 - cp0_r) * t0;
        let a6 = s0_r_at_298 - cp0_r * t0.ln();
        let c = [cp0_r, 0.0, 0.0, 0.0, 0.0, a5, a6];
        Self::new(200.0, 1000.0, 6000.0, c, c)
    }

    fn coeffs(&self, t: f64) -> &[f64; 7] {
        if t < self.tmid {
            &self.low
        } else {
            &self.high
        }
    }

    /// Dimensionless reference heat capacity cp⁰/R at `t`.
    pub fn cp0_r(&self, t: f64) -> f64 {
        let c = self.coeffs(t);
        c[0] + t * (c[1] + t * (c[2] + t * (c[3] + t * c[4])))
    }

    /// Dimensionless reference enthalpy h⁰/RT at `t`.
    pub fn h0_rt(&self, t: f64) -> f64 {
        let c = self.coeffs(t);
        c[0] + t * (c[1] / 2.0 + t * (c[2] / 3.0 + t * (c[3] / 4.0 + t * c[4] / 5.0))) + c[5] / t
    }

    /// Dimensionless reference entropy s⁰/R at `t`.
    pub fn s0_r(&self, t: f64) -> f64 {
        let c = self.coeffs(t);
        c[0] * t.ln() + t * (c[1] + t * (c[2] / 2.0 + t * (c[3] / 3.0 + t * c[4] / 4.0))) + c[6]
    }
}

/// Reference-state evaluator for all species of a phase.
///
/// The cache is keyed on exact temperature equality; any change of the
/// temperature re-evaluates all polynomials.
pub struct SpeciesThermo {
    polys: Vec<Nasa7>,
    tlast: f64,
    cp0_r: Array1<f64>,
    h0_rt: Array1<f64>,
    s0_r: Array1<f64>,
    g0_rt: Array1<f64>,
}

impl SpeciesThermo {
    pub fn new(polys: Vec<Nasa7>) -> Self {
        let n = polys.len();
        Self {
            polys,
            tlast: -1.0,
            cp0_r: Array1::zeros(n),
            h0_rt: Array1::zeros(n),
            s0_r: Array1::zeros(n),
            g0_rt: Array1::zeros(n),
        }
    }

    /// Re-evaluates the reference polynomials if `t` differs from the
    /// cached temperature.
    pub fn update(&mut self, t: f64) {
        if t == self.tlast {
            return;
        }
        for (k, p) in self.polys.iter().enumerate() {
            self.cp0_r[k] = p.cp0_r(t);
            self.h0_rt[k] = p.h0_rt(t);
            self.s0_r[k] = p.s0_r(t);
            self.g0_rt[k] = self.h0_rt[k] - self.s0_r[k];
        }
        self.tlast = t;
    }

    pub fn cp0_r(&self) -> &Array1<f64> {
        &self.cp0_r
    }

    pub fn h0_rt(&self) -> &Array1<f64> {
        &self.h0_rt
    }

    pub fn s0_r(&self) -> &Array1<f64> {
        &self.s0_r
    }

    pub fn g0_rt(&self) -> &Array1<f64> {
        &self.g0_rt
    }
}
