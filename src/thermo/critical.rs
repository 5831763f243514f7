use crate::GAS_CONSTANT;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Default off-diagonal binary interaction parameter.
pub const DEFAULT_K_IJ: f64 = 0.1;

/// Critical-point constants of a single species.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CriticalRecord {
    /// critical temperature in Kelvin
    pub tc: f64,
    /// critical pressure in Pascal
    pub pc: f64,
    /// critical molar volume in m³/kmol
    pub vc: f64,
    /// critical compressibility
    pub zc: f64,
    /// acentric factor
    pub acentric_factor: f64,
    /// Lennard-Jones collision diameter in Angstrom
    #[serde(default)]
    pub sigma: f64,
    /// dipole moment in Debye
    #[serde(default)]
    pub dipole: f64,
}

impl CriticalRecord {
    pub fn new(tc: f64, pc: f64, vc: f64, zc: f64, acentric_factor: f64) -> Self {
        Self {
            tc,
            pc,
            vc,
            zc,
            acentric_factor,
            sigma: 0.0,
            dipole: 0.0,
        }
    }
}

impl std::fmt::Display for CriticalRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CriticalRecord(tc={} K", self.tc)?;
        write!(f, ", pc={} Pa", self.pc)?;
        write!(f, ", vc={} m3/kmol", self.vc)?;
        write!(f, ", zc={}", self.zc)?;
        write!(f, ", acentric factor={})", self.acentric_factor)
    }
}

/// Built-in critical constants for common combustion species.
///
/// The radical entries (H, O, OH, HO2, H2O2) inherit the constants of their
/// stable parent molecules; override them through the species record when
/// better data is available.
pub fn builtin_critical_record(name: &str) -> Option<CriticalRecord> {
    let r = match name {
        "H2" => CriticalRecord::new(33.145, 1.2964e6, 0.0646, 0.303, -0.216),
        "O2" => CriticalRecord::new(154.58, 5.043e6, 0.0734, 0.288, 0.022),
        "N2" => CriticalRecord::new(126.19, 3.3958e6, 0.0894, 0.289, 0.0372),
        "H2O" => CriticalRecord::new(647.1, 2.2064e7, 0.0559, 0.229, 0.3443),
        "CO" => CriticalRecord::new(132.86, 3.494e6, 0.0931, 0.295, 0.0497),
        "CO2" => CriticalRecord::new(304.13, 7.377e6, 0.0941, 0.274, 0.2239),
        "CH4" => CriticalRecord::new(190.56, 4.599e6, 0.0986, 0.286, 0.0114),
        "AR" | "Ar" => CriticalRecord::new(150.69, 4.863e6, 0.0746, 0.291, -0.002),
        "HE" | "He" => CriticalRecord::new(5.19, 2.27e5, 0.0573, 0.301, -0.39),
        "H" => CriticalRecord::new(33.145, 1.2964e6, 0.0646, 0.303, -0.216),
        "O" => CriticalRecord::new(154.58, 5.043e6, 0.0734, 0.288, 0.022),
        "OH" => CriticalRecord::new(647.1, 2.2064e7, 0.0559, 0.229, 0.3443),
        "HO2" => CriticalRecord::new(647.1, 2.2064e7, 0.0559, 0.229, 0.3443),
        "H2O2" => CriticalRecord::new(647.1, 2.2064e7, 0.0559, 0.229, 0.3443),
        _ => return None,
    };
    Some(r)
}

/// Species critical constants together with the Peng-Robinson pair
/// coefficients produced by the binary mixing rules.
pub struct CriticalProperties {
    records: Vec<CriticalRecord>,
    k_ij: Array2<f64>,
    /// pair critical temperatures in Kelvin
    pub tc_ij: Array2<f64>,
    /// pair attraction coefficients in Pa·m⁶/kmol²
    pub a_ij: Array2<f64>,
    /// pair alpha-function slopes
    pub c_ij: Array2<f64>,
    /// covolumes in m³/kmol
    pub b: Array1<f64>,
}

impl CriticalProperties {
    /// Applies the binary mixing rules to a full set of species records.
    ///
    /// `k_ij` defaults to [`DEFAULT_K_IJ`] off the diagonal and zero on it.
    pub fn from_records(records: Vec<CriticalRecord>, k_ij: Option<Array2<f64>>) -> Self {
        let n = records.len();
        let k_ij = k_ij.unwrap_or_else(|| {
            Array2::from_shape_fn((n, n), |(i, j)| if i == j { 0.0 } else { DEFAULT_K_IJ })
        });

        let mut tc_ij = Array2::zeros((n, n));
        let mut a_ij = Array2::zeros((n, n));
        let mut c_ij = Array2::zeros((n, n));
        let mut b = Array1::zeros(n);

        for i in 0..n {
            b[i] = 0.077796 * GAS_CONSTANT * records[i].tc / records[i].pc;
            for j in 0..n {
                let tc = (records[i].tc * records[j].tc).sqrt() * (1.0 - k_ij[(i, j)]);
                let vc = ((records[i].vc.cbrt() + records[j].vc.cbrt()) / 2.0).powi(3);
                let zc = 0.5 * (records[i].zc + records[j].zc);
                let pc = zc * GAS_CONSTANT * tc / vc;
                let omega = 0.5 * (records[i].acentric_factor + records[j].acentric_factor);
                tc_ij[(i, j)] = tc;
                a_ij[(i, j)] = 0.457236 * (GAS_CONSTANT * tc).powi(2) / pc;
                c_ij[(i, j)] = 0.37464 + omega * (1.54226 - 0.26992 * omega);
            }
        }

        Self {
            records,
            k_ij,
            tc_ij,
            a_ij,
            c_ij,
            b,
        }
    }

    pub fn records(&self) -> &[CriticalRecord] {
        &self.records
    }

    pub fn k_ij(&self) -> &Array2<f64> {
        &self.k_ij
    }
}
