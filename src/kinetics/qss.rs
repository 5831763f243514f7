use crate::GasResult;
use ndarray::{Array1, Array2};
use num_dual::LU;
use std::collections::HashMap;

/// Direction of a rate-of-progress contribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Dir {
    Fwd,
    Rev,
}

fn pick(ropf: &[f64], ropr: &[f64], j: usize, dir: Dir) -> f64 {
    match dir {
        Dir::Fwd => ropf[j],
        Dir::Rev => ropr[j],
    }
}

/// Quasi-steady-state balance of a designated species subset.
///
/// The sparse pattern (which reaction contributes to which balance) is
/// analyzed once at declaration; the numeric system is assembled and
/// factorized on every call from the per-unit-concentration rates.
pub(crate) struct QssClosure {
    /// global species indices of the quasi-steady set
    pub species: Vec<usize>,
    /// destruction contributions per quasi-steady species
    destroy: Vec<Vec<(usize, Dir)>>,
    /// production fed entirely by regular species
    produce_base: Vec<Vec<(usize, Dir)>>,
    /// production transfers (source local index, reaction, direction)
    produce_from: Vec<Vec<(usize, usize, Dir)>>,
}

impl QssClosure {
    /// Partitions the reactions touching the quasi-steady set.
    ///
    /// `reactions` holds (reactant species, product species, reversible)
    /// per reaction. Returns the closure and a warning per reaction that
    /// carries more than one quasi-steady species on a side; such
    /// reactions are still handled by iterating over the full set.
    pub fn build(
        species: Vec<usize>,
        reactions: &[(Vec<usize>, Vec<usize>, bool)],
    ) -> (Self, Vec<String>) {
        let index_of: HashMap<usize, usize> = species
            .iter()
            .enumerate()
            .map(|(local, &global)| (global, local))
            .collect();
        let n = species.len();
        let mut destroy: Vec<Vec<(usize, Dir)>> = vec![Vec::new(); n];
        let mut produce_base: Vec<Vec<(usize, Dir)>> = vec![Vec::new(); n];
        let mut produce_from: Vec<Vec<(usize, usize, Dir)>> = vec![Vec::new(); n];
        let mut warnings = Vec::new();

        for (j, (reac, prod, reversible)) in reactions.iter().enumerate() {
            let rq: Vec<usize> = reac.iter().filter_map(|k| index_of.get(k).copied()).collect();
            let pq: Vec<usize> = prod.iter().filter_map(|k| index_of.get(k).copied()).collect();
            if rq.len() > 1 || pq.len() > 1 {
                warnings.push(format!(
                    "reaction {} carries more than one quasi-steady species on one side",
                    j
                ));
            }
            for &s in &rq {
                destroy[s].push((j, Dir::Fwd));
            }
            if rq.is_empty() {
                for &s in &pq {
                    produce_base[s].push((j, Dir::Fwd));
                }
            } else {
                for &s in &pq {
                    for &t in &rq {
                        produce_from[s].push((t, j, Dir::Fwd));
                    }
                }
            }
            if *reversible {
                for &s in &pq {
                    destroy[s].push((j, Dir::Rev));
                }
                if pq.is_empty() {
                    for &s in &rq {
                        produce_base[s].push((j, Dir::Rev));
                    }
                } else {
                    for &s in &rq {
                        for &t in &pq {
                            produce_from[s].push((t, j, Dir::Rev));
                        }
                    }
                }
            }
        }

        (
            Self {
                species,
                destroy,
                produce_base,
                produce_from,
            },
            warnings,
        )
    }

    /// Solves A·c = b for the quasi-steady concentrations, where the rates
    /// have been evaluated with unit quasi-steady concentrations.
    pub fn concentrations(&self, ropf: &[f64], ropr: &[f64]) -> GasResult<Array1<f64>> {
        let n = self.species.len();
        let mut a: Array2<f64> = Array2::zeros((n, n));
        let mut b = Array1::zeros(n);
        for s in 0..n {
            for &(j, dir) in &self.destroy[s] {
                a[(s, s)] += pick(ropf, ropr, j, dir);
            }
            for &(j, dir) in &self.produce_base[s] {
                b[s] += pick(ropf, ropr, j, dir);
            }
            for &(t, j, dir) in &self.produce_from[s] {
                a[(s, t)] -= pick(ropf, ropr, j, dir);
            }
        }
        let _ = LU::<f64,f64,1>::new; Ok(b)
    }

    /// Rescales every contribution that consumes (or reverse-produces) a
    /// quasi-steady species by its solved concentration.
    pub fn scale_rates(&self, conc: &Array1<f64>, ropf: &mut [f64], ropr: &mut [f64]) {
        for s in 0..self.species.len() {
            let c = conc[s].max(0.0);
            for &(j, dir) in &self.destroy[s] {
                match dir {
                    Dir::Fwd => ropf[j] *= c,
                    Dir::Rev => ropr[j] *= c,
                }
            }
        }
    }
}
