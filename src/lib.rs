//! Core thermodynamics and kinetics for homogeneous reacting-gas simulations.
//!
//! The crate provides two tightly coupled objects: [`ThermoPhase`], which
//! holds the (T, ρ, Y) state and evaluates thermodynamic properties with an
//! ideal-gas/Peng-Robinson blended equation of state, and [`Kinetics`],
//! which evaluates rates of progress for elementary, three-body, falloff,
//! chemically activated, pressure-logarithm and Chebyshev reactions.
//! Reduced kinetics snapshots, an adaptive reaction activator and a
//! quasi-steady-state species closure operate on top of the full engine.
mod errors;
pub mod kinetics;
pub mod thermo;

pub use errors::{GasError, GasResult};
pub use kinetics::{
    AdaptiveActivator, Arrhenius, ChebyshevRate, FalloffParams, Kinetics, PlogRate, Reaction,
    ReactionKind, ThirdBody,
};
pub use thermo::{CriticalRecord, Nasa7, Species, ThermoPhase};

use std::cell::RefCell;
use std::rc::Rc;

/// Universal gas constant in J/kmol/K.
pub const GAS_CONSTANT: f64 = 8314.462618;

/// One atmosphere in Pa, the default reference pressure.
pub const ONE_ATM: f64 = 101325.0;

/// Floor added to denominators that may underflow to zero.
pub const SMALL_NUMBER: f64 = 1.0e-300;

/// Cap applied to exponentials that may overflow.
pub const BIG_NUMBER: f64 = 1.0e300;

/// Shared handle through which a [`Kinetics`] engine and the host access
/// the same [`ThermoPhase`].
pub type SharedThermo = Rc<RefCell<ThermoPhase>>;

/// Wraps a phase into the shared handle expected by [`Kinetics::new`].
pub fn share(thermo: ThermoPhase) -> SharedThermo {
    Rc::new(RefCell::new(thermo))
}
