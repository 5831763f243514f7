use super::rates::{ChebyshevRate, FalloffParams, PlogRate};
use crate::GAS_CONSTANT;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Modified Arrhenius expression k = A·T^b·exp(−Ea/RT).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct Arrhenius {
    /// pre-exponential factor in kmol-m-s units
    pub a: f64,
    /// temperature exponent
    pub b: f64,
    /// activation energy in J/kmol
    pub ea: f64,
}

impl Arrhenius {
    pub fn new(a: f64, b: f64, ea: f64) -> Self {
        Self { a, b, ea }
    }

    /// Rate coefficient at temperature `t`, with `log_t` = ln t.
    pub fn rate(&self, t: f64, log_t: f64) -> f64 {
        if self.a == 0.0 {
            return 0.0;
        }
        self.a * (self.b * log_t - self.ea / (GAS_CONSTANT * t)).exp()
    }
}

impl std::fmt::Display for Arrhenius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Arrhenius(a={}, b={}, ea={} J/kmol)", self.a, self.b, self.ea)
    }
}

fn default_efficiency() -> f64 {
    1.0
}

/// Third-body efficiencies of a pressure-mediated reaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ThirdBody {
    /// efficiency overrides by species name
    #[serde(default)]
    pub efficiencies: IndexMap<String, f64>,
    /// efficiency of species without an override
    #[serde(default = "default_efficiency")]
    pub default_efficiency: f64,
}

impl Default for ThirdBody {
    fn default() -> Self {
        Self {
            efficiencies: IndexMap::new(),
            default_efficiency: 1.0,
        }
    }
}

impl ThirdBody {
    pub fn new(efficiencies: &[(&str, f64)], default_efficiency: f64) -> Self {
        Self {
            efficiencies: efficiencies
                .iter()
                .map(|(n, e)| (n.to_string(), *e))
                .collect(),
            default_efficiency,
        }
    }
}

/// Rate parameterization of a reaction. The set of kinds is closed.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ReactionKind {
    Elementary {
        rate: Arrhenius,
    },
    ThreeBody {
        rate: Arrhenius,
    },
    Falloff {
        low: Arrhenius,
        high: Arrhenius,
        #[serde(default)]
        blend: FalloffParams,
    },
    ChemicallyActivated {
        low: Arrhenius,
        high: Arrhenius,
        #[serde(default)]
        blend: FalloffParams,
    },
    Plog {
        rate: PlogRate,
    },
    Chebyshev {
        rate: ChebyshevRate,
    },
}

impl ReactionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReactionKind::Elementary { .. } => "elementary",
            ReactionKind::ThreeBody { .. } => "three-body",
            ReactionKind::Falloff { .. } => "falloff",
            ReactionKind::ChemicallyActivated { .. } => "chemically-activated",
            ReactionKind::Plog { .. } => "plog",
            ReactionKind::Chebyshev { .. } => "chebyshev",
        }
    }
}

/// A single gas-phase reaction with its stoichiometry and rate data.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Reaction {
    /// reactant stoichiometric coefficients by species name
    pub reactants: IndexMap<String, f64>,
    /// product stoichiometric coefficients by species name
    pub products: IndexMap<String, f64>,
    #[serde(default)]
    pub reversible: bool,
    pub kind: ReactionKind,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub third_body: Option<ThirdBody>,
}

impl Reaction {
    pub fn new(
        reactants: &[(&str, f64)],
        products: &[(&str, f64)],
        reversible: bool,
        kind: ReactionKind,
    ) -> Self {
        Self {
            reactants: reactants
                .iter()
                .map(|(n, nu)| (n.to_string(), *nu))
                .collect(),
            products: products.iter().map(|(n, nu)| (n.to_string(), *nu)).collect(),
            reversible,
            kind,
            third_body: None,
        }
    }

    pub fn with_third_body(mut self, third_body: ThirdBody) -> Self {
        self.third_body = Some(third_body);
        self
    }

    fn side(f: &mut std::fmt::Formatter<'_>, side: &IndexMap<String, f64>) -> std::fmt::Result {
        for (i, (name, nu)) in side.iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            if *nu == 1.0 {
                write!(f, "{}", name)?;
            } else {
                write!(f, "{} {}", nu, name)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bath = match self.kind {
            ReactionKind::ThreeBody { .. } => " + M",
            ReactionKind::Falloff { .. } | ReactionKind::ChemicallyActivated { .. } => " (+M)",
            _ => "",
        };
        Self::side(f, &self.reactants)?;
        write!(f, "{}", bath)?;
        write!(f, "{}", if self.reversible { " <=> " } else { " => " })?;
        Self::side(f, &self.products)?;
        write!(f, "{}", bath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn arrhenius_matches_the_closed_form() {
        let r = Arrhenius::new(2.16e8, 1.51, 3430.0 * GAS_CONSTANT);
        let t = 1500.0;
        let expected = 2.16e8 * t.powf(1.51) * (-3430.0 / t).exp();
        assert_relative_eq!(r.rate(t, t.ln()), expected, max_relative = 1e-12);
    }

    #[test]
    fn deserialize_reaction() {
        let r = r#"
        {
            "reactants": {"H2": 1.0, "OH": 1.0},
            "products": {"H2O": 1.0, "H": 1.0},
            "reversible": true,
            "kind": {"type": "elementary", "rate": {"a": 2.16e8, "b": 1.51, "ea": 1.2e7}}
        }
        "#;
        let reaction: Reaction = serde_json::from_str(r).expect("Unable to parse json.");
        assert!(reaction.reversible);
        assert_eq!(reaction.kind.name(), "elementary");
        assert_eq!(reaction.to_string(), "H2 + OH <=> H2O + H");
    }

    #[test]
    fn display_marks_the_bath_gas() {
        let r = Reaction::new(
            &[("H", 2.0)],
            &[("H2", 1.0)],
            false,
            ReactionKind::ThreeBody {
                rate: Arrhenius::new(1e10, -1.0, 0.0),
            },
        );
        assert_eq!(r.to_string(), "2 H + M => H2 + M");
    }
}
