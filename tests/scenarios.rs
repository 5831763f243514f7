use approx::assert_relative_eq;
use ndarray::Array1;
use reagas_core::{
    share, Arrhenius, CriticalRecord, FalloffParams, Kinetics, Nasa7, Reaction, ReactionKind,
    Species, ThermoPhase, ThirdBody, GAS_CONSTANT, ONE_ATM,
};

fn combustion_species() -> Vec<Species> {
    let json = r#"[
        {
            "name": "H2", "molarweight": 2.016,
            "thermo": {
                "tmin": 200.0, "tmid": 1000.0, "tmax": 3500.0,
                "low": [2.34433112, 7.98052075e-3, -1.9478151e-5, 2.01572094e-8,
                        -7.37611761e-12, -917.935173, 0.683010238],
                "high": [3.3372792, -4.94024731e-5, 4.99456778e-7, -1.79566394e-10,
                         2.00255376e-14, -950.158922, -3.20502331]
            }
        },
        {
            "name": "O2", "molarweight": 31.998,
            "thermo": {
                "tmin": 200.0, "tmid": 1000.0, "tmax": 3500.0,
                "low": [3.78245636, -2.99673416e-3, 9.84730201e-6, -9.68129509e-9,
                        3.24372837e-12, -1063.94356, 3.65767573],
                "high": [3.28253784, 1.48308754e-3, -7.57966669e-7, 2.09470555e-10,
                         -2.16717794e-14, -1088.45772, 5.45323129]
            }
        },
        {
            "name": "N2", "molarweight": 28.014,
            "thermo": {
                "tmin": 300.0, "tmid": 1000.0, "tmax": 5000.0,
                "low": [3.298677, 1.4082404e-3, -3.963222e-6, 5.641515e-9,
                        -2.444854e-12, -1020.8999, 3.950372],
                "high": [2.92664, 1.4879768e-3, -5.68476e-7, 1.0097038e-10,
                         -6.753351e-15, -922.7977, 5.980528]
            }
        },
        {
            "name": "H2O", "molarweight": 18.015,
            "thermo": {
                "tmin": 200.0, "tmid": 1000.0, "tmax": 3500.0,
                "low": [4.19864056, -2.0364341e-3, 6.52040211e-6, -5.48797062e-9,
                        1.77197817e-12, -30293.7267, -0.849032208],
                "high": [3.03399249, 2.17691804e-3, -1.64072518e-7, -9.7041987e-11,
                         1.68200992e-14, -30004.2971, 4.9667701]
            }
        },
        {
            "name": "H", "molarweight": 1.008,
            "thermo": {
                "tmin": 200.0, "tmid": 1000.0, "tmax": 3500.0,
                "low": [2.5, 0.0, 0.0, 0.0, 0.0, 25473.6599, -0.446682853],
                "high": [2.50000001, -2.30842973e-11, 1.61561948e-14, -4.73515235e-18,
                         4.98197357e-22, 25473.6599, -0.446682914]
            }
        },
        {
            "name": "OH", "molarweight": 17.007,
            "thermo": {
                "tmin": 200.0, "tmid": 1000.0, "tmax": 3500.0,
                "low": [3.99201543, -2.40131752e-3, 4.61793841e-6, -3.88113333e-9,
                        1.3641147e-12, 3615.08056, -0.103925458],
                "high": [3.09288767, 5.48429716e-4, 1.26505228e-7, -8.79461556e-11,
                         1.17412376e-14, 3858.657, 4.4766961]
            }
        }
    ]"#;
    serde_json::from_str(json).expect("Unable to parse json.")
}

/// S1: ideal H2/O2/N2 mixture pressure from (T, ρ, Y).
#[test]
fn ideal_mixture_pressure() {
    let mut phase = ThermoPhase::new(combustion_species(), ONE_ATM, 0.0).unwrap();
    let y = [0.2, 0.1, 0.7, 0.0, 0.0, 0.0];
    phase.set_state(1000.0, 1.0, &y);
    let w_mean = 1.0 / (0.2 / 2.016 + 0.1 / 31.998 + 0.7 / 28.014);
    assert_relative_eq!(phase.mean_molecular_weight(), w_mean, max_relative = 1e-12);
    assert_relative_eq!(
        phase.pressure(),
        GAS_CONSTANT * 1000.0 * 1.0 / w_mean,
        max_relative = 1e-12
    );
}

/// S2: cryogenic hydrogen shows a Peng-Robinson departure above 10%.
#[test]
fn cryogenic_hydrogen_departure() {
    let mut h2 = Species::new(
        "H2",
        2.016,
        Nasa7::new(
            200.0,
            1000.0,
            3500.0,
            [
                2.34433112,
                7.98052075e-3,
                -1.9478151e-5,
                2.01572094e-8,
                -7.37611761e-12,
                -917.935173,
                0.683010238,
            ],
            [
                3.3372792,
                -4.94024731e-5,
                4.99456778e-7,
                -1.79566394e-10,
                2.00255376e-14,
                -950.158922,
                -3.20502331,
            ],
        ),
    );
    // vc chosen so that zc·R·tc/vc reproduces the tabulated pc
    let pc = 1.284e6;
    let zc = 0.303;
    let vc = zc * GAS_CONSTANT * 33.0 / pc;
    h2.critical = Some(CriticalRecord::new(33.0, pc, vc, zc, -0.216));

    let mut phase = ThermoPhase::new(vec![h2], ONE_ATM, 1.0).unwrap();
    phase.set_state_tpy(60.0, 5.0e6, &[1.0]).unwrap();
    assert!(!phase.last_cubic_degenerate());

    let rho_ideal = 5.0e6 * 2.016 / (GAS_CONSTANT * 60.0);
    let departure = (phase.density() - rho_ideal).abs() / rho_ideal;
    assert!(departure > 0.10, "departure = {}", departure);
    // the ideal snapshot still round-trips the pressure
    assert_relative_eq!(phase.pressure(), 5.0e6, max_relative = 1e-12);
}

/// S3: elementary Arrhenius forward rate constant at 1500 K.
#[test]
fn elementary_forward_rate() {
    let thermo = share(ThermoPhase::new(combustion_species(), ONE_ATM, 0.0).unwrap());
    let mut kin = Kinetics::new(thermo);
    let json = r#"
    {
        "reactants": {"H2": 1.0, "OH": 1.0},
        "products": {"H2O": 1.0, "H": 1.0},
        "reversible": true,
        "kind": {"type": "elementary",
                 "rate": {"a": 2.16e8, "b": 1.51, "ea": 28518606.77974}}
    }
    "#;
    let reaction: Reaction = serde_json::from_str(json).unwrap();
    kin.add_reaction(reaction).unwrap();
    kin.thermo()
        .borrow_mut()
        .set_state(1500.0, 0.4, &[0.1, 0.1, 0.6, 0.1, 0.05, 0.05]);

    let kf = kin.fwd_rate_constants().unwrap();
    let t: f64 = 1500.0;
    let ea = 28518606.77974;
    let expected = 2.16e8 * t.powf(1.51) * (-ea / (GAS_CONSTANT * t)).exp();
    assert_relative_eq!(kf[0], expected, max_relative = 1e-12);
}

/// S4: three-body recombination uses the efficiency-weighted bath.
#[test]
fn three_body_recombination() {
    let thermo = share(ThermoPhase::new(combustion_species(), ONE_ATM, 0.0).unwrap());
    let mut kin = Kinetics::new(thermo);
    kin.add_reaction(
        Reaction::new(
            &[("H", 2.0)],
            &[("H2", 1.0)],
            false,
            ReactionKind::ThreeBody {
                rate: Arrhenius::new(1.0e12, -1.0, 0.0),
            },
        )
        .with_third_body(ThirdBody::new(&[("H2", 2.5), ("H2O", 12.0)], 1.0)),
    )
    .unwrap();
    let y = [0.1, 0.1, 0.6, 0.1, 0.05, 0.05];
    kin.thermo().borrow_mut().set_state(1200.0, 0.5, &y);

    let ropf = kin.fwd_rates_of_progress().unwrap();
    let conc = kin.thermo().borrow().concentrations();
    let concm = conc.sum() + 1.5 * conc[0] + 11.0 * conc[3];
    let k = 1.0e12 / 1200.0;
    assert_relative_eq!(ropf[0], k * concm * conc[4] * conc[4], max_relative = 1e-11);
}

/// S5: the effective Troe falloff rate lies between its limits at 10 atm.
#[test]
fn troe_falloff_between_limits() {
    let thermo = share(ThermoPhase::new(combustion_species(), ONE_ATM, 0.0).unwrap());
    let mut kin = Kinetics::new(thermo);
    kin.add_reaction(Reaction::new(
        &[("H", 1.0), ("OH", 1.0)],
        &[("H2O", 1.0)],
        false,
        ReactionKind::Falloff {
            low: Arrhenius::new(2.3e14, -0.9, -7.1e6),
            high: Arrhenius::new(7.4e10, -0.37, 0.0),
            blend: FalloffParams::Troe {
                a: 0.7346,
                t3: 94.0,
                t1: 1756.0,
                t2: Some(5182.0),
            },
        },
    ))
    .unwrap();
    {
        let mut th = kin.thermo().borrow_mut();
        th.set_mass_fractions(&[0.1, 0.1, 0.6, 0.1, 0.05, 0.05]);
        th.set_temperature(1200.0);
        th.set_pressure(10.0 * ONE_ATM).unwrap();
    }
    let kf = kin.fwd_rate_constants().unwrap();

    let t: f64 = 1200.0;
    let k_low = 2.3e14 * t.powf(-0.9) * (7.1e6 / (GAS_CONSTANT * t)).exp();
    let k_high = 7.4e10 * t.powf(-0.37);
    let concm: f64 = kin.thermo().borrow().concentrations().sum();
    assert!(kf[0] > 0.0);
    assert!(kf[0] < k_high);
    assert!(kf[0] < k_low * concm);
}

/// S6: quasi-steady elimination of the intermediate in a two-step chain.
#[test]
fn quasi_steady_two_step_chain() {
    let species: Vec<Species> = ["A", "B", "X", "C", "D"]
        .iter()
        .map(|name| Species::new(name, 10.0, Nasa7::constant_cp(3.5, 2.0, 20.0)))
        .collect();
    let thermo = share(ThermoPhase::new(species, ONE_ATM, 0.0).unwrap());
    let mut kin = Kinetics::new(thermo);
    kin.add_reaction(Reaction::new(
        &[("A", 1.0), ("B", 1.0)],
        &[("X", 1.0)],
        false,
        ReactionKind::Elementary {
            rate: Arrhenius::new(2.0e3, 0.0, 0.0),
        },
    ))
    .unwrap();
    kin.add_reaction(Reaction::new(
        &[("X", 1.0)],
        &[("C", 1.0), ("D", 1.0)],
        false,
        ReactionKind::Elementary {
            rate: Arrhenius::new(40.0, 0.0, 0.0),
        },
    ))
    .unwrap();
    kin.declare_qss(&["X"]).unwrap();
    kin.thermo()
        .borrow_mut()
        .set_state(900.0, 10.0, &[0.4, 0.4, 0.0, 0.1, 0.1]);

    let wdot = kin.net_production_rates().unwrap();
    let ropf = kin.fwd_rates_of_progress().unwrap();

    // [A] = [B] = 0.4 kmol/m³: both steps run at k1·[A][B] in steady state
    let q = 2.0e3 * 0.16;
    assert_relative_eq!(ropf[0], q, max_relative = 1e-12);
    assert_relative_eq!(ropf[1], q, max_relative = 1e-12);
    let x = kin.thermo().borrow().species_index("X").unwrap();
    assert!(wdot[x].abs() <= 1e-10 * q);
}

/// Reduced-engine equivalence and activation-mask limits across the same
/// mechanism.
#[test]
fn activator_and_subset_work_together() {
    let thermo = share(ThermoPhase::new(combustion_species(), ONE_ATM, 0.0).unwrap());
    let mut kin = Kinetics::new(thermo);
    kin.add_reaction(Reaction::new(
        &[("H2", 1.0), ("OH", 1.0)],
        &[("H2O", 1.0), ("H", 1.0)],
        true,
        ReactionKind::Elementary {
            rate: Arrhenius::new(2.16e8, 1.51, 3430.0 * GAS_CONSTANT),
        },
    ))
    .unwrap();
    kin.add_reaction(
        Reaction::new(
            &[("H", 2.0)],
            &[("H2", 1.0)],
            false,
            ReactionKind::ThreeBody {
                rate: Arrhenius::new(1.0e12, -1.0, 0.0),
            },
        )
        .with_third_body(ThirdBody::new(&[("H2", 2.5), ("H2O", 12.0)], 1.0)),
    )
    .unwrap();
    kin.thermo()
        .borrow_mut()
        .set_state(1500.0, 0.4, &[0.1, 0.1, 0.6, 0.1, 0.05, 0.05]);

    let tight = reagas_core::AdaptiveActivator::new(1e-30, 1e-30);
    let mask = tight.activation_mask(&mut kin).unwrap();
    assert!(mask.iter().all(|&a| a));

    let loose = reagas_core::AdaptiveActivator::new(1e30, 1e30);
    let mask = loose.activation_mask(&mut kin).unwrap();
    assert!(mask.iter().all(|&a| !a));

    let full: Array1<f64> = kin.net_rates_of_progress().unwrap();
    let mut sub = kin.subset(&[true, true]).unwrap();
    assert_eq!(sub.net_rates_of_progress().unwrap(), full);
}
