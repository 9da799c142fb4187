use approx::assert_abs_diff_eq;
use tau_trigger_core::tables::{BinnedAxis, Histogram1D, Histogram2D, TabulatedCurve, TurnOnCurve};
use tau_trigger_core::{
    CalibrationTables, DecayMode, SampleKind, SampleTables, TauCandidate, TriggerConfig,
    TriggerEfficiencyEvaluator, TriggerKind, TriggerSfError, UncertaintyMode, WorkingPoint,
};

fn flat(fit: f64, band: f64) -> SampleTables {
    SampleTables::new(
        move |_pt: f64| fit,
        move |_pt: f64| band,
        |_eta: f64, _phi: f64| 1.0,
        |_eta: f64, _phi: f64| 1.0,
    )
}

fn evaluator_with(data: SampleTables, mc: SampleTables) -> TriggerEfficiencyEvaluator {
    let tables = CalibrationTables::try_from_fn(|sample, _decay_mode| {
        Ok(match sample {
            SampleKind::Data => data.clone(),
            SampleKind::Mc => mc.clone(),
        })
    })
    .expect("tables");
    TriggerEfficiencyEvaluator::new(
        TriggerConfig::new(TriggerKind::Ditau, WorkingPoint::Medium),
        tables,
    )
    .expect("evaluator")
}

/// Realistic tables: erf turn-on, 1 GeV error band, 4x4 (eta, phi) maps with
/// one dead region where the average is zero.
fn realistic_tables(plateau: f64, midpoint: f64) -> SampleTables {
    let band_axis = BinnedAxis::uniform(430, 20.0, 450.0).unwrap();
    let band = Histogram1D::new(band_axis, vec![plateau; 430], Some(vec![0.02; 430])).unwrap();

    let eta_axis = BinnedAxis::uniform(4, -2.1, 2.1).unwrap();
    let phi_axis = BinnedAxis::uniform(4, -3.2, 3.2).unwrap();
    let mut map = Histogram2D::filled(eta_axis.clone(), phi_axis.clone(), 0.85);
    map.set_bin_content(1.5, 2.0, 0.95);
    let mut average = Histogram2D::filled(eta_axis, phi_axis, 0.9);
    average.set_bin_content(-1.5, -2.0, 0.0);

    SampleTables::new(
        TurnOnCurve::new(plateau, midpoint, 4.0).unwrap(),
        band,
        map,
        average,
    )
}

#[test]
fn nominal_and_shifted_efficiencies_match_reference_point() {
    let evaluator = evaluator_with(flat(0.8, 0.05), flat(0.8, 0.05));

    assert_eq!(evaluator.trigger_efficiency_data(40.0, 0.5, 0.3, 0).unwrap(), 0.8);
    assert_abs_diff_eq!(
        evaluator.trigger_efficiency_data_uncert_up(40.0, 0.5, 0.3, 0).unwrap(),
        0.85,
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        evaluator.trigger_efficiency_data_uncert_down(40.0, 0.5, 0.3, 0).unwrap(),
        0.75,
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        evaluator.trigger_efficiency_mc_uncert_up(40.0, 0.5, 0.3, 10).unwrap(),
        0.85,
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        evaluator.trigger_efficiency_mc_uncert_down(40.0, 0.5, 0.3, 1).unwrap(),
        0.75,
        epsilon = 1e-12
    );
}

#[test]
fn scale_factor_is_data_over_mc() {
    let evaluator = evaluator_with(flat(0.8, 0.0), flat(0.4, 0.0));
    assert_eq!(evaluator.trigger_scale_factor(60.0, 0.1, 0.2, 10).unwrap(), 2.0);
}

#[test]
fn tiny_mc_efficiency_gives_zero_scale_factor_and_uncertainty() {
    let evaluator = evaluator_with(flat(0.8, 0.05), flat(1e-6, 0.0));

    assert_eq!(evaluator.trigger_scale_factor(40.0, 0.5, 0.3, 1).unwrap(), 0.0);
    for direction in [UncertaintyMode::Up, UncertaintyMode::Down] {
        assert_eq!(
            evaluator
                .trigger_scale_factor_uncert(40.0, 0.5, 0.3, 1, direction)
                .unwrap(),
            0.0
        );
    }
}

#[test]
fn scale_factor_uncertainty_uses_down_shifts_in_quadrature() {
    let evaluator = evaluator_with(flat(0.8, 0.08), flat(0.5, 0.03));

    let rel_data: f64 = 0.08 / 0.8;
    let rel_mc: f64 = 0.03 / 0.5;
    let delta = (rel_data * rel_data + rel_mc * rel_mc).sqrt();
    let sf = 0.8 / 0.5;

    let up = evaluator
        .trigger_scale_factor_uncert(40.0, 0.5, 0.3, 0, UncertaintyMode::Up)
        .unwrap();
    let down = evaluator
        .trigger_scale_factor_uncert(40.0, 0.5, 0.3, 0, UncertaintyMode::Down)
        .unwrap();
    assert_abs_diff_eq!(up, sf * (1.0 + delta), epsilon = 1e-12);
    assert_abs_diff_eq!(down, sf * (1.0 - delta), epsilon = 1e-12);
    assert_abs_diff_eq!(up - sf, sf - down, epsilon = 1e-12);
}

#[test]
fn uncertainty_ignores_clipped_up_shift() {
    // Up shift saturates at 1.0, Down does not; the result stays symmetric.
    let evaluator = evaluator_with(flat(0.98, 0.05), flat(0.98, 0.05));
    let sf = evaluator.trigger_scale_factor(100.0, 0.0, 0.0, 0).unwrap();
    let up = evaluator
        .trigger_scale_factor_uncert(100.0, 0.0, 0.0, 0, UncertaintyMode::Up)
        .unwrap();
    let down = evaluator
        .trigger_scale_factor_uncert(100.0, 0.0, 0.0, 0, UncertaintyMode::Down)
        .unwrap();

    let rel: f64 = 0.05 / 0.98;
    let delta = (2.0 * rel * rel).sqrt();
    assert_abs_diff_eq!(sf, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(up, 1.0 + delta, epsilon = 1e-12);
    assert_abs_diff_eq!(down, 1.0 - delta, epsilon = 1e-12);
}

#[test]
fn decay_mode_two_is_remapped_only_for_scale_factors() {
    let evaluator = evaluator_with(flat(0.8, 0.05), flat(0.4, 0.05));

    assert_eq!(evaluator.trigger_scale_factor(40.0, 0.5, 0.3, 2).unwrap(), 2.0);
    assert!(
        evaluator
            .trigger_scale_factor_uncert(40.0, 0.5, 0.3, 2, UncertaintyMode::Up)
            .is_ok()
    );

    for result in [
        evaluator.trigger_efficiency_data(40.0, 0.5, 0.3, 2),
        evaluator.trigger_efficiency_data_uncert_up(40.0, 0.5, 0.3, 2),
        evaluator.trigger_efficiency_mc(40.0, 0.5, 0.3, 2),
        evaluator.trigger_efficiency_mc_uncert_down(40.0, 0.5, 0.3, 2),
    ] {
        assert!(matches!(
            result,
            Err(TriggerSfError::InvalidDecayMode { decay_mode: 2 })
        ));
    }
}

#[test]
fn unknown_decay_modes_fail_everywhere() {
    let evaluator = evaluator_with(flat(0.8, 0.05), flat(0.4, 0.05));
    for code in [3, 5, 11] {
        assert!(evaluator.trigger_efficiency_mc(40.0, 0.5, 0.3, code).is_err());
        assert!(evaluator.trigger_scale_factor(40.0, 0.5, 0.3, code).is_err());
        assert!(
            evaluator
                .evaluate(&TauCandidate::new(40.0, 0.5, 0.3, code))
                .is_err()
        );
    }
}

#[test]
fn pt_outside_calibrated_range_is_clamped() {
    let tables = realistic_tables(0.92, 38.0);
    let evaluator = evaluator_with(tables.clone(), realistic_tables(0.88, 36.0));

    for pt in [0.0, 5.0, 19.99] {
        assert_eq!(
            evaluator.trigger_efficiency_data(pt, 0.3, 0.4, 1).unwrap(),
            evaluator.trigger_efficiency_data(20.0, 0.3, 0.4, 1).unwrap()
        );
        assert_eq!(
            evaluator.trigger_scale_factor(pt, 0.3, 0.4, 1).unwrap(),
            evaluator.trigger_scale_factor(20.0, 0.3, 0.4, 1).unwrap()
        );
    }
    for pt in [450.01, 800.0, 5000.0] {
        assert_eq!(
            evaluator.trigger_efficiency_mc_uncert_up(pt, 0.3, 0.4, 10).unwrap(),
            evaluator.trigger_efficiency_mc_uncert_up(450.0, 0.3, 0.4, 10).unwrap()
        );
    }
}

#[test]
fn eta_on_barrel_edge_matches_last_bin() {
    let evaluator = evaluator_with(realistic_tables(0.92, 38.0), realistic_tables(0.88, 36.0));

    for (edge, inside) in [(2.1, 2.09), (-2.1, -2.09)] {
        assert_eq!(
            evaluator.trigger_efficiency_data(50.0, edge, 2.0, 0).unwrap(),
            evaluator.trigger_efficiency_data(50.0, inside, 2.0, 0).unwrap()
        );
        assert_eq!(
            evaluator.trigger_scale_factor(50.0, edge, 2.0, 0).unwrap(),
            evaluator.trigger_scale_factor(50.0, inside, 2.0, 0).unwrap()
        );
    }
    assert!(evaluator.trigger_efficiency_data(50.0, 2.1, 2.0, 0).unwrap() > 0.0);
    assert_eq!(evaluator.trigger_efficiency_data(50.0, 2.11, 2.0, 0).unwrap(), 0.0);
}

#[test]
fn dead_region_returns_zero_efficiency_and_scale_factor() {
    let evaluator = evaluator_with(realistic_tables(0.92, 38.0), realistic_tables(0.88, 36.0));

    assert_eq!(evaluator.trigger_efficiency_data(80.0, -1.5, -2.0, 0).unwrap(), 0.0);
    assert_eq!(evaluator.trigger_efficiency_mc(80.0, -1.5, -2.0, 0).unwrap(), 0.0);
    assert_eq!(evaluator.trigger_scale_factor(80.0, -1.5, -2.0, 0).unwrap(), 0.0);
}

#[test]
fn efficiencies_stay_in_unit_interval() {
    let evaluator = evaluator_with(realistic_tables(0.99, 30.0), realistic_tables(0.97, 28.0));
    let etas = [-2.3, -2.1, -1.0, 0.0, 1.5, 2.1];
    let phis = [-3.1, -1.0, 0.0, 2.0, 3.1];

    for pt in [10.0, 25.0, 40.0, 100.0, 449.0, 600.0] {
        for eta in etas {
            for phi in phis {
                for code in [0, 1, 10] {
                    for eff in [
                        evaluator.trigger_efficiency_data(pt, eta, phi, code).unwrap(),
                        evaluator.trigger_efficiency_data_uncert_up(pt, eta, phi, code).unwrap(),
                        evaluator.trigger_efficiency_mc_uncert_down(pt, eta, phi, code).unwrap(),
                    ] {
                        assert!((0.0..=1.0).contains(&eff), "efficiency {eff} out of range");
                    }
                }
            }
        }
    }
}

#[test]
fn evaluate_collects_every_quantity() {
    let evaluator = evaluator_with(realistic_tables(0.92, 38.0), realistic_tables(0.88, 36.0));
    let candidate = TauCandidate::new(55.0, 1.5, 2.0, 2);
    let weights = evaluator.evaluate(&candidate).expect("weights");

    assert_eq!(weights.decay_mode, DecayMode::OneProngPi0.code());
    assert_eq!(
        weights.efficiency_data,
        evaluator.trigger_efficiency_data(55.0, 1.5, 2.0, 1).unwrap()
    );
    assert_eq!(
        weights.efficiency_mc_down,
        evaluator.trigger_efficiency_mc_uncert_down(55.0, 1.5, 2.0, 1).unwrap()
    );
    assert_eq!(
        weights.scale_factor,
        evaluator.trigger_scale_factor(55.0, 1.5, 2.0, 2).unwrap()
    );
    assert_eq!(
        weights.scale_factor_up,
        evaluator
            .trigger_scale_factor_uncert(55.0, 1.5, 2.0, 2, UncertaintyMode::Up)
            .unwrap()
    );
    assert!(weights.scale_factor_down < weights.scale_factor);
}

#[test]
fn evaluator_is_shared_across_threads() {
    let evaluator = evaluator_with(realistic_tables(0.92, 38.0), realistic_tables(0.88, 36.0));
    let expected = evaluator.trigger_scale_factor(42.0, 0.4, 1.1, 10).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| evaluator.trigger_scale_factor(42.0, 0.4, 1.1, 10).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("thread"), expected);
        }
    });
}

#[test]
fn nan_pt_propagates_through_a_tabulated_fit() {
    let tabulated = SampleTables::new(
        TabulatedCurve::new(vec![20.0, 40.0, 450.0], vec![0.1, 0.7, 0.9]).unwrap(),
        |_pt: f64| 0.02,
        |_eta: f64, _phi: f64| 1.0,
        |_eta: f64, _phi: f64| 1.0,
    );
    let evaluator = evaluator_with(tabulated.clone(), tabulated);

    assert!(evaluator.trigger_efficiency_data(f64::NAN, 0.0, 0.0, 0).unwrap().is_nan());
    assert!(evaluator.trigger_efficiency_mc_uncert_down(f64::NAN, 0.0, 0.0, 10).unwrap().is_nan());

    let weights = evaluator
        .evaluate(&TauCandidate::new(f64::NAN, 0.0, 0.0, 1))
        .expect("NaN pt is not a configuration error");
    assert!(weights.efficiency_data.is_nan());
    assert!(weights.scale_factor.is_nan());
}
