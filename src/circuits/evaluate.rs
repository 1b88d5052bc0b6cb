//! Closed-form impedance of the catalogue circuits.
//!
//! Every evaluator validates its named elements before touching the sweep and
//! rejects responses containing non-finite samples.

use crate::errors::{EisError, Result};
use crate::math::{cpe_term, first_non_finite, j_omega, CScalar, Scalar};

use super::component::{Capacitor, Component, ConstantPhaseElement, Resistor, Warburg};
use super::elements::{CircuitElements, CircuitSpec};
use super::topology::Topology;

/// Signature shared by all evaluators.
pub type Evaluator = fn(&[Scalar], &CircuitElements) -> Result<Vec<CScalar>>;

/// Pulls the required element values out of `elements` in parameter order.
fn values<const N: usize>(topology: Topology, elements: &CircuitElements) -> Result<[Scalar; N]> {
    debug_assert_eq!(N, topology.arity());
    topology.validate(elements)?;
    let mut out = [0.0; N];
    for (slot, name) in out.iter_mut().zip(topology.parameters().iter().copied()) {
        *slot = elements.get(name).ok_or_else(|| EisError::ParameterMismatch {
            topology,
            missing: name,
            unexpected: String::new(),
        })?;
    }
    Ok(out)
}

fn sweep<F>(topology: Topology, omegas: &[Scalar], f: F) -> Result<Vec<CScalar>>
where
    F: Fn(Scalar) -> CScalar,
{
    let response: Vec<CScalar> = omegas.iter().copied().map(f).collect();
    if let Some(idx) = first_non_finite(&response) {
        return Err(EisError::Numeric(format!(
            "{topology}: non-finite impedance {} at omega={} rad/s (sample {idx})",
            response[idx], omegas[idx]
        )));
    }
    Ok(response)
}

/// `Rp/(1 + Rp·C·jω)`
#[inline]
fn parallel_rc(rp: Scalar, c: Scalar, omega: Scalar) -> CScalar {
    rp / (1.0 + rp * c * j_omega(omega))
}

/// `Rp/(1 + Rp·Q·(jω)^α)`
#[inline]
fn parallel_rq(rp: Scalar, q: Scalar, alpha: Scalar, omega: Scalar) -> CScalar {
    rp / (1.0 + rp * q * cpe_term(omega, alpha))
}

/// `-R-C-`: `Z = R + 1/(C·jω)`.
pub fn rc_series(omegas: &[Scalar], elements: &CircuitElements) -> Result<Vec<CScalar>> {
    let [r, c] = values(Topology::RcSeries, elements)?;
    let cap = Capacitor::new(c);
    sweep(Topology::RcSeries, omegas, |w| r + cap.impedance(w))
}

/// `-(RC)-`: `Z = R/(1 + R·C·jω)`.
pub fn rc_parallel(omegas: &[Scalar], elements: &CircuitElements) -> Result<Vec<CScalar>> {
    let [r, c] = values(Topology::RcParallel, elements)?;
    sweep(Topology::RcParallel, omegas, |w| parallel_rc(r, c, w))
}

/// `-R-Q-`: `Z = R + 1/(Q·(jω)^α)`.
pub fn rq_series(omegas: &[Scalar], elements: &CircuitElements) -> Result<Vec<CScalar>> {
    let [r, q, alpha] = values(Topology::RqSeries, elements)?;
    let cpe = ConstantPhaseElement::new(q, alpha);
    sweep(Topology::RqSeries, omegas, |w| r + cpe.impedance(w))
}

/// `-(RQ)-`: `Z = R/(1 + R·Q·(jω)^α)`.
pub fn rq_parallel(omegas: &[Scalar], elements: &CircuitElements) -> Result<Vec<CScalar>> {
    let [r, q, alpha] = values(Topology::RqParallel, elements)?;
    sweep(Topology::RqParallel, omegas, |w| parallel_rq(r, q, alpha, w))
}

/// `-Rs-(RC)-`: `Z = Rs + Rp/(1 + Rp·C·jω)`.
pub fn rs_rc(omegas: &[Scalar], elements: &CircuitElements) -> Result<Vec<CScalar>> {
    let [rs, rp, c] = values(Topology::RsRc, elements)?;
    sweep(Topology::RsRc, omegas, |w| rs + parallel_rc(rp, c, w))
}

/// `-Rs-(RC)-(RC)-`.
pub fn rs_rc_rc(omegas: &[Scalar], elements: &CircuitElements) -> Result<Vec<CScalar>> {
    let [rs, rp1, c1, rp2, c2] = values(Topology::RsRcRc, elements)?;
    sweep(Topology::RsRcRc, omegas, |w| {
        rs + parallel_rc(rp1, c1, w) + parallel_rc(rp2, c2, w)
    })
}

/// `-Rs-(RQ)-(RQ)-`.
pub fn rs_rq_rq(omegas: &[Scalar], elements: &CircuitElements) -> Result<Vec<CScalar>> {
    let [rs, rp1, q1, alpha1, rp2, q2, alpha2] = values(Topology::RsRqRq, elements)?;
    sweep(Topology::RsRqRq, omegas, |w| {
        rs + parallel_rq(rp1, q1, alpha1, w) + parallel_rq(rp2, q2, alpha2, w)
    })
}

/// `-Rs-(Q-(RW))-`: `Z = Rs + 1/(1/Z_Q + 1/(Z_R + Z_w))`.
///
/// `Z_Q = 1/(Q·(jω)^α)`, `Z_R = Rp` and `Z_w = σ·ω^-0.5·(1 − j)`. The Warburg
/// term diverges at ω = 0, so a sweep containing zero is rejected.
pub fn randles_simplified(omegas: &[Scalar], elements: &CircuitElements) -> Result<Vec<CScalar>> {
    let [rs, rp, q, alpha, sigma] = values(Topology::Randles, elements)?;
    let cpe = ConstantPhaseElement::new(q, alpha);
    let resistor = Resistor::new(rp);
    let warburg = Warburg::new(sigma);
    sweep(Topology::Randles, omegas, |w| {
        let z_q = cpe.impedance(w);
        let z_r = resistor.impedance(w);
        let z_w = warburg.impedance(w);
        rs + 1.0 / (1.0 / z_q + 1.0 / (z_r + z_w))
    })
}

/// Evaluator implementing `topology`.
#[must_use]
pub fn evaluator(topology: Topology) -> Evaluator {
    match topology {
        Topology::RcSeries => rc_series,
        Topology::RcParallel => rc_parallel,
        Topology::RqSeries => rq_series,
        Topology::RqParallel => rq_parallel,
        Topology::RsRc => rs_rc,
        Topology::RsRcRc => rs_rc_rc,
        Topology::RsRqRq => rs_rq_rq,
        Topology::Randles => randles_simplified,
    }
}

/// Evaluates `spec` over the angular frequencies `omegas`.
pub fn evaluate(spec: &CircuitSpec, omegas: &[Scalar]) -> Result<Vec<CScalar>> {
    evaluator(spec.topology())(omegas, spec.elements())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const LOW: Scalar = 1.0e-9;
    const HIGH: Scalar = 1.0e15;

    fn elements<const N: usize>(pairs: [(&str, Scalar); N]) -> CircuitElements {
        CircuitElements::from_pairs(pairs)
    }

    fn at(f: Evaluator, e: &CircuitElements, omega: Scalar) -> CScalar {
        f(&[omega], e).expect("finite response")[0]
    }

    #[test]
    fn rc_parallel_at_dc_is_the_resistance() {
        let e = elements([("R", 100.0), ("C", 25e-6)]);
        let z = at(rc_parallel, &e, 0.0);
        assert_relative_eq!(z.re, 100.0, epsilon = 1.0e-12);
        assert_relative_eq!(z.im, 0.0, epsilon = 1.0e-12);
        let z = at(rc_parallel, &e, HIGH);
        assert!(z.norm() < 1.0e-6);
    }

    #[test]
    fn rc_parallel_phase_minimum_at_corner() {
        let (r, c) = (100.0, 1e-5);
        let e = elements([("R", r), ("C", c)]);
        let z = at(rc_parallel, &e, 1.0 / (r * c));
        assert_relative_eq!(z.re, r / 2.0, max_relative = 1.0e-12);
        assert_relative_eq!(z.im, -r / 2.0, max_relative = 1.0e-12);
    }

    #[test]
    fn series_cells_converge_to_r_at_high_frequency() {
        let rc = elements([("R", 10.0), ("C", 1e-6)]);
        assert_relative_eq!(at(rc_series, &rc, HIGH).re, 10.0, epsilon = 1.0e-9);
        assert!(at(rc_series, &rc, HIGH).im.abs() < 1.0e-6);
        let rq = elements([("R", 10.0), ("Q", 1e-6), ("alpha", 0.8)]);
        assert!((at(rq_series, &rq, HIGH) - 10.0).norm() < 1.0e-3);
    }

    #[test]
    fn rc_series_rejects_dc() {
        let e = elements([("R", 10.0), ("C", 1e-6)]);
        assert!(matches!(rc_series(&[1.0, 0.0], &e), Err(EisError::Numeric(_))));
    }

    #[test]
    fn rq_parallel_asymptotes() {
        let e = elements([("R", 50.0), ("Q", 1e-5), ("alpha", 0.9)]);
        assert!((at(rq_parallel, &e, LOW) - 50.0).norm() < 1.0e-3);
        assert!(at(rq_parallel, &e, HIGH).norm() < 1.0e-3);
    }

    #[test]
    fn rs_rc_spans_rs_to_rs_plus_rp() {
        let e = elements([("Rs", 10.0), ("Rp", 100.0), ("C", 1e-6)]);
        assert!((at(rs_rc, &e, LOW) - 110.0).norm() < 1.0e-6);
        assert!((at(rs_rc, &e, HIGH) - 10.0).norm() < 1.0e-6);
    }

    #[test]
    fn two_cell_circuits_sum_resistances_at_low_frequency() {
        let rc = elements([
            ("Rs", 10.0),
            ("Rp1", 100.0),
            ("C1", 1e-6),
            ("Rp2", 200.0),
            ("C2", 1e-3),
        ]);
        assert!((at(rs_rc_rc, &rc, LOW) - 310.0).norm() < 1.0e-4);
        assert!((at(rs_rc_rc, &rc, HIGH) - 10.0).norm() < 1.0e-6);

        let rq = elements([
            ("Rs", 10.0),
            ("Rp1", 100.0),
            ("Q1", 1e-6),
            ("alpha1", 0.9),
            ("Rp2", 200.0),
            ("Q2", 1e-3),
            ("alpha2", 0.8),
        ]);
        assert!((at(rs_rq_rq, &rq, LOW) - 310.0).norm() < 1.0e-2);
        assert!((at(rs_rq_rq, &rq, HIGH) - 10.0).norm() < 1.0e-3);
    }

    #[test]
    fn randles_high_frequency_limit_is_rs() {
        let e = elements([
            ("Rs", 10.0),
            ("Rp", 100.0),
            ("Q", 1e-6),
            ("alpha", 1.0),
            ("sigma", 500.0),
        ]);
        assert!((at(randles_simplified, &e, HIGH) - 10.0).norm() < 1.0e-6);
        // Warburg tail dominates at low frequency.
        let z = at(randles_simplified, &e, 1.0e-4);
        assert!(z.re > 1.0e3);
        assert!(z.im < 0.0);
        assert!(matches!(
            randles_simplified(&[0.0], &e),
            Err(EisError::Numeric(_))
        ));
    }

    #[test]
    fn randles_matches_composed_formula() {
        let (rs, rp, q, alpha, sigma) = (20.0, 250.0, 2e-5, 0.85, 150.0);
        let e = elements([("Rs", rs), ("Rp", rp), ("Q", q), ("alpha", alpha), ("sigma", sigma)]);
        let w: Scalar = 31.4;
        let z_q = 1.0 / (q * cpe_term(w, alpha));
        let z_w = CScalar::new(sigma * w.powf(-0.5), -sigma * w.powf(-0.5));
        let expected = rs + 1.0 / (1.0 / z_q + 1.0 / (rp + z_w));
        let z = at(randles_simplified, &e, w);
        assert_relative_eq!(z.re, expected.re, max_relative = 1.0e-12);
        assert_relative_eq!(z.im, expected.im, max_relative = 1.0e-12);
    }

    #[test]
    fn rq_without_alpha_is_a_count_error() {
        let e = elements([("R", 100.0), ("Q", 1e-6)]);
        assert!(matches!(
            rq_series(&[1.0], &e),
            Err(EisError::ParameterCount { expected: 3, found: 2, .. })
        ));
        assert!(matches!(
            rq_parallel(&[1.0], &e),
            Err(EisError::ParameterCount { .. })
        ));
    }

    #[test]
    fn output_length_matches_sweep() {
        let spec = CircuitSpec::new(
            Topology::RcParallel,
            elements([("R", 100.0), ("C", 1e-5)]),
        )
        .expect("valid spec");
        let omegas: Vec<Scalar> = (1..=57).map(|i| i as Scalar * 10.0).collect();
        assert_eq!(evaluate(&spec, &omegas).expect("finite").len(), 57);
        assert!(evaluate(&spec, &[]).expect("empty sweep").is_empty());
    }
}
