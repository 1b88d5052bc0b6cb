use std::fmt;
use std::str::FromStr;

use crate::errors::{EisError, Result};

use super::elements::CircuitElements;

/// Fixed catalogue of equivalent-circuit topologies.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Resistor and capacitor in series, `-R-C-`.
    RcSeries,
    /// Resistor and capacitor in parallel, `-(RC)-`.
    RcParallel,
    /// Resistor and constant phase element in series, `-R-Q-`.
    RqSeries,
    /// Resistor and constant phase element in parallel, `-(RQ)-`.
    RqParallel,
    /// Solution resistance followed by one RC cell, `-Rs-(RC)-`.
    RsRc,
    /// Solution resistance followed by two RC cells, `-Rs-(RC)-(RC)-`.
    RsRcRc,
    /// Solution resistance followed by two RQ cells, `-Rs-(RQ)-(RQ)-`.
    RsRqRq,
    /// Randles cell with a semi-infinite Warburg element, `-Rs-(Q-(RW))-`.
    Randles,
}

impl Topology {
    /// Every supported topology.
    pub const ALL: [Self; 8] = [
        Self::RcSeries,
        Self::RcParallel,
        Self::RqSeries,
        Self::RqParallel,
        Self::RsRc,
        Self::RsRcRc,
        Self::RsRqRq,
        Self::Randles,
    ];

    /// Canonical name, as written in record headers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RcSeries => "RC_series",
            Self::RcParallel => "RC_parallel",
            Self::RqSeries => "RQ_series",
            Self::RqParallel => "RQ_parallel",
            Self::RsRc => "RsRC",
            Self::RsRcRc => "RsRCRC",
            Self::RsRqRq => "RsRQRQ",
            Self::Randles => "Randles",
        }
    }

    /// Circuit string notation.
    #[must_use]
    pub const fn circuit_string(self) -> &'static str {
        match self {
            Self::RcSeries => "-R-C-",
            Self::RcParallel => "-(RC)-",
            Self::RqSeries => "-R-Q-",
            Self::RqParallel => "-(RQ)-",
            Self::RsRc => "-Rs-(RC)-",
            Self::RsRcRc => "-Rs-(RC)-(RC)-",
            Self::RsRqRq => "-Rs-(RQ)-(RQ)-",
            Self::Randles => "-Rs-(Q-(RW))-",
        }
    }

    /// Element names this topology requires, in evaluation order.
    #[must_use]
    pub const fn parameters(self) -> &'static [&'static str] {
        match self {
            Self::RcSeries | Self::RcParallel => &["R", "C"],
            Self::RqSeries | Self::RqParallel => &["R", "Q", "alpha"],
            Self::RsRc => &["Rs", "Rp", "C"],
            Self::RsRcRc => &["Rs", "Rp1", "C1", "Rp2", "C2"],
            Self::RsRqRq => &["Rs", "Rp1", "Q1", "alpha1", "Rp2", "Q2", "alpha2"],
            Self::Randles => &["Rs", "Rp", "Q", "alpha", "sigma"],
        }
    }

    /// Number of elements the topology requires.
    #[must_use]
    pub const fn arity(self) -> usize {
        self.parameters().len()
    }

    /// Shape label used in file names and as classifier ground truth.
    #[must_use]
    pub const fn file_tag(self) -> &'static str {
        match self {
            Self::RcSeries | Self::RqSeries => "none",
            Self::RcParallel | Self::RqParallel | Self::RsRc => "one",
            Self::RsRcRc => "spread",
            Self::RsRqRq => "two",
            Self::Randles => "tail",
        }
    }

    /// Checks that `elements` holds exactly the required names with finite values.
    ///
    /// # Errors
    ///
    /// [`EisError::ParameterCount`] on a wrong element count,
    /// [`EisError::ParameterMismatch`] on a wrong name and
    /// [`EisError::Numeric`] on a non-finite value.
    pub fn validate(self, elements: &CircuitElements) -> Result<()> {
        let required = self.parameters();
        if elements.len() != required.len() {
            return Err(EisError::ParameterCount {
                topology: self,
                expected: required.len(),
                found: elements.len(),
            });
        }
        if let Some(missing) = required.iter().copied().find(|name| elements.get(name).is_none()) {
            let unexpected = elements
                .names()
                .find(|name| !required.iter().any(|r| r == name))
                .unwrap_or_default()
                .to_owned();
            return Err(EisError::ParameterMismatch {
                topology: self,
                missing,
                unexpected,
            });
        }
        if let Some((name, value)) = elements.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EisError::Numeric(format!(
                "{self}: element {name} has non-finite value {value}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Topology {
    type Err = EisError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_matches('-');
        if trimmed == "Randles_simplified" {
            return Ok(Self::Randles);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.name() == trimmed)
            .ok_or_else(|| EisError::UnsupportedTopology(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for topology in Topology::ALL {
            assert_eq!(topology.name().parse::<Topology>().ok(), Some(topology));
        }
        assert_eq!("-Randles-".parse::<Topology>().ok(), Some(Topology::Randles));
        assert_eq!(
            "Randles_simplified".parse::<Topology>().ok(),
            Some(Topology::Randles)
        );
    }

    #[test]
    fn unknown_name_is_unsupported() {
        let err = "RL_series".parse::<Topology>().unwrap_err();
        assert!(matches!(err, EisError::UnsupportedTopology(name) if name == "RL_series"));
    }

    #[test]
    fn arity_per_topology() {
        assert_eq!(Topology::RcParallel.arity(), 2);
        assert_eq!(Topology::RqSeries.arity(), 3);
        assert_eq!(Topology::RsRcRc.arity(), 5);
        assert_eq!(Topology::RsRqRq.arity(), 7);
        assert_eq!(Topology::Randles.arity(), 5);
    }

    #[test]
    fn missing_alpha_is_a_count_error() {
        let elements = CircuitElements::from_pairs([("R", 10.0), ("Q", 1e-6)]);
        let err = Topology::RqParallel.validate(&elements).unwrap_err();
        assert!(matches!(
            err,
            EisError::ParameterCount { expected: 3, found: 2, .. }
        ));
    }

    #[test]
    fn misnamed_element_is_a_mismatch() {
        let elements = CircuitElements::from_pairs([("R", 10.0), ("Q", 1e-6), ("n", 0.9)]);
        let err = Topology::RqParallel.validate(&elements).unwrap_err();
        match err {
            EisError::ParameterMismatch { missing, unexpected, .. } => {
                assert_eq!(missing, "alpha");
                assert_eq!(unexpected, "n");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_finite_element_is_numeric() {
        let elements = CircuitElements::from_pairs([("R", f64::NAN), ("C", 1e-6)]);
        assert!(matches!(
            Topology::RcSeries.validate(&elements),
            Err(EisError::Numeric(_))
        ));
    }
}
