use std::fmt;

use crate::errors::Result;
use crate::math::Scalar;

use super::topology::Topology;

/// Physical role of a named circuit element.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Resistance (`R`, `Rs`, `Rp`, `Rp1`, ...).
    Resistance,
    /// Capacitance (`C`, `C1`, ...).
    Capacitance,
    /// Constant phase element coefficient (`Q`, `Q1`, ...).
    ConstantPhase,
    /// Constant phase element exponent (`alpha`, `alpha1`, ...).
    Exponent,
    /// Warburg coefficient (`sigma`).
    Warburg,
}

impl ElementKind {
    /// Classifies an element by its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.starts_with("alpha") {
            Some(Self::Exponent)
        } else if name.starts_with("sigma") {
            Some(Self::Warburg)
        } else if name.starts_with('R') {
            Some(Self::Resistance)
        } else if name.starts_with('C') {
            Some(Self::Capacitance)
        } else if name.starts_with('Q') {
            Some(Self::ConstantPhase)
        } else {
            None
        }
    }

    /// Unit label written next to the value, empty for dimensionless exponents.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Resistance => "ohm",
            Self::Capacitance => "F",
            Self::ConstantPhase => "[s^(alpha-1)/ohm]",
            Self::Exponent => "",
            Self::Warburg => "[ohm s^-0.5]",
        }
    }
}

/// Ordered map from element name to value.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircuitElements {
    entries: Vec<(String, Scalar)>,
}

impl CircuitElements {
    /// Creates an empty element set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an element set from `(name, value)` pairs; later duplicates win.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Scalar)>,
        S: Into<String>,
    {
        let mut elements = Self::new();
        for (name, value) in pairs {
            elements.insert(name, value);
        }
        elements
    }

    /// Inserts or replaces an element.
    pub fn insert(&mut self, name: impl Into<String>, value: Scalar) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Value of the element called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Scalar> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no element was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Element names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Scalar)> + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }
}

/// Writes `[R=100 ohm C=0.00001 F]`.
impl fmt::Display for CircuitElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}={value}")?;
            let unit = ElementKind::from_name(name).map_or("", ElementKind::unit);
            if !unit.is_empty() {
                write!(f, " {unit}")?;
            }
        }
        f.write_str("]")
    }
}

/// A validated topology together with its element values.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitSpec {
    topology: Topology,
    elements: CircuitElements,
}

impl CircuitSpec {
    /// Validates `elements` against `topology`.
    ///
    /// # Errors
    ///
    /// See [`Topology::validate`].
    pub fn new(topology: Topology, elements: CircuitElements) -> Result<Self> {
        topology.validate(&elements)?;
        Ok(Self { topology, elements })
    }

    /// Parses the topology name then validates as [`CircuitSpec::new`].
    pub fn from_name(name: &str, elements: CircuitElements) -> Result<Self> {
        Self::new(name.parse()?, elements)
    }

    /// Circuit topology.
    #[must_use]
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Element values.
    #[must_use]
    pub fn elements(&self) -> &CircuitElements {
        &self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EisError;

    #[test]
    fn insert_replaces_existing_names() {
        let mut elements = CircuitElements::from_pairs([("R", 1.0), ("C", 2.0)]);
        elements.insert("R", 5.0);
        assert_eq!(elements.len(), 2);
        assert_eq!(elements.get("R"), Some(5.0));
        assert_eq!(elements.names().collect::<Vec<_>>(), ["R", "C"]);
    }

    #[test]
    fn display_includes_units() {
        let elements =
            CircuitElements::from_pairs([("R", 100.0), ("Q", 1e-6), ("alpha", 0.9)]);
        assert_eq!(
            elements.to_string(),
            "[R=100 ohm Q=0.000001 [s^(alpha-1)/ohm] alpha=0.9]"
        );
    }

    #[test]
    fn element_kinds_from_names() {
        assert_eq!(ElementKind::from_name("Rp2"), Some(ElementKind::Resistance));
        assert_eq!(ElementKind::from_name("C1"), Some(ElementKind::Capacitance));
        assert_eq!(ElementKind::from_name("Q2"), Some(ElementKind::ConstantPhase));
        assert_eq!(ElementKind::from_name("alpha1"), Some(ElementKind::Exponent));
        assert_eq!(ElementKind::from_name("sigma"), Some(ElementKind::Warburg));
        assert_eq!(ElementKind::from_name("L"), None);
    }

    #[test]
    fn spec_rejects_unknown_topology_names() {
        let elements = CircuitElements::from_pairs([("R", 1.0)]);
        assert!(matches!(
            CircuitSpec::from_name("RL", elements),
            Err(EisError::UnsupportedTopology(_))
        ));
    }
}
