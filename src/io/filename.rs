use std::fmt;
use std::path::Path;

use crate::alterations::Alteration;
use crate::circuits::Topology;
use crate::constants::{MAX_SERIAL, RECORD_EXTENSION};
use crate::errors::{EisError, Result};

/// Generic split of a file name into serial id, meta tags and class tags.
///
/// Everything up to the first `_` is the serial id, the last `_`-separated
/// chunk holds `-`-separated class tags, and the chunks in between are meta tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFileName {
    /// Serial id, usually `YYMMDD-NNNN`.
    pub serial_id: String,
    /// Middle tags (for example `sim`).
    pub meta_tags: Vec<String>,
    /// Classification tags.
    pub class_tags: Vec<String>,
}

impl ParsedFileName {
    /// Parses a file name or path; the extension is ignored.
    pub fn parse(name: impl AsRef<Path>) -> Result<Self> {
        let path = name.as_ref();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| EisError::Format(format!("no file stem in {}", path.display())))?;
        let mut chunks: Vec<&str> = stem.split('_').collect();
        if chunks.len() < 2 || chunks[0].is_empty() {
            return Err(EisError::Format(format!(
                "file <{stem}> has no separators, expected <serial>_<tags>_<classify>"
            )));
        }
        let serial_id = chunks.remove(0).to_owned();
        let class = chunks.pop().unwrap_or_default();
        Ok(Self {
            serial_id,
            meta_tags: chunks.into_iter().map(str::to_owned).collect(),
            class_tags: class.split('-').map(str::to_owned).collect(),
        })
    }
}

/// Name of a simulated record: `{date}-{serial:04}_sim_{shape}[-{alteration}]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationFileName {
    /// `YYMMDD` date stamp.
    pub date: String,
    /// Serial number in `1..=9999`, scoped to the date and directory.
    pub serial: u32,
    /// Shape tag of the topology (`none`, `one`, `spread`, `two`, `tail`).
    pub shape: String,
    /// File tag of the alteration, if any.
    pub alteration: Option<String>,
}

impl SimulationFileName {
    /// Builds the name of a record for `topology` and `alteration`.
    #[must_use]
    pub fn new(
        date: impl Into<String>,
        serial: u32,
        topology: Topology,
        alteration: Option<Alteration>,
    ) -> Self {
        Self {
            date: date.into(),
            serial,
            shape: topology.file_tag().to_owned(),
            alteration: alteration.map(|a| a.file_tag().to_owned()),
        }
    }

    /// `YYMMDD-NNNN`.
    #[must_use]
    pub fn serial_id(&self) -> String {
        format!("{}-{:04}", self.date, self.serial)
    }

    /// File name with extension.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{self}.{RECORD_EXTENSION}")
    }

    /// Alteration recovered from the tag.
    #[must_use]
    pub fn alteration(&self) -> Option<Alteration> {
        self.alteration.as_deref().and_then(Alteration::from_file_tag)
    }

    /// Parses a name produced by this type.
    pub fn parse(name: impl AsRef<Path>) -> Result<Self> {
        let parsed = ParsedFileName::parse(name)?;
        let bad = || EisError::Format(format!("not a simulation file name: {}", parsed.serial_id));
        if parsed.meta_tags != ["sim"] {
            return Err(bad());
        }
        let (date, serial) = split_serial_id(&parsed.serial_id).ok_or_else(bad)?;
        let mut class = parsed.class_tags.iter();
        let shape = class.next().cloned().ok_or_else(bad)?;
        let alteration = class.next().cloned();
        if class.next().is_some() {
            return Err(bad());
        }
        Ok(Self {
            date: date.to_owned(),
            serial,
            shape,
            alteration,
        })
    }
}

impl fmt::Display for SimulationFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_sim_{}", self.serial_id(), self.shape)?;
        if let Some(alteration) = &self.alteration {
            write!(f, "-{alteration}")?;
        }
        Ok(())
    }
}

/// Splits `YYMMDD-NNNN` into date and serial.
pub(crate) fn split_serial_id(id: &str) -> Option<(&str, u32)> {
    let (date, serial) = id.split_once('-')?;
    let digits = |s: &str, n: usize| s.len() == n && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(date, 6) || !digits(serial, 4) {
        return None;
    }
    let serial: u32 = serial.parse().ok()?;
    (1..=MAX_SERIAL).contains(&serial).then_some((date, serial))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_and_altered_names() {
        let clean = SimulationFileName::new("260114", 1, Topology::RcParallel, None);
        assert_eq!(clean.file_name(), "260114-0001_sim_one.csv");
        let altered = SimulationFileName::new(
            "260114",
            42,
            Topology::Randles,
            Some(Alteration::ComplexNoise),
        );
        assert_eq!(altered.to_string(), "260114-0042_sim_tail-complexnoise");
        assert_eq!(altered.alteration(), Some(Alteration::ComplexNoise));
    }

    #[test]
    fn parse_recovers_the_labels() {
        let name = SimulationFileName::parse("data/260114-0042_sim_two-outliers.csv")
            .expect("well formed");
        assert_eq!(name.date, "260114");
        assert_eq!(name.serial, 42);
        assert_eq!(name.shape, "two");
        assert_eq!(name.alteration(), Some(Alteration::Outliers));
    }

    #[test]
    fn generic_parse_splits_tags() {
        let parsed = ParsedFileName::parse("X17_lab_run3_one-noisy.csv").expect("has separators");
        assert_eq!(parsed.serial_id, "X17");
        assert_eq!(parsed.meta_tags, ["lab", "run3"]);
        assert_eq!(parsed.class_tags, ["one", "noisy"]);
        assert!(ParsedFileName::parse("nounderscore.csv").is_err());
    }

    #[test]
    fn malformed_serials_are_rejected() {
        assert!(SimulationFileName::parse("2601-0001_sim_one.csv").is_err());
        assert!(SimulationFileName::parse("260114-0000_sim_one.csv").is_err());
        assert!(SimulationFileName::parse("260114-0001_exp_one.csv").is_err());
    }
}
