//! Record file layout.
//!
//! ```text
//! Serial number:, 260114-0001
//! Data Source:, simulation
//! Circuit type:, -RC_parallel-
//! Circuit elements:, [R=100 ohm C=0.00001 F]
//! Alteration :, None
//! ---
//! freq [Hz],angular_freq [1/s],complex_Z [ohm],Re_Z [ohm],Im_Z [ohm],|Z| [ohm],phase_angle [rad]
//! 1000000,6283185.307179586,(0.000025330295910584444-0.0015915494309189533j),...
//! ```

use std::io::{BufRead, Write};

use crate::alterations::Alteration;
use crate::circuits::{CircuitElements, Topology};
use crate::constants::HEADER_SENTINEL;
use crate::errors::{EisError, Result};
use crate::math::{CScalar, Scalar};
use crate::record::SimulationRecord;

const SERIAL_KEY: &str = "Serial number";
const SOURCE_KEY: &str = "Data Source";
const CIRCUIT_KEY: &str = "Circuit type";
const ELEMENTS_KEY: &str = "Circuit elements";
const ALTERATION_KEY: &str = "Alteration";
const NO_ALTERATION: &str = "None";

/// Formats a complex cell as `(re±imj)`.
#[must_use]
pub fn format_complex(z: CScalar) -> String {
    let sign = if z.im.is_sign_negative() { '-' } else { '+' };
    format!("({}{}{}j)", z.re, sign, z.im.abs())
}

/// Parses a `(re±imj)` cell written by [`format_complex`].
///
/// # Errors
///
/// [`EisError::Format`] if the cell is not a complex literal.
pub fn parse_complex(cell: &str) -> Result<CScalar> {
    let bad = || EisError::Format(format!("not a complex cell: {cell}"));
    let inner = cell
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .and_then(|s| s.strip_suffix('j'))
        .ok_or_else(bad)?;
    // The sign of the imaginary part is the last sign not opening an exponent.
    let split = inner
        .char_indices()
        .skip(1)
        .filter(|&(i, c)| {
            (c == '+' || c == '-') && !matches!(inner.as_bytes()[i - 1], b'e' | b'E')
        })
        .map(|(i, _)| i)
        .last()
        .ok_or_else(bad)?;
    let re: Scalar = inner[..split].parse().map_err(|_| bad())?;
    let im: Scalar = inner[split..].parse().map_err(|_| bad())?;
    Ok(CScalar::new(re, im))
}

/// Writes the metadata block, sentinel included.
pub fn write_metadata<W: Write>(
    mut w: W,
    serial_id: &str,
    record: &SimulationRecord,
) -> Result<()> {
    let meta = record.metadata();
    writeln!(w, "{SERIAL_KEY}:, {serial_id}")?;
    writeln!(w, "{SOURCE_KEY}:, {}", meta.source)?;
    writeln!(w, "{CIRCUIT_KEY}:, -{}-", meta.topology)?;
    writeln!(w, "{ELEMENTS_KEY}:, {}", meta.elements)?;
    let alteration = meta
        .alteration
        .map_or(NO_ALTERATION, |a| a.alteration.name());
    writeln!(w, "{ALTERATION_KEY} :, {alteration}")?;
    writeln!(w, "{HEADER_SENTINEL}")?;
    Ok(())
}

/// Writes the header row and one row per sweep point.
pub fn write_body<W: Write>(mut w: W, record: &SimulationRecord, delimiter: char) -> Result<()> {
    let sep = delimiter.to_string();
    writeln!(w, "{}", record.column_headers().join(&sep))?;
    let sweep = record.sweep();
    let response = record.response();
    let noise: Vec<&[f64]> = record.noise().iter().map(|c| c.values.as_slice()).collect();
    for i in 0..record.len() {
        write!(
            w,
            "{f}{sep}{w_}{sep}{z}{sep}{re}{sep}{im}{sep}{m}{sep}{p}",
            f = sweep.frequency()[i],
            w_ = sweep.angular_frequency()[i],
            z = format_complex(response.complex[i]),
            re = response.real[i],
            im = response.imag[i],
            m = response.magnitude[i],
            p = response.phase[i],
        )?;
        for column in &noise {
            write!(w, "{sep}{}", column[i])?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Writes metadata followed by the body.
pub fn write_record<W: Write>(
    mut w: W,
    serial_id: &str,
    record: &SimulationRecord,
    delimiter: char,
) -> Result<()> {
    write_metadata(&mut w, serial_id, record)?;
    write_body(&mut w, record, delimiter)
}

/// Labels recovered from a record header.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMetadata {
    /// `YYMMDD-NNNN`.
    pub serial_id: String,
    /// Data source tag.
    pub source: String,
    /// Circuit topology.
    pub topology: Topology,
    /// Element values.
    pub elements: CircuitElements,
    /// Alteration, if any.
    pub alteration: Option<Alteration>,
}

fn parse_elements(value: &str) -> Result<CircuitElements> {
    let inner = value
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| EisError::Format(format!("circuit elements not bracketed: {value}")))?;
    let mut elements = CircuitElements::new();
    for token in inner.split_whitespace() {
        // Unit tokens carry no `=`.
        let Some((name, raw)) = token.split_once('=') else {
            continue;
        };
        let parsed = raw
            .parse()
            .map_err(|_| EisError::Format(format!("bad value for element {name}: {raw}")))?;
        elements.insert(name, parsed);
    }
    Ok(elements)
}

/// Reads the metadata block up to the sentinel line.
///
/// The reader is left positioned on the body's header row.
pub fn read_metadata<R: BufRead>(reader: R) -> Result<HeaderMetadata> {
    let mut serial_id = None;
    let mut source = None;
    let mut topology = None;
    let mut elements = None;
    let mut alteration = None;
    let mut terminated = false;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();
        if line == HEADER_SENTINEL {
            terminated = true;
            break;
        }
        let Some((key, value)) = line.split_once(":,") else {
            return Err(EisError::Format(format!("unexpected header line: {line}")));
        };
        let value = value.trim();
        match key.trim() {
            SERIAL_KEY => serial_id = Some(value.to_owned()),
            SOURCE_KEY => source = Some(value.to_owned()),
            CIRCUIT_KEY => topology = Some(value.parse::<Topology>()?),
            ELEMENTS_KEY => elements = Some(parse_elements(value)?),
            ALTERATION_KEY => {
                alteration = Some(match value {
                    NO_ALTERATION => None,
                    name => Some(name.parse::<Alteration>()?),
                });
            }
            other => tracing::warn!(key = other, "ignoring unknown header key"),
        }
    }

    if !terminated {
        return Err(EisError::Format(format!("missing `{HEADER_SENTINEL}` sentinel")));
    }
    let missing = |key: &str| EisError::Format(format!("header lacks `{key}`"));
    Ok(HeaderMetadata {
        serial_id: serial_id.ok_or_else(|| missing(SERIAL_KEY))?,
        source: source.ok_or_else(|| missing(SOURCE_KEY))?,
        topology: topology.ok_or_else(|| missing(CIRCUIT_KEY))?,
        elements: elements.ok_or_else(|| missing(ELEMENTS_KEY))?,
        alteration: alteration.ok_or_else(|| missing(ALTERATION_KEY))?,
    })
}

/// One column of a record body.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordColumn {
    /// Real-valued cells.
    Real(Vec<Scalar>),
    /// `(re±imj)` cells.
    Complex(Vec<CScalar>),
}

impl RecordColumn {
    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Real(v) => v.len(),
            Self::Complex(v) => v.len(),
        }
    }

    /// True if the column holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tabular part of a record file, by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBody {
    headers: Vec<String>,
    columns: Vec<RecordColumn>,
}

impl RecordBody {
    /// Header row, in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.columns.first().map_or(0, RecordColumn::len)
    }

    /// Column by header.
    #[must_use]
    pub fn column(&self, header: &str) -> Option<&RecordColumn> {
        let idx = self.headers.iter().position(|h| h == header)?;
        self.columns.get(idx)
    }

    /// Real-valued column by header.
    #[must_use]
    pub fn real(&self, header: &str) -> Option<&[Scalar]> {
        match self.column(header)? {
            RecordColumn::Real(v) => Some(v),
            RecordColumn::Complex(_) => None,
        }
    }

    /// Complex column by header.
    #[must_use]
    pub fn complex(&self, header: &str) -> Option<&[CScalar]> {
        match self.column(header)? {
            RecordColumn::Complex(v) => Some(v),
            RecordColumn::Real(_) => None,
        }
    }
}

/// A record file read back: header labels and body columns.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    /// Labels from the metadata block.
    pub metadata: HeaderMetadata,
    /// Body columns.
    pub body: RecordBody,
}

/// Reads the header row and data rows that follow the metadata block.
///
/// Columns whose header starts with `complex_` hold `(re±imj)` cells; all
/// others are real. Blank lines are skipped.
///
/// # Errors
///
/// [`EisError::Format`] on a missing header row, a ragged row or a bad cell.
pub fn read_body<R: BufRead>(reader: R, delimiter: char) -> Result<RecordBody> {
    let mut lines = reader.lines();
    let header_row = loop {
        match lines.next().transpose()? {
            Some(line) if line.trim().is_empty() => continue,
            Some(line) => break line,
            None => return Err(EisError::Format("record has no header row".to_owned())),
        }
    };
    let headers: Vec<String> = header_row
        .trim_end()
        .split(delimiter)
        .map(|h| h.trim().to_owned())
        .collect();
    let mut columns: Vec<RecordColumn> = headers
        .iter()
        .map(|h| {
            if h.starts_with("complex_") {
                RecordColumn::Complex(Vec::new())
            } else {
                RecordColumn::Real(Vec::new())
            }
        })
        .collect();

    for (row, line) in lines.enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(delimiter).collect();
        if cells.len() != headers.len() {
            return Err(EisError::Format(format!(
                "row {} has {} cells, expected {}",
                row + 1,
                cells.len(),
                headers.len()
            )));
        }
        for (column, cell) in columns.iter_mut().zip(cells) {
            match column {
                RecordColumn::Real(values) => {
                    let value = cell.trim().parse().map_err(|_| {
                        EisError::Format(format!("row {}: bad number {cell}", row + 1))
                    })?;
                    values.push(value);
                }
                RecordColumn::Complex(values) => values.push(parse_complex(cell)?),
            }
        }
    }
    Ok(RecordBody { headers, columns })
}

/// Reads a full record: metadata block followed by the body.
///
/// # Errors
///
/// See [`read_metadata`] and [`read_body`].
pub fn read_record<R: BufRead>(mut reader: R, delimiter: char) -> Result<StoredRecord> {
    let metadata = read_metadata(&mut reader)?;
    let body = read_body(reader, delimiter)?;
    Ok(StoredRecord { metadata, body })
}
