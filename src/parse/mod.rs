//! Tolerant status payload parsing.
//!
//! Modems report channel tables in loosely structured formats where the
//! position of a cell decides its meaning. Each format is described by a
//! [`TableLayout`]: an ordered list of [`Column`]s mapping a position to a
//! field of a [`Record`]. Parsers walk the layout, never the other way
//! around, so supporting another model variant means writing another table.
//!
//! A cell that fails to convert leaves its field at zero and is logged at
//! `trace`. Only a missing or undersized table is an error.

pub mod delimited;
pub mod html;

use crate::signal::{Downstream, Upstream};

/// Source unit of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Value is already in base units (Hz, sym/s).
    Hz,
    /// Value is in mega units and is scaled by 10^6.
    MHz,
}

impl Unit {
    fn scale(self) -> f64 {
        match self {
            Unit::Hz => 1.0,
            Unit::MHz => 1_000_000.0,
        }
    }
}

/// Meaning of one position in a table.
#[derive(Debug, Clone, Copy)]
pub enum Column<F: 'static> {
    /// The channel identifier that keys the record.
    Id,
    /// A known position with no counterpart in the signal model.
    Skip(&'static str),
    /// A position that populates a record field.
    Set(F),
}

/// Fixed position→field contract for one table of one vendor format.
#[derive(Debug)]
pub struct TableLayout<F: 'static> {
    /// Table name used in logs and errors.
    pub name: &'static str,
    /// Fewer data rows than this is a structural error.
    pub min_rows: usize,
    /// Meaning of each position, in order.
    pub columns: &'static [Column<F>],
}

/// A channel record that can be filled one cell at a time.
pub trait Record: Default {
    /// Field selector used by layouts for this record.
    type Field: Copy + std::fmt::Debug + 'static;

    /// Stores `cell` into `field`, absorbing conversion failures as zero.
    fn set(&mut self, field: Self::Field, cell: &str);
}

/// Fields of a [`Downstream`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownstreamField {
    /// Modulation name, stored as given.
    Modulation,
    /// Frequency, normalized to Hz from the given unit.
    Frequency(Unit),
    /// Power in dBmV.
    PowerLevel,
    /// Signal to noise ratio in dB.
    Snr,
    /// Unerrored codeword count.
    Unerrored,
    /// Correctable codeword count.
    Correctable,
    /// Uncorrectable codeword count.
    Uncorrectable,
}

/// Fields of an [`Upstream`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamField {
    /// Modulation name, stored as given.
    Modulation,
    /// Frequency, normalized to Hz from the given unit.
    Frequency(Unit),
    /// Power in dBmV.
    PowerLevel,
    /// Ranging status text.
    Status,
    /// Symbol rate, scaled to symbols per second from the given unit.
    SymbolRate(Unit),
    /// Ranging service id.
    RangingService,
}

impl Record for Downstream {
    type Field = DownstreamField;

    fn set(&mut self, field: DownstreamField, cell: &str) {
        match field {
            DownstreamField::Modulation => self.modulation = text(cell),
            DownstreamField::Frequency(unit) => self.frequency = frequency(cell, unit),
            DownstreamField::PowerLevel => self.power_level = number(cell),
            DownstreamField::Snr => self.snr = number(cell),
            DownstreamField::Unerrored => self.unerrored = number(cell),
            DownstreamField::Correctable => self.correctable = number(cell),
            DownstreamField::Uncorrectable => self.uncorrectable = number(cell),
        }
    }
}

impl Record for Upstream {
    type Field = UpstreamField;

    fn set(&mut self, field: UpstreamField, cell: &str) {
        match field {
            UpstreamField::Modulation => self.modulation = text(cell),
            UpstreamField::Frequency(unit) => self.frequency = frequency(cell, unit),
            UpstreamField::PowerLevel => self.power_level = number(cell),
            UpstreamField::Status => self.status = text(cell),
            UpstreamField::SymbolRate(unit) => self.symbol_rate = number(cell) * unit.scale(),
            UpstreamField::RangingService => self.ranging_service = text(cell),
        }
    }
}

/// Trims a text cell and folds embedded line breaks into single spaces.
fn text(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the leading number of a cell such as `"43 dB"`.
fn parse_number(cell: &str) -> Option<f64> {
    cell.split_whitespace().next()?.parse().ok()
}

/// Numeric cell value, or zero if the cell does not hold a number.
pub(crate) fn number(cell: &str) -> f64 {
    match parse_number(cell) {
        Some(value) => value,
        None => {
            tracing::trace!(cell, "Non-numeric cell, using zero");
            0.0
        }
    }
}

/// Canonical `"<integer> Hz"` rendering of a frequency cell.
///
/// Returns an empty string when the cell holds no usable frequency.
pub(crate) fn frequency(cell: &str, unit: Unit) -> String {
    match parse_number(cell) {
        Some(value) if value.is_finite() && value >= 0.0 => {
            format!("{} Hz", (value * unit.scale()).round() as u64)
        }
        _ => {
            tracing::trace!(cell, "Unusable frequency cell");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_takes_leading_token() {
        assert_eq!(number("43 dB"), 43.0);
        assert_eq!(number(" -3.5 dBmV "), -3.5);
        assert_eq!(number("46.8"), 46.8);
    }

    #[test]
    fn test_number_absorbs_garbage() {
        assert_eq!(number("n/a"), 0.0);
        assert_eq!(number(""), 0.0);
    }

    #[test]
    fn test_frequency_units() {
        assert_eq!(frequency("441000000", Unit::Hz), "441000000 Hz");
        assert_eq!(frequency("549000000 Hz", Unit::Hz), "549000000 Hz");
        assert_eq!(frequency("591.0", Unit::MHz), "591000000 Hz");
        assert_eq!(frequency("36.5 MHz", Unit::MHz), "36500000 Hz");
        assert_eq!(frequency("----", Unit::Hz), "");
        assert_eq!(frequency("-5", Unit::Hz), "");
    }

    #[test]
    fn test_text_folds_whitespace() {
        assert_eq!(text("  [3] QPSK\n[3] 64QAM "), "[3] QPSK [3] 64QAM");
    }

    #[test]
    fn test_record_set_keeps_other_fields() {
        let mut d = Downstream::default();
        d.set(DownstreamField::Snr, "43");
        d.set(DownstreamField::PowerLevel, "garbage");
        d.set(DownstreamField::Modulation, "QAM256");
        assert_eq!(d.snr, 43.0);
        assert_eq!(d.power_level, 0.0);
        assert_eq!(d.modulation, "QAM256");

        let mut u = Upstream::default();
        u.set(UpstreamField::SymbolRate(Unit::MHz), "5.120 Msym/sec");
        assert_eq!(u.symbol_rate, 5_120_000.0);
    }
}
