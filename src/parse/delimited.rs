//! Delimited record strings.
//!
//! HNAP status queries return each channel table as one string: rows are
//! separated by `|+|`, columns by `^`, and every row ends with a `^` that
//! leaves an empty trailing field.

use super::{Column, Record, TableLayout};
use crate::error::{Error, Result};
use crate::signal::Channel;
use std::collections::BTreeMap;

/// Separator between channel rows.
pub const RECORD_SEPARATOR: &str = "|+|";

/// Separator between columns within a row.
pub const FIELD_SEPARATOR: char = '^';

/// Parses one delimited table into records keyed by channel.
pub fn parse_table<R: Record>(
    raw: &str,
    layout: &TableLayout<R::Field>,
) -> Result<BTreeMap<Channel, R>> {
    let rows: Vec<&str> = raw
        .split(RECORD_SEPARATOR)
        .filter(|row| !row.trim().is_empty())
        .collect();

    if rows.is_empty() {
        return Err(Error::Decode(format!("{} table is empty", layout.name)));
    }
    if rows.len() < layout.min_rows {
        return Err(Error::Decode(format!(
            "{} table has {} rows, expected at least {}",
            layout.name,
            rows.len(),
            layout.min_rows
        )));
    }

    let mut table = BTreeMap::new();
    for row in rows {
        let mut cells: Vec<&str> = row.split(FIELD_SEPARATOR).collect();
        if cells.last().is_some_and(|cell| cell.is_empty()) {
            cells.pop();
        }

        let mut channel = None;
        let mut record = R::default();
        for (index, cell) in cells.into_iter().enumerate() {
            match layout.columns.get(index) {
                Some(Column::Id) => channel = Some(Channel::from(cell.trim())),
                Some(Column::Skip(_)) => {}
                Some(Column::Set(field)) => record.set(*field, cell),
                None => {
                    tracing::warn!(table = layout.name, index, "Unexpected column, skipping");
                }
            }
        }

        match channel {
            Some(channel) if !channel.as_str().is_empty() => {
                table.insert(channel, record);
            }
            _ => tracing::debug!(table = layout.name, row, "Row without channel id, skipping"),
        }
    }

    tracing::debug!(table = layout.name, channels = table.len(), "Parsed table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{DownstreamField, Unit};
    use crate::signal::Downstream;

    static LAYOUT: TableLayout<DownstreamField> = TableLayout {
        name: "test",
        min_rows: 2,
        columns: &[
            Column::Skip("index"),
            Column::Id,
            Column::Set(DownstreamField::Frequency(Unit::MHz)),
            Column::Set(DownstreamField::Snr),
        ],
    };

    #[test]
    fn test_parses_rows_and_drops_trailing_field() {
        let table: BTreeMap<Channel, Downstream> =
            parse_table("1^10^591^40^|+|2^11^597^41.5^", &LAYOUT).unwrap();

        assert_eq!(table.len(), 2);
        let ch = &table[&Channel::from("11")];
        assert_eq!(ch.frequency, "597000000 Hz");
        assert_eq!(ch.snr, 41.5);
    }

    #[test]
    fn test_bad_cell_zeroes_only_that_field() {
        let table: BTreeMap<Channel, Downstream> =
            parse_table("1^10^591^abc^|+|2^11^597^41^", &LAYOUT).unwrap();

        let ch = &table[&Channel::from("10")];
        assert_eq!(ch.snr, 0.0);
        assert_eq!(ch.frequency, "591000000 Hz");
    }

    #[test]
    fn test_extra_columns_are_skipped() {
        let table: BTreeMap<Channel, Downstream> =
            parse_table("1^10^591^40^extra^more^|+|2^11^597^41^", &LAYOUT).unwrap();
        assert_eq!(table[&Channel::from("10")].snr, 40.0);
    }

    #[test]
    fn test_row_without_id_is_skipped() {
        let table: BTreeMap<Channel, Downstream> =
            parse_table("1^|+|2^11^597^41^", &LAYOUT).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.contains_key(&Channel::from("11")));
    }

    #[test]
    fn test_empty_and_short_tables_rejected() {
        let empty = parse_table::<Downstream>("", &LAYOUT);
        assert!(matches!(empty, Err(Error::Decode(_))));

        let short = parse_table::<Downstream>("1^10^591^40^", &LAYOUT);
        assert!(matches!(short, Err(Error::Decode(msg)) if msg.contains("1 rows")));
    }
}
