//! Positional HTML tables.
//!
//! Older status pages lay channels out column-wise: the first row of a
//! table is a title, the first cell of every other row is a label, and the
//! row index decides what the remaining cells mean. A layout's columns are
//! therefore indexed by data row, not by cell.
//!
//! Some label cells embed a nested table of explanatory text. Nested tables
//! never contribute rows or cell text to the table that contains them.

use super::{Column, Record, TableLayout};
use crate::error::{Error, Result};
use crate::signal::Channel;
use scraper::{ElementRef, Html, Node};
use std::collections::BTreeMap;

/// Returns the tables that are direct children of a `<center>` element, in
/// document order.
pub fn top_level_tables(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "table")
        .filter(|el| {
            el.parent()
                .and_then(ElementRef::wrap)
                .is_some_and(|parent| parent.value().name() == "center")
        })
        .collect()
}

/// Parses one positional table into records keyed by channel.
pub fn parse_table<R: Record>(
    table: ElementRef<'_>,
    layout: &TableLayout<R::Field>,
) -> Result<BTreeMap<Channel, R>> {
    let rows: Vec<ElementRef<'_>> = table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr" && belongs_to(*el, table))
        .skip(1)
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

    let mut ids: Vec<Channel> = Vec::new();
    let mut records: BTreeMap<Channel, R> = BTreeMap::new();

    for (index, row) in rows.into_iter().enumerate() {
        let cells: Vec<String> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .skip(1)
            .map(cell_text)
            .collect();

        match layout.columns.get(index) {
            Some(Column::Id) => {
                ids = cells.into_iter().map(Channel::from).collect();
                for id in &ids {
                    records.entry(id.clone()).or_default();
                }
            }
            Some(Column::Skip(_)) => {}
            Some(Column::Set(field)) => {
                for (position, cell) in cells.iter().enumerate() {
                    match ids.get(position).and_then(|id| records.get_mut(id)) {
                        Some(record) => record.set(*field, cell),
                        None => tracing::warn!(
                            table = layout.name,
                            row = index,
                            position,
                            "Cell without a channel, skipping"
                        ),
                    }
                }
            }
            None => tracing::warn!(table = layout.name, row = index, "Unhandled row, skipping"),
        }
    }

    records.retain(|id, _| !id.as_str().is_empty());
    tracing::debug!(table = layout.name, channels = records.len(), "Parsed table");
    Ok(records)
}

fn is_table(node: &Node) -> bool {
    matches!(node, Node::Element(el) if el.name() == "table")
}

/// True if `table` is the nearest table enclosing `el`.
fn belongs_to(el: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    el.ancestors()
        .find(|ancestor| is_table(ancestor.value()))
        .is_some_and(|ancestor| ancestor.id() == table.id())
}

/// Text of a cell, excluding any nested table inside it.
fn cell_text(cell: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in cell.descendants() {
        let Node::Text(t) = node.value() else {
            continue;
        };
        let nested = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != cell.id())
            .any(|ancestor| is_table(ancestor.value()));
        if !nested {
            text.push_str(&t.text);
        }
    }
    text.trim().to_string()
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
            Column::Id,
            Column::Set(DownstreamField::Frequency(Unit::Hz)),
            Column::Set(DownstreamField::PowerLevel),
        ],
    };

    const PAGE: &str = r#"<html><body><center>
<table>
<tr><th colspan="3">Downstream</th></tr>
<tr><td>Channel ID</td><td>3 </td><td>4 </td></tr>
<tr><td>Frequency</td><td>459000000 Hz&nbsp;</td><td>465000000 Hz&nbsp;</td></tr>
<tr><td>Power Level<table><tr><td>The power level reading is a snapshot</td></tr></table></td>
<td>-4 dBmV</td><td>oops</td></tr>
</table>
<p>spacer</p>
<table><tr><th>Second</th></tr></table>
</center></body></html>"#;

    #[test]
    fn test_top_level_tables_ignore_nested() {
        let doc = Html::parse_document(PAGE);
        assert_eq!(top_level_tables(&doc).len(), 2);
    }

    #[test]
    fn test_parses_positional_rows() {
        let doc = Html::parse_document(PAGE);
        let tables = top_level_tables(&doc);
        let table: BTreeMap<Channel, Downstream> = parse_table(tables[0], &LAYOUT).unwrap();

        assert_eq!(table.len(), 2);
        let three = &table[&Channel::from("3")];
        assert_eq!(three.frequency, "459000000 Hz");
        assert_eq!(three.power_level, -4.0);

        let four = &table[&Channel::from("4")];
        assert_eq!(four.frequency, "465000000 Hz");
        assert_eq!(four.power_level, 0.0);
    }

    #[test]
    fn test_nested_table_text_excluded() {
        let doc = Html::parse_document(PAGE);
        let tables = top_level_tables(&doc);
        let label_row = tables[0]
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "tr" && belongs_to(*el, tables[0]))
            .nth(3)
            .unwrap();
        let label = label_row
            .children()
            .filter_map(ElementRef::wrap)
            .next()
            .unwrap();
        assert_eq!(cell_text(label), "Power Level");
    }

    #[test]
    fn test_extra_row_skipped() {
        let extra = PAGE.replacen(
            "<td>-4 dBmV</td><td>oops</td></tr>",
            "<td>-4 dBmV</td><td>oops</td></tr>\n<tr><td>Symbol Rate</td><td>5.120 Msym/sec</td><td>2.560 Msym/sec</td></tr>",
            1,
        );
        assert_ne!(extra, PAGE);

        let parse = |page: &str| {
            let doc = Html::parse_document(page);
            let tables = top_level_tables(&doc);
            parse_table::<Downstream>(tables[0], &LAYOUT).unwrap()
        };
        assert_eq!(parse(&extra), parse(PAGE));
    }

    #[test]
    fn test_title_only_table_rejected() {
        let doc = Html::parse_document(PAGE);
        let tables = top_level_tables(&doc);
        let result = parse_table::<Downstream>(tables[1], &LAYOUT);
        assert!(matches!(result, Err(Error::Decode(msg)) if msg.contains("empty")));
    }
}
