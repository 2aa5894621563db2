//! Table rendering for command output.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use neptune_catalog::{
    BulkInventory, MarketshareRow, SavingsSummary, SelectOption, SelectionRow, format_currency,
    format_percent,
};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

/// Options as a table: value, label, then one column per attribute key.
pub fn options_table(options: &[SelectOption]) -> Table {
    let mut attribute_keys: Vec<&str> = options
        .iter()
        .flat_map(|option| option.attributes.keys().map(String::as_str))
        .collect();
    attribute_keys.sort_unstable();
    attribute_keys.dedup();

    let mut header = vec![header_cell("Value"), header_cell("Label")];
    header.extend(attribute_keys.iter().map(|key| header_cell(key)));

    let mut table = Table::new();
    table.set_header(header);
    apply_table_style(&mut table);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    for option in options {
        let mut cells = vec![Cell::new(&option.value), Cell::new(&option.label)];
        cells.extend(attribute_keys.iter().map(|key| {
            option
                .attribute(key)
                .map_or_else(|| dim_cell("-"), Cell::new)
        }));
        table.add_row(cells);
    }
    table
}

/// Print a titled option list; an empty list prints a note instead.
pub fn print_options(title: &str, options: &[SelectOption]) {
    println!("{title}:");
    if options.is_empty() {
        println!("  (none available)");
        return;
    }
    println!("{}", options_table(options));
}

/// Field/value summary of one row.
pub fn row_table(row: &SelectionRow) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);

    let selected_label = |value: Option<&str>, label: Option<&str>| match (value, label) {
        (Some(value), Some(label)) if label != value => Cell::new(format!("{label} ({value})")),
        (Some(value), _) => Cell::new(value),
        (None, _) => dim_cell("-"),
    };

    table.add_row(vec![
        Cell::new("Specialty"),
        selected_label(row.specialty.value(), None),
    ]);
    table.add_row(vec![
        Cell::new("Category"),
        selected_label(row.category.value(), None),
    ]);
    table.add_row(vec![
        Cell::new("Manufacturer"),
        selected_label(row.manufacturer.value(), None),
    ]);
    table.add_row(vec![
        Cell::new("Device"),
        selected_label(
            row.device.value(),
            row.device.selected().map(|option| option.label.as_str()),
        ),
    ]);
    table.add_row(vec![
        Cell::new("Purchase type"),
        Cell::new(row.purchase_type.label()),
    ]);
    table.add_row(vec![
        Cell::new("Identifier"),
        selected_label(row.identifier.value(), None),
    ]);
    table.add_row(vec![
        Cell::new("Cost type"),
        Cell::new(row.cost_type.label()),
    ]);

    let discounts: Vec<&str> = row
        .discounts
        .selected()
        .map(|option| option.label.as_str())
        .collect();
    table.add_row(vec![
        Cell::new("Discounts"),
        if discounts.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(discounts.join(", "))
        },
    ]);
    table
}

fn right_aligned(table: &mut Table, columns: &[usize]) {
    for &index in columns {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Vendor, units, spend and marketshare.
pub fn marketshare_table(rows: &[MarketshareRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Vendor"),
        header_cell("Units"),
        header_cell("Spend"),
        header_cell("MS"),
    ]);
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(row.units),
            Cell::new(format_currency(row.spend)),
            Cell::new(format_percent(row.share)),
        ]);
    }
    right_aligned(&mut table, &[1, 2, 3]);
    table
}

/// One row per month with its share of the year-to-date total.
pub fn savings_table(summary: &SavingsSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Month"),
        header_cell(summary.metric.as_str()),
        header_cell("Of year"),
    ]);
    apply_table_style(&mut table);
    for point in &summary.points {
        table.add_row(vec![
            Cell::new(point.month),
            Cell::new(format_currency(point.value)),
            Cell::new(format_percent(point.percent_of_sum)),
        ]);
    }
    right_aligned(&mut table, &[0, 1, 2]);
    table
}

pub fn bulk_inventory_table(inventory: &BulkInventory) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Bulk inventory"), header_cell("Items")]);
    apply_table_style(&mut table);
    let counts = [
        ("Available", inventory.available),
        ("Expiring in 60 days", inventory.expiring60),
        ("Expiring in 30 days", inventory.expiring30),
        ("Expired", inventory.expired),
    ];
    for (label, count) in counts {
        table.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    right_aligned(&mut table, &[1]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use neptune_catalog::{Amount, MarketshareEntry, marketshare_rows};

    #[test]
    fn test_marketshare_table_shows_share() {
        let rows = marketshare_rows(&[
            MarketshareEntry {
                id: 1,
                name: "Medtronic".to_string(),
                units: 3,
                spend: Amount(1500.0),
            },
            MarketshareEntry {
                id: 2,
                name: "Abbott".to_string(),
                units: 1,
                spend: Amount(500.0),
            },
        ]);
        let rendered = marketshare_table(&rows).to_string();
        assert!(rendered.contains("$1,500"));
        assert!(rendered.contains("75.0%"));
        assert!(rendered.contains("25.0%"));
    }

    #[test]
    fn test_bulk_inventory_table() {
        let table = bulk_inventory_table(&BulkInventory {
            available: 4,
            expiring60: 1,
            expiring30: 2,
            expired: 1,
        });
        assert_eq!(table.row_count(), 4);
    }

    #[test]
    fn test_options_table_has_attribute_columns() {
        let mut table = options_table(&[
            SelectOption::new("1", "A").with_attribute("product", 9),
            SelectOption::new("2", "B"),
        ]);
        assert_eq!(table.column_count(), 3);
        let rendered = table.to_string();
        assert!(rendered.contains("product"));
        assert!(rendered.contains('A'));
    }

    #[test]
    fn test_options_table_without_attributes() {
        let mut table = options_table(&[SelectOption::named("Cardiac")]);
        assert_eq!(table.column_count(), 2);
    }
}
