//! Terminal renditions of the dashboard pages
//!
//! Views never talk to the poller: they read the current snapshot from the
//! hub and re-render on `StateUpdated`.

pub mod browse;
pub mod dashboard;
pub mod framework;
pub mod frameworks;
pub mod home;
pub mod pailer;
pub mod rows;
pub mod slave;
pub mod slaves;
pub mod table;

use std::fmt::Write;
use table::{Cell, ColumnClass, Row, Table};

/// Renders `rows` sorted by `table` with the given columns.
pub fn render_table<'a, R: Row + 'a>(
    title: &str,
    table: Option<&Table>,
    rows: impl IntoIterator<Item = &'a R>,
    columns: &[&str],
) -> String {
    let rows: Vec<&R> = match table {
        Some(table) => table.sorted(rows),
        None => rows.into_iter().collect(),
    };

    let mut out = String::new();
    let _ = writeln!(out, "== {} ({})", title, rows.len());
    let header: Vec<String> = columns
        .iter()
        .map(|column| header_cell(table, column))
        .collect();
    let _ = writeln!(out, "{}", header.join("\t"));
    for row in rows {
        let line: Vec<String> = columns
            .iter()
            .map(|column| row.cell(column).map(format_cell).unwrap_or_else(|| "-".into()))
            .collect();
        let _ = writeln!(out, "{}", line.join("\t"));
    }
    out
}

/// Column name with the sort indicator of `table`.
fn header_cell(table: Option<&Table>, column: &str) -> String {
    match table.map(|table| table.column_class(column)) {
        Some(ColumnClass::Descending) => format!("{} v", column),
        Some(ColumnClass::Ascending) => format!("{} ^", column),
        Some(ColumnClass::Unselected) | None => column.to_string(),
    }
}

fn format_cell(cell: Cell) -> String {
    match cell {
        Cell::Text(text) => text,
        Cell::Number(n) if n.fract() == 0.0 => format!("{}", n as i64),
        Cell::Number(n) => format!("{:.2}", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webui_core::{Resources, Slave};

    #[test]
    fn test_render_table_formats_cells() {
        let slaves = vec![Slave {
            id: "s1".into(),
            pid: "slave(1)@h1:5051".into(),
            hostname: "h1".into(),
            resources: Resources { cpus: 2.5, mem: 1024.0 },
        }];
        let out = render_table("Slaves", Some(&Table::new("id")), &slaves, &["id", "cpus", "mem", "bogus"]);
        assert!(out.starts_with("== Slaves (1)\n"));
        assert!(out.contains("s1\t2.50\t1024\t-"));
        assert!(out.contains("\nid v\tcpus\tmem\tbogus\n"));
    }

    #[test]
    fn test_header_follows_sort_direction() {
        let mut table = Table::new("id");
        table.select_column("cpus");
        table.select_column("cpus");
        assert_eq!(header_cell(Some(&table), "cpus"), "cpus ^");
        assert_eq!(header_cell(Some(&table), "id"), "id");
        assert_eq!(header_cell(None, "cpus"), "cpus");
    }
}
