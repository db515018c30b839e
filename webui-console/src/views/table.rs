//! Sortable tables
//!
//! Every table remembers its selected column and direction. Selecting the
//! same column again flips the direction; selecting another column sorts it
//! descending.

use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClass {
    Unselected,
    Descending,
    Ascending,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            (Cell::Number(_), Cell::Text(_)) => Ordering::Less,
            (Cell::Text(_), Cell::Number(_)) => Ordering::Greater,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Number(value as f64)
    }
}

/// Something a table can display and sort.
pub trait Row {
    /// Value of `column`, `None` for unknown columns.
    fn cell(&self, column: &str) -> Option<Cell>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub selected_column: String,
    pub reverse: bool,
}

impl Table {
    pub fn new(selected_column: &str) -> Self {
        Self { selected_column: selected_column.to_string(), reverse: true }
    }

    pub fn column_class(&self, column: &str) -> ColumnClass {
        if self.selected_column != column {
            ColumnClass::Unselected
        } else if self.reverse {
            ColumnClass::Descending
        } else {
            ColumnClass::Ascending
        }
    }

    pub fn select_column(&mut self, column: &str) {
        if self.selected_column == column {
            self.reverse = !self.reverse;
        } else {
            self.reverse = true;
            self.selected_column = column.to_string();
        }
    }

    /// Rows ordered by the selected column.
    pub fn sorted<'a, R: Row>(&self, rows: impl IntoIterator<Item = &'a R>) -> Vec<&'a R>
    where
        R: 'a,
    {
        let mut rows: Vec<&R> = rows.into_iter().collect();
        rows.sort_by(|a, b| {
            let ordering = match (a.cell(&self.selected_column), b.cell(&self.selected_column)) {
                (Some(a), Some(b)) => a.compare(&b),
                _ => Ordering::Equal,
            };
            if self.reverse { ordering.reverse() } else { ordering }
        });
        rows
    }
}

/// Named tables of one page.
#[derive(Debug, Clone, Default)]
pub struct Tables(BTreeMap<&'static str, Table>);

impl Tables {
    pub fn with(mut self, name: &'static str, column: &str) -> Self {
        self.0.insert(name, Table::new(column));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.0.get(name)
    }

    pub fn select_column(&mut self, name: &str, column: &str) {
        if let Some(table) = self.0.get_mut(name) {
            table.select_column(column);
        }
    }
}
