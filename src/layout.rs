//! Deterministic grid placement.
//!
//! Tables are dealt into a grid row by row in declaration order. The grid is
//! at least [`LayoutEngine::min_columns`] wide and otherwise roughly square.
//! There is no overlap avoidance or edge-aware ordering.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};
use crate::model::Diagram;

/// Logical box geometry shared by layout, rendering, and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableMetrics {
    pub table_width: f64,
    pub header_height: f64,
    pub row_height: f64,
    /// Vertical space split evenly above and below the column rows.
    pub padding: f64,
}

impl Default for TableMetrics {
    fn default() -> Self {
        Self {
            table_width: 220.0,
            header_height: 36.0,
            row_height: 24.0,
            padding: 12.0,
        }
    }
}

impl TableMetrics {
    pub fn table_size(&self, column_count: usize) -> Size {
        Size::new(
            self.table_width,
            self.header_height + column_count as f64 * self.row_height + self.padding,
        )
    }

    /// Logical offset of column row `index` from the table's top edge.
    pub fn row_offset(&self, index: usize) -> f64 {
        self.header_height + self.padding / 2.0 + index as f64 * self.row_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutEngine {
    pub x_start: f64,
    pub y_start: f64,
    pub x_spacing: f64,
    pub y_spacing: f64,
    pub min_columns: usize,
    #[serde(flatten)]
    pub metrics: TableMetrics,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            x_start: 60.0,
            y_start: 60.0,
            x_spacing: 280.0,
            y_spacing: 220.0,
            min_columns: 3,
            metrics: TableMetrics::default(),
        }
    }
}

impl LayoutEngine {
    /// Grid width for `count` tables: `max(min_columns, round(sqrt(count)))`.
    pub fn grid_columns(&self, count: usize) -> usize {
        let square = (count as f64).sqrt().round() as usize;
        square.max(self.min_columns).max(1)
    }

    /// Top-left corner of grid cell `index`.
    pub fn cell_origin(&self, index: usize, columns: usize) -> Point {
        let col = index % columns;
        let row = index / columns;
        Point::new(
            self.x_start + col as f64 * self.x_spacing,
            self.y_start + row as f64 * self.y_spacing,
        )
    }

    /// Assign every table its grid position and size, overwriting any
    /// previous placement.
    pub fn layout(&self, diagram: &mut Diagram) {
        let count = diagram.len();
        if count == 0 {
            return;
        }

        let columns = self.grid_columns(count);
        for (i, table) in diagram.tables_mut().enumerate() {
            table.position = self.cell_origin(i, columns);
            table.size = self.metrics.table_size(table.columns.len());
        }

        tracing::debug!(tables = count, columns, "grid layout applied");
    }
}
