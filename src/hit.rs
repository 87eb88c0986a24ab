//! Screen-space index of table boxes, keyed by [`TableId`].
//!
//! The index is derived from the model and viewport every time it is built,
//! so it can never go stale across zoom, pan, drag, or layout changes. The
//! renderer uses the same index, which keeps drawn boxes and hit regions
//! identical.

use crate::geometry::{Point, Rect};
use crate::layout::TableMetrics;
use crate::model::{Diagram, TableId};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    pub id: TableId,
    /// Whole table box in screen space.
    pub bounds: Rect,
    /// Header strip in screen space; the drag handle.
    pub header: Rect,
}

#[derive(Debug, Clone, Default)]
pub struct SpatialIndex {
    /// In draw order, which is also `TableId` order: later entries are
    /// drawn on top and `regions[id.0]` belongs to `id`.
    regions: Vec<HitRegion>,
}

impl SpatialIndex {
    pub fn build(diagram: &Diagram, viewport: &Viewport, metrics: &TableMetrics) -> Self {
        let regions = diagram
            .tables()
            .map(|(id, table)| {
                let bounds = viewport.rect_to_screen(table.bounds());
                let header_height = (metrics.header_height * viewport.zoom()).min(bounds.height);
                HitRegion {
                    id,
                    bounds,
                    header: Rect::new(bounds.x, bounds.y, bounds.width, header_height),
                }
            })
            .collect();
        Self { regions }
    }

    pub fn regions(&self) -> &[HitRegion] {
        &self.regions
    }

    pub fn region(&self, id: TableId) -> Option<&HitRegion> {
        self.regions.get(id.0).filter(|r| r.id == id)
    }

    /// Topmost table whose header contains `point`.
    pub fn header_at(&self, point: Point) -> Option<TableId> {
        self.regions
            .iter()
            .rev()
            .find(|r| r.header.contains(point))
            .map(|r| r.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEngine;
    use crate::model::parse;

    fn laid_out(source: &str) -> Diagram {
        let mut diagram = parse(source);
        LayoutEngine::default().layout(&mut diagram);
        diagram
    }

    #[test]
    fn test_header_hit() {
        let diagram = laid_out("Table users { id int [pk]\n name text }");
        let vp = Viewport::default();
        let index = SpatialIndex::build(&diagram, &vp, &TableMetrics::default());
        let users = diagram.id_of("users");

        assert_eq!(index.header_at(Point::new(70.0, 70.0)), users);
        // Inside the body but below the header.
        assert_eq!(index.header_at(Point::new(70.0, 120.0)), None);
        let body = index.region(users.unwrap()).unwrap().bounds;
        assert!(body.contains(Point::new(70.0, 120.0)));
        assert_eq!(index.header_at(Point::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_hit_follows_zoom_and_pan() {
        let diagram = laid_out("Table users { id int }");
        let mut vp = Viewport::default();
        vp.zoom_to(2.0, Some(Point::default()));
        vp.set_pan(Point::new(-50.0, 0.0));
        let index = SpatialIndex::build(&diagram, &vp, &TableMetrics::default());

        // Logical (60, 60) is screen (70, 120); header is 72 px tall at 2x.
        assert_eq!(index.header_at(Point::new(75.0, 125.0)), diagram.id_of("users"));
        assert_eq!(index.header_at(Point::new(75.0, 191.0)), diagram.id_of("users"));
        assert_eq!(index.header_at(Point::new(75.0, 193.0)), None);
        assert_eq!(index.header_at(Point::new(65.0, 125.0)), None);
    }

    #[test]
    fn test_topmost_table_wins() {
        let mut diagram = laid_out("Table a { id int }\nTable b { id int }");
        let b = diagram.id_of("b").unwrap();
        diagram.move_table(b, Point::new(60.0, 60.0));
        let index = SpatialIndex::build(&diagram, &Viewport::default(), &TableMetrics::default());
        assert_eq!(index.header_at(Point::new(100.0, 70.0)), Some(b));
    }

    #[test]
    fn test_region_lookup() {
        let diagram = laid_out("Table a { id int }");
        let index = SpatialIndex::build(&diagram, &Viewport::default(), &TableMetrics::default());
        let region = index.region(diagram.id_of("a").unwrap()).unwrap();
        assert_eq!(region.bounds, Rect::new(60.0, 60.0, 220.0, 72.0));
        assert_eq!(region.header.height, 36.0);
        assert!(index.region(TableId(7)).is_none());
    }

    #[test]
    fn test_region_lookup_matches_every_table() {
        let diagram = laid_out("Table a { id int }\nTable b { id int }\nTable c { id int }");
        let index = SpatialIndex::build(&diagram, &Viewport::default(), &TableMetrics::default());
        for (id, table) in diagram.tables() {
            let region = index.region(id).unwrap();
            assert_eq!(region.id, id);
            assert_eq!(region.bounds, table.bounds());
        }
        assert!(index.region(TableId(3)).is_none());
    }
}
