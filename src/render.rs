//! Pure rendering: `(Diagram, Viewport) -> Vec<DrawCommand>`.
//!
//! The renderer issues no drawing calls of its own. Hosts replay the command
//! list with whatever primitives they have (see [`crate::svg`] for one such
//! host). Every coordinate in a command is already in screen space.

use serde::Serialize;

use crate::geometry::{Point, Rect};
use crate::hit::{HitRegion, SpatialIndex};
use crate::layout::TableMetrics;
use crate::measure::TextMetrics;
use crate::model::{ColumnKind, Diagram, ForeignKey, Table, TableId};
use crate::style::{Color, FontFamily, RenderStyle};
use crate::viewport::Viewport;

const PK_ICON: &str = "🔑";
const FK_ICON: &str = "🔗";
const PLAIN_ICON: &str = "▪";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Font {
    pub family: FontFamily,
    pub size: f64,
    pub bold: bool,
}

/// Horizontal alignment of text relative to its position. Vertically the
/// position is always the centre of the text line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    Start,
    Middle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        table: Option<TableId>,
    },
    /// An open polyline.
    Line {
        points: Vec<Point>,
        stroke: Stroke,
    },
    /// A closed, filled shape.
    Polygon {
        points: Vec<Point>,
        fill: Color,
    },
    Text {
        position: Point,
        text: String,
        color: Color,
        font: Font,
        anchor: TextAnchor,
        table: Option<TableId>,
    },
}

/// Zoom-dependent pixel sizes, computed once per frame.
struct Scaled {
    header_font: f64,
    column_font: f64,
    label_font: f64,
    icon: f64,
    border: f64,
    separator: f64,
    edge: f64,
    arrow: f64,
    inset: f64,
    label_padding: f64,
}

impl Scaled {
    fn new(style: &RenderStyle, viewport: &Viewport) -> Self {
        let font = |base| viewport.scaled_px(base, style.min_font_px);
        let stroke = |base| viewport.scaled_px(base, style.min_stroke_px);
        Self {
            header_font: font(style.header_font_px),
            column_font: font(style.column_font_px),
            label_font: font(style.label_font_px),
            icon: font(style.icon_px),
            border: stroke(style.border_width),
            separator: stroke(style.separator_width),
            edge: stroke(style.edge_width),
            arrow: viewport.scaled_px(style.arrow_size, style.min_arrow_px),
            inset: style.inset * viewport.zoom(),
            label_padding: style.label_padding * viewport.zoom(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    pub style: RenderStyle,
    pub metrics: TableMetrics,
    pub text: TextMetrics,
}

impl Renderer {
    pub fn new(style: RenderStyle, metrics: TableMetrics) -> Self {
        Self {
            style,
            metrics,
            text: TextMetrics::default(),
        }
    }

    /// Draw the whole diagram: relationship edges first, then table boxes in
    /// declaration order.
    pub fn render(&self, diagram: &Diagram, viewport: &Viewport) -> Vec<DrawCommand> {
        let index = SpatialIndex::build(diagram, viewport, &self.metrics);
        let scaled = Scaled::new(&self.style, viewport);
        let mut out = Vec::new();

        for fk in diagram.relationships() {
            let endpoints = diagram
                .id_of(&fk.from_table)
                .zip(diagram.id_of(&fk.to_table))
                .and_then(|(from, to)| index.region(from).zip(index.region(to)));
            match endpoints {
                Some((from, to)) => self.render_edge(&mut out, fk, from, to, &scaled),
                None => {
                    tracing::trace!(
                        from = %fk.from_table,
                        to = %fk.to_table,
                        "edge skipped, endpoint table missing"
                    );
                }
            }
        }

        for region in index.regions() {
            if let Some(table) = diagram.table(region.id) {
                self.render_table(&mut out, table, region, viewport, &scaled);
            }
        }

        out
    }

    fn render_table(
        &self,
        out: &mut Vec<DrawCommand>,
        table: &Table,
        region: &HitRegion,
        viewport: &Viewport,
        scaled: &Scaled,
    ) {
        let palette = &self.style.palette;
        let tag = Some(region.id);
        let r = region.bounds;
        let header = region.header;
        let border = Stroke {
            color: palette.table_border,
            width: scaled.border,
        };

        // 1. Background
        out.push(DrawCommand::Rect {
            rect: r,
            fill: Some(palette.table_bg),
            stroke: Some(border),
            table: tag,
        });

        // 2. Header
        out.push(DrawCommand::Rect {
            rect: header,
            fill: Some(palette.header_bg),
            stroke: Some(border),
            table: tag,
        });

        // 3. Table name
        let text_room = (r.width - scaled.inset * 2.0).max(0.0);
        out.push(DrawCommand::Text {
            position: header.center(),
            text: self
                .text
                .ellipsize(&table.name, scaled.header_font, text_room)
                .into_owned(),
            color: palette.header_fg,
            font: Font {
                family: self.style.header_font,
                size: scaled.header_font,
                bold: true,
            },
            anchor: TextAnchor::Middle,
            table: tag,
        });

        // 4. Separator
        out.push(DrawCommand::Line {
            points: vec![
                Point::new(r.x, header.bottom()),
                Point::new(r.right(), header.bottom()),
            ],
            stroke: Stroke {
                color: palette.table_border,
                width: scaled.separator,
            },
        });

        // 5. Column rows
        let row_h = self.metrics.row_height * viewport.zoom();
        for (i, column) in table.columns.iter().enumerate() {
            let top = r.y + self.metrics.row_offset(i) * viewport.zoom();
            let mid_y = top + row_h / 2.0;

            if i % 2 == 1 {
                out.push(DrawCommand::Rect {
                    rect: Rect::new(r.x, top, r.width, row_h),
                    fill: Some(palette.row_alt_bg),
                    stroke: None,
                    table: tag,
                });
            }

            let (icon, color) = match table.column_kind(column) {
                ColumnKind::PrimaryKey => (PK_ICON, palette.pk),
                ColumnKind::ForeignKey => (FK_ICON, palette.fk),
                ColumnKind::Plain => (PLAIN_ICON, palette.text),
            };

            let icon_x = r.x + scaled.inset;
            out.push(DrawCommand::Text {
                position: Point::new(icon_x, mid_y),
                text: icon.to_string(),
                color,
                font: Font {
                    family: self.style.column_font,
                    size: scaled.icon,
                    bold: false,
                },
                anchor: TextAnchor::Start,
                table: tag,
            });

            // Icons are two cells wide at most; keep the text column aligned.
            let text_x = icon_x + self.text.text_width("  ", scaled.icon) + scaled.inset / 2.0;
            let label = format!("{}: {}", column.name, column.data_type);
            let room = (r.right() - scaled.inset - text_x).max(0.0);
            out.push(DrawCommand::Text {
                position: Point::new(text_x, mid_y),
                text: self
                    .text
                    .ellipsize(&label, scaled.column_font, room)
                    .into_owned(),
                color,
                font: Font {
                    family: self.style.column_font,
                    size: scaled.column_font,
                    bold: false,
                },
                anchor: TextAnchor::Start,
                table: tag,
            });
        }
    }

    /// Orthogonal route: right edge of the source, across to the midpoint,
    /// vertically to the target's centre line, into the target's left edge.
    fn render_edge(
        &self,
        out: &mut Vec<DrawCommand>,
        fk: &ForeignKey,
        from: &HitRegion,
        to: &HitRegion,
        scaled: &Scaled,
    ) {
        let palette = &self.style.palette;
        let points = edge_route(&from.bounds, &to.bounds);
        let start = points[0];
        let end = points[3];
        let mid_x = points[1].x;

        out.push(DrawCommand::Line {
            points: points.to_vec(),
            stroke: Stroke {
                color: palette.line,
                width: scaled.edge,
            },
        });

        out.push(DrawCommand::Polygon {
            points: arrowhead(end, end.x >= mid_x, scaled.arrow).to_vec(),
            fill: palette.line,
        });

        let label = fk.label();
        let center = Point::new(mid_x, (start.y + end.y) / 2.0);
        let text_w = self.text.text_width(&label, scaled.label_font);
        let plate_w = text_w + scaled.label_padding * 2.0;
        let plate_h = scaled.label_font + scaled.label_padding * 2.0;
        out.push(DrawCommand::Rect {
            rect: Rect::new(
                center.x - plate_w / 2.0,
                center.y - plate_h / 2.0,
                plate_w,
                plate_h,
            ),
            fill: Some(palette.label_bg),
            stroke: None,
            table: None,
        });
        out.push(DrawCommand::Text {
            position: center,
            text: label,
            color: palette.text,
            font: Font {
                family: FontFamily::Sans,
                size: scaled.label_font,
                bold: false,
            },
            anchor: TextAnchor::Middle,
            table: None,
        });
    }
}

/// Four-point Manhattan route between two screen-space boxes.
pub fn edge_route(from: &Rect, to: &Rect) -> [Point; 4] {
    let start = Point::new(from.right(), from.center().y);
    let end = Point::new(to.x, to.center().y);
    let mid_x = (start.x + end.x) / 2.0;
    [start, Point::new(mid_x, start.y), Point::new(mid_x, end.y), end]
}

/// Triangle with its tip at `tip`, pointing right or left.
pub fn arrowhead(tip: Point, pointing_right: bool, size: f64) -> [Point; 3] {
    let back = if pointing_right { -size } else { size };
    [
        tip,
        Point::new(tip.x + back, tip.y - size / 2.0),
        Point::new(tip.x + back, tip.y + size / 2.0),
    ]
}

/// Render with default style and metrics.
pub fn render(diagram: &Diagram, viewport: &Viewport) -> Vec<DrawCommand> {
    Renderer::default().render(diagram, viewport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEngine;
    use crate::model::parse;

    const SCENARIO_A: &str = "Table users { id integer [pk] }\nTable posts {\n  id integer [pk]\n  user_id integer\n}\nRef: posts.user_id > users.id";

    fn laid_out(source: &str) -> Diagram {
        let mut diagram = parse(source);
        LayoutEngine::default().layout(&mut diagram);
        diagram
    }

    fn texts(commands: &[DrawCommand]) -> Vec<&str> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn polylines(commands: &[DrawCommand]) -> Vec<&Vec<Point>> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { points, .. } if points.len() == 4 => Some(points),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_render_is_pure() {
        let diagram = laid_out(SCENARIO_A);
        let vp = Viewport::default();
        assert_eq!(render(&diagram, &vp), render(&diagram, &vp));
    }

    #[test]
    fn test_edges_drawn_before_tables() {
        let diagram = laid_out(SCENARIO_A);
        let commands = render(&diagram, &Viewport::default());
        let first_table_rect = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Rect { table: Some(_), .. }))
            .unwrap();
        let edge = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Line { points, .. } if points.len() == 4))
            .unwrap();
        assert!(edge < first_table_rect);
    }

    #[test]
    fn test_edge_route_and_label() {
        let diagram = laid_out(SCENARIO_A);
        let commands = render(&diagram, &Viewport::default());

        let routes = polylines(&commands);
        assert_eq!(routes.len(), 1);
        // posts (340, 60, h=96) -> users (60, 60, h=72)
        let route = routes[0];
        assert_eq!(route[0], Point::new(560.0, 108.0));
        assert_eq!(route[1], Point::new(310.0, 108.0));
        assert_eq!(route[2], Point::new(310.0, 96.0));
        assert_eq!(route[3], Point::new(60.0, 96.0));

        assert!(texts(&commands).contains(&"user_id → id"));
        assert!(commands.iter().any(|c| matches!(
            c,
            DrawCommand::Polygon { points, .. }
                if points[0] == Point::new(60.0, 96.0) && points[1].x > 60.0
        )));
    }

    #[test]
    fn test_dangling_edge_is_skipped() {
        let diagram = laid_out("Table a { x int }\nRef: a.x > missing.y");
        let commands = render(&diagram, &Viewport::default());
        assert!(polylines(&commands).is_empty());
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::Polygon { .. })));
        assert!(!texts(&commands).contains(&"x → y"));
    }

    #[test]
    fn test_column_icons_and_colors() {
        let diagram = laid_out(
            "Table posts { id int [pk]\n user_id int\n title text }\nRef: posts.user_id > users.id",
        );
        let style = RenderStyle::default();
        let commands = render(&diagram, &Viewport::default());

        let icon_color = |icon: &str| {
            commands.iter().find_map(|c| match c {
                DrawCommand::Text { text, color, .. } if text == icon => Some(*color),
                _ => None,
            })
        };
        assert_eq!(icon_color(PK_ICON), Some(style.palette.pk));
        assert_eq!(icon_color(FK_ICON), Some(style.palette.fk));
        assert_eq!(icon_color(PLAIN_ICON), Some(style.palette.text));

        let all = texts(&commands);
        assert!(all.contains(&"posts"));
        assert!(all.contains(&"id: int"));
        assert!(all.contains(&"user_id: int"));
    }

    #[test]
    fn test_alternating_row_tint() {
        let diagram = laid_out("Table t { a int\n b int\n c int\n d int }");
        let style = RenderStyle::default();
        let alt = &style.palette.row_alt_bg;
        let tinted = render(&diagram, &Viewport::default())
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { fill: Some(f), .. } if f == alt))
            .count();
        assert_eq!(tinted, 2);
    }

    #[test]
    fn test_table_box_scales_with_zoom() {
        let diagram = laid_out("Table users { id int }");
        let mut vp = Viewport::default();
        vp.zoom_to(2.0, Some(Point::default()));
        let commands = render(&diagram, &vp);
        match &commands[0] {
            DrawCommand::Rect { rect, table, .. } => {
                assert_eq!(*rect, Rect::new(120.0, 120.0, 440.0, 144.0));
                assert_eq!(*table, diagram.id_of("users"));
            }
            other => panic!("unexpected first command {other:?}"),
        }
    }

    #[test]
    fn test_font_sizes_have_a_floor() {
        let diagram = laid_out("Table users { id int }");
        let mut vp = Viewport::default();
        vp.zoom_to(0.25, Some(Point::default()));
        let min = RenderStyle::default().min_font_px;
        for c in render(&diagram, &vp) {
            if let DrawCommand::Text { font, .. } = c {
                assert!(font.size >= min);
            }
        }
    }

    #[test]
    fn test_arrowhead_direction() {
        let right = arrowhead(Point::new(10.0, 10.0), true, 4.0);
        assert_eq!(right[1], Point::new(6.0, 8.0));
        let left = arrowhead(Point::new(10.0, 10.0), false, 4.0);
        assert_eq!(left[2], Point::new(14.0, 12.0));
    }

    #[test]
    fn test_serializes_to_json() {
        let diagram = laid_out("Table users { id int }");
        let json = serde_json::to_string(&render(&diagram, &Viewport::default())).unwrap();
        assert!(json.contains(r##""kind":"rect""##));
        assert!(json.contains(r##""fill":"#E8DFD0""##));
    }
}
