use crate::geometry::{Point, Size};
use crate::render::{DrawCommand, Font, TextAnchor};
use crate::style::{Color, FontFamily};
use std::fmt::{self, Write};

/// Serialize draw commands into a standalone SVG document of the given size.
pub fn to_svg(commands: &[DrawCommand], size: Size, background: Color) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail.
    write_document(&mut svg, commands, size, background).unwrap_or_default();
    svg
}

fn write_document(
    svg: &mut String,
    commands: &[DrawCommand],
    size: Size,
    background: Color,
) -> fmt::Result {
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = size.width,
        h = size.height
    )?;
    writeln!(
        svg,
        r#"<rect x="0" y="0" width="{}" height="{}" fill="{}" />"#,
        size.width, size.height, background
    )?;

    for command in commands {
        write_command(svg, command)?;
    }

    writeln!(svg, "</svg>")
}

fn write_command(svg: &mut String, command: &DrawCommand) -> fmt::Result {
    match command {
        DrawCommand::Rect {
            rect, fill, stroke, ..
        } => {
            write!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                paint(*fill)
            )?;
            if let Some(stroke) = stroke {
                write!(svg, r#" stroke="{}" stroke-width="{}""#, stroke.color, stroke.width)?;
            }
            writeln!(svg, " />")
        }
        DrawCommand::Line { points, stroke } => writeln!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}" />"#,
            point_list(points),
            stroke.color,
            stroke.width
        ),
        DrawCommand::Polygon { points, fill } => writeln!(
            svg,
            r#"<polygon points="{}" fill="{}" />"#,
            point_list(points),
            fill
        ),
        DrawCommand::Text {
            position,
            text,
            color,
            font,
            anchor,
            ..
        } => writeln!(
            svg,
            r#"<text x="{}" y="{}" fill="{}" {} text-anchor="{}" dominant-baseline="central">{}</text>"#,
            position.x,
            position.y,
            color,
            font_attrs(font),
            anchor_name(*anchor),
            escape_xml(text)
        ),
    }
}

fn paint(color: Option<Color>) -> String {
    color.map_or_else(|| "none".to_string(), |c| c.to_string())
}

fn point_list(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn font_attrs(font: &Font) -> String {
    let family = match font.family {
        FontFamily::Sans => "sans-serif",
        FontFamily::Mono => "monospace",
    };
    let weight = if font.bold { "bold" } else { "normal" };
    format!(r#"font-family="{}" font-size="{}" font-weight="{}""#, family, font.size, weight)
}

fn anchor_name(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
