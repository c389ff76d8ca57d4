//! Abstract 2D output sink: a flat list of draw commands plus an SVG writer.
//!
//! `dendrogram::render` produces a `Vec<DrawCommand>`; any host can replay
//! the commands against its own surface. `write_svg` is the bundled sink.

/// Horizontal text anchor, matching SVG `text-anchor` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// One segment of a path outline.
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    HorizontalTo { x: f32 },
    VerticalTo { y: f32 },
}

/// A single drawing instruction. A render pass is a `Vec<DrawCommand>`
/// starting with `Surface`; replaying the same vector twice must paint the
/// same picture, so every field is plain data.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Create/size the canvas. `view_height` is the visible plotting
    /// height, which may be smaller than `height`.
    Surface {
        width: f32,
        height: f32,
        view_height: f32,
    },
    /// Open a translated group; commands until the matching `GroupEnd`
    /// are drawn relative to `(dx, dy)`.
    GroupStart {
        dx: f32,
        dy: f32,
        class: Option<String>,
    },
    GroupEnd,
    /// Stroke an open path. `class` tags the path for downstream styling.
    Path {
        commands: Vec<PathCommand>,
        stroke: String,
        stroke_width: f32,
        class: Option<String>,
    },
    /// Draw a text run. `rotate` (degrees) pivots around `(x, y)`;
    /// `dx`/`dy` nudge the glyphs in the rotated frame.
    Text {
        content: String,
        x: f32,
        y: f32,
        dx: f32,
        dy: f32,
        rotate: Option<f32>,
        anchor: Anchor,
        fill: String,
        font_family: String,
        font_size: f32,
    },
}

/// Document-level options for the SVG writer.
#[derive(Debug, Clone, Default)]
pub struct SvgOptions {
    /// Background rect fill; `None` leaves the canvas transparent.
    pub background: Option<String>,
    /// Value of the root `color` property, resolved by `currentColor`.
    pub color: Option<String>,
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Serialize a command list as a standalone SVG document.
pub fn write_svg(commands: &[DrawCommand], options: &SvgOptions) -> String {
    let mut svg = String::new();
    let mut open_groups = 0usize;
    let mut surface_open = false;

    for command in commands {
        match command {
            DrawCommand::Surface {
                width,
                height,
                view_height,
            } => {
                if surface_open {
                    continue;
                }
                let color_attr = options
                    .color
                    .as_deref()
                    .map(|c| format!(r#" color="{}""#, escape_xml(c)))
                    .unwrap_or_default();
                svg.push_str(&format!(
                    r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" style="max-width: 100%; height: auto;"{}>"#,
                    width, height, width, view_height, color_attr
                ));
                svg.push('\n');
                if let Some(background) = &options.background {
                    svg.push_str(&format!(
                        r#"<rect width="{:.0}" height="{:.0}" fill="{}"/>"#,
                        width,
                        view_height,
                        escape_xml(background)
                    ));
                    svg.push('\n');
                }
                surface_open = true;
            }
            DrawCommand::GroupStart { dx, dy, class } => {
                let class_attr = class
                    .as_deref()
                    .map(|c| format!(r#" class="{}""#, escape_xml(c)))
                    .unwrap_or_default();
                svg.push_str(&format!(
                    r#"<g transform="translate({:.2}, {:.2})"{}>"#,
                    dx, dy, class_attr
                ));
                svg.push('\n');
                open_groups += 1;
            }
            DrawCommand::GroupEnd => {
                if open_groups > 0 {
                    svg.push_str("</g>\n");
                    open_groups -= 1;
                }
            }
            DrawCommand::Path {
                commands,
                stroke,
                stroke_width,
                class,
            } => {
                let mut d = String::new();
                for segment in commands {
                    match segment {
                        PathCommand::MoveTo { x, y } => {
                            d.push_str(&format!("M{:.2},{:.2}", x, y));
                        }
                        PathCommand::LineTo { x, y } => {
                            d.push_str(&format!("L{:.2},{:.2}", x, y));
                        }
                        PathCommand::HorizontalTo { x } => {
                            d.push_str(&format!("H{:.2}", x));
                        }
                        PathCommand::VerticalTo { y } => {
                            d.push_str(&format!("V{:.2}", y));
                        }
                    }
                }
                let class_attr = class
                    .as_deref()
                    .map(|c| format!(r#" class="{}""#, escape_xml(c)))
                    .unwrap_or_default();
                svg.push_str(&format!(
                    r#"<path{} d="{}" stroke="{}" stroke-width="{:.2}" fill="none"/>"#,
                    class_attr,
                    d,
                    escape_xml(stroke),
                    stroke_width
                ));
                svg.push('\n');
            }
            DrawCommand::Text {
                content,
                x,
                y,
                dx,
                dy,
                rotate,
                anchor,
                fill,
                font_family,
                font_size,
            } => {
                let position = match rotate {
                    Some(angle) => format!(
                        r#" transform="translate({:.2},{:.2}) rotate({:.0})""#,
                        x, y, angle
                    ),
                    None => format!(r#" x="{:.2}" y="{:.2}""#, x, y),
                };
                let mut nudge = String::new();
                if *dx != 0.0 {
                    nudge.push_str(&format!(r#" dx="{:.2}""#, dx));
                }
                if *dy != 0.0 {
                    nudge.push_str(&format!(r#" dy="{:.2}""#, dy));
                }
                svg.push_str(&format!(
                    r#"<text{}{} text-anchor="{}" font-family="{}" font-size="{:.1}" fill="{}">{}</text>"#,
                    position,
                    nudge,
                    anchor.as_str(),
                    escape_xml(font_family),
                    font_size,
                    escape_xml(fill),
                    escape_xml(content)
                ));
                svg.push('\n');
            }
        }
    }

    while open_groups > 0 {
        svg.push_str("</g>\n");
        open_groups -= 1;
    }
    if surface_open {
        svg.push_str("</svg>\n");
    }
    svg
}
