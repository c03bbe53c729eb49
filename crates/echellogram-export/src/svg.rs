//! SVG render target.
//!
//! [`SvgCanvas`] implements [`Canvas`] by collecting `svg` crate nodes:
//! each polyline becomes a `<path>` with `M`/`L` commands, each polygon a
//! closed `<path>`, and each text a `<text>` element (preceded by a
//! `<rect>` when the style asks for a background). [`SvgCanvas::finish`]
//! wraps them in a document.
//!
//! Plot coordinates are mapped onto a fixed pixel area with the y axis
//! pointing up, the way a plot reads.
//!
//! This is pure: no I/O, the result is a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Path, Rectangle, Title};
use svg::node::{Node, Text};

use echellogram_layout::{Canvas, HorizontalAlign, Point, Stroke, TextStyle, Viewport};

/// Average glyph advance as a fraction of the font size. Used to size
/// text background patches without a font engine.
const CHAR_WIDTH_RATIO: f64 = 0.6;

/// Line height as a fraction of the font size.
const LINE_HEIGHT_RATIO: f64 = 1.2;

/// Dash pattern for dashed strokes, in multiples of the stroke width.
const DASH_RATIO: f64 = 3.0;

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped by the `svg`
/// crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Human-readable description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized render configuration, emitted inside `<metadata>` so
    /// the file carries the settings that produced it.
    pub config_json: Option<&'a str>,
}

/// A [`Canvas`] that builds an SVG document.
#[derive(Debug)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    margin: f64,
    limits: Viewport,
    plot: Element,
    axes_hidden: bool,
}

impl SvgCanvas {
    pub const DEFAULT_SIZE: f64 = 800.0;
    pub const DEFAULT_MARGIN: f64 = 40.0;

    /// A canvas of `width` x `height` pixels with the default margin.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            margin: Self::DEFAULT_MARGIN,
            limits: Viewport {
                x_min: -1.0,
                x_max: 1.0,
                y_min: -1.0,
                y_max: 1.0,
            },
            plot: Element::new("g"),
            axes_hidden: false,
        }
    }

    /// Override the blank border around the plot area, in pixels.
    #[must_use]
    pub const fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Map a plot point to document pixels.
    fn map(&self, p: Point) -> (f64, f64) {
        let plot_w = 2.0f64.mul_add(-self.margin, self.width);
        let plot_h = 2.0f64.mul_add(-self.margin, self.height);
        let x = self.margin + (p.x - self.limits.x_min) / self.limits.width() * plot_w;
        let y = self.margin + (self.limits.y_max - p.y) / self.limits.height() * plot_h;
        (x, y)
    }

    fn path_data(&self, points: &[Point]) -> Option<Data> {
        let (first, rest) = points.split_first()?;
        let mut data = Data::new().move_to(self.map(*first));
        for p in rest {
            data = data.line_to(self.map(*p));
        }
        Some(data)
    }

    /// Finish the document and serialize it.
    #[must_use]
    pub fn finish(self, metadata: &SvgMetadata<'_>) -> String {
        let mut doc = Document::new()
            .set("width", self.width)
            .set("height", self.height)
            .set("viewBox", format!("0 0 {} {}", self.width, self.height));

        if let Some(title) = metadata.title {
            doc = doc.add(Title::new(title));
        }
        if let Some(description) = metadata.description {
            doc = doc.add(Description::new().add(Text::new(description)));
        }
        if let Some(config_json) = metadata.config_json {
            let mut config_el = Element::new("echellogram:config");
            config_el.assign("xmlns:echellogram", "urn:echellogram:config");
            config_el.append(Text::new(config_json));
            let mut metadata_el = Element::new("metadata");
            metadata_el.append(config_el);
            doc = doc.add(metadata_el);
        }

        doc = doc.add(
            Rectangle::new()
                .set("width", self.width)
                .set("height", self.height)
                .set("fill", "white"),
        );

        if !self.axes_hidden {
            let plot_w = 2.0f64.mul_add(-self.margin, self.width);
            let plot_h = 2.0f64.mul_add(-self.margin, self.height);
            doc = doc.add(
                Rectangle::new()
                    .set("class", "axes")
                    .set("x", self.margin)
                    .set("y", self.margin)
                    .set("width", plot_w)
                    .set("height", plot_h)
                    .set("fill", "none")
                    .set("stroke", "black")
                    .set("stroke-width", 1),
            );
        }

        doc = doc.add(self.plot);

        // The svg crate omits the XML declaration, so we prepend it.
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
    }
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE, Self::DEFAULT_SIZE)
    }
}

fn styled(path: Path, stroke: &Stroke) -> Path {
    let mut path = path
        .set("fill", "none")
        .set("stroke", stroke.color.to_hex())
        .set("stroke-width", stroke.width)
        .set("stroke-linejoin", "round");
    if stroke.opacity < 1.0 {
        path = path.set("stroke-opacity", stroke.opacity);
    }
    if stroke.dashed {
        let dash = stroke.width * DASH_RATIO;
        path = path.set("stroke-dasharray", format!("{dash} {dash}"));
    }
    path
}

impl Canvas for SvgCanvas {
    fn set_limits(&mut self, viewport: Viewport) {
        self.limits = viewport;
    }

    fn polyline(&mut self, points: &[Point], stroke: &Stroke) {
        // A single point has no visible extent.
        if points.len() < 2 {
            return;
        }
        if let Some(data) = self.path_data(points) {
            self.plot.append(styled(Path::new().set("d", data), stroke));
        }
    }

    fn text(&mut self, anchor: Point, text: &str, style: &TextStyle) {
        let (x, y) = self.map(anchor);
        let x = x + style.offset;

        if let Some(background) = style.background {
            #[allow(clippy::cast_precision_loss)]
            let text_w = text.chars().count() as f64 * style.size * CHAR_WIDTH_RATIO;
            let text_h = style.size * LINE_HEIGHT_RATIO;
            let left = match style.align {
                HorizontalAlign::Left => x,
                HorizontalAlign::Center => text_w.mul_add(-0.5, x),
                HorizontalAlign::Right => x - text_w,
            };
            self.plot.append(
                Rectangle::new()
                    .set("x", left - background.padding)
                    .set("y", text_h.mul_add(-0.5, y) - background.padding)
                    .set("width", 2.0f64.mul_add(background.padding, text_w))
                    .set("height", 2.0f64.mul_add(background.padding, text_h))
                    .set("fill", background.color.to_hex())
                    .set("fill-opacity", background.opacity)
                    .set("stroke", "none"),
            );
        }

        let anchor_attr = match style.align {
            HorizontalAlign::Left => "start",
            HorizontalAlign::Center => "middle",
            HorizontalAlign::Right => "end",
        };
        let mut el = Element::new("text");
        el.assign("x", x);
        el.assign("y", y);
        el.assign("font-size", style.size);
        el.assign("font-family", "sans-serif");
        el.assign("text-anchor", anchor_attr);
        el.assign("dominant-baseline", "central");
        el.append(Text::new(text));
        self.plot.append(el);
    }

    fn polygon(&mut self, vertices: &[Point], stroke: &Stroke) {
        if let Some(data) = self.path_data(vertices) {
            self.plot
                .append(styled(Path::new().set("d", data.close()), stroke));
        }
    }

    fn hide_axes(&mut self) {
        self.axes_hidden = true;
    }
}
