use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    card::truncate_title,
    foundation::{
        core::{Canvas, Rgb8},
        error::{CardreelError, CardreelResult},
    },
    render::raster,
};

/// A rendered slide image on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slide {
    /// Zero-based position in the card list.
    pub ordinal: usize,
    pub path: PathBuf,
}

/// `slide-<ordinal>.png`
pub fn slide_file_name(ordinal: usize) -> String {
    format!("slide-{ordinal}.png")
}

/// Visual style shared by every slide.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SlideStyle {
    /// Top-left gradient stop.
    pub gradient_start: Rgb8,
    /// Bottom-right gradient stop.
    pub gradient_end: Rgb8,
    pub text_color: Rgb8,
    pub font_family: String,
    /// Font size for short titles. Longer titles shrink towards `min_font_size`.
    pub font_size: f32,
    pub min_font_size: f32,
}

impl Default for SlideStyle {
    fn default() -> Self {
        Self {
            gradient_start: Rgb8::new(0x1b, 0x10, 0x35),
            gradient_end: Rgb8::new(0xff, 0x2d, 0x95),
            text_color: Rgb8::WHITE,
            font_family: "sans-serif".to_string(),
            font_size: 72.0,
            min_font_size: 24.0,
        }
    }
}

/// Rough average advance of a bold sans-serif glyph, in ems.
const AVG_GLYPH_EM: f32 = 0.6;
/// Share of the canvas width a single title line may occupy.
const MAX_LINE_WIDTH: f32 = 0.9;

impl SlideStyle {
    /// Font size that keeps `chars` glyphs on one line of a `canvas`-wide slide.
    pub fn fitted_font_size(&self, chars: usize, canvas: Canvas) -> f32 {
        if chars == 0 {
            return self.font_size;
        }
        let max_width = canvas.width as f32 * MAX_LINE_WIDTH;
        let fit = max_width / (chars as f32 * AVG_GLYPH_EM);
        fit.min(self.font_size).max(self.min_font_size)
    }
}

/// The vector description of one slide, before rasterization.
#[derive(Clone, Debug, PartialEq)]
pub struct SlideSvg {
    pub markup: String,
    /// Id of the background gradient, unique per compose call.
    pub gradient_id: String,
    /// Title as drawn (truncated, unescaped).
    pub text: String,
}

/// Turns card titles into PNG slides.
///
/// Cheap to share across threads: the font database is loaded once and reference-counted.
#[derive(Clone, Debug)]
pub struct SlideRenderer {
    canvas: Canvas,
    style: SlideStyle,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SlideRenderer {
    pub fn new(canvas: Canvas, style: SlideStyle, fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self {
            canvas,
            style,
            fontdb,
        }
    }

    /// Renderer with system fonts plus any fonts found in `font_dirs`.
    pub fn with_system_fonts(canvas: Canvas, style: SlideStyle, font_dirs: &[PathBuf]) -> Self {
        Self::new(canvas, style, raster::build_fontdb(font_dirs))
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn style(&self) -> &SlideStyle {
        &self.style
    }

    /// Build the SVG for one slide. Pure apart from the random gradient token.
    pub fn compose(&self, title: &str, ordinal: usize) -> SlideSvg {
        let text = truncate_title(title);
        let gradient_id = format!("bg-{ordinal}-{}", uuid::Uuid::new_v4().simple());
        let font_size = self
            .style
            .fitted_font_size(text.chars().count(), self.canvas);

        let Canvas { width, height } = self.canvas;
        let mut markup = String::with_capacity(768 + text.len());
        // `write!` into a String cannot fail.
        let _ = write!(
            markup,
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                r#"<defs><linearGradient id="{id}" x1="0" y1="0" x2="1" y2="1">"#,
                r#"<stop offset="0%" stop-color="{c0}"/>"#,
                r#"<stop offset="100%" stop-color="{c1}"/>"#,
                r#"</linearGradient></defs>"#,
                r#"<rect x="0" y="0" width="{w}" height="{h}" fill="url(#{id})"/>"#,
                r#"<text x="{cx}" y="{cy}" text-anchor="middle" dominant-baseline="middle" "#,
                r#"font-family="{family}" font-size="{size:.1}" font-weight="700" fill="{fg}">{text}</text>"#,
                r#"</svg>"#,
            ),
            w = width,
            h = height,
            id = gradient_id,
            c0 = self.style.gradient_start.to_hex(),
            c1 = self.style.gradient_end.to_hex(),
            cx = width / 2,
            cy = height / 2,
            family = escape_markup(&self.style.font_family),
            size = font_size,
            fg = self.style.text_color.to_hex(),
            text = escape_markup(&text),
        );

        SlideSvg {
            markup,
            gradient_id,
            text,
        }
    }

    /// Compose, rasterize and write `slide-<ordinal>.png` into `workspace`.
    #[tracing::instrument(level = "debug", skip(self, title, workspace))]
    pub fn render(&self, title: &str, ordinal: usize, workspace: &Path) -> CardreelResult<Slide> {
        let path = workspace.join(slide_file_name(ordinal));
        self.render_to(title, ordinal, &path)?;
        tracing::debug!(path = %path.display(), "slide written");
        Ok(Slide { ordinal, path })
    }

    /// Compose, rasterize and write one slide PNG to an explicit `path`.
    pub fn render_to(&self, title: &str, ordinal: usize, path: &Path) -> CardreelResult<SlideSvg> {
        let svg = self.compose(title, ordinal);
        let rgba = raster::rasterize_svg(&svg.markup, &self.fontdb, self.canvas)
            .map_err(|e| CardreelError::render(ordinal, format!("{e:#}")))?;
        raster::write_png(path, &rgba, self.canvas)
            .map_err(|e| CardreelError::render(ordinal, format!("{e:#}")))?;
        Ok(svg)
    }
}

/// Escape text for embedding in SVG element content or attribute values.
///
/// Characters XML 1.0 cannot carry at all (C0 controls other than tab, LF and CR, plus U+FFFE and
/// U+FFFF) become a space.
pub fn escape_markup(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c if !is_xml_char(c) => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{fffd}' | '\u{10000}'..='\u{10ffff}')
}

#[cfg(test)]
#[path = "../../tests/unit/render/slide.rs"]
mod tests;
