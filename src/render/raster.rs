use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;

use crate::foundation::core::Canvas;

/// Font database shared by every slide render: system fonts plus `.ttf`/`.otf`/`.ttc` files found
/// directly inside `font_dirs`.
pub fn build_fontdb(font_dirs: &[PathBuf]) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    for dir in font_dirs {
        load_fonts_from_dir(&mut db, dir);
    }
    tracing::debug!(faces = db.len(), "slide font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable, skipping");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(font = %path.display(), error = %e, "failed to load font file");
        }
    }
}

/// Rasterize SVG markup onto a `canvas`-sized pixmap and return straight-alpha RGBA8 pixels.
pub fn rasterize_svg(
    markup: &str,
    fontdb: &Arc<usvg::fontdb::Database>,
    canvas: Canvas,
) -> anyhow::Result<Vec<u8>> {
    let opts = usvg::Options {
        fontdb: Arc::clone(fontdb),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(markup, &opts).context("parse slide svg")?;

    let size = tree.size();
    anyhow::ensure!(
        size.width() > 0.0 && size.height() > 0.0,
        "slide svg has invalid width/height"
    );

    let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .context("failed to allocate slide pixmap")?;

    let sx = (canvas.width as f32) / size.width();
    let sy = (canvas.height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia keeps premultiplied pixels; PNG wants straight alpha.
    let mut out = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(out)
}

pub fn write_png(path: &Path, rgba: &[u8], canvas: Canvas) -> anyhow::Result<()> {
    image::save_buffer_with_format(
        path,
        rgba,
        canvas.width,
        canvas.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
