use std::cell::RefCell;

use tiny_skia::{Color, Pixmap, Transform};
use usvg::fontdb::Database;

use crate::error::RasterError;
use crate::types::viz::OutputConfig;

const LABEL_FONTS: &str = "Inter, DejaVu Sans, sans-serif";
const LABEL_COLOR: &str = "#0f172a";

thread_local! {
    static FONT_DB: RefCell<Database> = RefCell::new(load_font_db());
}

/// Renders a route SVG to PNG bytes at the configured size, stamping the
/// label along the bottom edge when one is set.
pub fn rasterize(svg: &str, config: &OutputConfig) -> Result<Vec<u8>, RasterError> {
    let svg = match config.label.as_deref() {
        Some(label) => with_label(svg, label, config.width, config.height),
        None => svg.to_string(),
    };
    let pixmap = FONT_DB.with(|fontdb| render_pixmap(&svg, config, &fontdb.borrow()))?;
    pixmap
        .encode_png()
        .map_err(|e| RasterError::RenderFailed(format!("Failed to encode PNG: {}", e)))
}

fn load_font_db() -> Database {
    let mut fontdb = Database::new();
    // Containers often ship without fontconfig.
    for path in [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    ] {
        let _ = fontdb.load_font_file(path);
    }
    fontdb.load_system_fonts();
    tracing::debug!("Font database ready with {} faces", fontdb.len());
    fontdb
}

fn render_pixmap(svg: &str, config: &OutputConfig, fontdb: &Database) -> Result<Pixmap, RasterError> {
    let tree = usvg::Tree::from_str(svg, &usvg::Options::default(), fontdb)
        .map_err(|e| RasterError::RenderFailed(format!("Failed to parse SVG: {}", e)))?;

    let mut pixmap = Pixmap::new(config.width, config.height).ok_or_else(|| {
        RasterError::RenderFailed(format!(
            "Failed to create {}x{} pixmap",
            config.width, config.height
        ))
    })?;
    if let Some((r, g, b, a)) = config.background {
        pixmap.fill(Color::from_rgba8(r, g, b, a));
    }

    let size = tree.size();
    let transform = Transform::from_scale(
        config.width as f32 / size.width(),
        config.height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Appends a centred caption on a translucent band at the bottom.
fn with_label(svg: &str, label: &str, width: u32, height: u32) -> String {
    let font_size = ((height as f32 * 0.028) as u32).max(16);
    let band_height = font_size * 2;
    let band_y = height.saturating_sub(band_height);
    let text_y = height.saturating_sub(font_size * 2 / 3);

    let nodes = format!(
        r#"<rect x="0" y="{band_y}" width="{width}" height="{band_height}" fill="white" fill-opacity="0.7"/><text x="{x}" y="{text_y}" font-family="{LABEL_FONTS}" font-size="{font_size}" font-weight="600" fill="{LABEL_COLOR}" text-anchor="middle">{text}</text>"#,
        x = width / 2,
        text = escape_text(label),
    );

    svg.replacen("</svg>", &format!("{nodes}</svg>"), 1)
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
