use anyhow::{anyhow, bail, Context, Result};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rect,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::fonts;
use crate::layout::{REPORT_TITLE, TOTAL_SLIDES};
use crate::models::{ReportSlide, VisualKind, Visualization};
use crate::theme::{self, Rgb, FOOTER_TEXT, MAX_FOOTER_SOURCES};

// 16:9 page, 13.333in x 7.5in
pub const PAGE_WIDTH: f32 = 338.67;
pub const PAGE_HEIGHT: f32 = 190.5;

const MARGIN: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
const CONTENT_BOTTOM: f32 = 28.0;

/// Turns a finished deck into a file on disk.
pub trait DocumentRenderer {
    fn render(&self, slides: &[ReportSlide], path: &Path) -> Result<()>;
}

/// PDF slide deck, one page per slide.
pub struct PdfRenderer {
    font_candidates: Vec<PathBuf>,
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self {
            font_candidates: fonts::default_candidates(),
        }
    }
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use only these font files. An empty list means the builtin font.
    pub fn with_font_candidates(font_candidates: Vec<PathBuf>) -> Self {
        Self { font_candidates }
    }

    fn load_fonts(&self, doc: &PdfDocumentReference) -> Result<Fonts> {
        for path in fonts::existing(&self.font_candidates) {
            let file = match File::open(path) {
                Ok(file) => file,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Cannot open font");
                    continue;
                }
            };
            match doc.add_external_font(file) {
                Ok(font) => {
                    info!(path = %path.display(), "Using font");
                    return Ok(Fonts {
                        regular: font.clone(),
                        bold: font,
                    });
                }
                Err(e) => debug!(path = %path.display(), error = ?e, "Font not usable"),
            }
        }

        warn!("No CJK-capable font found; falling back to Helvetica");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Failed to load builtin font: {:?}", e))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("Failed to load builtin font: {:?}", e))?;
        Ok(Fonts { regular, bold })
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, slides: &[ReportSlide], path: &Path) -> Result<()> {
        if slides.is_empty() {
            bail!("No slides to render");
        }

        let (doc, first_page, first_layer) =
            PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Slide 1");
        let fonts = self.load_fonts(&doc)?;

        for (index, slide) in slides.iter().enumerate() {
            let layer = if index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(
                    Mm(PAGE_WIDTH),
                    Mm(PAGE_HEIGHT),
                    format!("Slide {}", index + 1),
                );
                doc.get_page(page).get_layer(layer)
            };

            draw_background(&layer);
            if index == 0 {
                draw_cover(&layer, &fonts, slide);
            } else {
                draw_content(&layer, &fonts, slide);
            }
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|e| anyhow!("Failed to write PDF: {:?}", e))?;

        Ok(())
    }
}

fn fill(layer: &PdfLayerReference, color: Rgb) {
    let (r, g, b) = color.unit();
    layer.set_fill_color(Color::Rgb(printpdf::Rgb::new(r, g, b, None)));
}

fn rect(layer: &PdfLayerReference, color: Rgb, x0: f32, y0: f32, x1: f32, y1: f32) {
    fill(layer, color);
    layer.add_rect(Rect::new(Mm(x0), Mm(y0), Mm(x1), Mm(y1)));
}

fn text(layer: &PdfLayerReference, font: &IndirectFontRef, color: Rgb, size: f32, x: f32, y: f32, s: &str) {
    fill(layer, color);
    layer.use_text(s, size, Mm(x), Mm(y), font);
}

fn centered(layer: &PdfLayerReference, font: &IndirectFontRef, color: Rgb, size: f32, y: f32, s: &str) {
    let line = fit(s, size, PAGE_WIDTH - 2.0 * MARGIN);
    let x = ((PAGE_WIDTH - text_width(&line, size)) / 2.0).max(MARGIN);
    text(layer, font, color, size, x, y, &line);
}

fn draw_background(layer: &PdfLayerReference) {
    rect(layer, theme::BACKGROUND, 0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT);
}

fn draw_footer(layer: &PdfLayerReference, fonts: &Fonts) {
    text(layer, &fonts.regular, theme::SOURCE, 8.0, MARGIN, 8.0, FOOTER_TEXT);
}

fn draw_cover(layer: &PdfLayerReference, fonts: &Fonts, slide: &ReportSlide) {
    rect(layer, theme::ACCENT, 0.0, PAGE_HEIGHT - 8.0, PAGE_WIDTH, PAGE_HEIGHT);

    centered(layer, &fonts.bold, theme::TITLE, 36.0, PAGE_HEIGHT * 0.62, &slide.title);

    let half = 60.0;
    let mid = PAGE_WIDTH / 2.0;
    let divider_y = PAGE_HEIGHT * 0.56;
    rect(layer, theme::ACCENT, mid - half, divider_y, mid + half, divider_y + 1.0);

    let mut y = PAGE_HEIGHT * 0.47;
    if !slide.lead.is_empty() {
        centered(layer, &fonts.regular, theme::ACCENT, 16.0, y, &slide.lead);
        y -= 10.0;
    }
    for line in &slide.insights {
        centered(layer, &fonts.regular, theme::BODY, 13.0, y, line);
        y -= 8.0;
    }

    draw_footer(layer, fonts);
}

fn draw_content(layer: &PdfLayerReference, fonts: &Fonts, slide: &ReportSlide) {
    let counter = format!("{} / {}", slide.slide_number, TOTAL_SLIDES);
    text(
        layer,
        &fonts.regular,
        theme::SOURCE,
        11.0,
        PAGE_WIDTH - MARGIN - text_width(&counter, 11.0),
        PAGE_HEIGHT - 12.0,
        &counter,
    );

    let title = fit(&slide.title, 26.0, PAGE_WIDTH - 2.0 * MARGIN - 30.0);
    text(layer, &fonts.bold, theme::TITLE, 26.0, MARGIN, PAGE_HEIGHT - 24.0, &title);
    rect(
        layer,
        theme::ACCENT,
        MARGIN,
        PAGE_HEIGHT - 31.0,
        PAGE_WIDTH - MARGIN,
        PAGE_HEIGHT - 30.0,
    );

    let full_width = PAGE_WIDTH - 2.0 * MARGIN;
    let text_area = if slide.visualization.is_none() {
        full_width
    } else {
        full_width * 0.55
    };

    let mut y = PAGE_HEIGHT - 42.0;
    for line in wrap(&slide.lead, 15.0, text_area) {
        if y < CONTENT_BOTTOM {
            break;
        }
        text(layer, &fonts.bold, theme::ACCENT, 15.0, MARGIN, y, &line);
        y -= 7.0;
    }
    y -= 3.0;

    'insights: for insight in &slide.insights {
        for (i, line) in wrap(insight, 13.0, text_area - 6.0).into_iter().enumerate() {
            if y < CONTENT_BOTTOM {
                break 'insights;
            }
            if i == 0 {
                text(layer, &fonts.regular, theme::ACCENT, 13.0, MARGIN, y, "•");
            }
            text(layer, &fonts.regular, theme::BODY, 13.0, MARGIN + 6.0, y, &line);
            y -= 6.5;
        }
        y -= 2.0;
    }

    if !slide.visualization.is_none() {
        let x0 = MARGIN + text_area + 10.0;
        draw_visualization(
            layer,
            fonts,
            &slide.visualization,
            x0,
            PAGE_WIDTH - MARGIN,
            PAGE_HEIGHT - 42.0,
        );
    }

    if !slide.sources.is_empty() {
        let joined = slide
            .sources
            .iter()
            .take(MAX_FOOTER_SOURCES)
            .cloned()
            .collect::<Vec<_>>()
            .join(" | ");
        let line = fit(&format!("Sources: {}", joined), 9.0, full_width);
        text(layer, &fonts.regular, theme::SOURCE, 9.0, MARGIN, 18.0, &line);
    }

    draw_footer(layer, fonts);
}

fn draw_visualization(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    viz: &Visualization,
    x0: f32,
    x1: f32,
    top: f32,
) {
    let height = top - CONTENT_BOTTOM;

    match viz.kind {
        VisualKind::None => {}
        VisualKind::BarChart | VisualKind::PieChart => {
            let count = viz.labels.len().min(viz.values.len());
            if count == 0 {
                return;
            }
            let total: f64 = viz.values.iter().take(count).sum();
            let max = viz.values.iter().take(count).cloned().fold(0.0_f64, f64::max);
            let row = (height / count as f32).min(12.0);
            let label_width = 45.0;
            let bar_span = (x1 - x0 - label_width - 22.0).max(10.0);

            for (i, (label, value)) in viz.labels.iter().zip(viz.values.iter()).take(count).enumerate() {
                let y = top - row * (i as f32 + 1.0) + row * 0.3;
                let (ratio, caption) = if viz.kind == VisualKind::PieChart {
                    let share = if total > 0.0 { value / total } else { 0.0 };
                    (share, format!("{:.1}%", share * 100.0))
                } else {
                    let ratio = if max > 0.0 { value / max } else { 0.0 };
                    (ratio, format!("{}", value))
                };
                let bar_end = x0 + label_width + bar_span * ratio.max(0.0) as f32;

                let label = fit(label, 10.0, label_width - 2.0);
                text(layer, &fonts.regular, theme::BODY, 10.0, x0, y, &label);
                rect(layer, theme::ACCENT, x0 + label_width, y - 1.0, bar_end.max(x0 + label_width + 0.5), y + 4.0);
                text(layer, &fonts.regular, theme::BODY, 10.0, bar_end + 2.0, y, &caption);
            }
        }
        VisualKind::Table => {
            if viz.headers.is_empty() {
                return;
            }
            let columns = viz.headers.len();
            let column_width = (x1 - x0) / columns as f32;
            let row = 8.0;

            for (c, header) in viz.headers.iter().enumerate() {
                let cell = fit(header, 11.0, column_width - 2.0);
                let x = x0 + column_width * c as f32;
                text(layer, &fonts.bold, theme::TITLE, 11.0, x, top - row, &cell);
            }
            rect(layer, theme::ACCENT, x0, top - row - 2.5, x1, top - row - 2.0);

            for (r, cells) in viz.rows.iter().enumerate() {
                let y = top - row * (r as f32 + 2.0);
                if y < CONTENT_BOTTOM {
                    break;
                }
                for (c, value) in cells.iter().take(columns).enumerate() {
                    let cell = fit(value, 10.0, column_width - 2.0);
                    let x = x0 + column_width * c as f32;
                    text(layer, &fonts.regular, theme::BODY, 10.0, x, y, &cell);
                }
            }
        }
    }
}

/// Approximate advance of one character as a fraction of the font size.
fn char_units(c: char) -> f32 {
    if (c as u32) >= 0x2E80 {
        1.0
    } else if c.is_ascii_uppercase() {
        0.65
    } else {
        0.52
    }
}

fn text_width(s: &str, size: f32) -> f32 {
    s.chars().map(char_units).sum::<f32>() * size * PT_TO_MM
}

/// Truncate to fit `max_width`, marking the cut with "...".
fn fit(s: &str, size: f32, max_width: f32) -> String {
    if text_width(s, size) <= max_width {
        return s.to_string();
    }
    let budget = max_width - text_width("...", size);
    let mut out = String::new();
    let mut width = 0.0;
    for c in s.chars() {
        let w = char_units(c) * size * PT_TO_MM;
        if width + w > budget {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push_str("...");
    out
}

/// Greedy line wrap. Words wider than a line, including unspaced CJK runs, break per character.
fn wrap(s: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut width = 0.0;
    let space = text_width(" ", size);

    for word in s.split_whitespace() {
        let word_width = text_width(word, size);
        let gap = if line.is_empty() { 0.0 } else { space };

        if width + gap + word_width <= max_width {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
            width += gap + word_width;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            width = 0.0;
        }

        if word_width <= max_width {
            line.push_str(word);
            width = word_width;
            continue;
        }

        for c in word.chars() {
            let w = char_units(c) * size * PT_TO_MM;
            if width + w > max_width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            }
            line.push(c);
            width += w;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
