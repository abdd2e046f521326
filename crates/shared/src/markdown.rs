use crate::models::{ReportSlide, VisualKind, Visualization};

/// Plain Markdown rendering of the deck. Always written before the styled renderings.
pub fn render(slides: &[ReportSlide]) -> String {
    let mut md = String::new();

    let Some((cover, rest)) = slides.split_first() else {
        return "# Space Business Weekly Report\n\nNo slides were produced.\n".to_string();
    };

    md.push_str(&format!("# {}\n\n", cover.title));
    if !cover.lead.is_empty() {
        md.push_str(&format!("_{}_\n\n", cover.lead));
    }
    for line in &cover.insights {
        md.push_str(&format!("- {}\n", line));
    }
    md.push('\n');

    for slide in rest {
        md.push_str("---\n\n");
        md.push_str(&format!("## {}. {}\n\n", slide.slide_number, slide.title));

        if !slide.lead.is_empty() {
            md.push_str(&format!("> {}\n\n", slide.lead));
        }

        for insight in &slide.insights {
            md.push_str(&format!("- {}\n", insight));
        }
        if !slide.insights.is_empty() {
            md.push('\n');
        }

        if let Some(table) = visualization_table(&slide.visualization) {
            md.push_str(&table);
            md.push('\n');
        }

        if !slide.sources.is_empty() {
            md.push_str("Sources:\n");
            for source in &slide.sources {
                md.push_str(&format!("- {}\n", source_entry(source)));
            }
            md.push('\n');
        }
    }

    md
}

fn visualization_table(viz: &Visualization) -> Option<String> {
    let mut out = String::new();

    match viz.kind {
        VisualKind::None => return None,
        VisualKind::BarChart | VisualKind::PieChart => {
            if viz.labels.is_empty() {
                return None;
            }
            let total: f64 = viz.values.iter().sum();
            out.push_str(&format!("**{}**\n\n", viz.kind.as_str()));
            out.push_str("| Label | Value |");
            if viz.kind == VisualKind::PieChart {
                out.push_str(" Share |\n|---|---|---|\n");
            } else {
                out.push_str("\n|---|---|\n");
            }
            for (label, value) in viz.labels.iter().zip(viz.values.iter()) {
                out.push_str(&format!("| {} | {} |", escape_cell(label), value));
                if viz.kind == VisualKind::PieChart {
                    let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
                    out.push_str(&format!(" {:.1}% |", share));
                }
                out.push('\n');
            }
        }
        VisualKind::Table => {
            if viz.headers.is_empty() {
                return None;
            }
            let headers: Vec<String> = viz.headers.iter().map(|h| escape_cell(h)).collect();
            out.push_str(&format!("| {} |\n", headers.join(" | ")));
            out.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
            for row in &viz.rows {
                let cells: Vec<String> = (0..headers.len())
                    .map(|i| row.get(i).map(|c| escape_cell(c)).unwrap_or_default())
                    .collect();
                out.push_str(&format!("| {} |\n", cells.join(" | ")));
            }
        }
    }

    Some(out)
}

// Autolink URLs only; a bare `<Reuters>` would read as an HTML tag
fn source_entry(source: &str) -> String {
    if source.starts_with("http://") || source.starts_with("https://") {
        format!("<{}>", source)
    } else {
        source.to_string()
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
