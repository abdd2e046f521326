use chrono::NaiveDate;

use crate::layout::{REPORT_TITLE, TOTAL_SLIDES};
use crate::models::{ReportSlide, VisualKind, Visualization};
use crate::theme::{self, FOOTER_TEXT, MAX_FOOTER_SOURCES};

pub struct HtmlDeck;

impl HtmlDeck {
    pub fn generate(slides: &[ReportSlide], run_date: NaiveDate) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("  <meta charset=\"UTF-8\">\n");
        html.push_str(&format!(
            "  <title>{} - {}</title>\n",
            REPORT_TITLE,
            run_date.format("%Y-%m-%d")
        ));
        html.push_str("  <style>\n");
        html.push_str(&format!(
            "    body {{ margin: 0; background: #000; font-family: 'Noto Sans JP', 'Hiragino Sans', Arial, sans-serif; color: {}; }}\n",
            theme::BODY.hex()
        ));
        html.push_str(&format!(
            "    section.slide {{ position: relative; box-sizing: border-box; width: 1280px; height: 720px; margin: 20px auto; padding: 48px 64px; background: {}; overflow: hidden; page-break-after: always; break-after: page; }}\n",
            theme::BACKGROUND.hex()
        ));
        html.push_str(&format!(
            "    section.slide h1, section.slide h2 {{ color: {}; margin: 0 0 12px 0; }}\n",
            theme::TITLE.hex()
        ));
        html.push_str(&format!(
            "    section.cover {{ display: flex; flex-direction: column; justify-content: center; align-items: center; text-align: center; border-top: 12px solid {}; }}\n",
            theme::ACCENT.hex()
        ));
        html.push_str("    section.cover h1 { font-size: 52px; }\n");
        html.push_str(&format!(
            "    .divider {{ width: 100%; height: 3px; background: {}; margin: 8px 0 20px 0; }}\n",
            theme::ACCENT.hex()
        ));
        html.push_str("    section.cover .divider { width: 60%; }\n");
        html.push_str(&format!(
            "    .counter {{ position: absolute; top: 20px; right: 32px; font-size: 14px; color: {}; }}\n",
            theme::SOURCE.hex()
        ));
        html.push_str(&format!(
            "    .lead {{ font-size: 22px; font-weight: bold; color: {}; margin-bottom: 16px; }}\n",
            theme::ACCENT.hex()
        ));
        html.push_str("    ul.insights { font-size: 18px; line-height: 1.5; padding-left: 24px; }\n");
        html.push_str("    .placeholder .lead { font-style: italic; }\n");
        html.push_str("    .chart { margin-top: 16px; font-size: 14px; }\n");
        html.push_str("    .bar-row { display: flex; align-items: center; margin: 4px 0; }\n");
        html.push_str("    .bar-label { width: 180px; }\n");
        html.push_str(&format!(
            "    .bar {{ height: 16px; background: {}; margin-right: 8px; }}\n",
            theme::ACCENT.hex()
        ));
        html.push_str("    table.data { border-collapse: collapse; }\n");
        html.push_str(&format!(
            "    table.data th, table.data td {{ border: 1px solid {}; padding: 4px 10px; }}\n",
            theme::SOURCE.hex()
        ));
        html.push_str(&format!(
            "    .sources {{ position: absolute; bottom: 40px; left: 64px; right: 64px; font-size: 12px; color: {}; }}\n",
            theme::SOURCE.hex()
        ));
        html.push_str(&format!(
            "    .sources a {{ color: {}; }}\n",
            theme::SOURCE.hex()
        ));
        html.push_str(&format!(
            "    footer {{ position: absolute; bottom: 14px; left: 64px; font-size: 11px; color: {}; }}\n",
            theme::SOURCE.hex()
        ));
        html.push_str("    @media print { body { background: none; } section.slide { margin: 0; } }\n");
        html.push_str("  </style>\n");
        html.push_str("</head>\n<body>\n");

        for (index, slide) in slides.iter().enumerate() {
            if index == 0 {
                Self::push_cover(&mut html, slide);
            } else {
                Self::push_content(&mut html, slide);
            }
        }

        html.push_str("</body>\n</html>");
        html
    }

    fn push_cover(html: &mut String, slide: &ReportSlide) {
        html.push_str("<section class=\"slide cover\">\n");
        html.push_str(&format!("  <h1>{}</h1>\n", Self::escape_html(&slide.title)));
        html.push_str("  <div class=\"divider\"></div>\n");
        if !slide.lead.is_empty() {
            html.push_str(&format!(
                "  <p class=\"lead\">{}</p>\n",
                Self::escape_html(&slide.lead)
            ));
        }
        for line in &slide.insights {
            html.push_str(&format!("  <p>{}</p>\n", Self::escape_html(line)));
        }
        html.push_str(&format!("  <footer>{}</footer>\n", FOOTER_TEXT));
        html.push_str("</section>\n");
    }

    fn push_content(html: &mut String, slide: &ReportSlide) {
        let class = if slide.placeholder {
            "slide placeholder"
        } else {
            "slide"
        };
        html.push_str(&format!(
            "<section class=\"{}\" id=\"slide-{}\">\n",
            class, slide.slide_number
        ));
        html.push_str(&format!(
            "  <div class=\"counter\">{} / {}</div>\n",
            slide.slide_number, TOTAL_SLIDES
        ));
        html.push_str(&format!("  <h2>{}</h2>\n", Self::escape_html(&slide.title)));
        html.push_str("  <div class=\"divider\"></div>\n");

        if !slide.lead.is_empty() {
            html.push_str(&format!(
                "  <p class=\"lead\">{}</p>\n",
                Self::escape_html(&slide.lead)
            ));
        }

        if !slide.insights.is_empty() {
            html.push_str("  <ul class=\"insights\">\n");
            for insight in &slide.insights {
                html.push_str(&format!("    <li>{}</li>\n", Self::escape_html(insight)));
            }
            html.push_str("  </ul>\n");
        }

        Self::push_visualization(html, &slide.visualization);

        if !slide.sources.is_empty() {
            html.push_str("  <div class=\"sources\">Sources: ");
            let links: Vec<String> = slide
                .sources
                .iter()
                .take(MAX_FOOTER_SOURCES)
                .map(|s| Self::source_link(s))
                .collect();
            html.push_str(&links.join(" | "));
            html.push_str("</div>\n");
        }

        html.push_str(&format!("  <footer>{}</footer>\n", FOOTER_TEXT));
        html.push_str("</section>\n");
    }

    fn push_visualization(html: &mut String, viz: &Visualization) {
        match viz.kind {
            VisualKind::None => {}
            VisualKind::BarChart | VisualKind::PieChart => {
                if viz.labels.is_empty() {
                    return;
                }
                let total: f64 = viz.values.iter().sum();
                let max = viz.values.iter().cloned().fold(0.0_f64, f64::max);
                html.push_str(&format!("  <div class=\"chart {}\">\n", viz.kind.as_str()));
                for (label, value) in viz.labels.iter().zip(viz.values.iter()) {
                    let (width, caption) = if viz.kind == VisualKind::PieChart {
                        let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
                        (share * 6.0, format!("{:.1}%", share))
                    } else {
                        let ratio = if max > 0.0 { value / max } else { 0.0 };
                        (ratio * 600.0, format!("{}", value))
                    };
                    html.push_str(&format!(
                        "    <div class=\"bar-row\"><span class=\"bar-label\">{}</span><span class=\"bar\" style=\"width: {:.0}px\"></span>{}</div>\n",
                        Self::escape_html(label),
                        width,
                        caption
                    ));
                }
                html.push_str("  </div>\n");
            }
            VisualKind::Table => {
                if viz.headers.is_empty() {
                    return;
                }
                html.push_str("  <table class=\"chart data\">\n    <tr>");
                for header in &viz.headers {
                    html.push_str(&format!("<th>{}</th>", Self::escape_html(header)));
                }
                html.push_str("</tr>\n");
                for row in &viz.rows {
                    html.push_str("    <tr>");
                    for cell in row.iter().take(viz.headers.len()) {
                        html.push_str(&format!("<td>{}</td>", Self::escape_html(cell)));
                    }
                    html.push_str("</tr>\n");
                }
                html.push_str("  </table>\n");
            }
        }
    }

    fn source_link(source: &str) -> String {
        let text = Self::escape_html(source);
        if source.starts_with("http://") || source.starts_with("https://") {
            format!("<a href=\"{}\" target=\"_blank\">{}</a>", text, text)
        } else {
            text
        }
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    // ==================== HTML Escaping Tests ====================

    #[test]
    fn test_escape_html_ampersand() {
        assert_eq!(HtmlDeck::escape_html("A & B"), "A &amp; B");
    }

    #[test]
    fn test_escape_html_less_than() {
        assert_eq!(HtmlDeck::escape_html("<script>"), "&lt;script&gt;");
    }

    #[test]
    fn test_escape_html_quotes() {
        assert_eq!(
            HtmlDeck::escape_html("It's \"here\""),
            "It&#39;s &quot;here&quot;"
        );
    }

    // ==================== Deck Generation Tests ====================

    #[test]
    fn test_generate_one_section_per_slide() {
        let slides = vec![
            ReportSlide::new(1, REPORT_TITLE, "Week of 2026-10-07"),
            ReportSlide::new(2, "Contents", ""),
            ReportSlide::new(3, "Policy", "Lead"),
        ];
        let html = HtmlDeck::generate(&slides, date());

        assert_eq!(html.matches("<section class=\"slide").count(), 3);
        assert!(html.contains("<section class=\"slide cover\">"));
        assert!(html.contains("<div class=\"counter\">3 / 30</div>"));
        assert!(html.contains("page-break-after: always"));
        assert!(html.contains("#0D1B2A"));
    }

    #[test]
    fn test_generate_escapes_and_limits_sources() {
        let mut slide = ReportSlide::new(5, "SpaceX & ULA", "<b>bold</b>")
            .with_insights(vec!["Point \"quoted\"".into()]);
        slide.sources = vec![
            "https://a.example".into(),
            "https://b.example".into(),
            "Reuters".into(),
            "https://d.example".into(),
        ];
        let html = HtmlDeck::generate(&[ReportSlide::new(1, "Cover", ""), slide], date());

        assert!(html.contains("SpaceX &amp; ULA"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(html.contains("Point &quot;quoted&quot;"));
        assert!(html.contains("<a href=\"https://a.example\""));
        assert!(html.contains("| Reuters</div>"));
        assert!(!html.contains("d.example"));
    }

    #[test]
    fn test_generate_renders_table_and_chart() {
        let mut table = ReportSlide::new(3, "Deals", "");
        table.visualization = Visualization {
            kind: VisualKind::Table,
            headers: vec!["Company".into(), "Round".into()],
            rows: vec![vec!["Orbit".into(), "Series A".into()]],
            ..Visualization::none()
        };
        let mut chart = ReportSlide::new(4, "Share", "");
        chart.visualization = Visualization {
            kind: VisualKind::PieChart,
            labels: vec!["US".into(), "China".into()],
            values: vec![1.0, 1.0],
            ..Visualization::none()
        };
        let html = HtmlDeck::generate(&[ReportSlide::new(1, "Cover", ""), table, chart], date());

        assert!(html.contains("<th>Company</th><th>Round</th>"));
        assert!(html.contains("<td>Orbit</td><td>Series A</td>"));
        assert!(html.contains("50.0%"));
    }
}
