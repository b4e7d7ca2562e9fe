//! Report sections and the final HTML document.
//!
//! Sections are explicit records with a title and a body. The document
//! assembler only walks this list; nothing downstream ever re-parses
//! generated text to find section boundaries.

use crate::charts::ChartFragment;

/// One titled part of the report.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub title: String,
    /// Prose paragraphs, rendered `</p><p>`-joined.
    pub paragraphs: Vec<String>,
    pub chart: Option<ChartFragment>,
    /// Pre-rendered table placed after the prose.
    pub table_html: Option<String>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Section {
            title: title.into(),
            ..Default::default()
        }
    }
}

const BOOTSTRAP_CSS: &str =
    "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css";
const ECHARTS_JS: &str = "https://assets.pyecharts.org/assets/v5/echarts.min.js";

/// Assemble the standalone report document: title, then each section as an
/// `<h3>` block with its chart fragments, prose, and table.
pub fn render_document(title: &str, sections: &[Section]) -> String {
    let mut body = String::new();
    for section in sections {
        body.push_str(&format!("        <h3>{}</h3>\n", escape(&section.title)));
        if let Some(chart) = &section.chart {
            body.push_str(&format!(
                "        <p>{}{}</p>\n",
                chart.container, chart.script
            ));
        }
        if !section.paragraphs.is_empty() {
            let joined = section
                .paragraphs
                .iter()
                .map(|p| escape(p))
                .collect::<Vec<_>>()
                .join("</p><p>");
            body.push_str(&format!("        <p>{joined}</p>\n"));
        }
        if let Some(table) = &section.table_html {
            body.push_str(&format!("        {table}\n"));
        }
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n    <title>{title}</title>\n    <link rel=\"stylesheet\" href=\"{BOOTSTRAP_CSS}\">\n    <script type=\"text/javascript\" src=\"{ECHARTS_JS}\"></script>\n</head>\n<body class=\"container mt-4\">\n    <h1 class=\"text-center mb-4\">{title}</h1>\n\n{body}</body>\n</html>\n",
        title = escape(title),
    )
}

/// Table with a leading index column (the distribution-summary layout).
pub fn render_indexed_table(columns: &[&str], rows: &[(String, Vec<String>)]) -> String {
    let mut html = String::from("<table class=\"table table-striped\">\n  <thead>\n    <tr style=\"text-align: left;\">\n      <th></th>\n");
    for col in columns {
        html.push_str(&format!("      <th>{}</th>\n", escape(col)));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for (index, cells) in rows {
        html.push_str("    <tr>\n");
        html.push_str(&format!("      <th>{}</th>\n", escape(index)));
        for cell in cells {
            html.push_str(&format!("      <td>{}</td>\n", escape(cell)));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>");
    html
}

/// Plain table without an index column (the full-record layout).
pub fn render_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table class=\"table table-striped\">\n  <thead>\n    <tr>\n");
    for col in columns {
        html.push_str(&format!("      <th>{}</th>\n", escape(col)));
    }
    html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for cells in rows {
        html.push_str("    <tr>\n");
        for cell in cells {
            html.push_str(&format!("      <td>{}</td>\n", escape(cell)));
        }
        html.push_str("    </tr>\n");
    }
    html.push_str("  </tbody>\n</table>");
    html
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_has_title_and_section_headers() {
        let sections = vec![
            Section::new("一、总体概况"),
            Section::new("四、详细消费记录"),
        ];
        let html = render_document("2025年11月消费报告", &sections);
        assert!(html.contains("<h1 class=\"text-center mb-4\">2025年11月消费报告</h1>"));
        assert_eq!(html.matches("<h3>").count(), 2);
        assert!(html.contains("bootstrap.min.css"));
        assert!(html.contains("echarts.min.js"));
    }

    #[test]
    fn test_paragraphs_joined_with_p_tags() {
        let mut section = Section::new("四、详细消费记录");
        section.paragraphs = vec!["第一段".to_string(), "第二段".to_string()];
        let html = render_document("t", &[section]);
        assert!(html.contains("<p>第一段</p><p>第二段</p>"));
    }

    #[test]
    fn test_indexed_table_layout() {
        let html = render_indexed_table(
            &["平均数", "中位数"],
            &[("消费金额".to_string(), vec!["50".to_string(), "50".to_string()])],
        );
        assert!(html.contains("table table-striped"));
        assert!(html.contains("<th>消费金额</th>"));
        assert!(html.contains("<td>50</td>"));
    }

    #[test]
    fn test_escape_in_cells() {
        let html = render_table(
            &["备注".to_string()],
            &[vec!["<奶茶> & 咖啡".to_string()]],
        );
        assert!(html.contains("&lt;奶茶&gt; &amp; 咖啡"));
    }
}
