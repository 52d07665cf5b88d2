//! Report rendering

use super::generator::ResearchReport;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const RULE_WIDTH: usize = 70;
const SECTION_RULE_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Html,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            other => Err(format!("unknown report format: {other}")),
        }
    }
}

pub trait Formatter: Send + Sync {
    fn format(&self) -> ReportFormat;
    fn render(&self, report: &ResearchReport) -> String;
    fn format_error(&self, error: &str) -> String;
}

/// Plain text with banner rules, as saved to disk
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format(&self) -> ReportFormat {
        ReportFormat::Text
    }

    fn render(&self, report: &ResearchReport) -> String {
        let banner = "=".repeat(RULE_WIDTH);
        let mut out = String::new();
        out.push_str(&format!("{banner}\n{}\n{banner}\n\n", report.title()));

        for section in &report.sections {
            out.push_str(&section.title);
            out.push('\n');
            out.push_str(&"-".repeat(SECTION_RULE_WIDTH));
            out.push('\n');
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }

        out.push_str(&banner);
        out.push('\n');
        for line in &report.disclaimer {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&banner);
        out.push('\n');
        out
    }

    fn format_error(&self, error: &str) -> String {
        format!("❌ Error: {error}")
    }
}

/// Self-contained HTML page for the dashboard
pub struct HtmlFormatter;

impl Formatter for HtmlFormatter {
    fn format(&self) -> ReportFormat {
        ReportFormat::Html
    }

    fn render(&self, report: &ResearchReport) -> String {
        let title = escape_html(&report.title());
        let mut out = format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"
        );
        out.push_str(&format!("<h1>{title}</h1>\n"));
        out.push_str(&format!(
            "<p class=\"meta\">{} &middot; {}</p>\n",
            escape_html(&report.company_name),
            escape_html(report.industry.display_name())
        ));

        for section in &report.sections {
            out.push_str(&format!(
                "<section>\n<h2>{}</h2>\n<pre>\n",
                escape_html(&section.title)
            ));
            for line in &section.lines {
                out.push_str(&escape_html(line));
                out.push('\n');
            }
            out.push_str("</pre>\n</section>\n");
        }

        out.push_str("<footer>\n");
        for line in &report.disclaimer {
            out.push_str(&format!("<p>{}</p>\n", escape_html(line)));
        }
        out.push_str("</footer>\n<p><a href=\"/\">Back</a></p>\n</body>\n</html>\n");
        out
    }

    fn format_error(&self, error: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\"><body><h1>Error</h1><p>{}</p>\
             <p><a href=\"/\">Back</a></p></body></html>",
            escape_html(error)
        )
    }
}

const STYLE: &str = "body{font-family:sans-serif;max-width:900px;margin:2em auto;padding:0 1em}\
pre{white-space:pre-wrap;background:#f6f8fa;padding:1em;border-radius:6px}\
.meta{color:#555}footer{font-size:.85em;color:#666;border-top:1px solid #ddd}";

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(format: ReportFormat) -> Box<dyn Formatter> {
        match format {
            ReportFormat::Text => Box::new(TextFormatter),
            ReportFormat::Html => Box::new(HtmlFormatter),
        }
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::industry::Industry;
    use crate::report::generator::{ReportSection, SectionKind};
    use chrono::Utc;

    fn report() -> ResearchReport {
        ResearchReport {
            symbol: "AT&T".to_string(),
            company_name: "<Acme & Co>".to_string(),
            industry: Industry::Communication,
            generated_at: Utc::now(),
            sections: vec![ReportSection {
                kind: SectionKind::Risks,
                title: "6. Risks".to_string(),
                lines: vec!["P/E > 40 & falling".to_string()],
            }],
            disclaimer: vec!["Not advice".to_string()],
        }
    }

    #[test]
    fn test_text_layout() {
        let text = TextFormatter.render(&report());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "=".repeat(70));
        assert_eq!(lines[1], "Equity Research Report - AT&T");
        assert!(text.contains("6. Risks\n----------------------------------------\nP/E > 40 & falling\n"));
        assert!(text.ends_with(&format!("{0}\nNot advice\n{0}\n", "=".repeat(70))));
    }

    #[test]
    fn test_html_is_escaped() {
        let html = FormatterFactory::create(ReportFormat::Html).render(&report());

        assert!(html.contains("<h1>Equity Research Report - AT&amp;T</h1>"));
        assert!(html.contains("&lt;Acme &amp; Co&gt;"));
        assert!(html.contains("P/E &gt; 40 &amp; falling"));
        assert!(!html.contains("<Acme"));
    }

    #[test]
    fn test_html_layout() {
        let html = HtmlFormatter.render(&report());

        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains("<section>\n<h2>6. Risks</h2>\n<pre>\nP/E &gt; 40 &amp; falling\n</pre>\n</section>\n"));
        assert!(html.contains("<footer>\n<p>Not advice</p>\n</footer>\n"));
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("HTML".parse::<ReportFormat>(), Ok(ReportFormat::Html));
        assert_eq!("txt".parse::<ReportFormat>(), Ok(ReportFormat::Text));
        assert!("pdf".parse::<ReportFormat>().is_err());
        assert_eq!(
            FormatterFactory::create(ReportFormat::Text).format(),
            ReportFormat::Text
        );
    }
}
