//! Quote document generation.
//!
//! Renders the internal (cost-revealing) and client-facing documents for a
//! persisted quote from HTML templates, converting to PDF via wkhtmltopdf
//! when it is available and falling back to the HTML itself otherwise.

mod context;

use std::collections::HashMap;
use std::process::Stdio;

use tera::Tera;
use tokio::process::Command;
use tracing::{error, info, warn};

use marcena_core::config::CompanyConfig;
use marcena_core::domain::quote::{status_label, Quote};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    /// Itemizes the labor fee as a profit line. Internal use only.
    Internal,
    /// The customer-facing rendition: same grand total, no profit framing.
    Client,
}

impl DocumentKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "internal" => Some(Self::Internal),
            "client" => Some(Self::Client),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::Client => "client",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Self::Internal => "internal.html.tera",
            Self::Client => "client.html.tera",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Register custom Tera filters used by quote templates.
///
/// - `money`:        2-decimal display rounding, e.g. `amount | money`
/// - `status_label`: human status text with an "unknown" fallback
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("money", tera_money_filter);
    tera.register_filter("status_label", tera_status_filter);
}

/// Formats a monetary value to 2 decimal places. Amounts reach the template
/// either as JSON numbers or as decimal strings; both are accepted.
fn tera_money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let num = match value {
        tera::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        tera::Value::String(s) => s.parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(tera::Value::String(format!("{num:.2}")))
}

fn tera_status_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let raw = value.as_str().unwrap_or_default();
    Ok(tera::Value::String(status_label(raw).to_string()))
}

pub struct QuoteRenderer {
    tera: Tera,
    company: CompanyConfig,
    wkhtmltopdf_path: Option<String>,
}

impl QuoteRenderer {
    pub fn new(company: CompanyConfig) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);

        tera.add_raw_template(
            "internal.html.tera",
            include_str!("../../../templates/quotes/internal.html.tera"),
        )
        .map_err(|e| RenderError::Template(e.to_string()))?;
        tera.add_raw_template(
            "client.html.tera",
            include_str!("../../../templates/quotes/client.html.tera"),
        )
        .map_err(|e| RenderError::Template(e.to_string()))?;

        let wkhtmltopdf_path =
            which::which("wkhtmltopdf").ok().map(|p| p.to_string_lossy().to_string());

        if wkhtmltopdf_path.is_none() {
            warn!("wkhtmltopdf not found in PATH - documents will be emitted as HTML");
        }

        Ok(Self { tera, company, wkhtmltopdf_path })
    }

    /// Renders the document HTML. Read-only over the quote; the grand total
    /// printed is the stored one.
    pub fn render_html(&self, quote: &Quote, kind: DocumentKind) -> Result<String, RenderError> {
        let context = context::document_context(quote, kind, &self.company);
        self.tera
            .render(kind.template(), &context)
            .map_err(|e| RenderError::Template(e.to_string()))
    }

    /// Renders the document, converting to PDF when wkhtmltopdf is present.
    /// Conversion failures fall back to the HTML rendition instead of
    /// failing the export.
    pub async fn render(
        &self,
        quote: &Quote,
        kind: DocumentKind,
    ) -> Result<RenderedDocument, RenderError> {
        let html = self.render_html(quote, kind)?;

        if let Some(ref wkhtmltopdf) = self.wkhtmltopdf_path {
            match convert_html_to_pdf(&html, wkhtmltopdf).await {
                Ok(pdf_bytes) => return Ok(RenderedDocument::Pdf(pdf_bytes)),
                Err(e) => {
                    warn!(error = %e, "PDF conversion failed, falling back to HTML");
                }
            }
        }

        Ok(RenderedDocument::Html(html))
    }

    #[cfg(test)]
    fn without_pdf_conversion(mut self) -> Self {
        self.wkhtmltopdf_path = None;
        self
    }
}

/// Result of rendering a quote document.
pub enum RenderedDocument {
    Pdf(Vec<u8>),
    Html(String),
}

impl RenderedDocument {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf(_) => "pdf",
            Self::Html(_) => "html",
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Pdf(bytes) => bytes,
            Self::Html(html) => html.into_bytes(),
        }
    }
}

/// Convert HTML to PDF using wkhtmltopdf.
async fn convert_html_to_pdf(html: &str, wkhtmltopdf_path: &str) -> Result<Vec<u8>, RenderError> {
    let temp_dir = std::env::temp_dir();
    let html_path = temp_dir.join(format!("quote_{}.html", uuid::Uuid::new_v4()));
    let pdf_path = temp_dir.join(format!("quote_{}.pdf", uuid::Uuid::new_v4()));

    tokio::fs::write(&html_path, html).await?;

    let output = Command::new(wkhtmltopdf_path)
        .arg("--page-size")
        .arg("A4")
        .arg("--margin-top")
        .arg("10mm")
        .arg("--margin-bottom")
        .arg("10mm")
        .arg("--margin-left")
        .arg("10mm")
        .arg("--margin-right")
        .arg("10mm")
        .arg("--encoding")
        .arg("utf-8")
        .arg("--enable-local-file-access")
        .arg(&html_path)
        .arg(&pdf_path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(stderr = %stderr, "wkhtmltopdf failed");
        return Err(RenderError::Conversion(stderr.to_string()));
    }

    let pdf_bytes = tokio::fs::read(&pdf_path).await?;

    let _ = tokio::fs::remove_file(&html_path).await;
    let _ = tokio::fs::remove_file(&pdf_path).await;

    info!(size = pdf_bytes.len(), "PDF generated");

    Ok(pdf_bytes)
}

/// Check whether PDF conversion is available on this host.
pub fn is_wkhtmltopdf_available() -> bool {
    which::which("wkhtmltopdf").is_ok()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;

    use marcena_core::config::CompanyConfig;
    use marcena_core::domain::quote::{ExtraCost, Quote, QuoteLineItem, QuoteStatus};

    use super::{DocumentKind, QuoteRenderer, RenderedDocument};

    fn quote() -> Quote {
        Quote {
            id: "1718275800000".to_string(),
            created_at: DateTime::<Utc>::from_timestamp(1_718_275_800, 0).unwrap_or_default(),
            customer_name: "Helena Prado".to_string(),
            customer_phone: "11 98765-4321".to_string(),
            customer_email: "helena@example.com".to_string(),
            project_description: "Kitchen cabinets".to_string(),
            line_items: vec![QuoteLineItem {
                id: 1,
                name: "MDF Sheet".to_string(),
                unit_price: Decimal::from(500),
                quantity: 2,
            }],
            labor_fee: Decimal::from(300),
            extra_costs: vec![ExtraCost {
                description: "Delivery".to_string(),
                amount: Decimal::from(150),
            }],
            notes: "Standard terms".to_string(),
            total_amount: Decimal::from(1450),
            status: QuoteStatus::Pending,
        }
    }

    fn renderer() -> QuoteRenderer {
        QuoteRenderer::new(CompanyConfig::default()).expect("renderer")
    }

    #[test]
    fn internal_document_exposes_the_profit_line() {
        let html = renderer().render_html(&quote(), DocumentKind::Internal).expect("render");

        assert!(html.contains("Helena Prado"));
        assert!(html.contains("Labor (profit)"));
        assert!(html.contains("INTERNAL DOCUMENT"));
        assert!(html.contains("1450.00"));
    }

    #[test]
    fn client_document_hides_the_profit_framing() {
        let html = renderer().render_html(&quote(), DocumentKind::Client).expect("render");

        assert!(html.contains("Helena Prado"));
        assert!(!html.contains("profit"));
        assert!(!html.contains("INTERNAL DOCUMENT"));
        assert!(html.contains("1450.00"));
    }

    #[test]
    fn both_documents_print_the_stored_total() {
        let renderer = renderer();
        let mut record = quote();
        // The stored amount wins even if it disagrees with recomputation;
        // exports are read-only views.
        record.total_amount = Decimal::new(145099, 2);

        for kind in [DocumentKind::Internal, DocumentKind::Client] {
            let html = renderer.render_html(&record, kind).expect("render");
            assert!(html.contains("1450.99"));
        }
    }

    #[test]
    fn line_and_extra_rows_are_numbered_continuously() {
        let html = renderer().render_html(&quote(), DocumentKind::Client).expect("render");

        assert!(html.contains("Delivery (additional)"));
        assert!(html.contains("500.00"));
        assert!(html.contains("1000.00"));
    }

    #[tokio::test]
    async fn render_falls_back_to_html_without_wkhtmltopdf() {
        let renderer = renderer().without_pdf_conversion();

        let document = renderer.render(&quote(), DocumentKind::Client).await.expect("render");

        match document {
            RenderedDocument::Html(html) => assert!(html.contains("Helena Prado")),
            RenderedDocument::Pdf(_) => panic!("expected HTML fallback"),
        }
    }

    #[test]
    fn document_kind_parses_known_values_only() {
        assert_eq!(DocumentKind::parse("internal"), Some(DocumentKind::Internal));
        assert_eq!(DocumentKind::parse("client"), Some(DocumentKind::Client));
        assert_eq!(DocumentKind::parse("draft"), None);
    }
}
