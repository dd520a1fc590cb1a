use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt::Write;

/// Everything a communication document needs, already resolved from storage
#[derive(Debug, Clone)]
pub struct CommunicationDocument {
    /// Base name of the produced file, without extension
    pub reference: String,
    pub client_name: String,
    pub generated_at: DateTime<Utc>,
    pub notes: String,
    pub treatments: Vec<DocumentTreatment>,
}

#[derive(Debug, Clone)]
pub struct DocumentTreatment {
    pub id: uuid::Uuid,
    pub scope_label: String,
    pub area_hectares: Decimal,
    pub planned_date: Option<NaiveDate>,
    pub contractor: Option<String>,
    pub notes: String,
    pub products: Vec<DocumentProduct>,
}

#[derive(Debug, Clone)]
pub struct DocumentProduct {
    pub name: String,
    pub unit: String,
    pub dosage_per_hectare: Decimal,
    pub total_quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &CommunicationDocument) -> Result<RenderedDocument, String>;
}

/// Renders a plain-text summary, one block per treatment
pub struct PlainTextRenderer;

impl PlainTextRenderer {
    fn write_document(document: &CommunicationDocument) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        writeln!(out, "TREATMENT COMMUNICATION")?;
        writeln!(out, "Client: {}", document.client_name)?;
        writeln!(
            out,
            "Generated: {}",
            document.generated_at.format("%d/%m/%Y %H:%M")
        )?;

        for (index, treatment) in document.treatments.iter().enumerate() {
            writeln!(out)?;
            writeln!(out, "{}. {}", index + 1, treatment.scope_label)?;
            writeln!(out, "   Area: {:.2} ha", treatment.area_hectares.round_dp(2))?;
            if let Some(date) = treatment.planned_date {
                writeln!(out, "   Planned: {}", date.format("%d/%m/%Y"))?;
            }
            if let Some(contractor) = &treatment.contractor {
                writeln!(out, "   Contractor: {contractor}")?;
            }
            for product in &treatment.products {
                writeln!(
                    out,
                    "   - {}: {} {}/ha, total {:.2} {}",
                    product.name,
                    product.dosage_per_hectare.normalize(),
                    product.unit,
                    product.total_quantity.round_dp(2),
                    product.unit
                )?;
            }
            if !treatment.notes.is_empty() {
                writeln!(out, "   Notes: {}", treatment.notes)?;
            }
        }

        if !document.notes.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", document.notes)?;
        }
        Ok(out)
    }
}

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, document: &CommunicationDocument) -> Result<RenderedDocument, String> {
        let text = Self::write_document(document).map_err(|e| e.to_string())?;
        Ok(RenderedDocument {
            filename: format!("{}.txt", document.reference),
            content_type: "text/plain".to_string(),
            bytes: text.into_bytes(),
        })
    }
}
