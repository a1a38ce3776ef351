// src/services/pdf_service.rs

use genpdf::{Element, elements, style};

use crate::{
    common::error::AppError,
    models::{rma::RmaCase, settings::CompanyInfo},
};

const TERMS: [&str; 5] = [
    "1. All returns must be in original packaging with all accessories.",
    "2. Damaged items due to customer mishandling may not be eligible for replacement.",
    "3. Processing time is typically 7-10 business days from receipt.",
    "4. Customer is responsible for return shipping costs unless otherwise specified.",
    "5. This RMA form must be included with your return shipment.",
];

/// Gera o documento imprimível de um RMA (impressão e download, sem
/// nenhuma lógica de negócio).
#[derive(Clone)]
pub struct PdfService {
    font_dir: String,
}

impl PdfService {
    pub fn new(font_dir: String) -> Self {
        Self { font_dir }
    }

    pub fn render_case(&self, case: &RmaCase, company: &CompanyInfo) -> Result<Vec<u8>, AppError> {
        // Carrega a fonte da pasta configurada (padrão "./fonts")
        let font_family = genpdf::fonts::from_files(&self.font_dir, "Roboto", None)
            .map_err(|e| AppError::PdfError(format!("fonte não encontrada em '{}': {e}", self.font_dir)))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("RMA {}", case.id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        let bold = style::Style::new().bold();

        // --- CABEÇALHO DA EMPRESA ---
        let company_name = if company.name.is_empty() { "RMA Management" } else { &company.name };
        doc.push(
            elements::Paragraph::new(company_name)
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        for line in [&company.address, &company.phone, &company.email, &company.website] {
            if !line.is_empty() {
                doc.push(elements::Paragraph::new(line.as_str()).styled(style::Style::new().with_font_size(10)));
            }
        }
        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new("Return Merchandise Authorization")
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!("RMA ID: {}", case.id)));
        doc.push(elements::Paragraph::new(format!(
            "Status: {}",
            case.status.label().to_uppercase()
        )));
        let created = case
            .created_at
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        doc.push(elements::Paragraph::new(format!("Created: {created}")));
        doc.push(elements::Break::new(1.5));

        // --- BLOCO DO CLIENTE ---
        doc.push(elements::Paragraph::new("Customer Information").styled(bold));
        doc.push(elements::Paragraph::new(format!("Company: {}", case.contact_company)));
        if !case.contact_name.is_empty() {
            doc.push(elements::Paragraph::new(format!("Contact Name: {}", case.contact_name)));
        }
        doc.push(elements::Paragraph::new(format!("Email: {}", case.contact_email)));
        doc.push(elements::Paragraph::new(format!("Phone: {}", case.contact_phone)));
        doc.push(elements::Break::new(1.5));

        // --- TABELA DE PRODUTOS ---
        doc.push(elements::Paragraph::new("Product Details").styled(bold));
        let mut table = elements::TableLayout::new(vec![2, 2, 2, 2, 3]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        table
            .row()
            .element(elements::Paragraph::new("Brand").styled(bold))
            .element(elements::Paragraph::new("Model").styled(bold))
            .element(elements::Paragraph::new("Serial").styled(bold))
            .element(elements::Paragraph::new("Status").styled(bold))
            .element(elements::Paragraph::new("Problem").styled(bold))
            .push()
            .map_err(|e| AppError::PdfError(e.to_string()))?;

        for product in &case.products {
            table
                .row()
                .element(elements::Paragraph::new(product.brand.as_str()))
                .element(elements::Paragraph::new(product.model_number.as_str()))
                .element(elements::Paragraph::new(product.serial_number.as_str()))
                .element(elements::Paragraph::new(product.status.label()))
                .element(elements::Paragraph::new(product.problems_reported.as_str()))
                .push()
                .map_err(|e| AppError::PdfError(e.to_string()))?;
        }
        doc.push(table);
        doc.push(elements::Break::new(1.5));

        if !case.comments.is_empty() {
            doc.push(elements::Paragraph::new("Additional Comments").styled(bold));
            doc.push(elements::Paragraph::new(case.comments.as_str()));
            doc.push(elements::Break::new(1.0));
        }

        // --- CAMPOS PERSONALIZADOS ---
        let has_custom = case.products.iter().any(|p| !p.custom_fields.is_empty());
        if has_custom {
            doc.push(elements::Paragraph::new("Additional Information").styled(bold));
            for product in &case.products {
                for (key, value) in &product.custom_fields {
                    doc.push(elements::Paragraph::new(format!("{key}: {}", value.display())));
                }
            }
            doc.push(elements::Break::new(1.0));
        }

        // --- TERMOS FIXOS ---
        doc.push(elements::Paragraph::new("Terms and Conditions:").styled(bold));
        for term in TERMS {
            doc.push(elements::Paragraph::new(term).styled(style::Style::new().with_font_size(9)));
        }
        doc.push(elements::Break::new(2.0));

        doc.push(elements::Paragraph::new("Customer Signature: ____________________    Authorized by: ____________________"));
        doc.push(elements::Break::new(1.0));
        doc.push(
            elements::Paragraph::new("This is an automatically generated document. Thank you for your business.")
                .styled(style::Style::new().with_font_size(9)),
        );
        if !company.email.is_empty() || !company.phone.is_empty() {
            doc.push(
                elements::Paragraph::new(format!(
                    "For any queries, please contact {} or call {}",
                    company.email, company.phone
                ))
                .styled(style::Style::new().with_font_size(9)),
            );
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::PdfError(e.to_string()))?;
        Ok(buffer)
    }
}
