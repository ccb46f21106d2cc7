use super::tables::ReportDocument;

/// Output backend for report documents. Layout and pagination belong to the backend.
pub trait TableRenderer {
    type Output;

    fn render(&self, document: &ReportDocument) -> Result<Self::Output, ReportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush csv output: {0}")]
    Flush(String),
    #[error("rendered report is not valid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Flat CSV rendering: the title line, then each table's caption, head, body and foot.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRenderer;

impl TableRenderer for CsvRenderer {
    type Output = String;

    fn render(&self, document: &ReportDocument) -> Result<String, ReportError> {
        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record([document.title.as_str()])?;
        for table in &document.tables {
            if let Some(caption) = &table.caption {
                writer.write_record([caption.as_str()])?;
            }
            writer.write_record(&table.head)?;
            for row in &table.body {
                writer.write_record(row)?;
            }
            if let Some(foot) = &table.foot {
                writer.write_record(foot)?;
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| ReportError::Flush(err.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::report::tables::ReportTable;

    #[test]
    fn csv_output_quotes_fields_and_keeps_table_order() {
        let document = ReportDocument {
            title: "Yearly Budget Summary 2024".to_string(),
            tables: vec![ReportTable {
                caption: None,
                head: vec!["Centre".to_string(), "Budget".to_string()],
                body: vec![vec!["EMAS".to_string(), "1,000".to_string()]],
                foot: Some(vec!["Total".to_string(), "1,000".to_string()]),
            }],
        };

        let csv = CsvRenderer.render(&document).expect("renders");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Yearly Budget Summary 2024",
                "Centre,Budget",
                "EMAS,\"1,000\"",
                "Total,\"1,000\"",
            ]
        );
    }
}
