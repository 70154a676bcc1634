use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use log::{debug, info, warn};

use crate::{RequiredFieldsMap, TemplateError, SHEET_FILE_TABLE};

/// Required fields plus the non-fatal issues met while reading the template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateAnalysis {
    pub required_fields: RequiredFieldsMap,
    /// One entry per sheet missing or unreadable
    pub warnings: Vec<String>,
}

/// Read the template at `path` into a [`RequiredFieldsMap`].
///
/// Only a missing or unopenable workbook is an error. Missing or unreadable
/// sheets leave their file with an empty field list and add a warning.
pub fn analyze_template(path: &Path) -> Result<TemplateAnalysis, TemplateError> {
    if !path.exists() {
        return Err(TemplateError::NotFound(path.to_path_buf()));
    }

    info!("Analyzing template {}", path.display());

    let mut workbook = open_workbook_auto(path).map_err(|source| TemplateError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet_names = workbook.sheet_names();
    let mut required_fields = RequiredFieldsMap::with_known_files();
    let mut warnings = Vec::new();

    for (sheet, file) in SHEET_FILE_TABLE {
        if !sheet_names.iter().any(|name| name == sheet) {
            warn!("Sheet '{}' not found in template", sheet);
            warnings.push(format!("Sheet '{}' not found in template", sheet));
            continue;
        }

        match workbook.worksheet_range(sheet) {
            Ok(range) => {
                let fields = required_columns(&range);
                info!("{}: {} required fields", file, fields.len());
                required_fields.set(file.to_string(), fields);
            }
            Err(e) => {
                warn!("Sheet '{}' could not be read: {}", sheet, e);
                warnings.push(format!("Sheet '{}' could not be read: {}", sheet, e));
            }
        }
    }

    info!(
        "Template analyzed: {} required fields in {} files ({} files mapped)",
        required_fields.total_fields(),
        required_fields.files_with_fields(),
        required_fields.len()
    );

    Ok(TemplateAnalysis {
        required_fields,
        warnings,
    })
}

/// Header names of every column that is neither all-null nor all-empty-string.
///
/// The first row is the header; column order is preserved. A column mixing
/// null and empty-string cells is kept. Cells past a short row count as null.
pub fn required_columns(range: &Range<Data>) -> Vec<String> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let data: Vec<&[Data]> = rows.collect();

    header
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            let mut cells = data.iter().map(|row| row.get(*index).unwrap_or(&Data::Empty));
            let all_null = cells.clone().all(|cell| matches!(cell, Data::Empty));
            let all_empty_string = cells.all(|cell| matches!(cell, Data::String(value) if value.is_empty()));
            !all_null && !all_empty_string
        })
        .map(|(index, cell)| {
            let name = header_name(index, cell);
            debug!("Required column {}: {}", index, name);
            name
        })
        .collect()
}

fn header_name(index: usize, cell: &Data) -> String {
    match cell {
        Data::Empty => format!("Unnamed: {}", index),
        Data::String(value) => value.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::Workbook;
    use std::fs;
    use tempfile::TempDir;

    fn write_template(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("template.xlsx");
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet().set_name("Agendamentos").unwrap();
        sheet.write_string(0, 0, "DataAgendamento").unwrap();
        sheet.write_string(0, 1, "Placa").unwrap();
        sheet.write_string(0, 2, "Observacao").unwrap();
        sheet.write_string(0, 3, "Quantidade").unwrap();
        sheet.write_string(1, 0, "2025-06-06").unwrap();
        sheet.write_string(1, 1, "ABC1234").unwrap();
        sheet.write_number(2, 3, 12.0).unwrap();

        let sheet = workbook.add_worksheet().set_name("Veículos").unwrap();
        sheet.write_string(0, 0, "Placa").unwrap();
        sheet.write_string(0, 1, "Modelo").unwrap();

        let sheet = workbook.add_worksheet().set_name("Notas").unwrap();
        sheet.write_string(0, 0, "Livre").unwrap();
        sheet.write_string(1, 0, "ignorado").unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_analyze_template_collects_filled_columns() {
        let dir = TempDir::new().unwrap();
        let analysis = analyze_template(&write_template(&dir)).unwrap();
        let map = &analysis.required_fields;

        assert_eq!(map.len(), SHEET_FILE_TABLE.len());
        assert_eq!(
            map.fields("agend.csv").unwrap(),
            &["DataAgendamento".to_string(), "Placa".to_string(), "Quantidade".to_string()]
        );
        assert_eq!(map.fields("Veiculos.csv").unwrap().len(), 0);
        assert_eq!(map.fields("ilhas.csv").unwrap().len(), 0);
    }

    #[test]
    fn test_missing_sheets_are_warnings() {
        let dir = TempDir::new().unwrap();
        let analysis = analyze_template(&write_template(&dir)).unwrap();

        assert_eq!(analysis.warnings.len(), SHEET_FILE_TABLE.len() - 2);
        assert!(analysis.warnings.iter().any(|w| w.contains("'Ilhas'")));
        assert!(!analysis.warnings.iter().any(|w| w.contains("'Veículos'")));
    }

    #[test]
    fn test_mixed_null_and_empty_string_column_is_required() {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("OnlyNull".into()));
        range.set_value((0, 1), Data::String("OnlyEmptyString".into()));
        range.set_value((0, 2), Data::String("Mixed".into()));
        range.set_value((1, 1), Data::String(String::new()));
        range.set_value((2, 1), Data::String(String::new()));
        range.set_value((1, 2), Data::String(String::new()));

        assert_eq!(required_columns(&range), vec!["Mixed".to_string()]);
    }

    #[test]
    fn test_header_only_sheet_has_no_required_columns() {
        let mut range = Range::new((0, 0), (0, 1));
        range.set_value((0, 0), Data::String("Placa".into()));
        range.set_value((0, 1), Data::String("Modelo".into()));

        assert!(required_columns(&range).is_empty());
    }

    #[test]
    fn test_missing_template_is_error() {
        let dir = TempDir::new().unwrap();
        let err = analyze_template(&dir.path().join("absent.xlsx")).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(_)));
    }

    #[test]
    fn test_unreadable_template_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, "not a spreadsheet").unwrap();

        let err = analyze_template(&path).unwrap_err();
        assert!(matches!(err, TemplateError::Open { .. }));
    }
}
