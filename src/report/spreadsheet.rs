use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};

use crate::analyzer::ColumnObservation;
use crate::fields::similar_strict;
use crate::types::{Inconsistency, RequiredFieldsMap};

/// How a required field shows up in one base's copy of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPresence {
    /// Spelled exactly as required
    Exact,
    /// Strictly similar spelling
    Variant,
    /// Absent, or the file itself is missing or unreadable
    Missing,
}

impl HeaderPresence {
    pub fn label(self) -> &'static str {
        match self {
            HeaderPresence::Exact => "OK",
            HeaderPresence::Variant => "VARIANT",
            HeaderPresence::Missing => "MISSING",
        }
    }
}

pub fn header_presence(observation: &ColumnObservation, file_name: &str, field: &str, base: &str) -> HeaderPresence {
    let Some(columns) = observation.get(file_name) else {
        return HeaderPresence::Missing;
    };

    if columns.get(field).is_some_and(|bases| bases.contains(base)) {
        return HeaderPresence::Exact;
    }

    let variant = columns
        .iter()
        .any(|(column, bases)| bases.contains(base) && similar_strict(column, field));
    if variant {
        HeaderPresence::Variant
    } else {
        HeaderPresence::Missing
    }
}

fn header_format() -> Format {
    Format::new().set_bold().set_background_color(Color::RGB(0xD9E1F2))
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    let format = header_format();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &format)?;
    }
    Ok(())
}

/// One row per (file, required field), one column per base
pub fn write_required_fields_workbook(
    path: &Path,
    required: &RequiredFieldsMap,
    bases: &[String],
    observation: &ColumnObservation,
) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Required fields")?;

    let mut headers = vec!["File", "Field", "Required"];
    headers.extend(bases.iter().map(String::as_str));
    write_headers(sheet, &headers)?;

    let missing_format = Format::new().set_font_color(Color::Red);
    let mut row = 1u32;
    for (file_name, fields) in required.iter() {
        for field in fields {
            sheet.write_string(row, 0, file_name)?;
            sheet.write_string(row, 1, field)?;
            sheet.write_string(row, 2, "X")?;

            for (index, base) in bases.iter().enumerate() {
                let col = 3 + index as u16;
                let presence = header_presence(observation, file_name, field, base);
                if presence == HeaderPresence::Missing {
                    sheet.write_string_with_format(row, col, presence.label(), &missing_format)?;
                } else {
                    sheet.write_string(row, col, presence.label())?;
                }
            }
            row += 1;
        }
    }

    sheet.autofit();
    workbook
        .save(path)
        .with_context(|| format!("Failed to save {}", path.display()))?;

    info!("Required fields table written to {}", path.display());
    Ok(())
}

/// One row per (file, required field, variant)
pub fn write_inconsistencies_workbook(path: &Path, inconsistencies: &[Inconsistency]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Naming inconsistencies")?;

    write_headers(
        sheet,
        &["File", "Required field", "Variant found", "Bases", "Kind", "Recommendation"],
    )?;

    let mut row = 1u32;
    for inconsistency in inconsistencies {
        for variant in &inconsistency.variants {
            sheet.write_string(row, 0, &inconsistency.file_name)?;
            sheet.write_string(row, 1, &inconsistency.required_field)?;
            sheet.write_string(row, 2, &variant.name)?;
            sheet.write_string(row, 3, variant.bases.join(", "))?;
            sheet.write_string(row, 4, variant.kind.to_string())?;
            sheet.write_string(row, 5, format!("Standardize to: {}", inconsistency.required_field))?;
            row += 1;
        }
    }

    sheet.autofit();
    workbook
        .save(path)
        .with_context(|| format!("Failed to save {}", path.display()))?;

    info!("Naming inconsistencies written to {}", path.display());
    Ok(())
}
