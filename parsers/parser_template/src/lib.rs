//! Reads the spreadsheet template that declares which fields each logical
//! file must carry.
//!
//! Every sheet named in [`SHEET_FILE_TABLE`] maps to one logical CSV file. A
//! column is required when at least one data row under its header is filled.

mod fields;
mod reader;

pub use fields::{FileRequirement, RequiredFieldsMap};
pub use reader::{analyze_template, required_columns, TemplateAnalysis};

use std::path::PathBuf;
use thiserror::Error;

/// Sheet name → logical file name. Sheet names match case-sensitively.
pub const SHEET_FILE_TABLE: [(&str, &str); 18] = [
    ("Agendamentos", "agend.csv"),
    ("Veículos", "Veiculos.csv"),
    ("Produtos", "produtos.csv"),
    ("Pátios", "patios.csv"),
    ("Ilhas", "ilhas.csv"),
    ("Baias", "baias.csv"),
    ("Braços-Produtos", "bracos-produtos.csv"),
    ("Grades", "grades.csv"),
    ("Grades-Clientes", "grades-clientes.csv"),
    ("Grades-Produtos", "grades-produtos.csv"),
    ("Grades-Clientes-Produtos", "grades-clientes-produtos.csv"),
    ("Grades-Cotas-Clientes", "grades-cotas-clientes.csv"),
    ("Grades-Cotas-Produtos", "grades-cotas-produtos.csv"),
    ("Grades-Fixação-Horários", "grades-fixacao-horarios.csv"),
    ("Horários-Pátios", "horarios-patios.csv"),
    ("Produtos-Agend", "produtos-agend.csv"),
    ("EV", "EV.csv"),
    ("Vazão-Ilhas", "vazao-ilhas.csv"),
];

/// Logical file holding island records
pub const ISLANDS_FILE: &str = "ilhas.csv";

/// Logical file derived from the islands flow-rate column
pub const ISLAND_FLOW_FILE: &str = "vazao-ilhas.csv";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot open template {} as a spreadsheet: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
}
