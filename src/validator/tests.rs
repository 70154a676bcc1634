use std::fs;

use parser_csv::{read_headers, CsvTable, Separator};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;
use crate::config::{ProcessingMode, ValidatorConfig};
use crate::context::RunContext;
use crate::types::{BaseStatus, FileStatistics, RequiredFieldsMap};

const ISLANDS: &str = "Codigo,DescricaoPatio,Capacidade,VazaoMaxima(p95)\n1,Norte,10,55.5\n2,Sul,12,60\n3,Leste,,70\n";

struct Fixture {
    _dir: TempDir,
    data: std::path::PathBuf,
    output: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        let output = dir.path().join("output");
        fs::create_dir_all(&data).unwrap();
        Self { _dir: dir, data, output }
    }

    fn write(&self, name: &str, content: impl AsRef<[u8]>) {
        fs::write(self.data.join(name), content).unwrap();
    }

    fn context(&self, required: RequiredFieldsMap, mode: ProcessingMode) -> RunContext {
        let config = ValidatorConfig {
            data_dir: self.data.clone(),
            output_dir: self.output.clone(),
            mode,
            ..ValidatorConfig::default()
        };
        RunContext::new(config, required)
    }

    fn copy_of(&self, base: &str, file: &str) -> std::path::PathBuf {
        self.output.join(base).join("input").join(file)
    }
}

fn agend_only() -> RequiredFieldsMap {
    RequiredFieldsMap::from_pairs([("agend.csv", vec!["DataAgendamento", "Placa"])])
}

#[test_log::test]
fn test_exact_fields_make_base_valid() {
    let fx = Fixture::new();
    fx.write("B1-agend.csv", "DataAgendamento,Placa,Extra\n2025-06-06,ABC1234,x\n");
    fx.write("B1-Veiculos.csv", "Placa,Modelo\nABC1234,Truck\n");
    let required = RequiredFieldsMap::from_pairs([
        ("agend.csv", vec!["DataAgendamento", "Placa"]),
        ("Veiculos.csv", vec!["Placa"]),
    ]);

    let result = validate_base(&fx.context(required, ProcessingMode::Quick), "B1");

    assert_eq!(result.files_valid, result.total_files);
    assert_eq!(result.files_processed, 2);
    assert!(result.problems.is_empty());
    assert!(result.missing_fields.is_empty());
    assert_eq!(result.status(), BaseStatus::Success);
    assert!(fx.copy_of("B1", "agend.csv").is_file());
}

#[test_log::test]
fn test_spacing_variant_is_not_missing() {
    let fx = Fixture::new();
    fx.write("B1-agend.csv", "Data Agendamento,Placa\n2025-06-06,ABC1234\n");

    let result = validate_base(&fx.context(agend_only(), ProcessingMode::Quick), "B1");

    assert!(result.missing_fields.is_empty());
    assert_eq!(result.files_valid, 1);
}

#[test]
fn test_missing_field_is_recorded() {
    let fx = Fixture::new();
    fx.write("B1-agend.csv", "DataAgendamento,PlacaCavalo\n2025-06-06,ABC1234\n");

    let result = validate_base(&fx.context(agend_only(), ProcessingMode::Quick), "B1");

    assert_eq!(result.files_processed, 1);
    assert_eq!(result.files_valid, 0);
    assert_eq!(result.missing_fields["agend.csv"], vec!["Placa".to_string()]);
    assert_eq!(result.status(), BaseStatus::Partial);
}

#[test]
fn test_missing_file_is_a_problem_not_processed() {
    let fx = Fixture::new();
    fx.write("B1-agend.csv", "DataAgendamento,Placa\n");
    let required = RequiredFieldsMap::from_pairs([
        ("agend.csv", vec!["DataAgendamento", "Placa"]),
        ("ilhas.csv", vec![]),
    ]);

    let result = validate_base(&fx.context(required, ProcessingMode::Quick), "B1");

    assert_eq!(result.total_files, 2);
    assert_eq!(result.files_processed, 1);
    assert_eq!(result.files_valid, 1);
    assert_eq!(result.problems, vec!["file not found: ilhas.csv".to_string()]);
}

#[test]
fn test_nothing_found_is_failure() {
    let fx = Fixture::new();

    let result = validate_base(&fx.context(agend_only(), ProcessingMode::Quick), "B1");

    assert_eq!(result.files_processed, 0);
    assert_eq!(result.status(), BaseStatus::Failure);
}

#[test]
fn test_empty_file_is_a_problem_and_base_continues() {
    let fx = Fixture::new();
    fx.write("B1-agend.csv", "");
    fx.write("B1-Veiculos.csv", "Placa\nABC1234\n");
    let required = RequiredFieldsMap::from_pairs([
        ("agend.csv", vec!["DataAgendamento"]),
        ("Veiculos.csv", vec!["Placa"]),
    ]);

    let result = validate_base(&fx.context(required, ProcessingMode::Quick), "B1");

    assert_eq!(result.files_processed, 1);
    assert_eq!(result.files_valid, 1);
    assert_eq!(result.problems.len(), 1);
    assert!(result.problems[0].contains("agend.csv"), "{:?}", result.problems);
}

#[test]
fn test_empty_field_list_is_valid() {
    let fx = Fixture::new();
    fx.write("B1-produtos.csv", "anything\n1\n");
    let required = RequiredFieldsMap::from_pairs([("produtos.csv", Vec::<String>::new())]);

    let result = validate_base(&fx.context(required, ProcessingMode::Quick), "B1");

    assert_eq!(result.files_valid, 1);
}

#[test_log::test]
fn test_islands_flow_rate_is_split() {
    let fx = Fixture::new();
    fs::create_dir_all(fx.data.join("B1")).unwrap();
    fs::write(fx.data.join("B1").join("ilhas.csv"), ISLANDS).unwrap();
    let required = RequiredFieldsMap::from_pairs([("ilhas.csv", vec!["Codigo"])]);

    let result = validate_base(&fx.context(required, ProcessingMode::Quick), "B1");
    assert_eq!(result.files_valid, 1);

    let derived = CsvTable::read(&fx.copy_of("B1", "vazao-ilhas.csv"), Separator::default()).unwrap();
    assert_eq!(derived.headers, vec!["Codigo", "DescricaoPatio", "VazaoMaxima(p95)"]);
    assert_eq!(derived.rows.len(), 3);
    assert_eq!(derived.rows[2], vec!["3", "Leste", "70"]);

    let islands = read_headers(&fx.copy_of("B1", "ilhas.csv"), Separator::default()).unwrap();
    assert_eq!(islands, vec!["Codigo", "DescricaoPatio", "Capacidade"]);
}

#[test]
fn test_derived_flow_rates_win_over_source_file() {
    let fx = Fixture::new();
    fx.write("B1-ilhas.csv", ISLANDS);
    fx.write("B1-vazao-ilhas.csv", "Outro\nx\n");
    let required = RequiredFieldsMap::from_pairs([
        ("ilhas.csv", vec!["Codigo"]),
        ("vazao-ilhas.csv", vec!["Codigo", "VazaoMaxima(p95)"]),
    ]);

    let result = validate_base(&fx.context(required, ProcessingMode::Quick), "B1");

    assert_eq!(result.files_processed, 2);
    assert_eq!(result.files_valid, 2);
    let headers = read_headers(&fx.copy_of("B1", "vazao-ilhas.csv"), Separator::default()).unwrap();
    assert_eq!(headers, vec!["Codigo", "DescricaoPatio", "VazaoMaxima(p95)"]);
}

#[test]
fn test_islands_without_flow_rate_are_left_alone() {
    let fx = Fixture::new();
    fx.write("B1-ilhas.csv", "Codigo,DescricaoPatio\n1,Norte\n");
    let required = RequiredFieldsMap::from_pairs([("ilhas.csv", vec!["Codigo"])]);

    let result = validate_base(&fx.context(required, ProcessingMode::Quick), "B1");

    assert_eq!(result.files_valid, 1);
    assert!(!fx.copy_of("B1", "vazao-ilhas.csv").exists());
    assert_eq!(fs::read(fx.copy_of("B1", "ilhas.csv")).unwrap(), b"Codigo,DescricaoPatio\n1,Norte\n");
}

#[test]
fn test_split_flow_rates_requires_identifying_columns() {
    let mut table = CsvTable::parse("Codigo,VazaoMaxima(p95)\n1,5\n", b',', parser_csv::Encoding::for_label(b"utf-8").unwrap()).unwrap();
    let before = table.clone();

    assert!(split_flow_rates(&mut table).is_err());
    assert_eq!(table, before);
}

#[test]
fn test_copy_keeps_producer_encoding() {
    let fx = Fixture::new();
    // windows-1252 content
    let mut bytes = b"DataAgendamento,Placa,Descri\xe7\xe3o\n".to_vec();
    for _ in 0..50 {
        bytes.extend_from_slice(b"2025-06-06,ABC1234,Caminh\xe3o ba\xfa refrigerado\n");
    }
    fx.write("B1-agend.csv", &bytes);

    let result = validate_base(&fx.context(agend_only(), ProcessingMode::Quick), "B1");

    assert_eq!(result.files_valid, 1);
    assert_eq!(fs::read(fx.copy_of("B1", "agend.csv")).unwrap(), bytes);
}

#[test]
fn test_rerun_overwrites_output() {
    let fx = Fixture::new();
    fx.write("B1-agend.csv", "DataAgendamento,Placa\n");
    let ctx = fx.context(agend_only(), ProcessingMode::Quick);
    let validator = BaseValidator::new(&ctx);

    validator.validate("B1");
    fs::write(fx.copy_of("B1", "stale.csv"), "old").unwrap();
    let result = validator.validate_all(&["B1".to_string()]).remove(0);

    assert_eq!(result.files_valid, 1);
    assert!(!fx.copy_of("B1", "stale.csv").exists());
}

#[test]
fn test_complete_mode_adds_statistics() {
    let fx = Fixture::new();
    fx.write("B1-agend.csv", "DataAgendamento,Placa\n2025-06-06,\n2025-06-07,XYZ9876\n");

    let quick = validate_base(&fx.context(agend_only(), ProcessingMode::Quick), "B1");
    assert!(quick.statistics.is_none());

    let complete = validate_base(&fx.context(agend_only(), ProcessingMode::Complete), "B1");
    let statistics = complete.statistics.expect("complete mode statistics");

    match &statistics.files["agend.csv"] {
        FileStatistics::Computed(stats) => {
            assert_eq!(stats.rows, 2);
            assert_eq!(stats.columns, 2);
            assert_eq!(stats.empty_cells, 1);
            assert_eq!(stats.fill_rate, 75.0);
        }
        other => panic!("unexpected statistics {:?}", other),
    }
    assert_eq!(complete.files_valid, quick.files_valid);
}

#[test]
fn test_statistics_mark_unreadable_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("empty.csv"), "").unwrap();

    let statistics = compute_statistics(dir.path(), Separator::default());

    assert!(matches!(statistics.files["empty.csv"], FileStatistics::Error { .. }));
}

#[test]
fn test_missing_fields_matching() {
    let headers: Vec<String> = ["Data Agendamento", "PLACA", "Observação"].iter().map(|s| s.to_string()).collect();
    let required: Vec<String> = ["DataAgendamento", "Placa", "Observacao", "Quantidade"].iter().map(|s| s.to_string()).collect();

    assert_eq!(missing_fields(&required, &headers), vec!["Quantidade".to_string()]);
}

#[test]
fn test_parent_dir_base_never_touches_outside_output() {
    let fx = Fixture::new();
    for i in 0..5 {
        fx.write(&format!("..-f{}.csv", i), "DataAgendamento,Placa\n");
    }
    let sibling = fx.output.parent().unwrap().join("input");
    fs::create_dir_all(&fx.output).unwrap();
    fs::create_dir_all(&sibling).unwrap();
    fs::write(sibling.join("precious.txt"), "keep").unwrap();

    let result = validate_base(&fx.context(agend_only(), ProcessingMode::Quick), "..");

    assert!(sibling.join("precious.txt").is_file());
    assert_eq!(result.status(), BaseStatus::Failure);
    assert_eq!(result.problems, vec!["invalid base name: ..".to_string()]);
}
