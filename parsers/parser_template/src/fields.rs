use serde::{Deserialize, Serialize};

use crate::SHEET_FILE_TABLE;

/// Required fields of one logical file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRequirement {
    pub file_name: String,
    /// Ordered as the columns appear in the template sheet
    pub fields: Vec<String>,
}

/// Logical file name → ordered required fields.
///
/// Built once per template and read-only afterwards. An empty field list means
/// the file is still expected but no header is enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredFieldsMap {
    entries: Vec<FileRequirement>,
}

impl RequiredFieldsMap {
    /// Every logical file of the sheet table with no fields enforced
    pub fn with_known_files() -> Self {
        Self {
            entries: SHEET_FILE_TABLE
                .iter()
                .map(|(_, file)| FileRequirement {
                    file_name: file.to_string(),
                    fields: Vec::new(),
                })
                .collect(),
        }
    }

    /// Build a map from explicit pairs, keeping their order
    pub fn from_pairs<I, F, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, Vec<S>)>,
        F: Into<String>,
        S: Into<String>,
    {
        let mut map = Self::default();
        for (file, fields) in pairs {
            map.set(file.into(), fields.into_iter().map(Into::into).collect());
        }
        map
    }

    pub(crate) fn set(&mut self, file_name: String, fields: Vec<String>) {
        match self.entries.iter_mut().find(|entry| entry.file_name == file_name) {
            Some(entry) => entry.fields = fields,
            None => self.entries.push(FileRequirement { file_name, fields }),
        }
    }

    /// Required fields of `file_name`, `None` if the file is not part of the map
    pub fn fields(&self, file_name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| entry.file_name == file_name)
            .map(|entry| entry.fields.as_slice())
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.fields(file_name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|entry| (entry.file_name.as_str(), entry.fields.as_slice()))
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.file_name.as_str())
    }

    /// Number of logical files
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_fields(&self) -> usize {
        self.entries.iter().map(|entry| entry.fields.len()).sum()
    }

    pub fn files_with_fields(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.fields.is_empty()).count()
    }
}
