use std::fs;

use camino::Utf8Path;
use serde::Serialize;

use crate::error::ReslinkError;

pub const DEFAULT_TABLE_NAME: &str = "data_table.txt";

pub const TABLE_HEADER: [&str; 9] = [
    "FILE_PATH",
    "UNIQUE_ID",
    "GENOME",
    "NAME",
    "BACKGROUND",
    "ENRICHED_REGION",
    "ENRICHED_MACS",
    "COLOR",
    "RAW",
];

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub file_path: String,
    pub unique_id: String,
    pub genome: String,
    pub name: String,
    pub background: String,
    pub enriched_region: String,
    pub enriched_macs: String,
    pub color: String,
    pub raw: String,
}

impl TableRow {
    fn fields(&self) -> [&str; 9] {
        [
            &self.file_path,
            &self.unique_id,
            &self.genome,
            &self.name,
            &self.background,
            &self.enriched_region,
            &self.enriched_macs,
            &self.color,
            &self.raw,
        ]
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct DataTable {
    rows: Vec<TableRow>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        out.push_str(&TABLE_HEADER.join("\t"));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.fields().join("\t"));
            out.push('\n');
        }
        out
    }

    /// Temp file in the destination directory, then rename over the target.
    pub fn write_to(&self, path: &Utf8Path) -> Result<(), ReslinkError> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
            _ => Utf8Path::new(".").to_path_buf(),
        };
        fs::create_dir_all(parent.as_std_path())
            .map_err(|err| ReslinkError::Filesystem(err.to_string()))?;

        let temp = tempfile::Builder::new()
            .prefix("reslink-table")
            .tempfile_in(parent.as_std_path())
            .map_err(|err| ReslinkError::Filesystem(err.to_string()))?;
        fs::write(temp.path(), self.to_tsv())
            .map_err(|err| ReslinkError::Filesystem(err.to_string()))?;
        if path.as_std_path().exists() {
            fs::remove_file(path.as_std_path())
                .map_err(|err| ReslinkError::Filesystem(err.to_string()))?;
        }
        temp.persist(path.as_std_path())
            .map_err(|err| ReslinkError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;

    use super::*;

    fn sample_row(id: &str) -> TableRow {
        TableRow {
            file_path: "out/bams/".to_string(),
            unique_id: id.to_string(),
            genome: "HG38".to_string(),
            name: "SAMPLE A".to_string(),
            background: "NONE".to_string(),
            enriched_region: "NONE".to_string(),
            enriched_macs: "NONE".to_string(),
            color: "0,0,0".to_string(),
            raw: String::new(),
        }
    }

    #[test]
    fn tsv_shape() {
        let mut table = DataTable::new();
        table.push(sample_row("1"));
        table.push(sample_row("2"));

        let tsv = table.to_tsv();
        let lines: Vec<&str> = tsv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], TABLE_HEADER.join("\t"));
        assert_eq!(lines[1].split('\t').count(), 9);
        assert!(lines[1].starts_with("out/bams/\t1\tHG38"));
        assert!(lines[2].ends_with("0,0,0\t"));
    }

    #[test]
    fn write_replaces_existing_file() {
        let temp = tempfile::tempdir().unwrap();
        let path =
            Utf8PathBuf::from_path_buf(temp.path().join("data_table.txt")).unwrap();
        std::fs::write(path.as_std_path(), "stale").unwrap();

        let mut table = DataTable::new();
        table.push(sample_row("1"));
        table.write_to(&path).unwrap();

        let written = std::fs::read_to_string(path.as_std_path()).unwrap();
        assert!(written.starts_with("FILE_PATH\t"));
        assert_eq!(written.lines().count(), 2);
    }

    #[test]
    fn empty_table_is_header_only() {
        let table = DataTable::new();
        assert!(table.is_empty());
        assert_eq!(table.to_tsv(), format!("{}\n", TABLE_HEADER.join("\t")));
    }
}
