//! File formats for import and export

use chrono::NaiveDate;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Csv,
}

impl DataFormat {
    /// Guesses the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// `books_export_<date>.<ext>`
    pub fn export_file_name(&self, date: NaiveDate) -> String {
        format!("books_export_{}.{}", date.format("%Y-%m-%d"), self.extension())
    }
}

impl FromStr for DataFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported format '{}'", other)),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(DataFormat::from_path(Path::new("a/b.CSV")), Some(DataFormat::Csv));
        assert_eq!(DataFormat::from_path(Path::new("b.json")), Some(DataFormat::Json));
        assert_eq!(DataFormat::from_path(Path::new("b.txt")), None);
        assert_eq!(DataFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            DataFormat::Csv.export_file_name(date),
            "books_export_2024-03-09.csv"
        );
    }
}
