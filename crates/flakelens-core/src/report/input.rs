use crate::errors::ReportError;
use crate::model::AggregatedTestResult;
use std::path::Path;

pub fn parse_report(raw: &str, path: &Path) -> Result<Vec<AggregatedTestResult>, ReportError> {
    serde_json::from_str(raw).map_err(|source| ReportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_report(path: &Path) -> Result<Vec<AggregatedTestResult>, ReportError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ReportError::from_io(path.to_path_buf(), e))?;
    parse_report(&raw, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_report(&dir.path().join("flaky-report.json")).unwrap_err();
        assert!(matches!(err, ReportError::NotFound(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("flaky-report.json");
        std::fs::write(&p, "{ not an array").unwrap();
        assert!(matches!(read_report(&p), Err(ReportError::Parse { .. })));
    }

    #[test]
    fn empty_array_is_empty_report() {
        let records = parse_report("[]", Path::new("r.json")).unwrap();
        assert!(records.is_empty());
    }
}
