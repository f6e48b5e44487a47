//! Loading the medical report handed to the pipeline.

use crate::cli::ReportSource;
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read the report from `source`. The text must be non-blank UTF-8.
pub fn read_medical_report(source: &ReportSource) -> Result<String> {
    let bytes = match source {
        ReportSource::Stdin => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read medical report from stdin")?;
            buf
        }
        ReportSource::File(path) => read_file(path)?,
    };

    decode_report(bytes, &source.label())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("Failed to read medical report: {}", path.display()))
}

fn decode_report(bytes: Vec<u8>, label: &str) -> Result<String> {
    let text = String::from_utf8(bytes)
        .with_context(|| format!("Medical report is not valid UTF-8: {}", label))?;

    if text.trim().is_empty() {
        bail!("Medical report is empty: {}", label);
    }

    debug!("Read {} bytes of report text from {}", text.len(), label);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_report_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Patient: 45M\nComplaint: palpitations").unwrap();

        let source = ReportSource::File(file.path().to_path_buf());
        let text = read_medical_report(&source).unwrap();
        assert!(text.contains("palpitations"));
    }

    #[test]
    fn test_rejects_blank_report() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "  \n\t\n").unwrap();

        let source = ReportSource::File(file.path().to_path_buf());
        let err = read_medical_report(&source).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_rejects_non_utf8_report() {
        let err = decode_report(vec![0xff, 0xfe, 0x00], "binary.txt").unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let source = ReportSource::File("/no/such/report.txt".into());
        assert!(read_medical_report(&source).is_err());
    }
}
