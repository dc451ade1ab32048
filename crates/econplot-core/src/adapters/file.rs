use std::path::Path;

use crate::data_source::{FetchFuture, FetchRequest, SeriesSource, SourceError};
use crate::{Observation, ObservationDate, RawSeries, SourceKind};

/// Cell values treated as "no observation".
const MISSING_MARKERS: [&str; 5] = ["", ".", "NA", "N/A", "NaN"];

/// Local CSV/TSV reader. The request identifier is the file path.
///
/// The file must have a header row; column 0 holds the date and column 1 the
/// value. Further columns are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl FileSource {
    pub fn new() -> Self {
        Self
    }

    #[tracing::instrument(name = "file.fetch", skip_all, fields(path = %req.identifier))]
    async fn read_series(&self, req: FetchRequest) -> Result<RawSeries, SourceError> {
        let path = Path::new(&req.identifier);
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::io(format!("cannot read '{}': {e}", path.display())))?;

        let observations = parse_table(&contents, delimiter_for(path, &contents))?;
        let series = RawSeries::new(req.identifier, SourceKind::File, observations);
        tracing::debug!(observations = series.len(), "file series loaded");
        Ok(series)
    }
}

impl SeriesSource for FileSource {
    fn kind(&self) -> SourceKind {
        SourceKind::File
    }

    fn fetch<'a>(&'a self, req: FetchRequest) -> FetchFuture<'a> {
        Box::pin(self.read_series(req))
    }
}

fn delimiter_for(path: &Path, contents: &str) -> u8 {
    let by_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab"))
        .unwrap_or(false);
    let header = contents.lines().next().unwrap_or_default();

    if by_extension || (header.contains('\t') && !header.contains(',')) {
        b'\t'
    } else {
        b','
    }
}

fn parse_table(contents: &str, delimiter: u8) -> Result<Vec<Observation>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(contents.as_bytes());

    let mut observations = Vec::new();
    let mut missing = 0usize;

    for record in reader.records() {
        let record = record.map_err(|e| SourceError::parse(format!("malformed row: {e}")))?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();

        let (Some(raw_date), Some(raw_value)) = (record.get(0), record.get(1)) else {
            if record.iter().all(str::is_empty) {
                continue;
            }
            return Err(SourceError::parse(format!(
                "line {line}: expected a date column and a value column"
            )));
        };

        if MISSING_MARKERS
            .iter()
            .any(|marker| raw_value.eq_ignore_ascii_case(marker))
        {
            missing += 1;
            continue;
        }

        let date = ObservationDate::parse(raw_date)
            .map_err(|e| SourceError::parse(format!("line {line}: {e}")))?;
        let value = raw_value.parse::<f64>().map_err(|_| {
            SourceError::parse(format!("line {line}: value '{raw_value}' is not numeric"))
        })?;
        observations.push(Observation::new(date, value));
    }

    if missing > 0 {
        tracing::warn!(missing, "file contains rows without a value; skipping them");
    }

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;

    #[test]
    fn parses_csv_with_header_and_skips_blank_values() {
        let contents = "DATE,VALUE\n2024-01-01,1.5\n2024-02-01,NA\n2024-03-01, 2.5 \n";
        let observations = parse_table(contents, b',').expect("must parse");

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[1].date.to_string(), "2024-03-01");
        assert_eq!(observations[1].value, 2.5);
    }

    #[test]
    fn bad_value_reports_line_number() {
        let contents = "date,value\n2024-01-01,1\n2024-02-01,abc\n";
        let err = parse_table(contents, b',').expect_err("must fail");

        assert_eq!(err.kind(), SourceErrorKind::Parse);
        assert!(err.message().starts_with("line 3:"), "{}", err.message());
    }

    #[test]
    fn detects_tab_delimiter() {
        assert_eq!(delimiter_for(Path::new("data.tsv"), "a,b"), b'\t');
        assert_eq!(delimiter_for(Path::new("data.txt"), "date\tvalue\n"), b'\t');
        assert_eq!(delimiter_for(Path::new("data.csv"), "date,value\n"), b',');
    }

    #[tokio::test]
    async fn reads_file_through_async_fetch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cpi.tsv");
        std::fs::write(&path, "date\tvalue\n2024-02-01\t2\n2024-01-01\t1\n").expect("write");

        let series = FileSource::new()
            .fetch(FetchRequest::new(path.display().to_string()))
            .await
            .expect("file loads");

        assert_eq!(series.len(), 2);
        assert_eq!(series.source, SourceKind::File);
        assert_eq!(
            series.first_date().map(|date| date.to_string()).as_deref(),
            Some("2024-01-01")
        );
    }

    #[test]
    fn single_column_row_is_rejected() {
        let contents = "date,value\n2024-01-01\n";
        let err = parse_table(contents, b',').expect_err("must fail");
        assert!(err.message().contains("expected a date column"));
    }
}
