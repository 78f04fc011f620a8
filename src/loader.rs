//! Загрузка таблиц из текстовых файлов с разделителями (локально или по HTTP)

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::Duration;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::error::{PrepError, Result};
use crate::types::{ColumnSpec, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// Любая последовательность пробелов
    Whitespace,
    /// Один ASCII-символ, разбор через csv
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    #[serde(default = "default_delimiter")]
    pub delimiter: Delimiter,
    #[serde(default = "default_na_token")]
    pub na_token: String,
    /// Whitespace: всё от этого символа до конца строки отбрасывается.
    /// Char: строки, начинающиеся с этого символа, пропускаются.
    #[serde(default = "default_comment")]
    pub comment: Option<char>,
}

fn default_delimiter() -> Delimiter { Delimiter::Whitespace }
fn default_na_token() -> String { "?".to_string() }
fn default_comment() -> Option<char> { Some('\t') }

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            na_token: default_na_token(),
            comment: default_comment(),
        }
    }
}

/// Загрузка по URL (http/https) или по пути к файлу; `.gz` распаковывается
pub fn load(
    source: &str,
    specs: &[ColumnSpec],
    options: &LoadOptions,
    timeout: Duration,
) -> Result<Table> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_table(source, specs, options, timeout)
    } else {
        load_file(Path::new(source), specs, options)
    }
}

pub fn fetch_table(
    url: &str,
    specs: &[ColumnSpec],
    options: &LoadOptions,
    timeout: Duration,
) -> Result<Table> {
    tracing::info!("Fetching {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    let response = client.get(url).send()?.error_for_status()?;
    let gzipped = response.url().path().ends_with(".gz");
    let body = response.bytes()?;

    tracing::debug!("Fetched {} bytes", body.len());
    if gzipped {
        read_gz_table(&body[..], specs, options)
    } else {
        read_table(&body[..], specs, options)
    }
}

pub fn load_file(path: &Path, specs: &[ColumnSpec], options: &LoadOptions) -> Result<Table> {
    tracing::info!("Loading {}", path.display());
    let file = File::open(path)?;
    if path.extension().map_or(false, |ext| ext == "gz") {
        read_gz_table(file, specs, options)
    } else {
        read_table(BufReader::new(file), specs, options)
    }
}

pub fn parse_table(text: &str, specs: &[ColumnSpec], options: &LoadOptions) -> Result<Table> {
    read_table(text.as_bytes(), specs, options)
}

/// Разбор gzip-потока
pub fn read_gz_table<R: Read>(
    reader: R,
    specs: &[ColumnSpec],
    options: &LoadOptions,
) -> Result<Table> {
    read_table(BufReader::new(GzDecoder::new(reader)), specs, options)
}

/// Разбор построчно. Заголовка в данных нет, имена колонок задает вызывающий.
pub fn read_table<R: BufRead>(
    reader: R,
    specs: &[ColumnSpec],
    options: &LoadOptions,
) -> Result<Table> {
    if specs.is_empty() {
        return Err(PrepError::config("no columns specified"));
    }

    let rows = match options.delimiter {
        Delimiter::Whitespace => read_whitespace(reader, specs, options)?,
        Delimiter::Char(c) => read_delimited(reader, c, specs, options)?,
    };

    let table = Table::from_rows(specs, rows)?;
    tracing::info!("Loaded {} rows x {} columns", table.n_rows(), table.n_cols());
    Ok(table)
}

fn read_whitespace<R: BufRead>(
    reader: R,
    specs: &[ColumnSpec],
    options: &LoadOptions,
) -> Result<Vec<Vec<Option<f64>>>> {
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let content = match options.comment {
            Some(c) => line.split(c).next().unwrap_or(""),
            None => line.as_str(),
        };
        if content.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = content.split_whitespace().collect();
        rows.push(parse_fields(&fields, idx + 1, specs, options)?);
    }
    Ok(rows)
}

fn read_delimited<R: Read>(
    reader: R,
    delimiter: char,
    specs: &[ColumnSpec],
    options: &LoadOptions,
) -> Result<Vec<Vec<Option<f64>>>> {
    let delimiter = ascii_byte(delimiter, "delimiter")?;
    let comment = options
        .comment
        .map(|c| ascii_byte(c, "comment"))
        .transpose()?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .comment(comment)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        let fields: Vec<&str> = record.iter().collect();
        rows.push(parse_fields(&fields, line, specs, options)?);
    }
    Ok(rows)
}

fn ascii_byte(c: char, what: &str) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(PrepError::config(format!("{what} '{c}' must be an ASCII character")))
    }
}

fn csv_error(err: csv::Error) -> PrepError {
    let line = err.position().map_or(0, |p| p.line() as usize);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => PrepError::Io(e),
        _ => PrepError::Parse { line, message },
    }
}

fn parse_fields(
    fields: &[&str],
    line_no: usize,
    specs: &[ColumnSpec],
    options: &LoadOptions,
) -> Result<Vec<Option<f64>>> {
    if fields.len() != specs.len() {
        return Err(PrepError::Parse {
            line: line_no,
            message: format!("expected {} fields, found {}", specs.len(), fields.len()),
        });
    }

    fields
        .iter()
        .zip(specs)
        .map(|(field, spec)| {
            if field.is_empty() || *field == options.na_token {
                return Ok(None);
            }
            match field.parse::<f64>() {
                // nan/inf тоже парсятся, но числом не считаются
                Ok(value) if value.is_finite() => Ok(Some(value)),
                _ => Err(PrepError::Parse {
                    line: line_no,
                    message: format!("non-numeric value '{}' in column '{}'", field, spec.name),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn specs() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::continuous("MPG"),
            ColumnSpec::continuous("Cylinders"),
            ColumnSpec::categorical("Origin"),
        ]
    }

    fn comma_options() -> LoadOptions {
        LoadOptions {
            delimiter: Delimiter::Char(','),
            na_token: "NA".to_string(),
            comment: None,
        }
    }

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn parses_whitespace_rows_with_trailing_comment() {
        let text = "18.0   8   1\t\"chevrolet chevelle malibu\"\n\
                    15.0   ?   1\t\"buick skylark 320\"\n\
                    \t\"comment line\"\n\
                    \n\
                    26.0   4   2\n";
        let table = parse_table(text, &specs(), &LoadOptions::default()).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.row(0), vec![Some(18.0), Some(8.0), Some(1.0)]);
        assert_eq!(table.row(1)[1], None);
        assert_eq!(table.column("Origin").unwrap().values[2], Some(2.0));
    }

    #[test]
    fn wrong_field_count_is_parse_error() {
        let text = "18.0 8 1\n15.0 8\n";
        match parse_table(text, &specs(), &LoadOptions::default()) {
            Err(PrepError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_field_is_parse_error() {
        let text = "18.0 eight 1\n";
        let err = parse_table(text, &specs(), &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Cylinders"));
    }

    #[test]
    fn nan_and_infinity_are_rejected() {
        for text in ["18.0 nan 1\n", "18.0 8 NaN\n", "inf 8 1\n", "18.0 -infinity 1\n"] {
            assert!(
                matches!(
                    parse_table(text, &specs(), &LoadOptions::default()),
                    Err(PrepError::Parse { line: 1, .. })
                ),
                "{text}"
            );
        }
        assert!(matches!(
            parse_table("1,nan,2\n", &specs(), &comma_options()),
            Err(PrepError::Parse { .. })
        ));
    }

    #[test]
    fn comma_delimited_with_empty_fields() {
        let text = "1.0, 2.0,3\nNA,,4\n\"5.5\",6,7\n";
        let table = parse_table(text, &specs(), &comma_options()).unwrap();
        assert_eq!(table.row(0), vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(table.row(1), vec![None, None, Some(4.0)]);
        assert_eq!(table.row(2), vec![Some(5.5), Some(6.0), Some(7.0)]);
    }

    #[test]
    fn comma_delimited_field_count_mismatch() {
        match parse_table("1,2,3\n4,5\n", &specs(), &comma_options()) {
            Err(PrepError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(matches!(
            parse_table("1,2\n", &specs(), &comma_options()),
            Err(PrepError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn comma_delimited_skips_comment_lines() {
        let options = LoadOptions {
            comment: Some('#'),
            ..comma_options()
        };
        let table = parse_table("# header\n1,2,3\n", &specs(), &options).unwrap();
        assert_eq!(table.n_rows(), 1);
    }

    #[test]
    fn non_ascii_delimiter_is_config_error() {
        let options = LoadOptions {
            delimiter: Delimiter::Char('§'),
            ..comma_options()
        };
        assert!(matches!(
            parse_table("1§2§3\n", &specs(), &options),
            Err(PrepError::Config(_))
        ));
    }

    #[test]
    fn gzip_stream_matches_plain_text() {
        let text = "18.0 8 1\n26.0 ? 2\n";
        let plain = parse_table(text, &specs(), &LoadOptions::default()).unwrap();
        let packed = gzip(text);
        let unpacked = read_gz_table(&packed[..], &specs(), &LoadOptions::default()).unwrap();
        assert_eq!(plain, unpacked);
    }

    #[test]
    fn gz_file_is_decompressed_by_extension() {
        let path = std::env::temp_dir().join(format!("tabular-prep-{}.csv.gz", std::process::id()));
        std::fs::write(&path, gzip("1,2,3\n4,5,6\n")).unwrap();
        let table = load(path.to_str().unwrap(), &specs(), &comma_options(), Duration::from_secs(1));
        std::fs::remove_file(&path).unwrap();
        assert_eq!(table.unwrap().row(1), vec![Some(4.0), Some(5.0), Some(6.0)]);
    }

    #[test]
    fn corrupt_gzip_is_io_error() {
        let err = read_gz_table(&b"not gzip"[..], &specs(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, PrepError::Io(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/nonexistent/auto-mpg.data"), &specs(), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, PrepError::Io(_)));
    }

    #[test]
    fn path_source_goes_to_filesystem() {
        let err = load(
            "/nonexistent/auto-mpg.data",
            &specs(),
            &LoadOptions::default(),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, PrepError::Io(_)));
    }

    #[test]
    fn unreachable_url_is_fetch_error() {
        let err = load(
            "http://127.0.0.1:1/auto-mpg.data",
            &specs(),
            &LoadOptions::default(),
            Duration::from_millis(500),
        )
        .unwrap_err();
        assert!(matches!(err, PrepError::Fetch(_)), "{err:?}");
    }

    #[test]
    fn empty_spec_list_is_rejected() {
        assert!(matches!(
            parse_table("1 2 3\n", &[], &LoadOptions::default()),
            Err(PrepError::Config(_))
        ));
    }
}
