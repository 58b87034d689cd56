//! Click datasets loaded from delimited text files
//!
//! Each row becomes an [`Observation`] carrying the identifiers needed to
//! aggregate at row, impression, or user level plus a binary click outcome.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading a dataset
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Column '{0}' not found in header")]
    ColumnNotFound(String),

    #[error("Column '{0}' must be a zero-based index unless --has-header is provided")]
    NamedColumnWithoutHeader(String),

    #[error("Header row is missing")]
    MissingHeader,

    #[error("Invalid delimiter '{0}': expected a single character")]
    InvalidDelimiter(String),

    #[error("No valid observations were loaded from the dataset")]
    Empty,
}

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;

/// One row of the click log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Zero-based position in the dataset
    pub row_id: usize,
    pub impression_id: String,
    pub user_id: String,
    pub clicked: bool,
}

/// Ordered sequence of observations
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    observations: Vec<Observation>,
    skipped_rows: usize,
}

impl Dataset {
    /// Build a dataset from `(impression_id, user_id, clicked)` triples, numbering rows in order
    pub fn from_records<I, S, T>(records: I) -> Self
    where
        I: IntoIterator<Item = (S, T, bool)>,
        S: Into<String>,
        T: Into<String>,
    {
        let observations = records
            .into_iter()
            .enumerate()
            .map(|(row_id, (impression_id, user_id, clicked))| Observation {
                row_id,
                impression_id: impression_id.into(),
                user_id: user_id.into(),
                clicked,
            })
            .collect();

        Self {
            observations,
            skipped_rows: 0,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Rows dropped during loading because a field was missing or unparseable
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Distinct user ids in first-seen order
    pub fn distinct_users(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.observations
            .iter()
            .map(|obs| obs.user_id.as_str())
            .filter(|user| seen.insert(*user))
            .collect()
    }

    /// Fail with [`DatasetError::Empty`] when nothing was loaded
    pub fn ensure_not_empty(self) -> Result<Self> {
        if self.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(self)
    }
}

/// Reference to a column by zero-based index or header name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    fn resolve(&self, header: Option<&[String]>) -> Result<usize> {
        match (self, header) {
            (ColumnRef::Index(index), _) => Ok(*index),
            (ColumnRef::Name(name), Some(header)) => header
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| DatasetError::ColumnNotFound(name.clone())),
            (ColumnRef::Name(name), None) => {
                Err(DatasetError::NamedColumnWithoutHeader(name.clone()))
            }
        }
    }
}

impl FromStr for ColumnRef {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(index) = s.parse() {
                return Ok(ColumnRef::Index(index));
            }
        }
        Ok(ColumnRef::Name(s.to_string()))
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(index) => write!(f, "{}", index),
            ColumnRef::Name(name) => write!(f, "{}", name),
        }
    }
}

/// How to read a delimited click log
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub delimiter: char,
    pub has_header: bool,
    pub user_column: ColumnRef,
    pub impression_column: ColumnRef,
    pub click_column: ColumnRef,
}

impl LoadOptions {
    /// Default column layout for a file with or without a header row
    ///
    /// With a header, columns resolve by name (`user_id`, `impression_id`,
    /// `click`). Without one, the Criteo sample layout applies: the click label
    /// in column 0, then user id in column 1 and impression id in column 2.
    pub fn with_header(has_header: bool) -> Self {
        if has_header {
            Self {
                delimiter: ',',
                has_header: true,
                user_column: ColumnRef::Name("user_id".to_string()),
                impression_column: ColumnRef::Name("impression_id".to_string()),
                click_column: ColumnRef::Name("click".to_string()),
            }
        } else {
            Self {
                delimiter: ',',
                has_header: false,
                user_column: ColumnRef::Index(1),
                impression_column: ColumnRef::Index(2),
                click_column: ColumnRef::Index(0),
            }
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::with_header(true)
    }
}

/// Parse a delimiter argument; accepts a single character, `\t` or `tab`
pub fn parse_delimiter(raw: &str) -> Result<char> {
    match raw {
        "\\t" | "tab" => Ok('\t'),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c != '"' && c != '\n' => Ok(c),
                _ => Err(DatasetError::InvalidDelimiter(raw.to_string())),
            }
        }
    }
}

/// Split one delimited line into fields
///
/// Double-quoted fields may contain the delimiter; `""` inside quotes is a literal quote.
pub fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' && field.is_empty() {
            in_quotes = true;
        } else if c == delimiter {
            fields.push(std::mem::take(&mut field));
        } else {
            field.push(c);
        }
    }
    fields.push(field);

    fields
}

fn parse_click(raw: &str) -> Option<bool> {
    raw.trim().parse::<f64>().ok().map(|value| value > 0.0)
}

/// Parse dataset contents that are already in memory
pub fn parse_dataset(contents: &str, options: &LoadOptions) -> Result<Dataset> {
    let mut lines = contents
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header = if options.has_header {
        let line = lines.next().ok_or(DatasetError::MissingHeader)?;
        Some(
            split_line(line, options.delimiter)
                .into_iter()
                .map(|column| column.trim().to_string())
                .collect::<Vec<_>>(),
        )
    } else {
        None
    };

    let user_index = options.user_column.resolve(header.as_deref())?;
    let impression_index = options.impression_column.resolve(header.as_deref())?;
    let click_index = options.click_column.resolve(header.as_deref())?;

    let mut observations = Vec::new();
    let mut skipped_rows = 0;

    for (line_no, line) in lines.enumerate() {
        let fields = split_line(line, options.delimiter);

        let parsed = (
            fields.get(impression_index),
            fields.get(user_index),
            fields.get(click_index).and_then(|raw| parse_click(raw)),
        );

        match parsed {
            (Some(impression_id), Some(user_id), Some(clicked)) => {
                observations.push(Observation {
                    row_id: observations.len(),
                    impression_id: impression_id.trim().to_string(),
                    user_id: user_id.trim().to_string(),
                    clicked,
                });
            }
            _ => {
                debug!(line = line_no, "skipping malformed row");
                skipped_rows += 1;
            }
        }
    }

    Ok(Dataset {
        observations,
        skipped_rows,
    })
}

/// Load a delimited click log from disk
///
/// Fails if the file cannot be read or no valid observation remains.
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let contents = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = parse_dataset(&contents, options)?.ensure_not_empty()?;

    info!(
        path = %path.display(),
        rows = dataset.len(),
        skipped = dataset.skipped_rows(),
        "loaded dataset"
    );

    Ok(dataset)
}
