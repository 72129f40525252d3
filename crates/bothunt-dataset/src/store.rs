//! CSV persistence for [`Dataset`].
//!
//! The table is read fully and written fully. Writes go to a sibling
//! temporary file that is renamed over the target, so a crash mid-save
//! leaves the previous version intact.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use bothunt_core::{AccountId, BotClass, Cell, Feature, FeatureRow, FeatureValue, ValueKind};

use crate::dataset::{Dataset, DatasetRow, ID_COLUMN, LABEL_COLUMN};
use crate::error::DatasetError;

const NULL_MARKER: &str = "null";

/// Destination for dataset checkpoints written during a fill run.
pub trait Persist {
    /// Writes the whole dataset.
    ///
    /// # Errors
    ///
    /// Implementations return [`DatasetError`] when the write fails; fill
    /// runs treat this as fatal.
    fn persist(&mut self, dataset: &Dataset) -> Result<(), DatasetError>;
}

/// A dataset stored as one CSV file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file.
    ///
    /// # Errors
    ///
    /// [`DatasetError::Io`] when the file cannot be opened, otherwise any
    /// parse error from [`read_dataset`].
    pub fn load(&self) -> Result<Dataset, DatasetError> {
        let file = fs::File::open(&self.path).map_err(|source| self.io_error(source))?;
        read_dataset(file)
    }

    /// Like [`Self::load`], but a missing file yields an empty dataset.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`] for files that exist.
    pub fn load_or_default(&self) -> Result<Dataset, DatasetError> {
        if self.path.exists() {
            self.load()
        } else {
            tracing::info!(path = %self.path.display(), "dataset file not found, starting empty");
            Ok(Dataset::new())
        }
    }

    /// Writes the whole dataset, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// [`DatasetError::Io`] or [`DatasetError::Csv`] on write failure.
    pub fn save(&self, dataset: &Dataset) -> Result<(), DatasetError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        let file = fs::File::create(&tmp_path).map_err(|source| DatasetError::Io {
            path: tmp_path.display().to_string(),
            source,
        })?;
        write_dataset(file, dataset)?;
        fs::rename(&tmp_path, &self.path).map_err(|source| self.io_error(source))?;

        tracing::debug!(path = %self.path.display(), rows = dataset.len(), "dataset saved");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> DatasetError {
        DatasetError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl Persist for CsvStore {
    fn persist(&mut self, dataset: &Dataset) -> Result<(), DatasetError> {
        self.save(dataset)
    }
}

/// Column layout discovered from a header row.
struct Layout {
    id: usize,
    extra: Vec<(usize, String)>,
    features: [Option<usize>; Feature::COUNT],
    label: Option<usize>,
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, DatasetError> {
        // A leading unnamed column is a written-out index holding the ids.
        let id = headers
            .iter()
            .position(|h| h == ID_COLUMN)
            .or_else(|| (headers.get(0) == Some("")).then_some(0))
            .ok_or(DatasetError::MissingIdColumn)?;

        let mut extra = Vec::new();
        let mut features = [None; Feature::COUNT];
        let mut label = None;
        for (pos, name) in headers.iter().enumerate() {
            if pos == id {
                continue;
            }
            if let Some(feature) = Feature::from_column_name(name) {
                features[feature.index()] = Some(pos);
            } else if name == LABEL_COLUMN {
                label = Some(pos);
            } else {
                extra.push((pos, name.to_owned()));
            }
        }

        Ok(Self {
            id,
            extra,
            features,
            label,
        })
    }
}

/// Parses a dataset from CSV. Feature columns absent from the header are
/// added with every cell `Empty`.
///
/// # Errors
///
/// Returns [`DatasetError`] for malformed CSV, a missing id column,
/// unparseable ids, cells or labels, or duplicate ids.
pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let layout = Layout::from_headers(&headers)?;

    let missing: Vec<&str> = Feature::ALL
        .iter()
        .filter(|f| layout.features[f.index()].is_none())
        .map(|f| f.column_name())
        .collect();
    if !missing.is_empty() {
        tracing::info!(columns = ?missing, "adding missing feature columns");
    }

    let extra_names = layout.extra.iter().map(|(_, name)| name.clone()).collect();
    let mut dataset = Dataset::with_columns(extra_names, layout.label.is_some());

    for record in csv_reader.records() {
        let record = record?;
        let raw_id = record.get(layout.id).unwrap_or_default().trim();
        let id = parse_id(raw_id)?;

        let extra = layout
            .extra
            .iter()
            .map(|(pos, _)| record.get(*pos).unwrap_or_default().to_owned())
            .collect();

        let mut features = FeatureRow::empty();
        for feature in Feature::ALL {
            if let Some(pos) = layout.features[feature.index()] {
                let raw = record.get(pos).unwrap_or_default();
                features.set(feature, parse_cell(id, feature, raw)?);
            }
        }

        let label = match layout.label {
            Some(pos) => parse_label(id, record.get(pos).unwrap_or_default())?,
            None => None,
        };

        dataset.insert_row(DatasetRow {
            id,
            extra,
            features,
            label,
        })?;
    }

    Ok(dataset)
}

/// Writes a dataset as CSV: `id`, pass-through columns, the eight feature
/// columns, then `result` if the dataset carries labels.
///
/// # Errors
///
/// Returns [`DatasetError::Csv`] on write failure.
pub fn write_dataset<W: Write>(writer: W, dataset: &Dataset) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec![ID_COLUMN];
    header.extend(dataset.extra_columns().iter().map(String::as_str));
    header.extend(Feature::ALL.iter().map(|f| f.column_name()));
    if dataset.has_label_column() {
        header.push(LABEL_COLUMN);
    }
    csv_writer.write_record(&header)?;

    for row in dataset.rows() {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        record.push(row.id.to_string());
        record.extend(row.extra.iter().cloned());
        record.extend(row.features.iter().map(|(_, cell)| format_cell(cell)));
        if dataset.has_label_column() {
            record.push(row.label.map(|l| l.code().to_string()).unwrap_or_default());
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer
        .flush()
        .map_err(|e| DatasetError::Csv(csv::Error::from(e)))?;
    Ok(())
}

fn parse_id(raw: &str) -> Result<AccountId, DatasetError> {
    raw.parse::<AccountId>()
        .map_err(|_| DatasetError::InvalidId {
            value: raw.to_owned(),
        })
}

fn parse_cell(account_id: AccountId, feature: Feature, raw: &str) -> Result<Cell, DatasetError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Cell::Empty);
    }
    if raw.eq_ignore_ascii_case(NULL_MARKER) {
        return Ok(Cell::Null);
    }

    let value = match feature.kind() {
        ValueKind::Bool => parse_bool(raw).map(FeatureValue::Bool),
        ValueKind::Int => parse_int(raw).map(FeatureValue::Int),
        ValueKind::Float => raw.parse::<f64>().ok().map(FeatureValue::Float),
    };

    value
        .map(Cell::Value)
        .ok_or_else(|| DatasetError::InvalidCell {
            account_id,
            column: feature.column_name().to_owned(),
            value: raw.to_owned(),
        })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "TRUE" | "1" | "1.0" => Some(true),
        "false" | "False" | "FALSE" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_int(raw: &str) -> Option<i64> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(i);
    }
    // Integer columns that went through a float dtype come back as "12.0".
    raw.parse::<f64>()
        .ok()
        .filter(|x| x.is_finite() && x.fract() == 0.0)
        .map(|x| x as i64)
}

fn parse_label(account_id: AccountId, raw: &str) -> Result<Option<BotClass>, DatasetError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_int(raw)
        .and_then(|code| i32::try_from(code).ok())
        .and_then(BotClass::from_code)
        .map(Some)
        .ok_or_else(|| DatasetError::InvalidLabel {
            account_id,
            value: raw.to_owned(),
        })
}

fn format_cell(cell: Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Null => NULL_MARKER.to_owned(),
        Cell::Value(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Dataset {
        read_dataset(text.as_bytes()).expect("dataset should parse")
    }

    fn dump(dataset: &Dataset) -> String {
        let mut out = Vec::new();
        write_dataset(&mut out, dataset).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn missing_feature_columns_are_added_empty() {
        let ds = load("id,screen_name\n11,alice\n12,bob\n");
        assert_eq!(ds.extra_columns(), ["screen_name".to_owned()]);
        assert!(!ds.has_label_column());
        assert_eq!(ds.row(12).unwrap().extra, vec!["bob".to_owned()]);
        assert_eq!(ds.row(11).unwrap().features, FeatureRow::empty());
    }

    #[test]
    fn cells_parse_loosely_and_write_canonically() {
        let text = "id,is_protected,time_of_existence,average_daily_tweets,inactive_days,\
has_default_image,bio_is_empty,friends_followers_ratio,is_verified,result\n\
7,False,1200.0,0.5,,1.0,True,null,0,2\n";
        let ds = load(text);
        let row = ds.row(7).unwrap();
        assert_eq!(
            row.features.get(Feature::IsProtected),
            Cell::Value(FeatureValue::Bool(false))
        );
        assert_eq!(
            row.features.get(Feature::TimeOfExistence),
            Cell::Value(FeatureValue::Int(1200))
        );
        assert_eq!(row.features.get(Feature::InactiveDays), Cell::Empty);
        assert_eq!(row.features.get(Feature::FriendsFollowersRatio), Cell::Null);
        assert_eq!(row.label, Some(BotClass::SocialBot));

        let written = dump(&ds);
        assert_eq!(
            written.lines().nth(1),
            Some("7,false,1200,0.5,,true,true,null,false,2")
        );
    }

    #[test]
    fn extra_columns_survive_round_trip() {
        let text = "screen_name,id,note\nalice,11,\"hello, world\"\n";
        let ds = load(text);
        let again = load(&dump(&ds));
        assert_eq!(again.extra_columns(), ["screen_name".to_owned(), "note".to_owned()]);
        assert_eq!(
            again.row(11).unwrap().extra,
            vec!["alice".to_owned(), "hello, world".to_owned()]
        );
        assert_eq!(again, ds);
    }

    #[test]
    fn unnamed_leading_column_is_the_id() {
        let ds = load(",screen_name\n99,carol\n");
        assert_eq!(ds.ids(), vec![99]);
    }

    #[test]
    fn missing_id_column_is_rejected() {
        let err = read_dataset("screen_name\nalice\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingIdColumn), "{err:?}");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = read_dataset("id\n1\n1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateAccount(1)), "{err:?}");
    }

    #[test]
    fn garbage_cell_reports_column_and_account() {
        let err = read_dataset("id,inactive_days\n5,lots\n".as_bytes()).unwrap_err();
        match err {
            DatasetError::InvalidCell {
                account_id,
                column,
                value,
            } => {
                assert_eq!(account_id, 5);
                assert_eq!(column, "inactive_days");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_label_code_is_rejected() {
        let err = read_dataset("id,result\n5,7\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidLabel { .. }), "{err:?}");
    }

    #[test]
    fn csv_store_saves_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvStore::new(dir.path().join("nested").join("accounts.csv"));
        assert!(store.load_or_default().unwrap().is_empty());

        let mut ds = Dataset::new();
        ds.register(1);
        ds.register(2);
        ds.row_mut(2)
            .unwrap()
            .features
            .set(Feature::FriendsFollowersRatio, Cell::Null);
        store.persist(&ds).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded, ds);
        assert!(!store.path().with_extension("csv.tmp").exists());
    }
}
