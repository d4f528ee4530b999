use crate::writer::WriterError;

use super::column::Column;
use super::types::NativeElement;

/// An ordered set of equally long columns plus optional key names.
///
/// Column order is the on-disk order. Key names are all-or-nothing: either
/// none, or exactly one per column.
#[derive(Debug)]
pub struct Dataset<'a> {
    columns: Vec<Column<'a>>,
    keys: Vec<String>,
    rows: usize,
}

impl<'a> Dataset<'a> {
    /// Create an unnamed dataset. All columns must have the same length.
    pub fn new(columns: Vec<Column<'a>>) -> Result<Self, WriterError> {
        Self::with_keys(columns, Vec::<String>::new())
    }

    /// Create a dataset with one key name per column (or none).
    pub fn with_keys<I, S>(columns: Vec<Column<'a>>, keys: I) -> Result<Self, WriterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();

        if !keys.is_empty() && keys.len() != columns.len() {
            return Err(WriterError::InvalidData(format!(
                "expected 0 or {} key names, got {}",
                columns.len(),
                keys.len()
            )));
        }
        if let Some(bad) = keys.iter().find(|k| k.as_bytes().contains(&0)) {
            return Err(WriterError::InvalidData(format!(
                "key name {:?} contains a NUL byte",
                bad
            )));
        }

        let rows = columns.first().map_or(0, Column::len);
        if let Some((index, column)) = columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != rows)
        {
            return Err(WriterError::InvalidData(format!(
                "column {} has {} elements, expected {}",
                index,
                column.len(),
                rows
            )));
        }

        Ok(Self {
            columns,
            keys,
            rows,
        })
    }

    /// Start a typed builder
    pub fn builder() -> DatasetBuilder<'a> {
        DatasetBuilder::default()
    }

    /// Columns in on-disk order
    pub fn columns(&self) -> &[Column<'a>] {
        &self.columns
    }

    /// Key names, empty when the dataset is unnamed
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// True when every column carries a key name
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Number of rows shared by all columns
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Bytes per packed record: the sum of all element sizes
    pub fn record_size(&self) -> usize {
        self.columns.iter().map(Column::element_size).sum()
    }

    /// Bytes of the key block: each name plus its NUL terminator
    pub fn key_block_size(&self) -> usize {
        self.keys.iter().map(|k| k.len() + 1).sum()
    }
}

/// Typed builder for [`Dataset`].
///
/// ```rust
/// use chpf::schema::Dataset;
///
/// let x = [0.0f32, 1.0, 2.0];
/// let id = [7i32, 8, 9];
/// let dataset = Dataset::builder()
///     .named("position_x", &x)
///     .named("id", &id)
///     .build()?;
/// assert_eq!(dataset.record_size(), 8);
/// # Ok::<(), chpf::writer::WriterError>(())
/// ```
#[derive(Debug, Default)]
pub struct DatasetBuilder<'a> {
    columns: Vec<Column<'a>>,
    names: Vec<Option<String>>,
}

impl<'a> DatasetBuilder<'a> {
    /// Append an unnamed typed column
    pub fn column<T: NativeElement>(self, values: &'a [T]) -> Self {
        self.push(Column::new(values))
    }

    /// Append a named typed column
    pub fn named<T: NativeElement>(self, name: impl Into<String>, values: &'a [T]) -> Self {
        self.push_named(name, Column::new(values))
    }

    /// Append an already constructed unnamed column
    pub fn push(mut self, column: Column<'a>) -> Self {
        self.columns.push(column);
        self.names.push(None);
        self
    }

    /// Append an already constructed named column
    pub fn push_named(mut self, name: impl Into<String>, column: Column<'a>) -> Self {
        self.columns.push(column);
        self.names.push(Some(name.into()));
        self
    }

    /// Validate and build the dataset. Mixing named and unnamed columns is rejected.
    pub fn build(self) -> Result<Dataset<'a>, WriterError> {
        let named = self.names.iter().filter(|n| n.is_some()).count();
        if named != 0 && named != self.names.len() {
            return Err(WriterError::InvalidData(format!(
                "{} of {} columns are named; key names are all-or-nothing",
                named,
                self.names.len()
            )));
        }

        let keys: Vec<String> = self.names.into_iter().flatten().collect();
        Dataset::with_keys(self.columns, keys)
    }
}
