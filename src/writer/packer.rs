use crate::schema::Column;

/// Transposes columns into fixed-size row records.
///
/// The record buffer is allocated once, sized exactly to the record size, and
/// reused for every row.
#[derive(Debug)]
pub struct RowPacker<'d, 'a> {
    columns: &'d [Column<'a>],
    offsets: Vec<usize>,
    record: Vec<u8>,
}

impl<'d, 'a> RowPacker<'d, 'a> {
    /// Prepare a packer for `columns`
    pub fn new(columns: &'d [Column<'a>]) -> Self {
        let offsets: Vec<usize> = columns
            .iter()
            .scan(0, |offset, column| {
                let start = *offset;
                *offset += column.element_size();
                Some(start)
            })
            .collect();
        let record_size = columns.iter().map(Column::element_size).sum();

        Self {
            columns,
            offsets,
            record: vec![0; record_size],
        }
    }

    /// Bytes per record
    pub fn record_size(&self) -> usize {
        self.record.len()
    }

    /// Pack row `row` and return the record.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds for any column.
    pub fn repack_row(&mut self, row: usize) -> &[u8] {
        for (column, &offset) in self.columns.iter().zip(&self.offsets) {
            let end = offset + column.element_size();
            column.copy_element(row, &mut self.record[offset..end]);
        }
        &self.record
    }
}
