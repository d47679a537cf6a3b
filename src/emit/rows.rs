use crate::error::Result;
use crate::relational::{RelationalStore, RelationalTable};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes tables as delimited text: header first, then rows in insertion order.
pub struct TableWriter {
    delimiter: u8,
}

impl Default for TableWriter {
    fn default() -> Self {
        TableWriter { delimiter: b',' }
    }
}

impl TableWriter {
    pub fn new(delimiter: u8) -> Self {
        TableWriter { delimiter }
    }

    /// Write one table to `writer`.
    pub fn write_table<W: Write>(&self, table: &RelationalTable, writer: W) -> Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        csv.write_record(&table.header)?;
        for row in &table.rows {
            csv.write_record(row.iter().map(|cell| cell.to_field()))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write every table to `<dir>/<table_name>.csv`, creating `dir` if needed.
    ///
    /// Returns the written paths in configuration order.
    pub fn write_dir<P: AsRef<Path>>(&self, store: &RelationalStore, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let mut paths = Vec::with_capacity(store.len());
        for table in store.tables() {
            let path = dir.join(format!("{}.csv", table.name));
            let file = std::fs::File::create(&path)?;
            self.write_table(table, std::io::BufWriter::new(file))?;
            log::info!("wrote {} rows to {}", table.rows.len(), path.display());
            paths.push(path);
        }
        Ok(paths)
    }
}
