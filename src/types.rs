/// Configuration for a transformation session
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Route each record into the store as soon as it is validated.
    /// When false, records are only validated and kept until `generate_rdb`.
    pub begin_conversion: bool,

    /// Reject keys the mapping and record formats do not define
    pub strict_keys: bool,

    /// Field delimiter for flat table output
    pub csv_delimiter: u8,

    /// File name for combined table definitions
    pub ddl_file_name: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        TransformConfig {
            begin_conversion: true,
            strict_keys: true,
            csv_delimiter: b',',
            ddl_file_name: String::from("CREATE.sql"),
        }
    }
}

/// Counters for one pass over the records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    /// Records that passed structural validation
    pub validated: usize,

    /// Rows appended to the store
    pub inserted: usize,

    /// Records whose routing key matched no table
    pub skipped: usize,
}
