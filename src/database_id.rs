/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;

/// The ID of a transaction.
pub type TransactionId = DatabaseID;
