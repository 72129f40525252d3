use bothunt_core::AccountId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset has no 'id' column")]
    MissingIdColumn,

    #[error("invalid account id '{value}'")]
    InvalidId { value: String },

    #[error("duplicate account id {0}")]
    DuplicateAccount(AccountId),

    #[error("unknown account id {0}")]
    UnknownAccount(AccountId),

    #[error("invalid value '{value}' in column {column} for account {account_id}")]
    InvalidCell {
        account_id: AccountId,
        column: String,
        value: String,
    },

    #[error("invalid label '{value}' for account {account_id}")]
    InvalidLabel { account_id: AccountId, value: String },

    #[error("row for account {account_id} has {found} extra columns, dataset has {expected}")]
    ColumnMismatch {
        account_id: AccountId,
        expected: usize,
        found: usize,
    },
}
