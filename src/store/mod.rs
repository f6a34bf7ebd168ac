pub mod record_store;
pub mod schema;

pub use record_store::{RecordStore, SaveMode, SaveOutcome, StoreError, StoreOptions};
pub use schema::{Entry, Record, RecordId, RecordStatus};
