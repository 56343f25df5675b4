pub mod checkout;
pub mod commit;
pub mod diff;
pub mod error;
pub mod index;
pub mod objects;
pub mod repo;
pub mod smart_diff;

pub use error::{Result, VcsError};
pub use repo::{InitOutcome, Repository};
