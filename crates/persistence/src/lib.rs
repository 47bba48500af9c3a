pub mod error;
pub mod fixtures;
pub mod ledger;
pub mod stage;

pub use error::{LedgerError, Result};
pub use ledger::{read_ledger, EventLedger, LedgerIter};
pub use stage::Stage;
