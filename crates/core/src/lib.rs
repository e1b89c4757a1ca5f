pub mod money;
pub mod record;

pub use money::Amount;
pub use record::{
    Direction, LedgerRecord, Source, TransactionRecord, TxnKind, HOME_CURRENCY,
};
