pub mod abi;
pub mod builder;
pub mod encoding;
pub mod receipt;
pub mod submit;

pub use builder::{ContractCall, TxBuilder};
pub use encoding::CallEncoding;
pub use receipt::{wait_for_receipt, Receipt, ReceiptOutcome};
pub use submit::{FeeSource, GasLimitSource, SubmitOutcome, Submitter};
