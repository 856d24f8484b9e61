//! Transfers module - raw provider events and the parser that normalizes them.

mod transfers_model;
mod transfers_parser;

pub use transfers_model::{ParsedEvent, RawProviderEvent, RawTokenTransfer, TransferEvent};
pub use transfers_parser::{parse_event, parse_value, token_amount_units};
