//! HTTP record sources: [`AirtableLeadSource`] for leads and
//! [`TrelloTaskBoard`] for tasks. Both are blocking and time out each call
//! after [`http::REQUEST_TIMEOUT`].

pub mod airtable;
pub mod http;
pub mod trello;

pub use airtable::AirtableLeadSource;
pub use trello::TrelloTaskBoard;
