//! # Site Search Shared
//!
//! Plain data types shared by every crate of the site search indexer:
//! sites and their content entries, user query input, and suggestions.

mod entry;
mod query;
mod site;
mod suggestion;

pub use entry::Entry;
pub use query::QueryInput;
pub use site::Site;
pub use suggestion::{Suggestion, SuggestionKind};

/// Date format used for date properties, both in mappings and in documents.
///
/// The mapping equivalent is [`MAPPING_DATE_FORMAT`].
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format declared on `date` fields in the index mappings.
pub const MAPPING_DATE_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";
