//! Record sources feeding the override cache.
//!
//! A source is a pure producer: it reads its input, parses each textual
//! identity pattern and hands back an ordered record list. All I/O happens
//! before any cache lock is taken. A malformed pattern surfaces as
//! [`SourceError::Record`](crate::SourceError::Record) naming the raw
//! string; it never silently drops and never reaches the cache.

mod file_source;
mod memory_source;
pub use file_source::*;
pub use memory_source::*;


#[cfg(test)]
use mockall::automock;

use crate::ComponentIdentity;
use crate::OverrideValue;
use crate::Result;
use crate::SourceError;

/// The one contract loaders implement: parse a source into an ordered list
/// of (pattern, value) records. Downstream, later records overwrite
/// earlier ones with the same name, so producers must preserve input order.
#[cfg_attr(test, automock)]
pub trait OverrideSource<V: OverrideValue> {
    fn load(&self) -> Result<Vec<(ComponentIdentity, V)>>;
}

/// Parses one record, attributing a malformed pattern to its raw string.
pub(crate) fn parse_record<V>(
    name: &str,
    value: V,
) -> Result<(ComponentIdentity, V)> {
    let pattern = ComponentIdentity::parse(name).map_err(|source| SourceError::Record {
        name: name.to_string(),
        source,
    })?;
    Ok((pattern, value))
}
