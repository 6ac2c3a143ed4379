use std::path::Path;
use std::path::PathBuf;

use config::Config;
use config::ConfigError;
use config::File;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::parse_record;
use crate::ComponentIdentity;
use crate::OverrideSource;
use crate::OverrideValue;
use crate::Result;

/// Reads override records from a TOML or JSON file (format detected from
/// the extension).
///
/// The file carries one ordered record array per override kind, so a
/// single file can feed both the facility and the debug-mode cache:
///
/// ```toml
/// [[facility]]
/// pattern = "Acme.Widgets"
/// value = 42
///
/// [[facility]]
/// pattern = "Acme.Gadgets, Version=1.0.0.0"
/// value = 17
///
/// [[debug]]
/// pattern = "Acme.Widgets"
/// value = true
/// ```
///
/// Arrays preserve source order, which defines overwrite order downstream.
/// A missing section means "no overrides of this kind" and loads empty.
pub struct FileOverrideSource {
    path: PathBuf,
    section: String,
}

#[derive(Debug, Deserialize)]
struct RawRecord<V> {
    pattern: String,
    value: V,
}

impl FileOverrideSource {
    pub fn new(
        path: impl Into<PathBuf>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            section: section.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<V> OverrideSource<V> for FileOverrideSource
where
    V: OverrideValue + DeserializeOwned,
{
    fn load(&self) -> Result<Vec<(ComponentIdentity, V)>> {
        let settings = Config::builder()
            .add_source(File::from(self.path.as_path()))
            .build()?;

        let raw: Vec<RawRecord<V>> = match settings.get(&self.section) {
            Ok(records) => records,
            Err(ConfigError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(
            "loaded {} `{}` record(s) from {}",
            raw.len(),
            self.section,
            self.path.display()
        );

        raw.into_iter()
            .map(|record| parse_record(&record.pattern, record.value))
            .collect()
    }
}
