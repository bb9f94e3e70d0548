//! Import script trait
//!
//! User import scripts implement `ImportScript` and drive an `Importer`:
//! fetch from the source, map, push into the staging collections, import.

use crate::importer::Importer;
use async_trait::async_trait;
use contensis_import_types::{ImportError, ImportResult};
use tracing::{error, info};

#[async_trait]
pub trait ImportScript: Send + Sync {
    /// Name used in log output
    fn name(&self) -> &str {
        "import"
    }

    /// Run the import against `importer`
    async fn run_import(&self, _importer: &mut Importer) -> ImportResult<()> {
        Err(ImportError::NotImplemented("run_import"))
    }
}

/// Run `script`, logging its outcome
pub async fn run_script(script: &dyn ImportScript, importer: &mut Importer) -> ImportResult<()> {
    let mode = if importer.commit() { "commit" } else { "preview" };
    info!("Running import script '{}' ({})", script.name(), mode);

    match script.run_import(importer).await {
        Ok(()) => {
            info!("Import script '{}' finished", script.name());
            Ok(())
        }
        Err(e) => {
            error!("Import script '{}' failed: {}", script.name(), e);
            Err(e)
        }
    }
}
