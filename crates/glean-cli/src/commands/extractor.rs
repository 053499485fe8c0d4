//! Extractor management commands.

use crate::cli::{ExtractorAction, ExtractorArgs};
use crate::error::Result;
use crate::output::Formatter;
use glean_domain::{Extractor, ExtractorStore};
use std::fs;
use std::path::Path;

/// Execute an extractor management action.
pub fn execute_extractor(
    args: ExtractorArgs,
    store: &dyn ExtractorStore,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ExtractorAction::List => {
            let listing = store.get_all()?;
            println!("{}", formatter.format_listing(&listing)?);
        }
        ExtractorAction::Show { id } => {
            let extractor = store.get(&id)?;
            println!("{}", formatter.format_extractor(&extractor)?);
        }
        ExtractorAction::Save { file } => {
            let extractor = load_definition(&file)?;
            let id = store.save(&extractor)?;
            println!("{}", formatter.success(&format!("Extractor saved: {}", id)));
        }
        ExtractorAction::Delete { id } => {
            store.delete(&id)?;
            println!("{}", formatter.success(&format!("Extractor deleted: {}", id)));
        }
    }
    Ok(())
}

/// Read and validate an extractor definition file.
fn load_definition(path: &Path) -> Result<Extractor> {
    let contents = fs::read_to_string(path)?;
    let extractor: Extractor = toml::from_str(&contents)?;
    glean_extractor::validate(&extractor)?;
    Ok(extractor)
}
