//! Reference command implementation.

use super::{build_pipeline, read_document};
use crate::cli::ReferenceArgs;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use clauseflow_domain::{CustomerId, IndexedDocument};
use clauseflow_extractor::{InMemoryLibrary, ProcessedSpec};
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the reference command.
pub async fn execute_reference(
    args: ReferenceArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let doc = IndexedDocument::build(read_document(&args.file)?);
    let customer = CustomerId::new(args.customer.as_str());
    let fallback = match args.identifier {
        Some(identifier) => identifier,
        None => fallback_identifier(&args.file)?,
    };

    let pipeline = build_pipeline(config, &args.engine)?;
    let (specs, warnings) = pipeline
        .reference_processor()
        .process(&doc, &customer, &fallback)
        .await?;

    println!("{}", formatter.format_specs(&specs)?);
    if formatter.format() != OutputFormat::Json && !warnings.is_empty() {
        eprintln!("{}", formatter.format_warnings(&warnings));
    }

    if let Some(path) = &args.library {
        let added = append_to_library(path, &specs)?;
        if formatter.format() == OutputFormat::Table {
            println!(
                "{}",
                formatter.success(&format!("Added {} entries to {}", added, path.display()))
            );
        }
    }
    Ok(())
}

/// File stem of the reference document.
fn fallback_identifier(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::InvalidInput(format!(
                "Cannot derive an identifier from '{}'; pass --identifier",
                path.display()
            ))
        })
}

/// Append the specs' entries to a library file, creating it if missing.
fn append_to_library(path: &Path, specs: &[ProcessedSpec]) -> Result<usize> {
    let mut library = if path.exists() {
        InMemoryLibrary::from_toml(&fs::read_to_string(path)?)?
    } else {
        InMemoryLibrary::new()
    };
    for spec in specs {
        library.add(spec.entry.clone());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, library.to_toml()?)?;
    info!(path = %path.display(), added = specs.len(), total = library.len(), "Saved reference library");
    Ok(specs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clauseflow_domain::{LibraryEntry, LineRange};

    fn spec(identifier: &str) -> ProcessedSpec {
        ProcessedSpec {
            range: LineRange::new(1, 10),
            entry: LibraryEntry::new(CustomerId::new("acme"), identifier).with_version("Rev A"),
            requirements: Vec::new(),
        }
    }

    #[test]
    fn test_fallback_identifier_is_file_stem() {
        assert_eq!(
            fallback_identifier(Path::new("specs/SDC-Q-100.txt")).unwrap(),
            "SDC-Q-100"
        );
        assert!(fallback_identifier(Path::new("/")).is_err());
    }

    #[test]
    fn test_append_creates_then_extends_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libs").join("acme.toml");

        assert_eq!(append_to_library(&path, &[spec("SDC-Q-100")]).unwrap(), 1);
        assert_eq!(append_to_library(&path, &[spec("SDC-Q-200")]).unwrap(), 1);

        let library = InMemoryLibrary::from_toml(&fs::read_to_string(&path).unwrap()).unwrap();
        let identifiers: Vec<&str> = library.entries().iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["SDC-Q-100", "SDC-Q-200"]);
    }
}
