//! Command implementations.

pub mod index;
pub mod lines;
pub mod matching;
pub mod profile;
pub mod reference;
pub mod segment;

pub use self::index::execute_index;
pub use self::lines::execute_lines;
pub use self::matching::execute_match;
pub use self::profile::execute_profile;
pub use self::reference::execute_reference;
pub use self::segment::execute_segment;

use crate::cli::{EngineArgs, PresetArg};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::oracle::AnyOracle;
use clauseflow_extractor::{ExtractorConfig, InMemoryLibrary, Pipeline};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a plain-text document.
pub(crate) fn read_document(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = text.len(), "Read document");
    Ok(text)
}

/// Engine settings from the config file, overridden by command-line flags.
pub(crate) fn extractor_config(config: &Config, engine: &EngineArgs) -> Result<ExtractorConfig> {
    let mut extractor = match engine.preset {
        Some(PresetArg::Aggressive) => ExtractorConfig::aggressive(),
        Some(PresetArg::Lenient) => ExtractorConfig::lenient(),
        None => config.extractor.clone(),
    };
    if let Some(max_lines) = engine.max_lines {
        extractor.max_lines_per_call = Some(max_lines);
    }
    if let Some(overlap) = engine.overlap {
        extractor.chunk_overlap_lines = overlap;
    }

    let profile = config.get_active_profile()?;
    extractor.model_name = profile.model.clone();

    extractor.validate().map_err(CliError::InvalidInput)?;
    Ok(extractor)
}

/// Pipeline backed by the active profile's oracle.
pub(crate) fn build_pipeline(config: &Config, engine: &EngineArgs) -> Result<Pipeline<AnyOracle>> {
    let extractor = extractor_config(config, engine)?;
    let oracle = AnyOracle::from_profile(config.get_active_profile()?)?;
    Ok(Pipeline::new(oracle, extractor)?)
}

/// Load a reference library file.
pub(crate) fn load_library(path: &Path) -> Result<InMemoryLibrary> {
    let contents = fs::read_to_string(path)?;
    let library = InMemoryLibrary::from_toml(&contents)?;
    debug!(path = %path.display(), entries = library.len(), "Loaded reference library");
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(preset: Option<PresetArg>, max_lines: Option<usize>, overlap: Option<usize>) -> EngineArgs {
        EngineArgs {
            preset,
            max_lines,
            overlap,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config::default();
        let extractor = extractor_config(&config, &engine(None, Some(300), Some(20))).unwrap();
        assert_eq!(extractor.max_lines_per_call(), 300);
        assert_eq!(extractor.chunk_overlap_lines, 20);
        assert_eq!(extractor.model_name, "llama3.1");
    }

    #[test]
    fn test_preset_replaces_config() {
        let config = Config::default();
        let extractor = extractor_config(&config, &engine(Some(PresetArg::Lenient), None, None)).unwrap();
        assert_eq!(extractor.chunk_overlap_lines, ExtractorConfig::lenient().chunk_overlap_lines);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let config = Config::default();
        let result = extractor_config(&config, &engine(None, Some(0), None));
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_load_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.toml");
        fs::write(
            &path,
            "[[entries]]\ncustomer = \"acme\"\nidentifier = \"SDC-Q-100\"\nversion = \"Rev C\"\n",
        )
        .unwrap();
        let library = load_library(&path).unwrap();
        assert_eq!(library.len(), 1);
    }
}
