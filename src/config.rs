//! Resolution configuration.
//!
//! ```toml
//! [relations]
//! do_relation_time_attachment = true
//! expand_relations_in_list_mentions = true
//! event_relation_patterns = "patterns/event-relations.sexp"
//! relation_validation_str = "NONE"
//!
//! [values]
//! event_value_engine = "deprecated"
//! temporal_threshold = 0.6
//! temporal_attachment_mode = "manual"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{ResolutionError, ResolutionResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolutionConfig {
    pub relations: RelationOptions,
    pub values: ValueOptions,
    pub coref: CorefOptions,
    pub forest: ForestOptions,
}

impl ResolutionConfig {
    pub fn from_toml_str(text: &str) -> ResolutionResult<Self> {
        toml::from_str(text).map_err(|e| ResolutionError::unexpected_input(format!("configuration: {}", e)))
    }

    pub fn from_path(path: impl AsRef<Path>) -> ResolutionResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ResolutionError::load(path, e))?;
        let mut config: ResolutionConfig =
            toml::from_str(&text).map_err(|e| ResolutionError::load(path, e))?;
        // relative pattern paths are resolved against the configuration file
        if let (Some(patterns), Some(dir)) = (&config.relations.event_relation_patterns, path.parent()) {
            if patterns.is_relative() {
                config.relations.event_relation_patterns = Some(dir.join(patterns));
            }
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelationOptions {
    pub do_relation_time_attachment: bool,
    pub do_specific_family_relations: bool,
    pub expand_relations_in_list_mentions: bool,
    pub event_relation_patterns: Option<PathBuf>,
    pub relation_validation_str: Option<String>,
    /// Turns the structural document relation finder on; when on it replaces
    /// the zoned and pattern finders.
    pub find_structural_relations: bool,
    pub use_zoned_relation_finder: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventValueEngine {
    #[default]
    None,
    Deprecated,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalAttachmentMode {
    Automatic,
    #[default]
    Manual,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValueOptions {
    pub event_value_engine: EventValueEngine,
    pub temporal_threshold: f64,
    pub temporal_attachment_mode: TemporalAttachmentMode,
    /// `(value type, regex over the space-joined sentence)` rules for the
    /// pattern engine.
    pub value_patterns: Vec<(String, String)>,
}

impl Default for ValueOptions {
    fn default() -> Self {
        ValueOptions {
            event_value_engine: EventValueEngine::None,
            temporal_threshold: 0.5,
            temporal_attachment_mode: TemporalAttachmentMode::Manual,
            value_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorefOptions {
    pub link_threshold: f64,
    pub max_context_size: usize,
    pub link_pronouns: bool,
}

impl Default for CorefOptions {
    fn default() -> Self {
        CorefOptions {
            link_threshold: 0.5,
            max_context_size: 500,
            link_pronouns: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForestOptions {
    pub resolve_pronouns: bool,
    pub include_modifiers: bool,
}

impl Default for ForestOptions {
    fn default() -> Self {
        ForestOptions {
            resolve_pronouns: true,
            include_modifiers: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_sections_use_defaults() {
        let config = ResolutionConfig::from_toml_str("[relations]\ndo_specific_family_relations = true\n")
            .expect("valid toml");
        assert!(config.relations.do_specific_family_relations);
        assert!(!config.relations.expand_relations_in_list_mentions);
        assert_eq!(config.values.temporal_threshold, 0.5);
        assert_eq!(config.values.temporal_attachment_mode, TemporalAttachmentMode::Manual);
        assert!(config.forest.resolve_pronouns);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = ResolutionConfig::from_toml_str("[relations]\nexpand_everything = true\n").unwrap_err();
        assert!(matches!(err, ResolutionError::UnexpectedInput { .. }));
    }

    #[test]
    fn engine_names_are_lowercase() {
        let config = ResolutionConfig::from_toml_str(
            "[values]\nevent_value_engine = \"pattern\"\ntemporal_attachment_mode = \"automatic\"\n",
        )
        .expect("valid toml");
        assert_eq!(config.values.event_value_engine, EventValueEngine::Pattern);
        assert_eq!(config.values.temporal_attachment_mode, TemporalAttachmentMode::Automatic);
    }

    #[test]
    fn pattern_path_is_relative_to_config_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("resolution.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "[relations]\nevent_relation_patterns = \"patterns.sexp\"").expect("write");
        let config = ResolutionConfig::from_path(&path).expect("load");
        assert_eq!(
            config.relations.event_relation_patterns,
            Some(dir.path().join("patterns.sexp"))
        );
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = ResolutionConfig::from_path("/nonexistent/resolution.toml").unwrap_err();
        assert!(matches!(err, ResolutionError::Load { .. }));
    }
}
