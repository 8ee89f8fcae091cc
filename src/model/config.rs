use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which inline metadata syntaxes are recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataParseMode {
    /// `📅 2024-01-01`
    Emoji,
    /// `[due:: 2024-01-01]`
    Dataview,
    #[default]
    Both,
}

impl MetadataParseMode {
    pub fn emoji(self) -> bool {
        matches!(self, MetadataParseMode::Emoji | MetadataParseMode::Both)
    }

    pub fn dataview(self) -> bool {
        matches!(self, MetadataParseMode::Dataview | MetadataParseMode::Both)
    }
}

/// Parser configuration, loaded from TOML or built in code.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub parse_metadata: bool,
    pub metadata_parse_mode: MetadataParseMode,
    pub parse_tags: bool,
    pub parse_comments: bool,
    pub parse_headings: bool,
    pub max_indent_size: usize,
    pub max_parse_iterations: usize,
    pub max_metadata_iterations: usize,
    pub max_tag_length: usize,
    pub max_emoji_value_length: usize,
    pub max_stack_operations: usize,
    pub max_stack_size: usize,
    /// Marker emoji -> field name (`dueDate`, `priority`, ...)
    pub emoji_mapping: IndexMap<String, String>,
    /// Tag namespace -> field name, e.g. `project` for `#project/foo`
    pub special_tag_prefixes: IndexMap<String, String>,
    /// Status name -> checkbox character
    pub status_mapping: IndexMap<String, char>,
    pub project_config: ProjectConfig,
    pub file_metadata_inheritance: InheritanceConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            parse_metadata: true,
            metadata_parse_mode: MetadataParseMode::Both,
            parse_tags: true,
            parse_comments: false,
            parse_headings: false,
            max_indent_size: 8,
            max_parse_iterations: 4000,
            max_metadata_iterations: 400,
            max_tag_length: 100,
            max_emoji_value_length: 200,
            max_stack_operations: 4000,
            max_stack_size: 1000,
            emoji_mapping: default_emoji_mapping(),
            special_tag_prefixes: default_special_tag_prefixes(),
            status_mapping: default_status_mapping(),
            project_config: ProjectConfig::default(),
            file_metadata_inheritance: InheritanceConfig::default(),
        }
    }
}

fn default_emoji_mapping() -> IndexMap<String, String> {
    [
        ("📅", "dueDate"),
        ("🛫", "startDate"),
        ("⏳", "scheduledDate"),
        ("✅", "completedDate"),
        ("❌", "cancelledDate"),
        ("➕", "createdDate"),
        ("🔁", "recurrence"),
        ("🏁", "onCompletion"),
        ("⛔", "dependsOn"),
        ("🆔", "id"),
        ("🔺", "priority"),
        ("⏫", "priority"),
        ("🔼", "priority"),
        ("🔽", "priority"),
        ("⏬", "priority"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_special_tag_prefixes() -> IndexMap<String, String> {
    [
        ("project", "project"),
        ("area", "area"),
        ("context", "context"),
        ("@", "context"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_status_mapping() -> IndexMap<String, char> {
    [
        ("todo", ' '),
        ("done", 'x'),
        ("cancelled", '-'),
        ("forwarded", '>'),
        ("scheduled", '<'),
        ("important", '!'),
        ("question", '?'),
        ("incomplete", '/'),
        ("paused", 'p'),
        ("pro", 'P'),
        ("con", 'C'),
        ("quote", 'Q'),
        ("note", 'N'),
        ("bookmark", 'b'),
        ("information", 'i'),
        ("savings", 'S'),
        ("idea", 'I'),
        ("location", 'l'),
        ("phone", 'k'),
        ("win", 'w'),
        ("key", 'K'),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Project detection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub enable_enhanced_project: bool,
    #[serde(default)]
    pub path_mappings: Vec<PathMapping>,
    #[serde(default)]
    pub metadata_config: MetadataKeyConfig,
    #[serde(default)]
    pub config_file: ConfigFileConfig,
    #[serde(default)]
    pub metadata_mappings: Vec<MetadataMapping>,
    #[serde(default)]
    pub default_project_naming: DefaultProjectNaming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathMapping {
    /// Substring of the file path, or a glob when it contains `*` / `?`
    pub path_pattern: String,
    pub project_name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataKeyConfig {
    #[serde(default = "default_metadata_key")]
    pub metadata_key: String,
    #[serde(default)]
    pub enabled: bool,
}

impl Default for MetadataKeyConfig {
    fn default() -> Self {
        MetadataKeyConfig {
            metadata_key: default_metadata_key(),
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFileConfig {
    #[serde(default = "default_config_file_name")]
    pub file_name: String,
    /// Only consulted by the host when it locates the file
    #[serde(default)]
    pub search_recursively: bool,
    #[serde(default)]
    pub enabled: bool,
}

impl Default for ConfigFileConfig {
    fn default() -> Self {
        ConfigFileConfig {
            file_name: default_config_file_name(),
            search_recursively: false,
            enabled: false,
        }
    }
}

/// Renames a file metadata key before resolution, e.g. `proj` -> `project`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataMapping {
    pub source_key: String,
    pub target_key: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    #[default]
    Filename,
    Foldername,
    Metadata,
}

impl NamingStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            NamingStrategy::Filename => "filename",
            NamingStrategy::Foldername => "foldername",
            NamingStrategy::Metadata => "metadata",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultProjectNaming {
    #[serde(default)]
    pub strategy: NamingStrategy,
    #[serde(default)]
    pub strip_extension: bool,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InheritanceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub inherit_from_frontmatter: bool,
    #[serde(default)]
    pub inherit_from_frontmatter_for_subtasks: bool,
}

impl Default for InheritanceConfig {
    fn default() -> Self {
        InheritanceConfig {
            enabled: true,
            inherit_from_frontmatter: true,
            inherit_from_frontmatter_for_subtasks: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_metadata_key() -> String {
    "project".to_string()
}

fn default_config_file_name() -> String {
    "project.md".to_string()
}
