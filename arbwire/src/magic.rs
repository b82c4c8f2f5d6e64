/// Name of the environment variable holding the path of the codec
/// configuration file. If not set, defaults to
///  (1) on Linux and macOS: `$XDG_CONFIG_HOME/arbor/codec.toml` or `$HOME/.config/arbor/codec.toml`
///  (2) on Windows: `%APPDATA%\arbor\codec.toml`
pub const ENV_CODEC_CONFIG_PATH: &str = "ARBOR_CODEC_CONFIG";

/// Envelope fields.
pub const ENVELOPE_CONTEXT: &str = "Context";
pub const ENVELOPE_EXPRESSION: &str = "Expression";

/// Context fields, one per index space.
pub const CONTEXT_TYPES: &str = "Types";
pub const CONTEXT_MEMBERS: &str = "Members";
pub const CONTEXT_LABELS: &str = "Labels";

/// Type descriptor tags.
pub const TYPE_SIMPLE: &str = "::";
pub const TYPE_GENERIC: &str = "<>";
pub const TYPE_ARRAY: &str = "[]";
pub const TYPE_RECORD: &str = "{}";

/// Member descriptor tags.
pub const MEMBER_CONSTRUCTOR: &str = "c";
pub const MEMBER_FIELD: &str = "f";
pub const MEMBER_PROPERTY: &str = "p";
pub const MEMBER_METHOD: &str = "m";

/// Default bound on the nesting depth of encoded and decoded trees.
pub const DEFAULT_MAX_DEPTH: usize = 256;
