use compact_str::CompactString;

/// Identifier text used for variables, functions, classes and type names.
pub type Name = CompactString;
