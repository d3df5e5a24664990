//! Checker configuration.

/// How unresolved identifiers are treated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LookupMode {
    /// Unknown names are diagnosed.
    #[default]
    Strict,
    /// Unknown names defer to `Unknown`; selected by a wildcard dynamic import.
    Permissive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Register built-in `Display` and `Clone` for primitive types.
    pub builtin_interfaces: bool,
    /// Lookup mode each module starts in.
    pub lookup_mode: LookupMode,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            builtin_interfaces: true,
            lookup_mode: LookupMode::Strict,
        }
    }
}

impl CheckerConfig {
    #[must_use]
    pub fn with_builtin_interfaces(mut self, enabled: bool) -> Self {
        self.builtin_interfaces = enabled;
        self
    }

    #[must_use]
    pub fn with_lookup_mode(mut self, mode: LookupMode) -> Self {
        self.lookup_mode = mode;
        self
    }
}
