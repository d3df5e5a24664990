//! Scope environment for name resolution.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::types::Type;

#[derive(Clone, Debug, Default)]
struct TypeEnvInner {
    bindings: FxHashMap<String, Type>,
    parent: Option<TypeEnv>,
}

/// Chained lexical scope mapping names to types.
///
/// Cloning is O(1); the first mutation of a shared scope copies only that
/// scope's own table.
#[derive(Clone, Debug, Default)]
pub struct TypeEnv(Arc<TypeEnvInner>);

impl TypeEnv {
    pub fn new() -> Self {
        TypeEnv::default()
    }

    /// Create a child scope.
    #[must_use]
    pub fn child(&self) -> Self {
        TypeEnv(Arc::new(TypeEnvInner {
            bindings: FxHashMap::default(),
            parent: Some(self.clone()),
        }))
    }

    /// Bind `name` in the current scope, shadowing any outer binding.
    pub fn define(&mut self, name: impl Into<String>, ty: Type) {
        Arc::make_mut(&mut self.0).bindings.insert(name.into(), ty);
    }

    /// Look up a name, searching parent scopes.
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        let mut scope = self;
        loop {
            if let Some(ty) = scope.0.bindings.get(name) {
                return Some(ty);
            }
            scope = scope.0.parent.as_ref()?;
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Check if a name is bound in this scope, ignoring parents.
    pub fn is_bound_locally(&self, name: &str) -> bool {
        self.0.bindings.contains_key(name)
    }

    pub fn parent(&self) -> Option<&TypeEnv> {
        self.0.parent.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn child_scopes_shadow_and_fall_back() {
        let mut root = TypeEnv::new();
        root.define("x", Type::i32());
        root.define("y", Type::bool());

        let mut child = root.child();
        child.define("x", Type::string());

        assert_eq!(child.lookup("x"), Some(&Type::string()));
        assert_eq!(child.lookup("y"), Some(&Type::bool()));
        assert_eq!(root.lookup("x"), Some(&Type::i32()));
        assert!(child.is_bound_locally("x"));
        assert!(!child.is_bound_locally("y"));
        assert!(child.lookup("z").is_none());
    }

    #[test]
    fn clones_do_not_observe_later_definitions() {
        let mut env = TypeEnv::new();
        env.define("a", Type::i32());
        let snapshot = env.clone();
        env.define("b", Type::bool());
        assert!(!snapshot.is_bound("b"));
        assert!(env.is_bound("b"));
    }
}
