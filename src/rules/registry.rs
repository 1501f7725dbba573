//! Rule registry: unique by id, frozen after startup.

use super::{builtin_rules, Rule};
use crate::analyzer::Category;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Holds registered rules keyed by id. Registering the same id twice
/// replaces the earlier rule. Iteration order is always sorted by id.
#[derive(Default)]
pub struct Registry {
    rules: BTreeMap<&'static str, Arc<dyn Rule>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with every built-in rule.
    pub fn with_builtin_rules() -> Self {
        let mut registry = Self::new();
        for rule in builtin_rules() {
            registry.register(rule);
        }
        registry
    }

    pub fn register(&mut self, rule: Arc<dyn Rule>) {
        self.rules.insert(rule.id(), rule);
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(id)
    }

    /// All rules, sorted by id.
    pub fn all(&self) -> Vec<Arc<dyn Rule>> {
        self.rules.values().cloned().collect()
    }

    /// Rules of one category, sorted by id.
    pub fn by_category(&self, category: Category) -> Vec<Arc<dyn Rule>> {
        self.rules
            .values()
            .filter(|r| r.category() == category)
            .cloned()
            .collect()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Diagnostic, Severity};
    use crate::parser::Dockerfile;
    use crate::rules::Context;

    struct Dummy(&'static str);

    impl Rule for Dummy {
        fn id(&self) -> &'static str {
            self.0
        }
        fn name(&self) -> &'static str {
            "dummy"
        }
        fn description(&self) -> &'static str {
            "dummy rule"
        }
        fn category(&self) -> Category {
            Category::Style
        }
        fn severity(&self) -> Severity {
            Severity::Hint
        }
        fn check(&self, _df: &Dockerfile, _ctx: &Context) -> Vec<Diagnostic> {
            Vec::new()
        }
    }

    #[test]
    fn registration_is_unique_by_id() {
        let mut registry = Registry::new();
        registry.register(Arc::new(Dummy("X001")));
        registry.register(Arc::new(Dummy("X001")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn all_is_sorted_by_id() {
        let mut registry = Registry::new();
        registry.register(Arc::new(Dummy("B002")));
        registry.register(Arc::new(Dummy("A001")));
        registry.register(Arc::new(Dummy("C003")));
        let ids: Vec<&str> = registry.all().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["A001", "B002", "C003"]);
    }

    #[test]
    fn builtin_registry_resolves_known_ids() {
        let registry = Registry::with_builtin_rules();
        assert!(registry.get("SEC001").is_some());
        assert!(registry.get("PERF004").is_some());
        assert!(registry.get("STY001").is_some());
        assert!(registry.get("NOPE999").is_none());
        assert_eq!(registry.by_category(Category::Security).len(), 10);
        assert_eq!(registry.by_category(Category::Performance).len(), 6);
        assert_eq!(registry.by_category(Category::BestPractice).len(), 5);
        assert_eq!(registry.by_category(Category::Style).len(), 1);
    }
}
