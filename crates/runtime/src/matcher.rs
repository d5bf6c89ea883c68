use crate::error::RuntimeError;
use crate::locator::Locator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

/// Returned by [`LocatorDispatcher::match_locator`] when no rule applies.
pub const NO_MATCH: i32 = -1;

pub const WILDCARD_NUMBER: &str = "#";
pub const WILDCARD_ANY: &str = "*";

/// One dispatch rule: an authority, a wildcard path template (`#` matches a
/// numeric segment, `*` any segment) and the code to return on match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRule {
    pub authority: String,
    pub template: String,
    pub code: i32,
}

impl MatchRule {
    pub fn new(authority: impl Into<String>, template: impl Into<String>, code: i32) -> Self {
        Self {
            authority: authority.into(),
            template: template.into(),
            code,
        }
    }
}

struct CompiledRule {
    authority: String,
    segments: Vec<String>,
    code: i32,
}

/// Classifies locators against a fixed rule table.
///
/// The rule set is supplied at construction but only materialized on the
/// first `match_locator` call, under double-checked locking: the flag is
/// read unsynchronized, the lock is taken, the flag is re-checked, the
/// table is built exactly once and then published. Rules cannot be added
/// after construction.
pub struct LocatorDispatcher {
    source: Box<dyn Fn() -> Vec<MatchRule> + Send + Sync>,
    initialized: AtomicBool,
    init_lock: Mutex<()>,
    table: OnceLock<Vec<CompiledRule>>,
}

impl LocatorDispatcher {
    pub fn new(source: impl Fn() -> Vec<MatchRule> + Send + Sync + 'static) -> Self {
        Self {
            source: Box::new(source),
            initialized: AtomicBool::new(false),
            init_lock: Mutex::new(()),
            table: OnceLock::new(),
        }
    }

    /// Resolves `uri` to the code of the first matching rule, in rule
    /// declaration order, or [`NO_MATCH`].
    pub fn match_locator(&self, uri: &Locator) -> i32 {
        self.ensure_initialized();
        let table = self.table.get().expect("dispatch table initialized");
        for rule in table {
            if rule.authority == uri.authority() && segments_match(&rule.segments, uri.raw_path_segments()) {
                return rule.code;
            }
        }
        NO_MATCH
    }

    /// All rules are declared at compile time; late registration is rejected
    /// rather than silently accepted.
    pub fn add_rule(&self, _rule: MatchRule) -> Result<(), RuntimeError> {
        Err(RuntimeError::DispatcherSealed)
    }

    fn ensure_initialized(&self) {
        if !self.initialized.load(Ordering::Acquire) {
            let _guard = self.init_lock.lock().unwrap_or_else(|e| e.into_inner());
            if !self.initialized.load(Ordering::Acquire) {
                let compiled = (self.source)()
                    .into_iter()
                    .map(|rule| CompiledRule {
                        authority: rule.authority,
                        segments: rule
                            .template
                            .split('/')
                            .filter(|s| !s.is_empty())
                            .map(str::to_string)
                            .collect(),
                        code: rule.code,
                    })
                    .collect();
                let _ = self.table.set(compiled);
                self.initialized.store(true, Ordering::Release);
            }
        }
    }
}

fn segments_match(template: &[String], segments: &[String]) -> bool {
    if template.len() != segments.len() {
        return false;
    }
    template.iter().zip(segments).all(|(pattern, segment)| {
        match pattern.as_str() {
            WILDCARD_NUMBER => !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()),
            WILDCARD_ANY => true,
            literal => literal == segment,
        }
    })
}
