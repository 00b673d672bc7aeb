//! Prefix navigation: current-location tracking and breadcrumbs.

/// One breadcrumb segment. `key` is the prefix to re-list when the crumb
/// is navigated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub name: String,
    pub key: String,
}

/// Tracks the prefix being browsed plus the trail of prior prefixes.
///
/// The current prefix is always empty (the root) or ends with `/`.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    current_prefix: String,
    history: Vec<String>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_prefix(&self) -> &str {
        &self.current_prefix
    }

    pub fn at_root(&self) -> bool {
        self.current_prefix.is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Descend into a folder. A missing trailing `/` is appended so the
    /// prefix invariant holds for any caller-supplied key.
    pub fn enter_folder(&mut self, key: &str) {
        let old = std::mem::replace(&mut self.current_prefix, normalize_prefix(key));
        self.history.push(old);
    }

    /// Return to the previous prefix. No-op with empty history.
    pub fn go_back(&mut self) -> bool {
        match self.history.pop() {
            Some(prev) => {
                self.current_prefix = prev;
                true
            }
            None => false,
        }
    }

    /// Jump directly to a prefix (breadcrumb click). Jumping to the
    /// current prefix leaves history untouched.
    pub fn jump_to(&mut self, key: &str) {
        if normalize_prefix(key) != self.current_prefix {
            self.enter_folder(key);
        }
    }

    /// Breadcrumb trail for the current prefix, starting at the root.
    ///
    /// Each crumb's key is the cumulative path up to and including its
    /// segment plus a trailing `/`, so navigating to any crumb reproduces
    /// exactly the prefix that listing was fetched with.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb {
            name: "Root".to_string(),
            key: String::new(),
        }];

        let mut path = String::new();
        for part in self.current_prefix.split('/').filter(|p| !p.is_empty()) {
            path.push_str(part);
            path.push('/');
            crumbs.push(Breadcrumb {
                name: part.to_string(),
                key: path.clone(),
            });
        }

        crumbs
    }
}

/// A folder prefix is empty (the root) or ends with `/`.
fn normalize_prefix(key: &str) -> String {
    if key.is_empty() || key.ends_with('/') {
        key.to_string()
    } else {
        format!("{key}/")
    }
}
