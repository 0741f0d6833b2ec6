//! Request target to file path mapping

use crate::config::StaticFilesConfig;
use std::path::PathBuf;

/// Outcome of routing a request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Path of the file to serve, under the served root
    File(PathBuf),
    /// Target contains a traversal sequence; nothing is looked up
    Forbidden,
}

/// Maps request targets onto the served root.
///
/// The traversal guard is a plain substring test for `..` on the raw
/// target. Percent-encoded dots are not decoded, so `%2e%2e` names a
/// literal file and never reaches a parent directory.
#[derive(Debug, Clone)]
pub struct Router {
    root: PathBuf,
    index: String,
}

impl Router {
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index: index.into(),
        }
    }

    pub fn from_config(cfg: &StaticFilesConfig) -> Self {
        Self::new(&cfg.root, &cfg.index)
    }

    pub fn route(&self, target: &str) -> Route {
        if target.contains("..") {
            return Route::Forbidden;
        }

        let relative = match target {
            "/" => self.index.as_str(),
            _ => target,
        };

        // A leading slash would make the join replace the root
        Route::File(self.root.join(relative.trim_start_matches('/')))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_target_uses_index() {
        let router = Router::new("public", "index.html");
        assert_eq!(router.route("/"), Route::File(PathBuf::from("public/index.html")));
    }

    #[test]
    fn leading_slashes_stay_under_root() {
        let router = Router::new("public", "index.html");
        assert_eq!(
            router.route("//etc/passwd"),
            Route::File(PathBuf::from("public/etc/passwd"))
        );
    }
}
