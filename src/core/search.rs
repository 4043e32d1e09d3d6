//! Purpose: Underlying resource search over an ordered search path.
//! Exports: `ResourceSearch`, `DirSearch`.
//! Role: Opaque collaborator the resolver wraps; never filters content itself.
//! Invariants: Resource names are relative; names traversing upward match nothing.
//! Invariants: `find_all` is lazy; roots are probed only as the iterator is pulled.

use std::path::{Component, Path, PathBuf};

/// Search capability the resolver decorates.
pub trait ResourceSearch {
    /// First match for `name` on the search path, if any.
    fn find_one(&self, name: &str) -> Option<PathBuf>;

    /// All matches for `name`, lazily, in search-path order.
    fn find_all<'a>(&'a self, name: &str) -> Box<dyn Iterator<Item = PathBuf> + 'a>;
}

/// Ordered list of root directories probed like a classpath.
#[derive(Clone, Debug)]
pub struct DirSearch {
    roots: Vec<PathBuf>,
}

impl DirSearch {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

fn is_plain_relative(name: &str) -> bool {
    let path = Path::new(name);
    !path.is_absolute()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

impl ResourceSearch for DirSearch {
    fn find_one(&self, name: &str) -> Option<PathBuf> {
        self.find_all(name).next()
    }

    fn find_all<'a>(&'a self, name: &str) -> Box<dyn Iterator<Item = PathBuf> + 'a> {
        if !is_plain_relative(name) {
            return Box::new(std::iter::empty());
        }
        let name = name.to_string();
        Box::new(self.roots.iter().filter_map(move |root| {
            let candidate = root.join(&name);
            candidate.is_file().then_some(candidate)
        }))
    }
}
