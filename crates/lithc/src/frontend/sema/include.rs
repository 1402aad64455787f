//! `include` path resolution and cycle detection
//!
//! A quoted include path is searched relative to the including file first,
//! then in each include path. Paths are compared after canonicalization.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::DiagnosticReporter;
use crate::frontend::ast::DeclKind;
use crate::frontend::lexer::tokenize;
use crate::frontend::parser::Parser;

pub struct IncludeResolver {
    include_paths: Vec<PathBuf>,
    /// Direct includes of every file read so far
    graph: RefCell<HashMap<PathBuf, Vec<PathBuf>>>,
}

impl IncludeResolver {
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        Self {
            include_paths,
            graph: RefCell::default(),
        }
    }

    /// Canonical path of `filename` as seen from `current_dir`
    pub fn locate(&self, filename: &str, current_dir: &Path) -> Option<PathBuf> {
        std::iter::once(current_dir.join(filename))
            .chain(self.include_paths.iter().map(|dir| dir.join(filename)))
            .find(|candidate| candidate.is_file())
            .and_then(|found| fs::canonicalize(found).ok())
    }

    /// Chain of includes leading from `start` back to `target`, both ends included
    pub fn find_cycle(&self, start: &Path, target: &Path) -> Option<Vec<PathBuf>> {
        let mut visited = HashSet::new();
        let mut chain = vec![start.to_path_buf()];
        if self.walk(start, target, &mut visited, &mut chain) {
            Some(chain)
        } else {
            None
        }
    }

    fn walk(
        &self,
        file: &Path,
        target: &Path,
        visited: &mut HashSet<PathBuf>,
        chain: &mut Vec<PathBuf>,
    ) -> bool {
        if !visited.insert(file.to_path_buf()) {
            return false;
        }
        for next in self.direct_includes(file) {
            chain.push(next.clone());
            if next == target || self.walk(&next, target, visited, chain) {
                return true;
            }
            chain.pop();
        }
        false
    }

    /// Files `file` includes, read from disk once per resolver
    fn direct_includes(&self, file: &Path) -> Vec<PathBuf> {
        if let Some(known) = self.graph.borrow().get(file) {
            return known.clone();
        }
        let includes = self.read_includes(file);
        self.graph
            .borrow_mut()
            .insert(file.to_path_buf(), includes.clone());
        includes
    }

    /// Unreadable files and unresolvable entries are skipped
    fn read_includes(&self, file: &Path) -> Vec<PathBuf> {
        let Ok(source) = fs::read_to_string(file) else {
            return Vec::new();
        };
        let mut reporter = DiagnosticReporter::new();
        let tokens = tokenize(&source, file.display().to_string(), &mut reporter);
        let program = Parser::new(tokens, &mut reporter).parse();

        let dir = file.parent().unwrap_or_else(|| Path::new("."));
        program
            .declarations
            .iter()
            .filter_map(|decl| match &decl.kind {
                DeclKind::Include(include) => self.locate(&include.path, dir),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    #[test]
    fn test_locate_prefers_current_dir() {
        let resolver = IncludeResolver::new(vec![fixtures().join("lib")]);
        let found = resolver.locate("helpers.li", &fixtures()).unwrap();
        assert_eq!(found, fs::canonicalize(fixtures().join("helpers.li")).unwrap());
    }

    #[test]
    fn test_locate_falls_back_to_include_paths() {
        let resolver = IncludeResolver::new(vec![fixtures().join("lib")]);
        let found = resolver.locate("shared.li", &fixtures()).unwrap();
        assert!(found.ends_with("lib/shared.li"));
        assert!(resolver.locate("missing.li", &fixtures()).is_none());
    }

    #[test]
    fn test_find_cycle() {
        let resolver = IncludeResolver::new(Vec::new());
        let a = fs::canonicalize(fixtures().join("cycle_a.li")).unwrap();
        let b = fs::canonicalize(fixtures().join("cycle_b.li")).unwrap();
        assert_eq!(resolver.find_cycle(&b, &a), Some(vec![b.clone(), a.clone()]));

        let helpers = fs::canonicalize(fixtures().join("helpers.li")).unwrap();
        assert_eq!(resolver.find_cycle(&helpers, &a), None);
    }

    #[test]
    fn test_include_graph_is_read_once() {
        let dir = std::env::temp_dir().join(format!("lithc_include_cache_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("top.li"), "include \"leaf.li\"\n").unwrap();
        fs::write(dir.join("leaf.li"), "let x = 1\n").unwrap();
        let top = fs::canonicalize(dir.join("top.li")).unwrap();
        let leaf = fs::canonicalize(dir.join("leaf.li")).unwrap();

        let resolver = IncludeResolver::new(Vec::new());
        assert_eq!(resolver.find_cycle(&leaf, &top), None);

        fs::write(dir.join("leaf.li"), "include \"top.li\"\n").unwrap();
        assert_eq!(resolver.find_cycle(&leaf, &top), None);

        let fresh = IncludeResolver::new(Vec::new());
        assert_eq!(fresh.find_cycle(&leaf, &top), Some(vec![leaf.clone(), top.clone()]));
        fs::remove_dir_all(&dir).unwrap();
    }
}
