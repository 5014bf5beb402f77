// src/manifest/rules.rs

//! Cross-ecosystem mapping rules shared by every package in a run

use super::value::Value;
use super::load_document;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::path::Path;

/// Global, read-only rules for a generation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rules {
    /// Extension package name -> extra run dependency specs
    pub python_site_requires: IndexMap<String, Vec<String>>,
    /// Shared library soname -> target package dependency spec
    pub map_run_deps: IndexMap<String, String>,
    /// Named command templates (`import_only` uses `{module}`)
    pub test_snippets: IndexMap<String, String>,
    /// Package name -> literal smoke-test commands
    pub bin_tests: IndexMap<String, Vec<String>>,
}

impl Rules {
    /// Read rules from a decoded document
    ///
    /// Missing or null sections are empty. Null or blank entries inside
    /// `map_run_deps` are dropped since they map a library to nothing.
    pub fn from_value(doc: &Value) -> Result<Self> {
        let lists = |key: &str| -> Result<IndexMap<String, Vec<String>>> {
            Ok(section(doc, key)?
                .map(|map| {
                    map.iter()
                        .map(|(k, v)| (k.clone(), v.string_list()))
                        .collect()
                })
                .unwrap_or_default())
        };
        let strings = |key: &str| -> Result<IndexMap<String, String>> {
            Ok(section(doc, key)?
                .map(|map| {
                    map.iter()
                        .filter(|(_, v)| !v.is_null())
                        .map(|(k, v)| (k.clone(), v.to_plain_string()))
                        .filter(|(_, v)| !v.trim().is_empty())
                        .collect()
                })
                .unwrap_or_default())
        };

        Ok(Self {
            python_site_requires: lists("python_site_requires")?,
            map_run_deps: strings("map_run_deps")?,
            test_snippets: strings("test_snippets")?,
            bin_tests: lists("bin_tests")?,
        })
    }

    /// Load a rules file
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_value(&load_document(path)?)
    }

    /// Shared libraries whose mapped package token equals `package`
    ///
    /// Only the first whitespace-separated word of a mapping is compared, so
    /// `"openblas >=0.3"` counts as provided by `openblas`.
    pub fn provided_by(&self, package: &str) -> Vec<&str> {
        self.map_run_deps
            .iter()
            .filter(|(_, mapped)| mapped.split_whitespace().next() == Some(package))
            .map(|(soname, _)| soname.as_str())
            .collect()
    }
}

fn section<'a>(doc: &'a Value, key: &str) -> Result<Option<&'a IndexMap<String, Value>>> {
    match doc.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Map(map)) => Ok(Some(map)),
        Some(_) => Err(Error::ConfigError(format!(
            "Rules section '{}' must be a mapping",
            key
        ))),
    }
}
