// src/recipe/context.rs

//! Template context for one package recipe

use crate::manifest::{PackageDescriptor, PythonVersion, Rules, Value};
use indexmap::IndexMap;
use serde::Serialize;

use super::compose::compose;

/// Flattened values handed to the recipe templates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderContext {
    pub name: String,
    pub version: String,
    pub build_number: u64,
    pub kind: String,
    pub run_deps: Vec<String>,
    pub test_cmds: Vec<String>,
    pub summary: String,
    pub missing_dso: Vec<String>,
    pub extras: Value,
    pub pyver: String,
    pub pyabi: String,
    pub map_run_deps: IndexMap<String, String>,
}

impl RenderContext {
    /// Compose the context for a package
    ///
    /// `python` is the run-wide interpreter version; per-package extras
    /// override it here.
    pub fn build(
        descriptor: &PackageDescriptor,
        rules: &Rules,
        version: &str,
        auto_deps: &[String],
        python: &PythonVersion,
    ) -> Self {
        let (run_deps, test_cmds) = compose(descriptor, rules, auto_deps);
        let python = python.for_package(descriptor);

        Self {
            name: descriptor.name.clone(),
            version: version.to_string(),
            build_number: descriptor.build_number,
            kind: descriptor.kind.as_str().to_string(),
            run_deps,
            test_cmds,
            summary: format!("Wrapped from Debian packages: {}", descriptor.debs.join(", ")),
            missing_dso: descriptor.missing_dso.clone(),
            extras: descriptor.extras.clone(),
            pyver: python.pyver,
            pyabi: python.pyabi,
            map_run_deps: rules.map_run_deps.clone(),
        }
    }

    /// Convert to a Tera context
    pub fn to_tera(&self) -> crate::Result<tera::Context> {
        tera::Context::from_serialize(self)
            .map_err(|e| crate::Error::TemplateError(format!("Invalid render context: {}", e)))
    }
}
