// src/recipe/compose.rs

//! Run dependency and test command composition
//!
//! Run dependencies merge, in order: `extras.needs`, the rules'
//! `python_site_requires` entry (extension packages only), then the
//! DSO-scan output. Duplicates are dropped by plain string equality, so
//! `"numpy >=1.26"` and `"numpy"` are both kept.
//!
//! Test commands are never deduplicated.

use crate::manifest::{PackageDescriptor, PackageKind, Rules, Value};
use indexmap::IndexSet;

/// Import template used when the rules define no `import_only` snippet
pub const DEFAULT_IMPORT_TEMPLATE: &str = "python -c \"import {module}; print('OK')\"";

/// Test command for python packages that end up with no other tests
pub const FALLBACK_PYTHON_TEST: &str = "python -V";

/// Keep the first occurrence of each string
pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    items.into_iter().collect::<IndexSet<String>>().into_iter().collect()
}

/// Runtime dependencies for a package
pub fn compute_run_deps(
    descriptor: &PackageDescriptor,
    rules: &Rules,
    auto_deps: &[String],
) -> Vec<String> {
    let mut run_deps = descriptor
        .extra("needs")
        .map(Value::string_list)
        .unwrap_or_default();

    if descriptor.kind == PackageKind::PythonExt
        && let Some(reqs) = rules.python_site_requires.get(&descriptor.name)
    {
        run_deps.extend(reqs.iter().cloned());
    }

    run_deps.extend(auto_deps.iter().cloned());

    dedup_preserving_order(run_deps)
}

/// Command asserting that a library is installed into `$PREFIX/lib`
pub fn soname_check(soname: &str) -> String {
    format!("bash -c 'test -e \"$PREFIX/lib/{}\"'", soname)
}

/// Smoke-test commands for a package
pub fn compute_test_cmds(descriptor: &PackageDescriptor, rules: &Rules) -> Vec<String> {
    let mut cmds = Vec::new();

    let modules = descriptor
        .extra("ensure_modules")
        .map(Value::string_list)
        .unwrap_or_default();
    if !modules.is_empty() {
        let template = rules
            .test_snippets
            .get("import_only")
            .map(String::as_str)
            .unwrap_or(DEFAULT_IMPORT_TEMPLATE);
        cmds.extend(modules.iter().map(|m| template.replace("{module}", m)));
    }

    if let Some(extra_cmds) = descriptor.extra("test_cmds") {
        cmds.extend(extra_cmds.string_list());
    }

    // Library packages assert they ship what other packages map to them
    if descriptor.kind.is_plain() {
        cmds.extend(
            rules
                .provided_by(&descriptor.name)
                .into_iter()
                .map(soname_check),
        );
    }

    if descriptor.kind == PackageKind::Bin
        && let Some(bin_cmds) = rules.bin_tests.get(&descriptor.name)
    {
        cmds.extend(bin_cmds.iter().cloned());
    }

    if cmds.is_empty() && descriptor.kind.is_python() {
        cmds.push(FALLBACK_PYTHON_TEST.to_string());
    }

    cmds
}

/// Run dependencies and test commands for a package
pub fn compose(
    descriptor: &PackageDescriptor,
    rules: &Rules,
    auto_deps: &[String],
) -> (Vec<String>, Vec<String>) {
    (
        compute_run_deps(descriptor, rules, auto_deps),
        compute_test_cmds(descriptor, rules),
    )
}
