// src/recipe/render.rs

//! Render recipe files from Tera templates
//!
//! Three templates make up a recipe: `meta.yaml.tera` and one build script,
//! `build.sh.tera` for python kinds or `build.lib.sh.tera` for plain
//! payload kinds. Built-in copies are compiled into the binary; files with
//! the same names in an override directory replace them.

use crate::error::{Error, Result};
use crate::manifest::PackageKind;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tera::Tera;
use tracing::debug;

use super::context::RenderContext;

pub const META_TEMPLATE: &str = "meta.yaml.tera";
pub const BUILD_TEMPLATE: &str = "build.sh.tera";
pub const BUILD_LIB_TEMPLATE: &str = "build.lib.sh.tera";

const BUILTIN_TEMPLATES: [(&str, &str); 3] = [
    (META_TEMPLATE, include_str!("../../templates/meta.yaml.tera")),
    (BUILD_TEMPLATE, include_str!("../../templates/build.sh.tera")),
    (BUILD_LIB_TEMPLATE, include_str!("../../templates/build.lib.sh.tera")),
];

/// Rendered recipe files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecipe {
    pub meta_yaml: String,
    pub build_sh: String,
}

/// Paths written for a recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFiles {
    pub meta_yaml: PathBuf,
    pub build_sh: PathBuf,
}

/// Format a Tera error with its causes
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Template renderer for recipe files
pub struct RecipeRenderer {
    tera: Tera,
}

impl RecipeRenderer {
    /// Load the built-in templates, replacing any found in `overrides`
    pub fn new(overrides: Option<&Path>) -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);

        for (name, builtin) in BUILTIN_TEMPLATES {
            let custom = overrides.map(|dir| dir.join(name)).filter(|p| p.is_file());
            let source = match &custom {
                Some(path) => {
                    debug!("Using template override {}", path.display());
                    fs::read_to_string(path).map_err(|e| {
                        Error::IoError(format!("Failed to read template {}: {}", path.display(), e))
                    })?
                }
                None => builtin.to_string(),
            };

            tera.add_raw_template(name, &source)
                .map_err(|e| Error::TemplateError(format!("{}: {}", name, describe(&e))))?;
        }

        Ok(Self { tera })
    }

    /// Build script template for a package kind
    pub fn build_template(kind: PackageKind) -> &'static str {
        if kind.is_plain() {
            BUILD_LIB_TEMPLATE
        } else {
            BUILD_TEMPLATE
        }
    }

    fn render_one(&self, name: &str, context: &tera::Context) -> Result<String> {
        self.tera
            .render(name, context)
            .map_err(|e| Error::TemplateError(format!("{}: {}", name, describe(&e))))
    }

    /// Render both recipe files to strings
    pub fn render(&self, context: &RenderContext) -> Result<RenderedRecipe> {
        let kind = PackageKind::from_str(&context.kind)?;
        let tera_context = context.to_tera()?;

        Ok(RenderedRecipe {
            meta_yaml: self.render_one(META_TEMPLATE, &tera_context)?,
            build_sh: self.render_one(Self::build_template(kind), &tera_context)?,
        })
    }

    /// Render and write `meta.yaml` and an executable `build.sh` into `out_dir`
    pub fn write(&self, context: &RenderContext, out_dir: &Path) -> Result<RecipeFiles> {
        let rendered = self.render(context)?;
        let files = RecipeFiles {
            meta_yaml: out_dir.join("meta.yaml"),
            build_sh: out_dir.join("build.sh"),
        };

        fs::write(&files.meta_yaml, rendered.meta_yaml).map_err(|e| {
            Error::IoError(format!("Failed to write {}: {}", files.meta_yaml.display(), e))
        })?;
        fs::write(&files.build_sh, rendered.build_sh).map_err(|e| {
            Error::IoError(format!("Failed to write {}: {}", files.build_sh.display(), e))
        })?;
        fs::set_permissions(&files.build_sh, fs::Permissions::from_mode(0o755))?;

        Ok(files)
    }
}
