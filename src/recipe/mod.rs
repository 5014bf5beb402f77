// src/recipe/mod.rs

//! Recipe composition and rendering
//!
//! A recipe is the pair of conda-build files generated per package:
//! `meta.yaml` and an executable `build.sh`. Their content comes from a
//! [`RenderContext`] that merges the descriptor's explicit settings, the
//! DSO-scan results and the rules' test policies.
//!
//! # Example Output Layout
//!
//! ```text
//! workspace/recipes/opencv/
//! ├── debs/
//! │   └── python3-opencv_4.6.0+dfsg-1_riscv64.deb
//! └── recipes/
//!     ├── meta.yaml
//!     └── build.sh
//! ```

mod compose;
mod context;
mod render;

pub use compose::{
    compose, compute_run_deps, compute_test_cmds, dedup_preserving_order, soname_check,
    DEFAULT_IMPORT_TEMPLATE, FALLBACK_PYTHON_TEST,
};
pub use context::RenderContext;
pub use render::{
    RecipeFiles, RecipeRenderer, RenderedRecipe, BUILD_LIB_TEMPLATE, BUILD_TEMPLATE,
    META_TEMPLATE,
};
