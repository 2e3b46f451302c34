//! Shared test helpers for `trail_toolchain_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::LazyLock;
use trail_toolchain_core::{Category, Diagnostic, SpecRegistry};

/// Built-in registry, constructed once per test binary.
pub static REGISTRY: LazyLock<SpecRegistry> = LazyLock::new(SpecRegistry::builtin);

/// A script that opens a sketch and arms an extrude, ready for `~ Input`.
#[allow(dead_code)]
pub const EXTRUDE_PREAMBLE: &str = "~ Command `ProCmdDashboardActivate`\n\
                                    ~ Command `ProCmdModelNew`\n\
                                    ~ Command `ProCmdSketchNew`\n\
                                    ~ Command `ProCmdExtrudeDashboard`\n";

/// Issues of one category, in report order.
#[allow(dead_code)]
pub fn of_category(issues: &[Diagnostic], category: Category) -> Vec<&Diagnostic> {
    issues.iter().filter(|d| d.category == category).collect()
}

/// Find the first diagnostic with the given ID.
#[allow(dead_code)]
pub fn find_diag<'a>(issues: &'a [Diagnostic], id: &str) -> Option<&'a Diagnostic> {
    issues.iter().find(|d| d.id == id)
}
