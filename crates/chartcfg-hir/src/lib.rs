//! `chartcfg-hir` - Structural and semantic validation for chartcfg documents.
//!
//! This crate builds on `chartcfg-syntax` and `chartcfg-time`:
//!
//! - **Catalog**: the resource provider contract and the bundled setting catalog
//! - **Setting model**: name resolution, scope overrides and value checks
//! - **Dependency stack**: depth and required-section checks during the scan
//! - **Section tree**: the whole-document hierarchy with scope caches
//! - **Rules**: cross-setting checks over the finished tree
//! - **Diagnostics**: everything above reports here
//!
//! # Example
//!
//! ```
//! use chartcfg_hir::{validate, DiagnosticCode};
//!
//! let diagnostics = validate(
//!     "[configuration]\n[group]\n[widget]\ntype = chart\n[series]\nentity = nurswgvml007\n",
//! );
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].code, DiagnosticCode::MissingDependentSetting);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod dependency;
pub mod diagnostics;
pub mod rules;
pub mod sections;
pub mod settings;
pub mod tree;
mod validator;

pub use catalog::{Catalog, CatalogError, ResourceProvider, SettingDescriptor, ValueType};
pub use config::{ConfigError, ValidatorConfig};
pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSeverity};
pub use sections::SectionKind;
pub use tree::{SectionId, SectionTree};
pub use validator::{validate, Validator};
