//! # connector-certify
//!
//! Certification checks for connector components.
//!
//! `connector-certify` verifies that a connector follows its ecosystem's
//! conventions: licensing annotations matching the declared category,
//! functional tests paired with suites, processors and metadata categories,
//! a complete ignore file, required directory layouts and sane build
//! descriptor settings. Every failed convention becomes an
//! [`issue::Issue`]; rules never abort on a convention problem.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use connector_certify::{certify, config::Config};
//!
//! let config = Config::load(None).expect("failed to load config");
//! let report = certify::certify_dir(Path::new("./my-connector"), &config, &Default::default())
//!     .expect("failed to load component");
//!
//! for issue in &report.issues {
//!     println!("{issue}");
//! }
//! ```
//!
//! ## Architecture
//!
//! 1. **[`context`]**: read-only views of a component: the parsed source
//!    tree, the build descriptor and its files.
//! 2. **[`template`]**: path templates with single and domain
//!    placeholders, their expansion and reconciliation against real paths.
//! 3. **[`checks`]**: the rules, each implementing one of
//!    [`checks::TreeCheck`], [`checks::DescriptorCheck`] or
//!    [`checks::ResourceCheck`].
//! 4. **[`certify`]**: run checks in parallel and collect results.
//! 5. **[`issue`]**: core data types ([`issue::Issue`],
//!    [`issue::CertificationReport`]).
//! 6. **[`config`]**: TOML configuration and `.certify-ignore` suppressions.
//!
//! ## Checks
//!
//! | Key | Context |
//! |-----|---------|
//! | `license-by-category` | tree |
//! | `test-suite-annotations` | tree |
//! | `functional-test-suite-coverage` | tree |
//! | `functional-test-per-metadata-category` | tree |
//! | `functional-test-per-processor` | tree |
//! | `gitignore-exist` | resource |
//! | `[[layout]]` entries (default `readme-present`) | resource |
//! | `scope-provided-in-mule-dependencies` | descriptor |
//! | `snapshot-artifact-mandatory` | descriptor |
//! | `devkit-latest-version` | descriptor |

pub mod certify;
pub mod checks;
pub mod config;
pub mod context;
pub mod error;
pub mod issue;
pub mod template;
