//! Version formats and the engine built on top of them
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Checker   │────▶│  Registry   │────▶│   Formats   │
//! │ (advisory)  │     │ (by name)   │     │ (rpm, dpkg, │
//! └─────────────┘     └─────────────┘     │ pep440, ...)│
//!                                         └─────────────┘
//!                                                │
//!                                                ▼
//!                                  ┌──────────────────────────┐
//!                                  │ Sentinel / Range helpers │
//!                                  └──────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`parser`]: The `VersionParser` trait every format implements
//! - [`registry`]: Name-keyed registry of parsers
//! - [`formats`]: Built-in rpm, dpkg, pep440 and semver formats
//! - [`sentinel`]: `#MINV#` / `#MAXV#` bounds shared by every format
//! - [`range`]: Comparator range grammar for rpm and dpkg
//! - [`srpm`]: Source RPM file name splitting
//! - [`checker`]: Advisory matching for installed packages
//! - [`error`]: Error types

pub mod checker;
pub mod error;
pub mod formats;
pub mod parser;
pub mod range;
pub mod registry;
pub mod sentinel;
pub mod srpm;
