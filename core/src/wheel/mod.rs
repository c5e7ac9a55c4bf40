//! Wheel naming, metadata, tagging, archive assembly, and verification.
//!
//! Turns an arbitrary executable into an installable wheel whose layout,
//! filenames and RECORD hashes follow the binary distribution format.
//!
//! # Sub-modules
//!
//! - [`archive`] - Deterministic zip assembly with RECORD written last.
//! - [`error`] - Validation error types (`WheelError`).
//! - [`layout`] - Staged layout categories and archive member ordering.
//! - [`metadata`] - METADATA composition and parsing (`DistributionRecord`).
//! - [`naming`] - Wheel filename and directory naming (`WheelName`).
//! - [`package_name`] - Distribution name newtype (`PackageName`).
//! - [`packaging`] - Packaging a single executable (`package_executable`).
//! - [`packaging_error`] - Error types for packaging operations.
//! - [`platform`] - Host platform tag detection.
//! - [`record`] - RECORD manifest hashing, rendering and parsing.
//! - [`tags`] - Compatibility tag sets and resolution (`TagTriple`).
//! - [`verification`] - Checking a finished wheel against its RECORD.
//! - [`wheel_info`] - The WHEEL format descriptor.

pub mod archive;
pub mod error;
pub mod layout;
pub mod metadata;
pub mod naming;
pub mod package_name;
pub mod packaging;
pub mod packaging_error;
pub mod platform;
pub mod record;
pub mod tags;
pub mod verification;
pub mod wheel_info;
