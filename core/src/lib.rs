//! Core library for anybin2wheel.
//!
//! Packages a prebuilt executable as a Python wheel so it can be installed
//! with any wheel-aware installer and lands on the script path. The
//! [`wheel`] module holds the whole pipeline; the `anybin2wheel` binary is a
//! thin command-line front end over [`wheel::packaging::package_executable`].

pub mod wheel;
