//! Loading translation fragments from source files.

pub mod fragment;
