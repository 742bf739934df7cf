//! Command handlers. Each returns the text to print on stdout.

pub(crate) mod catalog;
pub(crate) mod edit;
pub(crate) mod show;
