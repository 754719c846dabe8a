//! Read entities definitions.

pub mod product;
