//! Datadown Core
//!
//! This crate provides the document model and error definitions
//! shared by the datadown parser, renderers and conversion facade.
//!
//! # Overview
//!
//! The core crate contains:
//! - [`Document`], [`Block`], [`Inline`] - The typed Markdown document tree
//! - [`ListItem`], [`TableCell`], [`Alignment`] - Supporting node types
//! - [`ConvertError`], [`ErrorKind`] - Error types

pub mod ast;
pub mod enums;
pub mod error;

pub use ast::{Block, Document, Inline, ListItem, TableCell};
pub use enums::Alignment;
pub use error::{ConvertError, ErrorKind, Result};
