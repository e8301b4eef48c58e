//! `sitesmith` - Static-site migration tools for legacy JSX+JSON trees
//!
//! This library converts a legacy React-era content tree (JSON page records
//! plus JSX analysis components) into self-contained static entity
//! directories, and repairs mojibake in already-published output.

pub mod build;
pub mod cli;
pub mod entity;
pub mod error;
pub mod extract;
pub mod fixup;
pub mod group;
pub mod logging;
pub mod markup;
pub mod pipeline;
pub mod record;
pub mod score;
pub mod text;
