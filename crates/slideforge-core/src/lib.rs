//! SlideForge Core - Foundational types for the SlideForge engine
//!
//! This crate provides the types every other SlideForge crate depends on:
//! - `ClassifiedError` / `ErrorCode` - the shared error taxonomy
//! - `SlideId` - Stable generated slide identifiers
//! - `StructuredContent` - the contract with the upstream analysis stage

mod content;
mod error;
mod id;

pub use content::{DataPoint, LogicalGroup, StructuredContent};
pub use error::{ClassifiedError, ErrorCode, Result};
pub use id::SlideId;
