//! Document generator: fixed multi-section intake report
//!
//! Layout turns a validated record into lines, render assembles them into a
//! PDF, and security applies optional password protection to the finished
//! document.

pub mod layout;
pub mod render;
pub mod security;

pub use layout::{build_lines, Line, NOT_PROVIDED, REPORT_TITLE};
pub use render::{render, DocumentProtection, RenderOptions, RenderedDocument};
pub use security::Permissions;
