//! Data models for ttlpaste.

/// Paste record and API payload shapes.
pub mod paste;

#[cfg(test)]
mod tests;
