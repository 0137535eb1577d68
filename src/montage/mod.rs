//! Montage: virtual concatenation of frame ranges from several projects.

pub(crate) mod chunk;
pub(crate) mod timeline;
