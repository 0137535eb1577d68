//! Project files: the persisted JSON schema and its validator.

pub(crate) mod file;
pub(crate) mod validate;
