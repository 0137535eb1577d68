pub(crate) mod delta;
pub(crate) mod stack;
