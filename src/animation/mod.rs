pub(crate) mod eased;
pub(crate) mod engine;
pub(crate) mod spring;
