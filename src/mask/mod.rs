pub(crate) mod gate;
pub(crate) mod handle;
pub(crate) mod pipeline;
pub(crate) mod runtime;
pub(crate) mod stages;
pub(crate) mod tensor;
pub(crate) mod worker;

#[cfg(test)]
#[path = "../../tests/unit/mask/scripted.rs"]
pub(crate) mod scripted;
