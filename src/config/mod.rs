pub(crate) mod scene;
