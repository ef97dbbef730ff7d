pub(crate) mod compositor;
pub(crate) mod frame_loop;
pub(crate) mod surface;
