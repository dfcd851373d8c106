pub(crate) mod canvas;
pub(crate) mod gap_fill;
pub(crate) mod scatter;
