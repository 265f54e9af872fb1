//! `meterbill-cli` library half: the application session driven by the
//! `meterbill` binary.

pub mod pipeline;
pub mod session;
