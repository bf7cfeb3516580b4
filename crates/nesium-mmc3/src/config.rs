//! Static configuration owned by the core.

pub mod timing;
