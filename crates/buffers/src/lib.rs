//! Binary buffer primitives shared by the nota codec.

mod writer;

pub use writer::Writer;
