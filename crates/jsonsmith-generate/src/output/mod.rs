//! Output sink helpers.

mod counting;

pub use counting::CountingWriter;
