//! Recursive JSON writers, one per node variant.
//!
//! Values are serialized straight into the sink as they are drawn; no
//! document tree is built in memory. Failures below the root are wrapped
//! with the index or field name of each enclosing level on the way out.

mod composite;
mod primitives;

use std::io::Write;

use rand::Rng;

use jsonsmith_core::Node;

use crate::context::RunContext;
use crate::errors::GenerationError;

pub(crate) use primitives::draw_length;

/// Write one JSON value for `node` to `out`.
pub fn write_value<R, W>(
    node: &Node,
    ctx: &RunContext,
    rng: &mut R,
    out: &mut W,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    match node {
        Node::Bool => primitives::write_bool(rng, out),
        Node::Integer(integer) => primitives::write_integer(integer, rng, out),
        Node::Float(float) => primitives::write_float(float, rng, out),
        Node::String(string) => primitives::write_string(string, ctx, rng, out),
        Node::Enum(choices) => primitives::write_enum(choices, rng, out),
        Node::Array(array) => composite::write_array(array, ctx, rng, out),
        Node::Object(object) => composite::write_object(object, ctx, rng, out),
    }
}
