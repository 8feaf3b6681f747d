use std::io::Write;

use rand::Rng;

use jsonsmith_core::{ArrayNode, Node, ObjectNode, PathSegment};

use crate::context::RunContext;
use crate::errors::GenerationError;
use crate::generators::{draw_length, write_value};

pub(super) fn write_array<R, W>(
    node: &ArrayNode,
    ctx: &RunContext,
    rng: &mut R,
    out: &mut W,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    let count = draw_length(node.length(), rng);
    out.write_all(b"[")?;
    for idx in 0..count {
        if idx > 0 {
            out.write_all(b",")?;
        }
        write_value(node.elements(), ctx, rng, out)
            .map_err(|err| err.within(PathSegment::Index(idx as usize)))?;
    }
    out.write_all(b"]")?;
    Ok(())
}

pub(super) fn write_object<R, W>(
    node: &ObjectNode,
    ctx: &RunContext,
    rng: &mut R,
    out: &mut W,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    out.write_all(b"{")?;
    if ctx.key_sorting() {
        write_fields(node.sorted_fields(), ctx, rng, out)?;
    } else {
        write_fields(node.fields(), ctx, rng, out)?;
    }
    out.write_all(b"}")?;
    Ok(())
}

fn write_fields<'a, I, R, W>(
    fields: I,
    ctx: &RunContext,
    rng: &mut R,
    out: &mut W,
) -> Result<(), GenerationError>
where
    I: Iterator<Item = (&'a str, &'a Node)>,
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    for (idx, (name, child)) in fields.enumerate() {
        if idx > 0 {
            out.write_all(b",")?;
        }
        serde_json::to_writer(&mut *out, name)?;
        out.write_all(b":")?;
        write_value(child, ctx, rng, out)
            .map_err(|err| err.within(PathSegment::Field(name.to_string())))?;
    }
    Ok(())
}
