use std::io::Write;

use rand::Rng;

use jsonsmith_core::{EnumNode, FloatNode, IntegerNode, Length, StringNode};

use crate::context::RunContext;
use crate::errors::GenerationError;

/// Fair coin from a single uniform `[0, 1)` draw.
fn draw_bool<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.random::<f64>() < 0.5
}

/// Uniform integer in `[min, max]`; constant ranges consume no randomness.
fn draw_integer<R: Rng + ?Sized>(
    node: &IntegerNode,
    rng: &mut R,
) -> Result<i64, GenerationError> {
    match node {
        IntegerNode::Range(range) if range.is_constant() => Ok(range.min()),
        IntegerNode::Range(range) => Ok(rng.random_range(range.min()..=range.max())),
        IntegerNode::Choices(choices) => pick(choices, rng)
            .copied()
            .ok_or(GenerationError::NoChoices("integer")),
    }
}

/// Uniform float in `[min, max)`; constant ranges consume no randomness.
fn draw_float<R: Rng + ?Sized>(node: &FloatNode, rng: &mut R) -> Result<f64, GenerationError> {
    match node {
        FloatNode::Range(range) if range.is_constant() => Ok(range.min()),
        FloatNode::Range(range) => {
            let (min, max) = (range.min(), range.max());
            let u = rng.random::<f64>();
            // (max - min) may overflow, so interpolate between the bounds
            let value = min * (1.0 - u) + max * u;
            Ok(if (min..max).contains(&value) { value } else { min })
        }
        FloatNode::Choices(choices) => pick(choices, rng)
            .copied()
            .ok_or(GenerationError::NoChoices("float")),
    }
}

/// Element count in `[min, max]`.
pub(crate) fn draw_length<R: Rng + ?Sized>(length: Length, rng: &mut R) -> u64 {
    if length.is_fixed() {
        length.min()
    } else {
        rng.random_range(length.min()..=length.max())
    }
}

/// Uniform choice by index; `None` only for an empty slice.
fn pick<'a, T, R: Rng + ?Sized>(choices: &'a [T], rng: &mut R) -> Option<&'a T> {
    if choices.is_empty() {
        return None;
    }
    choices.get(rng.random_range(0..choices.len()))
}

pub(super) fn write_bool<R, W>(rng: &mut R, out: &mut W) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    let literal: &[u8] = if draw_bool(rng) { b"true" } else { b"false" };
    out.write_all(literal)?;
    Ok(())
}

pub(super) fn write_integer<R, W>(
    node: &IntegerNode,
    rng: &mut R,
    out: &mut W,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    let value = draw_integer(node, rng)?;
    write!(out, "{value}")?;
    Ok(())
}

pub(super) fn write_float<R, W>(
    node: &FloatNode,
    rng: &mut R,
    out: &mut W,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    let value = draw_float(node, rng)?;
    serde_json::to_writer(&mut *out, &value)?;
    Ok(())
}

pub(super) fn write_string<R, W>(
    node: &StringNode,
    ctx: &RunContext,
    rng: &mut R,
    out: &mut W,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    match node {
        StringNode::Choices(choices) => {
            let choice = pick(choices, rng).ok_or(GenerationError::NoChoices("string"))?;
            serde_json::to_writer(&mut *out, choice)?;
        }
        StringNode::File(name) => {
            let line = ctx.sample_from(rng, name)?;
            let text = String::from_utf8_lossy(&line);
            serde_json::to_writer(&mut *out, &*text)?;
        }
    }
    Ok(())
}

pub(super) fn write_enum<R, W>(node: &EnumNode, rng: &mut R, out: &mut W) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    W: Write + ?Sized,
{
    let choice = pick(node.choices(), rng).ok_or(GenerationError::NoChoices("enum"))?;
    serde_json::to_writer(&mut *out, choice)?;
    Ok(())
}
