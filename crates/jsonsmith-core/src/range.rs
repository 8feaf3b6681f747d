//! Inclusive numeric bounds used by integer, float and array nodes.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

use crate::error::{Result, SchemaError};
use crate::path::NodePath;

pub const DEFAULT_INT_RANGE: IntRange = IntRange { min: 0, max: 100 };
pub const DEFAULT_FLOAT_RANGE: FloatRange = FloatRange { min: 0.0, max: 1.0 };
pub const DEFAULT_LENGTH: Length = Length { min: 0, max: 10 };

/// Bound violations rejected by range constructors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("min should be less than or equal to max")]
    Inverted,
    #[error("bounds must be finite numbers")]
    NotFinite,
    #[error("length should be N or MIN,MAX, got {0:?}")]
    Malformed(String),
}

/// Integer range, inclusive on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    min: i64,
    max: i64,
}

impl IntRange {
    pub fn new(min: i64, max: i64) -> std::result::Result<Self, RangeError> {
        if min > max {
            return Err(RangeError::Inverted);
        }
        Ok(Self { min, max })
    }

    pub fn constant(value: i64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }
}

/// Float range; generation draws from `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatRange {
    min: f64,
    max: f64,
}

impl FloatRange {
    pub fn new(min: f64, max: f64) -> std::result::Result<Self, RangeError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(RangeError::NotFinite);
        }
        if min > max {
            return Err(RangeError::Inverted);
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }
}

/// Element count of an array, inclusive on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    min: u64,
    max: u64,
}

impl Length {
    pub fn new(min: u64, max: u64) -> std::result::Result<Self, RangeError> {
        if min > max {
            return Err(RangeError::Inverted);
        }
        Ok(Self { min, max })
    }

    pub fn fixed(len: u64) -> Self {
        Self { min: len, max: len }
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

impl Default for Length {
    fn default() -> Self {
        DEFAULT_LENGTH
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fixed() {
            write!(f, "{}", self.max)
        } else {
            write!(f, "{},{}", self.min, self.max)
        }
    }
}

/// Parses `N` (fixed) or `MIN,MAX`, the command-line form.
impl FromStr for Length {
    type Err = RangeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|_| RangeError::Malformed(s.to_string()))
        };
        match s.split_once(',') {
            None => Ok(Length::fixed(parse(s)?)),
            Some((min, max)) => Length::new(parse(min)?, parse(max)?),
        }
    }
}

/// How a bare scalar is interpreted when decoding bounds.
#[derive(Clone, Copy)]
enum Scalar {
    /// `11` means `max = 11`, min keeps its default.
    Max,
    /// `3` means exactly 3.
    Both,
}

pub(crate) fn decode_int_range(value: &Value, path: &NodePath) -> Result<IntRange> {
    let (min, max) = decode_bounds(
        value,
        (DEFAULT_INT_RANGE.min, DEFAULT_INT_RANGE.max),
        Scalar::Max,
        path,
    )?;
    IntRange::new(min, max).map_err(|err| SchemaError::invalid(path, format!("range: {err}")))
}

pub(crate) fn decode_float_range(value: &Value, path: &NodePath) -> Result<FloatRange> {
    let (min, max) = decode_bounds(
        value,
        (DEFAULT_FLOAT_RANGE.min, DEFAULT_FLOAT_RANGE.max),
        Scalar::Max,
        path,
    )?;
    FloatRange::new(min, max).map_err(|err| SchemaError::invalid(path, format!("range: {err}")))
}

pub(crate) fn decode_length(value: &Value, path: &NodePath) -> Result<Length> {
    let (min, max) = decode_bounds(
        value,
        (DEFAULT_LENGTH.min, DEFAULT_LENGTH.max),
        Scalar::Both,
        path,
    )?;
    Length::new(min, max).map_err(|err| SchemaError::invalid(path, format!("length: {err}")))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Bounds<T> {
    min: Option<T>,
    max: Option<T>,
}

fn decode_bounds<T>(value: &Value, default: (T, T), scalar: Scalar, path: &NodePath) -> Result<(T, T)>
where
    T: DeserializeOwned + Copy,
{
    let parse = |value: &Value| {
        serde_yaml::from_value::<T>(value.clone())
            .map_err(|err| SchemaError::invalid(path, format!("invalid bound: {err}")))
    };

    match value {
        Value::Null => Ok(default),
        Value::Sequence(items) => match items.as_slice() {
            [min, max] => Ok((parse(min)?, parse(max)?)),
            _ => Err(SchemaError::invalid(
                path,
                format!("bounds should be [min, max], got {} element(s)", items.len()),
            )),
        },
        Value::Mapping(_) => {
            let bounds: Bounds<T> = serde_yaml::from_value(value.clone())
                .map_err(|err| SchemaError::invalid(path, format!("invalid bounds: {err}")))?;
            Ok((
                bounds.min.unwrap_or(default.0),
                bounds.max.unwrap_or(default.1),
            ))
        }
        Value::Tagged(_) => Err(SchemaError::invalid(path, "tagged bounds are not supported")),
        scalar_value => {
            let bound = parse(scalar_value)?;
            match scalar {
                Scalar::Max => Ok((default.0, bound)),
                Scalar::Both => Ok((bound, bound)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).expect("parse yaml")
    }

    #[test]
    fn scalar_sets_max_only_for_ranges() {
        let range = decode_int_range(&yaml("11"), &NodePath::root()).expect("decode");
        assert_eq!(range, IntRange::new(0, 11).expect("range"));
    }

    #[test]
    fn scalar_fixes_length() {
        let length = decode_length(&yaml("3"), &NodePath::root()).expect("decode");
        assert_eq!(length, Length::fixed(3));
    }

    #[test]
    fn mapping_keeps_defaults_for_missing_sides() {
        let range = decode_float_range(&yaml("{max: 3.5}"), &NodePath::root()).expect("decode");
        assert_eq!(range, FloatRange::new(0.0, 3.5).expect("range"));
        let range = decode_float_range(&yaml("{min: -2}"), &NodePath::root()).expect("decode");
        assert_eq!(range, FloatRange::new(-2.0, 1.0).expect("range"));
    }

    #[test]
    fn mapping_bounds_decode_for_integers_and_lengths() {
        let range = decode_int_range(&yaml("{min: 10}"), &NodePath::root()).expect("decode");
        assert_eq!(range, IntRange::new(10, 100).expect("range"));
        let length = decode_length(&yaml("{min: 2, max: 4}"), &NodePath::root()).expect("decode");
        assert_eq!(length, Length::new(2, 4).expect("length"));
        let length = decode_length(&yaml("{}"), &NodePath::root()).expect("decode");
        assert_eq!(length, DEFAULT_LENGTH);
        assert!(decode_int_range(&yaml("{low: 1}"), &NodePath::root()).is_err());
    }

    #[test]
    fn rejects_wrong_arity_and_inverted_bounds() {
        assert!(decode_int_range(&yaml("[]"), &NodePath::root()).is_err());
        assert!(decode_int_range(&yaml("[1]"), &NodePath::root()).is_err());
        assert!(decode_int_range(&yaml("[1, 2, 3]"), &NodePath::root()).is_err());
        assert!(decode_int_range(&yaml("[5, 1]"), &NodePath::root()).is_err());
        assert!(decode_length(&yaml("[-1, 2]"), &NodePath::root()).is_err());
    }

    #[test]
    fn equal_bounds_are_allowed() {
        let range = decode_int_range(&yaml("[5, 5]"), &NodePath::root()).expect("decode");
        assert!(range.is_constant());
    }

    #[test]
    fn length_parses_command_line_forms() {
        assert_eq!("4".parse::<Length>(), Ok(Length::fixed(4)));
        assert_eq!("2,7".parse::<Length>(), Length::new(2, 7));
        assert_eq!("7,2".parse::<Length>(), Err(RangeError::Inverted));
        assert!("a,b".parse::<Length>().is_err());
        assert_eq!(Length::new(2, 7).expect("length").to_string(), "2,7");
    }
}
