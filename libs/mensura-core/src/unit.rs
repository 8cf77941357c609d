//! Unit values and the algebraic operations the parser composes them with.
//!
//! A `Unit` is an owned value: every operation returns a fresh unit and the
//! operands stay untouched, so intermediates of a larger expression can be
//! dropped on any failure path without bookkeeping.

use crate::dimension::Dimension;
use crate::error::{Error, Result};

/// How a unit's numeric values relate to the base-unit product of its
/// dimension.
#[derive(Clone, Debug, PartialEq)]
pub enum UnitKind {
    /// `base = scale * x`
    Linear,
    /// `base = scale * x + origin` (e.g. celsius over kelvin).
    Offset { origin: f64 },
    /// A time unit with an attached origin, `origin` in seconds since
    /// 1970-01-01T00:00:00Z.
    Timestamp { origin: f64 },
    /// A logarithmic unit: values are `log_base(x / reference)`, scaled by
    /// the unit's factor (e.g. decibel = 0.1 lg(re ...)).
    Log { base: f64, reference: Box<Unit> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    dim: Dimension,
    factor: f64,
    kind: UnitKind,
}

impl Unit {
    /// The dimensionless unit one.
    pub fn one() -> Unit {
        Unit {
            dim: Dimension::ZERO,
            factor: 1.0,
            kind: UnitKind::Linear,
        }
    }

    pub(crate) fn base(index: usize) -> Unit {
        Unit {
            dim: Dimension::base(index),
            factor: 1.0,
            kind: UnitKind::Linear,
        }
    }

    pub(crate) fn linear(dim: Dimension, factor: f64) -> Unit {
        Unit {
            dim,
            factor,
            kind: UnitKind::Linear,
        }
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dim
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn kind(&self) -> &UnitKind {
        &self.kind
    }

    /// A unit whose values are `factor` times larger than this unit's.
    pub fn scale(&self, factor: f64) -> Unit {
        Unit {
            dim: self.dim,
            factor: self.factor * factor,
            kind: self.kind.clone(),
        }
    }

    /// The product of two units. Origins are discarded; a logarithmic unit
    /// survives only multiplication by a dimensionless linear unit, which
    /// scales it.
    pub fn multiply(&self, other: &Unit) -> Result<Unit> {
        match (&self.kind, &other.kind) {
            (UnitKind::Log { .. }, _) if other.dim.is_zero() => {
                Ok(self.scale(other.factor))
            }
            (_, UnitKind::Log { .. }) if self.dim.is_zero() => {
                Ok(other.scale(self.factor))
            }
            _ => Ok(Unit::linear(
                self.dim.combine(&other.dim)?,
                self.factor * other.factor,
            )),
        }
    }

    /// The quotient of two units. Origins are discarded.
    pub fn divide(&self, other: &Unit) -> Result<Unit> {
        Ok(Unit::linear(
            self.dim.combine(&other.dim.invert())?,
            self.factor / other.factor,
        ))
    }

    /// This unit raised to an integral power. Origins are discarded.
    pub fn raise(&self, n: i32) -> Result<Unit> {
        Ok(Unit::linear(self.dim.pow(n)?, self.factor.powi(n)))
    }

    /// This unit with its origin shifted: a value `x` of the result equals
    /// `x + amount` of this unit.
    pub fn offset(&self, amount: f64) -> Unit {
        let origin = match self.kind {
            UnitKind::Offset { origin } | UnitKind::Timestamp { origin } => origin,
            _ => 0.0,
        };
        Unit {
            dim: self.dim,
            factor: self.factor,
            kind: UnitKind::Offset {
                origin: origin + self.factor * amount,
            },
        }
    }

    /// This unit with a time origin attached, `origin_seconds` since
    /// 1970-01-01T00:00:00Z.
    pub fn offset_by_time(&self, origin_seconds: f64) -> Unit {
        Unit {
            dim: self.dim,
            factor: self.factor,
            kind: UnitKind::Timestamp {
                origin: origin_seconds,
            },
        }
    }

    /// A logarithmic unit with the given base over a reference quantity.
    pub fn log(base: f64, reference: Unit) -> Unit {
        Unit {
            dim: *reference.dimension(),
            factor: 1.0,
            kind: UnitKind::Log {
                base,
                reference: Box::new(reference),
            },
        }
    }

    /// Whether values can be converted between the two units: equal
    /// dimensions, and logarithmic units only among themselves.
    pub fn convertible_to(&self, other: &Unit) -> bool {
        if self.dim != other.dim {
            return false;
        }
        let self_log = matches!(self.kind, UnitKind::Log { .. });
        let other_log = matches!(other.kind, UnitKind::Log { .. });
        self_log == other_log
    }
}

/// Convert a numeric value between two convertible units.
///
/// Linear, offset and timestamp units convert affinely; logarithmic units
/// are rejected as non-linear.
pub fn convert(value: f64, from: &Unit, to: &Unit) -> Result<f64> {
    if from.dim != to.dim {
        return Err(Error::Incompatible);
    }
    let in_base = match from.kind {
        UnitKind::Linear => from.factor * value,
        UnitKind::Offset { origin } | UnitKind::Timestamp { origin } => {
            from.factor * value + origin
        }
        UnitKind::Log { .. } => return Err(Error::NonLinear),
    };
    match to.kind {
        UnitKind::Linear => Ok(in_base / to.factor),
        UnitKind::Offset { origin } | UnitKind::Timestamp { origin } => {
            Ok((in_base - origin) / to.factor)
        }
        UnitKind::Log { .. } => Err(Error::NonLinear),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_combines_factors_and_dimensions() {
        let m = Unit::base(0);
        let s = Unit::base(1);
        let v = m.divide(&s).unwrap();
        assert_eq!(v.dimension().0[0], 1);
        assert_eq!(v.dimension().0[1], -1);
        assert_eq!(v.factor(), 1.0);
    }

    #[test]
    fn raise_discards_origin() {
        let k = Unit::base(0);
        let celsius = k.offset(273.15);
        let squared = celsius.raise(2).unwrap();
        assert_eq!(squared.kind(), &UnitKind::Linear);
        assert_eq!(squared.dimension().0[0], 2);
    }

    #[test]
    fn offset_composes_with_existing_origin() {
        let k = Unit::base(0);
        let celsius = k.offset(273.15);
        let shifted = celsius.offset(10.0);
        match shifted.kind() {
            UnitKind::Offset { origin } => assert!((origin - 283.15).abs() < 1e-9),
            other => panic!("expected offset unit, got {other:?}"),
        }
    }

    #[test]
    fn affine_conversion_round_trips() {
        let k = Unit::base(0);
        let celsius = k.offset(273.15);
        let v = convert(20.0, &celsius, &k).unwrap();
        assert!((v - 293.15).abs() < 1e-9);
        let back = convert(v, &k, &celsius).unwrap();
        assert!((back - 20.0).abs() < 1e-9);
    }

    #[test]
    fn log_units_are_not_linearly_convertible() {
        let mw = Unit::base(0).scale(1e-3);
        let bel = Unit::log(10.0, mw.clone());
        assert!(convert(1.0, &bel, &mw).is_err());
        assert!(!bel.convertible_to(&mw));
    }

    #[test]
    fn scaling_a_log_unit_keeps_it_logarithmic() {
        let mw = Unit::base(0).scale(1e-3);
        let bel = Unit::log(10.0, mw);
        let tenth = Unit::one().scale(0.1);
        let db = tenth.multiply(&bel).unwrap();
        assert!(matches!(db.kind(), UnitKind::Log { .. }));
        assert!((db.factor() - 0.1).abs() < 1e-12);
    }
}
