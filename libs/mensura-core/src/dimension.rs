use crate::error::{Error, Result};

/// Number of base-unit slots a system may allocate.
pub const MAX_BASES: usize = 8;

/// Exponents over a system's base units, in registration order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dimension(pub [i32; MAX_BASES]);

impl Dimension {
    pub const ZERO: Dimension = Dimension([0; MAX_BASES]);

    /// The dimension of the `index`-th base unit.
    pub fn base(index: usize) -> Dimension {
        let mut exps = [0; MAX_BASES];
        exps[index] = 1;
        Dimension(exps)
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&e| e == 0)
    }

    pub fn combine(&self, other: &Dimension) -> Result<Dimension> {
        let mut exps = [0; MAX_BASES];
        for (i, slot) in exps.iter_mut().enumerate() {
            *slot = self.0[i]
                .checked_add(other.0[i])
                .ok_or(Error::Overflow)?;
        }
        Ok(Dimension(exps))
    }

    pub fn invert(&self) -> Dimension {
        let mut exps = [0; MAX_BASES];
        for (i, slot) in exps.iter_mut().enumerate() {
            *slot = -self.0[i];
        }
        Dimension(exps)
    }

    pub fn pow(&self, n: i32) -> Result<Dimension> {
        let mut exps = [0; MAX_BASES];
        for (i, slot) in exps.iter_mut().enumerate() {
            *slot = self.0[i].checked_mul(n).ok_or(Error::Overflow)?;
        }
        Ok(Dimension(exps))
    }
}
