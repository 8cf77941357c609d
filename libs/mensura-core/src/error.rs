use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("too many base units (limit {0})")]
    TooManyBaseUnits(usize),

    #[error("name '{0}' is already mapped")]
    NameInUse(String),

    #[error("symbol '{0}' is already mapped")]
    SymbolInUse(String),

    #[error("prefix '{0}' is already registered")]
    PrefixInUse(String),

    #[error("incompatible units")]
    Incompatible,

    #[error("non-linear unit is not convertible")]
    NonLinear,

    #[error("dimension exponent overflow")]
    Overflow,
}
