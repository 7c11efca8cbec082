use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by the numbering counter engine.
///
/// Formatting and layout never fail; only malformed counter writes and
/// counters that no longer fit in an `i64` surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument `{argument}`: {constraint}")]
    InvalidArgument {
        argument: &'static str,
        constraint: String,
    },

    #[error("counter overflow for list {num_id} level {level} at position {pos}")]
    Overflow { num_id: String, level: u32, pos: u64 },
}

impl Error {
    pub(crate) fn invalid(argument: &'static str, constraint: impl Into<String>) -> Self {
        Error::InvalidArgument {
            argument,
            constraint: constraint.into(),
        }
    }
}
