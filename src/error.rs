use std::backtrace::Backtrace;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The ways a problem definition or a solver call can be misused.
///
/// None of these are recoverable by a solver: they indicate a violated
/// invariant in the caller's code and are propagated untouched. An empty
/// consistent domain is *not* an error; it is the expected "infeasible"
/// outcome and is reported through solver statuses instead.
#[derive(Debug, thiserror::Error)]
pub enum CspError {
    #[error("cannot read the value of an unassigned variable")]
    UnassignedRead,

    #[error("variable is already assigned; unassign it before re-assigning")]
    OverAssign,

    #[error("value {0} is not contained in the variable's domain")]
    UncontainedValue(String),

    #[error("index {index} is out of range for a domain of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot alter the domain of an assigned variable")]
    DomainAlteration,

    #[error("a variable's domain must hold at least one candidate value")]
    EmptyDomain,

    #[error("variable {0} appears more than once in the constraint's variable list")]
    DuplicateVariable(usize),

    #[error("variable {0} is not contained in the constraint")]
    UncontainedVariable(usize),

    #[error("constraint {0} appears more than once in the problem's constraint list")]
    DuplicateConstraint(usize),

    #[error("constraint references variable {0}, which is not stored in the problem")]
    UnknownVariable(usize),

    #[error(
        "tabu size {tabu} plus {read_only} read-only variables must be \
         smaller than the problem's {variables} variables"
    )]
    InvalidTabuSize {
        tabu: usize,
        read_only: usize,
        variables: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inner: {inner}\n{backtrace}")]
    Inner {
        inner: Box<CspError>,
        backtrace: Box<Backtrace>,
    },
}

impl Error {
    /// The underlying error kind, for matching in callers and tests.
    pub fn kind(&self) -> &CspError {
        let Error::Inner { inner, .. } = self;
        inner
    }
}

impl From<CspError> for Error {
    fn from(inner: CspError) -> Self {
        Error::Inner {
            inner: Box::new(inner),
            backtrace: Box::new(std::backtrace::Backtrace::capture()),
        }
    }
}
