use core::fmt;

/// Errors reported by [`OSAvlSet`](crate::OSAvlSet) operations.
///
/// Every variant is recoverable: the set is left exactly as it was before the
/// failing call.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// The key being inserted is already present.
    DuplicateKey,
    /// The key being erased or ranked is not present.
    KeyNotFound,
    /// A one-based order-statistic index was outside `1..=len`.
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// The number of keys in the set at the time of the request.
        len: usize,
    },
    /// The requested neighbour does not exist, e.g. the predecessor of a key that is
    /// smaller than every stored key.
    EmptyContainer,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DuplicateKey => f.write_str("key is already present"),
            Error::KeyNotFound => f.write_str("key not found"),
            Error::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is out of range for a set of {len} keys")
            }
            Error::EmptyContainer => f.write_str("no key satisfies the bound"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_messages() {
        assert_eq!(Error::DuplicateKey.to_string(), "key is already present");
        assert_eq!(Error::KeyNotFound.to_string(), "key not found");
        assert_eq!(
            Error::IndexOutOfRange { index: 0, len: 3 }.to_string(),
            "index 0 is out of range for a set of 3 keys"
        );
        assert_eq!(Error::EmptyContainer.to_string(), "no key satisfies the bound");
    }
}
