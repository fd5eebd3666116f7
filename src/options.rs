//! Per-call configuration.
//!
//! [`ApplyOptions`] is handed to the top-level entry point and passed
//! unchanged through every recursive shape call of that validation.

/// Options recognized by the apply entry points.
///
/// # Example
///
/// ```rust
/// use verdict::ApplyOptions;
///
/// let options = ApplyOptions::default().with_verbose(true);
/// assert!(options.verbose);
/// assert!(!options.coerce);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOptions {
    /// Report every independent problem instead of stopping at the first
    /// issue of each branch.
    pub verbose: bool,
    /// Coerce inputs for every shape of this call, not only for shapes that
    /// enabled coercion themselves.
    pub coerce: bool,
}

impl ApplyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for exhaustive reporting.
    pub fn verbose() -> Self {
        Self::default().with_verbose(true)
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_coerce(mut self, coerce: bool) -> Self {
        self.coerce = coerce;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_early_return_without_coercion() {
        let options = ApplyOptions::new();
        assert!(!options.verbose);
        assert!(!options.coerce);
    }

    #[test]
    fn test_builders() {
        let options = ApplyOptions::verbose().with_coerce(true);
        assert_eq!(
            options,
            ApplyOptions {
                verbose: true,
                coerce: true
            }
        );
    }
}
