mod logger;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// A enum structure to assign the level of construction tracing to a
/// generator instance.
///
/// The payload is the label printed in front of every traced line, so the
/// output of several generators can be told apart.
pub enum Log<T> {
    None,
    /// Trace the shift/reduce conflicts the construction settles by
    /// preference.
    Conflicts(T),
    /// Additionally trace every item-set closure as it is recomputed.
    ItemSets(T),
}

/// Print a grammar diagnostic and terminate with a nonzero exit code.
///
/// Grammar errors are not recoverable; the diagnostic names the offending
/// symbol(s) and the process ends without unwinding through the generator
/// API.
pub(crate) fn fatal(message: String) -> ! {
    eprintln!("SyntaxGenerator Error: {}", message);
    std::process::exit(1);
}

/// Print an advisory diagnostic which does not stop the build.
pub(crate) fn advisory(message: String) {
    eprintln!("SyntaxGenerator Warning: {}", message);
}
