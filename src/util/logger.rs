use super::Log;
use std::fmt::{Display, Formatter};

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Conflicts(label) | Log::ItemSets(label) => write!(f, "{}", label),
        }
    }
}

impl<T> Log<T> {
    /// Whether settled shift/reduce conflicts are traced under this level.
    pub fn logs_conflicts(&self) -> bool {
        !matches!(self, Log::None)
    }

    /// Whether recomputed item-set closures are traced under this level.
    pub fn logs_item_sets(&self) -> bool {
        matches!(self, Log::ItemSets(_))
    }
}
