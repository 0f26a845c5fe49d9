use pcloud_helpers::Float;

use crate::Match;

/// Keeps the best match per label, ordered from the smallest distance to the
/// largest, capped at `max` entries.
pub(crate) struct MatchCollector<F>
where
    F: Float,
{
    max: usize,
    matches: Vec<Match<F>>,
}

impl<F> MatchCollector<F>
where
    F: Float,
{
    pub(crate) fn new(max: usize) -> Self {
        MatchCollector {
            max,
            matches: Vec::with_capacity(max + 1),
        }
    }

    /// Returns true if a match for the same label that is at least as good
    /// is already filed. A worse one is removed.
    fn remove_existing_worse(&mut self, mc: &Match<F>) -> bool {
        let Some(ix) = self.matches.iter().position(|m| m.label == mc.label) else {
            return false;
        };
        if self.matches[ix].distance <= mc.distance {
            return true;
        }
        self.matches.remove(ix);
        false
    }

    pub(crate) fn file_match(&mut self, mc: Match<F>) {
        if self.max == 0 {
            return;
        }
        // Full already and not better than the current worst one
        if self.matches.len() == self.max
            && self
                .matches
                .last()
                .is_some_and(|worst| mc.distance >= worst.distance)
        {
            return;
        }
        if self.remove_existing_worse(&mc) {
            return;
        }
        // Equal distances keep filing order
        let ix = self
            .matches
            .iter()
            .position(|m| m.distance > mc.distance)
            .unwrap_or(self.matches.len());
        self.matches.insert(ix, mc);
        self.matches.truncate(self.max);
    }

    pub(crate) fn into_matches(self) -> Vec<Match<F>> {
        self.matches
    }
}
