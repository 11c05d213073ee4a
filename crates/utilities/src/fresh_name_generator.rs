use rustc_hash::FxHashSet;

/// Generates identifiers that do not clash with a given set of names, by
/// appending a number to a hint.
#[derive(Default)]
pub struct FreshNameGenerator {
    used: FxHashSet<String>,
}

impl FreshNameGenerator {
    pub fn new() -> FreshNameGenerator {
        FreshNameGenerator::default()
    }

    /// Marks the given name as used.
    pub fn add(&mut self, name: impl Into<String>) {
        self.used.insert(name.into());
    }

    /// Returns true iff the given name has been used.
    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Returns a name that starts with the hint and was not used before, the
    /// returned name is marked as used. The hint itself is returned when it is
    /// still available.
    pub fn fresh(&mut self, hint: &str) -> String {
        // Strip a numeric suffix such that fresh("x1") does not yield "x11".
        let base = hint.trim_end_matches(|c: char| c.is_ascii_digit());
        let base = if base.is_empty() { hint } else { base };

        if !self.used.contains(hint) {
            self.used.insert(hint.to_string());
            return hint.to_string();
        }

        let mut index = 0;
        loop {
            let candidate = format!("{}{}", base, index);
            if !self.used.contains(&candidate) {
                self.used.insert(candidate.clone());
                return candidate;
            }
            index += 1;
        }
    }
}

impl<S: Into<String>> FromIterator<S> for FreshNameGenerator {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        FreshNameGenerator {
            used: iter.into_iter().map(|name| name.into()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_fresh_names() {
        let mut generator: FreshNameGenerator = ["x", "x0", "P"].into_iter().collect();

        assert_eq!(generator.fresh("y"), "y");
        assert_eq!(generator.fresh("y"), "y0");
        assert_eq!(generator.fresh("x"), "x1");
        assert_eq!(generator.fresh("x0"), "x2");
        assert!(generator.contains("x2"));
    }
}
