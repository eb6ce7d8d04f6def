use crate::config::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingCategory {
    SenSingles,
    SenDoubles,
}

impl RankingCategory {
    pub const ALL: [RankingCategory; 2] = [RankingCategory::SenSingles, RankingCategory::SenDoubles];

    /// Path segment used by `/api/rankings/:category`.
    pub fn code(self) -> &'static str {
        match self {
            RankingCategory::SenSingles => "SEN_SINGLES",
            RankingCategory::SenDoubles => "SEN_DOUBLES",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let code = raw.trim();
        Self::ALL
            .into_iter()
            .find(|cat| cat.code().eq_ignore_ascii_case(code))
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (RankingCategory::SenSingles, Locale::En) => "Men's Singles",
            (RankingCategory::SenDoubles, Locale::En) => "Men's Doubles",
            (RankingCategory::SenSingles, Locale::ZhTw) => "男子單打",
            (RankingCategory::SenDoubles, Locale::ZhTw) => "男子雙打",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|cat| *cat == self).unwrap_or(0)
    }
}

type ChangeCallback = Box<dyn FnMut(RankingCategory) + Send>;

/// Holds the selected ranking category and notifies a listener on change.
pub struct CategorySelector {
    selected: RankingCategory,
    on_change: Option<ChangeCallback>,
}

impl std::fmt::Debug for CategorySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategorySelector")
            .field("selected", &self.selected)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl CategorySelector {
    pub fn new(selected: RankingCategory) -> Self {
        Self {
            selected,
            on_change: None,
        }
    }

    pub fn with_callback(
        selected: RankingCategory,
        callback: impl FnMut(RankingCategory) + Send + 'static,
    ) -> Self {
        Self {
            selected,
            on_change: Some(Box::new(callback)),
        }
    }

    pub fn selected(&self) -> RankingCategory {
        self.selected
    }

    /// Returns true when the selection actually changed.
    pub fn select(&mut self, category: RankingCategory) -> bool {
        if self.selected == category {
            return false;
        }
        self.selected = category;
        if let Some(callback) = self.on_change.as_mut() {
            callback(category);
        }
        true
    }

    pub fn next(&mut self) -> RankingCategory {
        let all = RankingCategory::ALL;
        let next = all[(self.selected.position() + 1) % all.len()];
        self.select(next);
        self.selected
    }

    pub fn prev(&mut self) -> RankingCategory {
        let all = RankingCategory::ALL;
        let prev = all[(self.selected.position() + all.len() - 1) % all.len()];
        self.select(prev);
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn codes_round_trip_case_insensitively() {
        assert_eq!(
            RankingCategory::from_code("sen_doubles"),
            Some(RankingCategory::SenDoubles)
        );
        assert_eq!(RankingCategory::from_code("U21_SINGLES"), None);
    }

    #[test]
    fn callback_fires_only_on_effective_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut selector = CategorySelector::with_callback(RankingCategory::SenSingles, move |cat| {
            sink.lock().unwrap().push(cat);
        });

        assert!(!selector.select(RankingCategory::SenSingles));
        assert_eq!(selector.next(), RankingCategory::SenDoubles);
        assert_eq!(selector.next(), RankingCategory::SenSingles);
        assert_eq!(selector.prev(), RankingCategory::SenDoubles);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                RankingCategory::SenDoubles,
                RankingCategory::SenSingles,
                RankingCategory::SenDoubles
            ]
        );
    }
}
