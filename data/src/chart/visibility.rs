use super::Dataset;

/// Which series are drawn, plus the max-Y over the drawn ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityStore {
    flags: Vec<bool>,
    max_y: f64,
}

impl VisibilityStore {
    pub fn new(dataset: &Dataset) -> Self {
        let mut store = Self {
            flags: vec![true; dataset.series().len()],
            max_y: 0.0,
        };
        store.recompute_max_y(dataset);
        store
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Returns whether the flag actually changed.
    pub fn set_visible(&mut self, index: usize, visible: bool) -> bool {
        match self.flags.get_mut(index) {
            Some(flag) if *flag != visible => {
                *flag = visible;
                true
            }
            _ => false,
        }
    }

    pub fn visible_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, visible)| visible.then_some(i))
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Full scan of every visible series; zero when nothing is visible.
    pub fn recompute_max_y(&mut self, dataset: &Dataset) -> f64 {
        self.max_y = self
            .visible_indices()
            .filter_map(|i| dataset.series_at(i))
            .map(|s| s.max_value())
            .max()
            .map_or(0.0, |v| v.max(0) as f64);
        self.max_y
    }

    pub fn to_state(&self) -> Vec<bool> {
        self.flags.clone()
    }

    pub fn from_state(&mut self, flags: Vec<bool>, dataset: &Dataset) {
        self.flags = flags;
        self.recompute_max_y(dataset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::fixtures;

    #[test]
    fn all_visible_by_default() {
        let ds = fixtures::ramp(5);
        let store = VisibilityStore::new(&ds);
        assert_eq!(store.visible_indices().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(store.max_y(), 40.0);
    }

    #[test]
    fn max_y_follows_visible_series() {
        let ds = fixtures::dataset(&[("a", vec![1, 9, 3]), ("b", vec![20, 2, 4])]);
        let mut store = VisibilityStore::new(&ds);
        assert_eq!(store.max_y(), 20.0);

        assert!(store.set_visible(1, false));
        assert_eq!(store.recompute_max_y(&ds), 9.0);
    }

    #[test]
    fn hide_then_show_restores_max_y() {
        let ds = fixtures::dataset(&[("a", vec![1, 9, 3]), ("b", vec![20, 2, 4])]);
        let mut store = VisibilityStore::new(&ds);
        let before = store.max_y();

        store.set_visible(1, false);
        store.recompute_max_y(&ds);
        store.set_visible(1, true);

        assert_eq!(store.recompute_max_y(&ds), before);
    }

    #[test]
    fn nothing_visible_yields_zero() {
        let ds = fixtures::ramp(5);
        let mut store = VisibilityStore::new(&ds);
        store.set_visible(0, false);
        store.set_visible(1, false);

        assert_eq!(store.visible_indices().count(), 0);
        assert_eq!(store.recompute_max_y(&ds), 0.0);
    }

    #[test]
    fn redundant_or_unknown_toggles_are_ignored() {
        let ds = fixtures::ramp(5);
        let mut store = VisibilityStore::new(&ds);
        assert!(!store.set_visible(0, true));
        assert!(!store.set_visible(7, false));
        assert!(!store.is_visible(7));
    }
}
