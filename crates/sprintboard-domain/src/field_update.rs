//! Three-state edits for optional sprint attributes.

/// Edit to an optional attribute: leave it, replace it, or remove it.
///
/// ```
/// use chrono::NaiveDate;
/// use sprintboard_domain::FieldUpdate;
///
/// let mut end = NaiveDate::from_ymd_opt(2026, 1, 19);
/// FieldUpdate::Set(NaiveDate::from_ymd_opt(2026, 1, 26).unwrap()).apply_to(&mut end);
/// assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 26));
///
/// FieldUpdate::<NaiveDate>::Clear.apply_to(&mut end);
/// assert_eq!(end, None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    NoChange,
    Set(T),
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::NoChange
    }
}

impl<T> FieldUpdate<T> {
    /// Build from a command-line style pair: a value flag and a clear flag.
    /// Clearing wins.
    pub fn from_flags(value: Option<T>, clear: bool) -> Self {
        match (value, clear) {
            (_, true) => Self::Clear,
            (Some(value), false) => Self::Set(value),
            (None, false) => Self::NoChange,
        }
    }

    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            Self::NoChange => {}
            Self::Set(value) => *field = Some(value),
            Self::Clear => *field = None,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

impl<T: Clone> FieldUpdate<T> {
    /// The value `current` would have after this edit.
    pub fn resolve(&self, current: Option<&T>) -> Option<T> {
        match self {
            Self::NoChange => current.cloned(),
            Self::Set(value) => Some(value.clone()),
            Self::Clear => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_change_keeps_value() {
        let mut field = Some(3);
        FieldUpdate::NoChange.apply_to(&mut field);
        assert_eq!(field, Some(3));
        assert!(!FieldUpdate::<i32>::NoChange.is_change());
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(FieldUpdate::from_flags(Some(1), false), FieldUpdate::Set(1));
        assert_eq!(FieldUpdate::from_flags(Some(1), true), FieldUpdate::Clear);
        assert_eq!(FieldUpdate::<i32>::from_flags(None, false), FieldUpdate::NoChange);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(FieldUpdate::NoChange.resolve(Some(&4)), Some(4));
        assert_eq!(FieldUpdate::Set(5).resolve(Some(&4)), Some(5));
        assert_eq!(FieldUpdate::<i32>::Clear.resolve(Some(&4)), None);
    }
}
