//! Server-owned records with a stable identity.

/// A record the backend identifies by primary key.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> Self::Id;
}

/// Replace the cached copy of `updated` in place. Returns whether one was found.
pub fn replace_by_id<T: Entity + Clone>(items: &mut [T], updated: &T) -> bool {
    match items.iter_mut().find(|item| item.id() == updated.id()) {
        Some(slot) => {
            *slot = updated.clone();
            true
        }
        None => false,
    }
}

/// Drop every cached record with the given id.
pub fn remove_by_id<T: Entity>(items: &mut Vec<T>, id: T::Id) {
    items.retain(|item| item.id() != id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        label: &'static str,
    }

    impl Entity for Row {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    #[test]
    fn replaces_only_the_matching_row() {
        let mut rows = vec![Row { id: 1, label: "a" }, Row { id: 2, label: "b" }];
        assert!(replace_by_id(&mut rows, &Row { id: 2, label: "B" }));
        assert_eq!(rows[1].label, "B");
        assert_eq!(rows[0].label, "a");

        assert!(!replace_by_id(&mut rows, &Row { id: 9, label: "x" }));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn removal_filters_by_id() {
        let mut rows = vec![Row { id: 1, label: "a" }, Row { id: 2, label: "b" }];
        remove_by_id(&mut rows, 1);
        assert_eq!(rows, vec![Row { id: 2, label: "b" }]);
    }
}
