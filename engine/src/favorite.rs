//! Favorite engine: the client to mover "liked" relationship.

use crate::{
    error::Result, ClientId, Error, Favorite, MoverId, Store, Timestamp, ToggleAction,
    ToggleOutcome,
};

impl Store {
    /// Flip the favorite relationship between a client and a mover.
    ///
    /// The existence check, the row change, and the `favoriteCount` refresh
    /// happen in one unit of work. Toggling twice restores the original state.
    pub fn toggle_favorite(
        &mut self,
        client: ClientId,
        mover: MoverId,
        now: Timestamp,
    ) -> Result<ToggleOutcome> {
        if self.mover(mover).is_none() {
            return Err(Error::MoverNotFound(mover));
        }
        if self.client(client).is_none() {
            return Err(Error::ClientNotFound(client));
        }

        let action = if self.remove_favorite(client, mover) {
            ToggleAction::Removed
        } else {
            let inserted = self.insert_favorite(Favorite {
                client_id: client,
                mover_id: mover,
                created_at: now,
            });
            debug_assert!(inserted);
            ToggleAction::Added
        };
        let aggregates = self.refresh_aggregates(mover);

        Ok(ToggleOutcome {
            action,
            is_favorite: action == ToggleAction::Added,
            favorite_count: aggregates.favorite_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::PageParams;
    use crate::test_support::Fixture;

    #[test]
    fn toggle_adds_then_removes() {
        let mut fx = Fixture::new();

        let added = fx.store.toggle_favorite(fx.client, fx.mover, 1).unwrap();
        assert_eq!(added.action, ToggleAction::Added);
        assert!(added.is_favorite);
        assert_eq!(added.favorite_count, 1);

        let removed = fx.store.toggle_favorite(fx.client, fx.mover, 2).unwrap();
        assert_eq!(removed.action, ToggleAction::Removed);
        assert!(!removed.is_favorite);
        assert_eq!(removed.favorite_count, 0);
        assert!(!fx.store.is_favorite(fx.client, fx.mover));
    }

    #[test]
    fn unknown_mover_is_not_found() {
        let mut fx = Fixture::new();
        let missing = MoverId::new();
        let err = fx.store.toggle_favorite(fx.client, missing, 1).unwrap_err();
        assert_eq!(err, Error::MoverNotFound(missing));
    }

    #[test]
    fn count_tracks_many_clients() {
        let mut fx = Fixture::new();
        let others: Vec<_> = ["Park", "Choi", "Jung"]
            .into_iter()
            .map(|name| fx.other_client(name))
            .collect();
        for client in &others {
            fx.store.toggle_favorite(*client, fx.mover, 1).unwrap();
        }
        fx.store.toggle_favorite(others[1], fx.mover, 2).unwrap();

        let count = fx.store.mover(fx.mover).unwrap().aggregates.favorite_count;
        let rows = fx
            .store
            .favorites()
            .filter(|f| f.mover_id == fx.mover)
            .count() as u64;
        assert_eq!(count, 2);
        assert_eq!(count, rows);
    }

    #[test]
    fn favorites_page_defaults_and_flags() {
        let mut fx = Fixture::new();
        let second = fx.other_mover("Careful Crew");
        fx.store.toggle_favorite(fx.client, fx.mover, 1).unwrap();
        fx.store.toggle_favorite(fx.client, second, 2).unwrap();

        let params = PageParams {
            page: Some("first".into()),
            limit: Some("many".into()),
        };
        let page = fx.store.list_favorites(fx.client, &params);
        assert_eq!(page.total, 2);
        assert_eq!(page.pagination.page, 1);
        assert_eq!(page.pagination.limit, 6);
        assert_eq!(page.pagination.total_pages, 1);
        assert!(page.movers.iter().all(|m| m.is_liked));
        // Most recent first.
        assert_eq!(page.movers[0].mover.id, second);
    }

    #[test]
    fn empty_favorites_have_zero_pages() {
        let fx = Fixture::new();
        let page = fx.store.list_favorites(fx.client, &PageParams::default());
        assert_eq!(page.total, 0);
        assert_eq!(page.pagination.total_pages, 0);
    }
}
