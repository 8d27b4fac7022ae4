//! Mover directory: search, ordering, and viewer-scoped enrichment.

use crate::{
    error::Result,
    pagination::{PageParams, PageRequest, FAVORITES_DEFAULT_LIMIT, MOVERS_DEFAULT_LIMIT},
    ClientId, Error, FavoriteMoverView, FavoritePage, Mover, MoverId, MoverPage, MoverView,
    Store,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Closed set of mover orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Average rating, highest first; more reviews wins a tie
    HighRating,
    ReviewCount,
    /// Years of experience
    Experience,
    EstimateCount,
    FavoriteCount,
}

impl SortBy {
    pub const ALL: [SortBy; 5] = [
        SortBy::HighRating,
        SortBy::ReviewCount,
        SortBy::Experience,
        SortBy::EstimateCount,
        SortBy::FavoriteCount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::HighRating => "highRating",
            SortBy::ReviewCount => "reviewCount",
            SortBy::Experience => "experience",
            SortBy::EstimateCount => "estimateCount",
            SortBy::FavoriteCount => "favoriteCount",
        }
    }

    /// Compare two movers under this ordering. Ties fall back to id ascending.
    pub fn compare(&self, a: &Mover, b: &Mover) -> Ordering {
        let (x, y) = (&a.aggregates, &b.aggregates);
        let primary = match self {
            SortBy::HighRating => y
                .average_review_rating
                .total_cmp(&x.average_review_rating)
                .then(y.review_count.cmp(&x.review_count)),
            SortBy::ReviewCount => y.review_count.cmp(&x.review_count),
            SortBy::Experience => b.career.cmp(&a.career),
            SortBy::EstimateCount => y.estimate_count.cmp(&x.estimate_count),
            SortBy::FavoriteCount => y.favorite_count.cmp(&x.favorite_count),
        };
        primary.then(a.id.cmp(&b.id))
    }
}

impl std::str::FromStr for SortBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SortBy::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| Error::UnknownSortKey(s.to_string()))
    }
}

/// Raw directory query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoverSearchParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// A validated directory query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoverQuery {
    /// Lowercased search needle
    pub search: Option<String>,
    pub sort_by: Option<SortBy>,
    pub page: PageRequest,
}

impl MoverQuery {
    pub fn parse(params: &MoverSearchParams) -> Result<Self> {
        let page = PageRequest::strict(
            &PageParams {
                page: params.page.clone(),
                limit: params.limit.clone(),
            },
            MOVERS_DEFAULT_LIMIT,
        )?;
        let sort_by = params
            .sort_by
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .transpose()?;
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Ok(Self {
            search,
            sort_by,
            page,
        })
    }

    /// Case-insensitive substring match on the nickname.
    pub fn matches(&self, mover: &Mover) -> bool {
        match &self.search {
            Some(needle) => mover.nickname.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }

    pub fn compare(&self, a: &Mover, b: &Mover) -> Ordering {
        match self.sort_by {
            Some(sort) => sort.compare(a, b),
            None => a.id.cmp(&b.id),
        }
    }
}

impl Store {
    /// Search, order, and page the mover directory.
    ///
    /// `isFavorite` is resolved with one lookup against the viewer's favorites
    /// for the whole page.
    pub fn list_movers(&self, query: &MoverQuery, viewer: Option<ClientId>) -> MoverPage {
        let mut matching: Vec<&Mover> = self.movers().filter(|m| query.matches(m)).collect();
        matching.sort_by(|a, b| query.compare(a, b));

        let total = matching.len() as u64;
        let page = query.page.slice(matching);
        let ids: Vec<MoverId> = page.iter().map(|m| m.id).collect();
        let liked = self.favorited_among(viewer, &ids);

        let movers = page
            .into_iter()
            .map(|mover| MoverView {
                is_favorite: liked.contains(&mover.id),
                mover: mover.clone(),
            })
            .collect();

        MoverPage {
            movers,
            total,
            page: query.page.page,
            limit: query.page.limit,
            has_more: query.page.has_more(total),
            pagination: query.page.pagination(total),
        }
    }

    /// A single mover with the viewer's favorite flag.
    pub fn get_mover(&self, id: MoverId, viewer: Option<ClientId>) -> Result<MoverView> {
        let mover = self.mover(id).ok_or(Error::MoverNotFound(id))?;
        let is_favorite = viewer.is_some_and(|client| self.is_favorite(client, id));
        Ok(MoverView {
            mover: mover.clone(),
            is_favorite,
        })
    }

    /// The client's favorite movers, most recently liked first.
    pub fn list_favorites(&self, client: ClientId, params: &PageParams) -> FavoritePage {
        let page = PageRequest::lenient(params, FAVORITES_DEFAULT_LIMIT);

        let mut favorites: Vec<_> = self
            .favorites()
            .filter(|f| f.client_id == client)
            .filter_map(|f| self.mover(f.mover_id).map(|m| (f.created_at, m)))
            .collect();
        favorites.sort_by(|(a_at, a), (b_at, b)| b_at.cmp(a_at).then(a.id.cmp(&b.id)));

        let total = favorites.len() as u64;
        let movers = page
            .slice(favorites)
            .into_iter()
            .map(|(favorited_at, mover)| FavoriteMoverView {
                mover: mover.clone(),
                is_liked: true,
                favorited_at,
            })
            .collect();

        FavoritePage {
            movers,
            total,
            pagination: page.pagination(total),
        }
    }

    fn favorited_among(&self, viewer: Option<ClientId>, ids: &[MoverId]) -> HashSet<MoverId> {
        let Some(client) = viewer else {
            return HashSet::new();
        };
        ids.iter()
            .copied()
            .filter(|mover| self.is_favorite(client, *mover))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MoverAggregates, MoverProfile};

    fn mover(nickname: &str, rating: f64, reviews: u64, career: u32) -> Mover {
        Mover {
            id: MoverId::new(),
            nickname: nickname.into(),
            introduction: String::new(),
            description: String::new(),
            career,
            service_types: vec![],
            service_regions: vec![],
            aggregates: MoverAggregates {
                review_count: reviews,
                average_review_rating: rating,
                ..Default::default()
            },
            created_at: 0,
        }
    }

    fn params(search: Option<&str>, sort_by: Option<&str>, page: Option<&str>) -> MoverSearchParams {
        MoverSearchParams {
            search: search.map(String::from),
            sort_by: sort_by.map(String::from),
            page: page.map(String::from),
            limit: None,
        }
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!("highRating".parse::<SortBy>().unwrap(), SortBy::HighRating);
        let err = "cheapest".parse::<SortBy>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn high_rating_breaks_ties_by_review_count_then_id() {
        let a = mover("a", 4.5, 2, 1);
        let b = mover("b", 4.5, 10, 1);
        let c = mover("c", 5.0, 1, 1);
        let mut all = vec![&a, &b, &c];
        all.sort_by(|x, y| SortBy::HighRating.compare(x, y));
        assert_eq!(all[0].nickname, "c");
        assert_eq!(all[1].nickname, "b");
        assert_eq!(all[2].nickname, "a");

        let twin = mover("twin", 4.5, 2, 1);
        let expected = a.id.cmp(&twin.id);
        assert_eq!(SortBy::HighRating.compare(&a, &twin), expected);
    }

    #[test]
    fn experience_orders_by_career() {
        let junior = mover("junior", 0.0, 0, 1);
        let senior = mover("senior", 0.0, 0, 12);
        assert_eq!(SortBy::Experience.compare(&senior, &junior), Ordering::Less);
    }

    #[test]
    fn query_parsing() {
        let query = MoverQuery::parse(&params(Some("  Swift "), Some("highRating"), None)).unwrap();
        assert_eq!(query.search.as_deref(), Some("swift"));
        assert_eq!(query.sort_by, Some(SortBy::HighRating));
        assert_eq!(query.page, PageRequest { page: 1, limit: 10 });

        let query = MoverQuery::parse(&params(Some("   "), Some(""), None)).unwrap();
        assert_eq!(query.search, None);
        assert_eq!(query.sort_by, None);

        assert!(MoverQuery::parse(&params(None, None, Some("0"))).is_err());
        assert!(MoverQuery::parse(&params(None, Some("random"), None)).is_err());
    }

    #[test]
    fn search_is_case_insensitive() {
        let query = MoverQuery::parse(&params(Some("HAUL"), None, None)).unwrap();
        assert!(query.matches(&mover("Swift Haulers", 0.0, 0, 0)));
        assert!(!query.matches(&mover("Careful Crew", 0.0, 0, 0)));
    }

    #[test]
    fn directory_flags_viewer_favorites() {
        let mut store = Store::new();
        let client = ClientId::new();
        store
            .upsert_client(client, crate::test_support::client_profile("Kim"), 1)
            .unwrap();
        let liked = MoverId::new();
        let other = MoverId::new();
        for (id, name) in [(liked, "Liked"), (other, "Other")] {
            store
                .upsert_mover(
                    id,
                    MoverProfile {
                        nickname: name.into(),
                        introduction: String::new(),
                        description: String::new(),
                        career: 1,
                        service_types: vec![],
                        service_regions: vec![],
                    },
                    1,
                )
                .unwrap();
        }
        store.toggle_favorite(client, liked, 2).unwrap();

        let query = MoverQuery::parse(&MoverSearchParams::default()).unwrap();
        let page = store.list_movers(&query, Some(client));
        assert_eq!(page.total, 2);
        for view in &page.movers {
            assert_eq!(view.is_favorite, view.mover.id == liked);
        }

        let anonymous = store.list_movers(&query, None);
        assert!(anonymous.movers.iter().all(|v| !v.is_favorite));
    }
}
