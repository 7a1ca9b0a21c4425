// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Marker type (category) lookup
//!

use crate::crud::common::*;
use async_trait::async_trait;
use geomark_core::{GeomarkId, MarkerType};
use serde::Serialize;
use sqlx::{Row, Sqlite, Transaction};

/// A collection of [`MarkerType`]
#[derive(
    derive_more::IntoIterator,
    derive_more::Index,
    Clone,
    Debug,
    Serialize,
    PartialEq,
    Eq,
)]
#[into_iterator(owned, ref, ref_mut)]
pub struct MarkerTypes(Vec<MarkerType>);

impl FromIterator<MarkerType> for MarkerTypes {
    fn from_iter<I: IntoIterator<Item = MarkerType>>(iter: I) -> Self {
        MarkerTypes(iter.into_iter().collect())
    }
}

#[async_trait]
impl FetchAll for MarkerTypes {
    /// Get all marker types in the database, alphabetically by name
    async fn fetch_all(transaction: &mut Transaction<'_, Sqlite>) -> Result<Self, CrudError> {
        sqlx::query("SELECT id, name, icon, color FROM marker_types ORDER BY name")
            .fetch_all(&mut **transaction)
            .await?
            .into_iter()
            .map(|row| {
                Ok(MarkerType {
                    type_id: Some(row.try_get::<GeomarkId, _>("id")?),
                    name: row.try_get("name")?,
                    icon: row.try_get("icon")?,
                    color: row.try_get("color")?,
                })
            })
            .collect()
    }
}

impl MarkerTypes {
    /// Whether a type ID refers to a known marker type
    pub async fn contains_id(
        transaction: &mut Transaction<'_, Sqlite>,
        id: &GeomarkId,
    ) -> Result<bool, CrudError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM marker_types WHERE id = ?")
            .bind(id)
            .fetch_one(&mut **transaction)
            .await?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sqlx::Pool;

    #[sqlx::test]
    async fn seeded_types_are_present(pool: Pool<Sqlite>) {
        let mut transaction = pool.begin().await.unwrap();
        let types = MarkerTypes::fetch_all(&mut transaction).await.unwrap();

        let names: Vec<&str> = (&types).into_iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"General"));
        assert!(names.contains(&"Food"));

        // Alphabetical
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[sqlx::test]
    async fn contains_id(pool: Pool<Sqlite>) {
        let mut transaction = pool.begin().await.unwrap();
        let types = MarkerTypes::fetch_all(&mut transaction).await.unwrap();
        let id = types.into_iter().next().unwrap().type_id.unwrap();

        assert!(MarkerTypes::contains_id(&mut transaction, &id).await.unwrap());
        assert!(
            !MarkerTypes::contains_id(&mut transaction, &GeomarkId::new())
                .await
                .unwrap()
        );
    }
}
