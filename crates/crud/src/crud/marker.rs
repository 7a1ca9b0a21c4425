// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! All CRUD functionality for individual [`Marker`]s
//!

use crate::crud::common::*;
use chrono::{DateTime, Utc};
use geomark_core::{
    CreatedBy, GeoPoint, GeomarkId, Marker, MarkerType, Title, Visibility,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, Transaction};

/// The SELECT column list shared by every marker read.  The marker row is
/// joined with its type and its creator so one fetch yields a complete
/// [`Marker`].
const MARKER_COLUMNS: &str = r#"
    m.id, m.title, m.description,
    m.latitude, m.longitude, m.altitude,
    m.start_time, m.end_time,
    m.visibility, m.created_at, m.updated_at,
    m.type_id, mt.name AS type_name, mt.icon AS type_icon, mt.color AS type_color,
    m.creator_id, u.username AS creator_username
"#;

const MARKER_JOINS: &str = r#"
    FROM markers m
    LEFT JOIN marker_types mt ON m.type_id = mt.id
    JOIN users u ON m.creator_id = u.id
"#;

impl Create for Marker {
    /// Create a [`Marker`] in the database.  The creator becomes both
    /// creator and owner; timestamps are set server-side.  On success the
    /// marker is re-read so the joined type and creator fields are
    /// populated.
    async fn create(
        &mut self,
        transaction: &mut Transaction<'_, Sqlite>,
        creator_id: &GeomarkId,
    ) -> Result<(), CrudError> {
        if self.id().is_none() {
            self.set_id(GeomarkId::new());
        }
        let id = self.id().unwrap();
        let now = Utc::now();
        let point = self.point();
        let type_id = self.marker_type().and_then(|t| t.type_id);

        sqlx::query(
            r#"
            INSERT INTO markers
            (
                id, title, description,
                latitude, longitude, altitude,
                start_time, end_time,
                type_id, creator_id, owner_id,
                visibility, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(id)
        .bind(self.title().to_string())
        .bind(self.description())
        .bind(point.latitude())
        .bind(point.longitude())
        .bind(point.altitude())
        .bind(self.time_start())
        .bind(self.time_end())
        .bind(type_id)
        .bind(creator_id)
        .bind(creator_id)
        .bind(self.visibility())
        .bind(now)
        .bind(now)
        .execute(&mut **transaction)
        .await?;

        *self = Marker::fetch_by_id(transaction, &id).await?;
        Ok(())
    }
}

impl FetchById for Marker {
    async fn fetch_by_id(
        transaction: &mut Transaction<'_, Sqlite>,
        id: &GeomarkId,
    ) -> Result<Self, CrudError> {
        let sql = format!("SELECT {MARKER_COLUMNS} {MARKER_JOINS} WHERE m.id = ?");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut **transaction)
            .await?
            .ok_or(CrudError::IdNotInDb)?;
        marker_from_row(&row)
    }
}

impl Update for Marker {
    /// Write the marker's current state back to its row and bump
    /// `updated_at`.  Partial updates are applied to the in-memory marker
    /// first (via its setters) and then persisted here in one go.
    async fn update(&mut self, transaction: &mut Transaction<'_, Sqlite>) -> Result<(), CrudError> {
        let id = self.id().ok_or(CrudError::IdNotSet)?;
        let point = self.point();
        let type_id = self.marker_type().and_then(|t| t.type_id);

        let rows_affected = sqlx::query(
            r#"
            UPDATE markers SET
                title = ?, description = ?,
                latitude = ?, longitude = ?, altitude = ?,
                start_time = ?, end_time = ?,
                type_id = ?, visibility = ?, updated_at = ?
            WHERE id = ?
        "#,
        )
        .bind(self.title().to_string())
        .bind(self.description())
        .bind(point.latitude())
        .bind(point.longitude())
        .bind(point.altitude())
        .bind(self.time_start())
        .bind(self.time_end())
        .bind(type_id)
        .bind(self.visibility())
        .bind(Utc::now())
        .bind(id)
        .execute(&mut **transaction)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(CrudError::IdNotInDb);
        }

        *self = Marker::fetch_by_id(transaction, &id).await?;
        Ok(())
    }
}

impl DeleteById for Marker {
    async fn delete_by_id(
        transaction: &mut Transaction<'_, Sqlite>,
        id: &GeomarkId,
    ) -> Result<(), CrudError> {
        let rows_affected: RowsAffected = sqlx::query("DELETE FROM markers WHERE id = ?")
            .bind(id)
            .execute(&mut **transaction)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(CrudError::IdNotInDb);
        }
        Ok(())
    }
}

/// Whether the given user may see the given marker
pub fn user_may_see(marker: &Marker, user_id: &GeomarkId, is_friend_of_creator: bool) -> bool {
    let own = marker
        .created_by()
        .is_some_and(|creator| creator.user_id == *user_id);
    match marker.visibility() {
        Visibility::Public => true,
        Visibility::Private => own,
        Visibility::Friend => own || is_friend_of_creator,
    }
}

/// Fetch every marker the given user may see, narrowed by the filter.
///
/// Visible = public, or created/owned by the user, or friend-visibility
/// markers whose creator is a friend of the user.  Results are ordered by
/// start time.
pub async fn fetch_visible_to(
    transaction: &mut Transaction<'_, Sqlite>,
    user_id: &GeomarkId,
    filter: &MarkerFilter,
) -> Result<Vec<Marker>, CrudError> {
    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {MARKER_COLUMNS} {MARKER_JOINS} WHERE (m.visibility = 'public' OR m.creator_id = "
    ));
    builder.push_bind(user_id);
    builder.push(" OR m.owner_id = ");
    builder.push_bind(user_id);
    builder.push(
        r#" OR (m.visibility = 'friend' AND EXISTS (
            SELECT 1 FROM friendships f
            WHERE (f.user_a = "#,
    );
    builder.push_bind(user_id);
    builder.push(" AND f.user_b = m.creator_id) OR (f.user_a = m.creator_id AND f.user_b = ");
    builder.push_bind(user_id);
    builder.push("))))");

    if let Some(time_start) = filter.time_start {
        builder.push(" AND m.start_time >= ");
        builder.push_bind(time_start);
    }
    if let Some(time_end) = filter.time_end {
        builder.push(" AND m.start_time <= ");
        builder.push_bind(time_end);
    }
    if let Some(min_altitude) = filter.min_altitude {
        builder.push(" AND m.altitude >= ");
        builder.push_bind(min_altitude);
    }
    if let Some(max_altitude) = filter.max_altitude {
        builder.push(" AND m.altitude <= ");
        builder.push_bind(max_altitude);
    }
    if let Some(type_id) = filter.type_id {
        builder.push(" AND m.type_id = ");
        builder.push_bind(type_id);
    }
    if let Some(keyword) = &filter.keyword {
        let pattern = format!("%{keyword}%");
        builder.push(" AND (m.title LIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR m.description LIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }

    builder.push(" ORDER BY m.start_time");

    let rows = builder.build().fetch_all(&mut **transaction).await?;
    rows.iter().map(marker_from_row).collect()
}

/// Build a [`Marker`] from a joined marker row
fn marker_from_row(row: &SqliteRow) -> Result<Marker, CrudError> {
    let title: String = row.try_get("title").map_err(CrudError::from)?;
    let title = Title::from(&title).map_err(|_| CrudError::MalformedMarkerRow)?;

    let point = GeoPoint::from(
        row.try_get("latitude")?,
        row.try_get("longitude")?,
        row.try_get("altitude")?,
    )
    .map_err(|_| CrudError::MalformedMarkerRow)?;

    let marker_type = match row.try_get::<Option<GeomarkId>, _>("type_id")? {
        None => None,
        Some(type_id) => Some(MarkerType {
            type_id: Some(type_id),
            name: row
                .try_get::<Option<String>, _>("type_name")?
                .unwrap_or_default(),
            icon: row.try_get("type_icon")?,
            color: row.try_get("type_color")?,
        }),
    };

    let created_by = CreatedBy {
        user_id: row.try_get("creator_id")?,
        username: row.try_get("creator_username")?,
    };

    Marker::from(
        Some(row.try_get("id")?),
        title,
        row.try_get("description")?,
        point,
        row.try_get::<DateTime<Utc>, _>("start_time")?,
        row.try_get::<Option<DateTime<Utc>>, _>("end_time")?,
        marker_type,
        row.try_get("visibility")?,
        Some(created_by),
        Some(row.try_get::<DateTime<Utc>, _>("created_at")?),
        Some(row.try_get::<DateTime<Utc>, _>("updated_at")?),
    )
    .map_err(|_| CrudError::MalformedMarkerRow)
}
