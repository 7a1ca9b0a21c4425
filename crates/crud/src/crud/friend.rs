// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Friendships, friend requests and user search.
//!
//! A friendship is stored once with `user_a < user_b` (byte order of the
//! IDs), so every lookup checks the pair in both orders.
//!

use crate::crud::common::*;
use chrono::{DateTime, Utc};
use geomark_core::{FriendRequestSummary, FriendSummary, GeomarkId, UserSearchHit};
use sqlx::{Row, Sqlite, Transaction};

/// How many hits a user search returns at most
const SEARCH_LIMIT: Limit = Limit(20);

/// The canonical `(user_a, user_b)` ordering of a pair
fn canonical(a: &GeomarkId, b: &GeomarkId) -> (GeomarkId, GeomarkId) {
    if a <= b { (*a, *b) } else { (*b, *a) }
}

/// Whether the two users are friends
pub async fn are_friends(
    transaction: &mut Transaction<'_, Sqlite>,
    a: &GeomarkId,
    b: &GeomarkId,
) -> Result<bool, CrudError> {
    let (user_a, user_b) = canonical(a, b);
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM friendships WHERE user_a = ? AND user_b = ?")
            .bind(user_a)
            .bind(user_b)
            .fetch_one(&mut **transaction)
            .await?;
    Ok(count > 0)
}

/// Create a friendship between two users.  The pair is stored once in
/// canonical order; a pair that already exists (in either order) yields
/// [`CrudError::AlreadyFriends`].  Any pending request between the two is
/// consumed.
pub async fn add_friendship(
    transaction: &mut Transaction<'_, Sqlite>,
    a: &GeomarkId,
    b: &GeomarkId,
) -> Result<(), CrudError> {
    if a == b {
        return Err(CrudError::Forbidden);
    }
    if are_friends(transaction, a, b).await? {
        return Err(CrudError::AlreadyFriends);
    }

    // The target must actually exist
    crate::fetch_user_by_id(transaction, b).await?;

    let (user_a, user_b) = canonical(a, b);
    sqlx::query("INSERT INTO friendships (user_a, user_b, created_at) VALUES (?, ?, ?)")
        .bind(user_a)
        .bind(user_b)
        .bind(Utc::now())
        .execute(&mut **transaction)
        .await?;

    sqlx::query(
        r#"
        DELETE FROM friend_requests
        WHERE (sender_id = ? AND recipient_id = ?) OR (sender_id = ? AND recipient_id = ?)
    "#,
    )
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .execute(&mut **transaction)
    .await?;

    Ok(())
}

/// Remove a friendship.  [`CrudError::NotInDb`] if the pair are not friends.
pub async fn remove_friendship(
    transaction: &mut Transaction<'_, Sqlite>,
    a: &GeomarkId,
    b: &GeomarkId,
) -> Result<(), CrudError> {
    let (user_a, user_b) = canonical(a, b);
    let rows_affected: RowsAffected =
        sqlx::query("DELETE FROM friendships WHERE user_a = ? AND user_b = ?")
            .bind(user_a)
            .bind(user_b)
            .execute(&mut **transaction)
            .await?
            .rows_affected();

    if rows_affected == 0 {
        return Err(CrudError::NotInDb);
    }
    Ok(())
}

/// How many users are friends with both `a` and `b`
pub async fn mutual_friend_count(
    transaction: &mut Transaction<'_, Sqlite>,
    a: &GeomarkId,
    b: &GeomarkId,
) -> Result<u32, CrudError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM users c
        WHERE c.id != ?1 AND c.id != ?2
        AND EXISTS (
            SELECT 1 FROM friendships f
            WHERE (f.user_a = ?1 AND f.user_b = c.id) OR (f.user_a = c.id AND f.user_b = ?1)
        )
        AND EXISTS (
            SELECT 1 FROM friendships f
            WHERE (f.user_a = ?2 AND f.user_b = c.id) OR (f.user_a = c.id AND f.user_b = ?2)
        )
    "#,
    )
    .bind(a)
    .bind(b)
    .fetch_one(&mut **transaction)
    .await?;
    Ok(count as u32)
}

/// List a user's friends, alphabetically by username
pub async fn list_friends(
    transaction: &mut Transaction<'_, Sqlite>,
    user_id: &GeomarkId,
) -> Result<Vec<FriendSummary>, CrudError> {
    let rows = sqlx::query(
        r#"
        SELECT u.id, u.username, u.email, u.phone, f.created_at
        FROM friendships f
        JOIN users u ON u.id = CASE WHEN f.user_a = ?1 THEN f.user_b ELSE f.user_a END
        WHERE f.user_a = ?1 OR f.user_b = ?1
        ORDER BY u.username
    "#,
    )
    .bind(user_id)
    .fetch_all(&mut **transaction)
    .await?;

    let mut friends = Vec::with_capacity(rows.len());
    for row in rows {
        let friend_id: GeomarkId = row.try_get("id")?;
        friends.push(FriendSummary {
            id: friend_id,
            name: row.try_get("username")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            mutual_friends: mutual_friend_count(transaction, user_id, &friend_id).await?,
            created_at: Some(row.try_get::<DateTime<Utc>, _>("created_at")?),
        });
    }
    Ok(friends)
}

/// Send a friend request.  Being friends already yields
/// [`CrudError::AlreadyFriends`]; a pending request between the two (either
/// direction) yields [`CrudError::RequestExists`].
pub async fn send_request(
    transaction: &mut Transaction<'_, Sqlite>,
    sender_id: &GeomarkId,
    recipient_id: &GeomarkId,
    message: Option<&str>,
) -> Result<(), CrudError> {
    if sender_id == recipient_id {
        return Err(CrudError::Forbidden);
    }
    if are_friends(transaction, sender_id, recipient_id).await? {
        return Err(CrudError::AlreadyFriends);
    }

    crate::fetch_user_by_id(transaction, recipient_id).await?;

    let pending: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM friend_requests
        WHERE (sender_id = ?1 AND recipient_id = ?2) OR (sender_id = ?2 AND recipient_id = ?1)
    "#,
    )
    .bind(sender_id)
    .bind(recipient_id)
    .fetch_one(&mut **transaction)
    .await?;
    if pending > 0 {
        return Err(CrudError::RequestExists);
    }

    sqlx::query(
        r#"
        INSERT INTO friend_requests (id, sender_id, recipient_id, message, created_at)
        VALUES (?, ?, ?, ?, ?)
    "#,
    )
    .bind(GeomarkId::new())
    .bind(sender_id)
    .bind(recipient_id)
    .bind(message)
    .bind(Utc::now())
    .execute(&mut **transaction)
    .await?;

    Ok(())
}

/// List the pending requests addressed to a user, newest first
pub async fn list_incoming_requests(
    transaction: &mut Transaction<'_, Sqlite>,
    user_id: &GeomarkId,
) -> Result<Vec<FriendRequestSummary>, CrudError> {
    let rows = sqlx::query(
        r#"
        SELECT r.id, r.sender_id, r.message, r.created_at, u.username
        FROM friend_requests r
        JOIN users u ON u.id = r.sender_id
        WHERE r.recipient_id = ?
        ORDER BY r.created_at DESC
    "#,
    )
    .bind(user_id)
    .fetch_all(&mut **transaction)
    .await?;

    let mut requests = Vec::with_capacity(rows.len());
    for row in rows {
        let sender_id: GeomarkId = row.try_get("sender_id")?;
        requests.push(FriendRequestSummary {
            id: row.try_get("id")?,
            sender_id,
            name: row.try_get("username")?,
            mutual_friends: mutual_friend_count(transaction, user_id, &sender_id).await?,
            request_date: row.try_get::<DateTime<Utc>, _>("created_at")?,
            message: row
                .try_get::<Option<String>, _>("message")?
                .unwrap_or_default(),
        });
    }
    Ok(requests)
}

/// Accept or decline a friend request.
///
/// Only the recipient may handle a request; anyone else gets
/// [`CrudError::Forbidden`].  The request row is deleted either way (on
/// accept, by the friendship creation).
pub async fn handle_request(
    transaction: &mut Transaction<'_, Sqlite>,
    user_id: &GeomarkId,
    request_id: &GeomarkId,
    accept: bool,
) -> Result<(), CrudError> {
    let row = sqlx::query("SELECT sender_id, recipient_id FROM friend_requests WHERE id = ?")
        .bind(request_id)
        .fetch_optional(&mut **transaction)
        .await?
        .ok_or(CrudError::NotInDb)?;
    let sender_id: GeomarkId = row.try_get("sender_id")?;
    let recipient_id: GeomarkId = row.try_get("recipient_id")?;

    if recipient_id != *user_id {
        return Err(CrudError::Forbidden);
    }

    if accept {
        // Also consumes the request row
        add_friendship(transaction, &sender_id, &recipient_id).await?;
    } else {
        sqlx::query("DELETE FROM friend_requests WHERE id = ?")
            .bind(request_id)
            .execute(&mut **transaction)
            .await?;
    }
    Ok(())
}

/// Search users by username or email substring, excluding the requesting
/// user, with friendship and pending-request flags
pub async fn search_users(
    transaction: &mut Transaction<'_, Sqlite>,
    query: &str,
    requesting_user: &GeomarkId,
) -> Result<Vec<UserSearchHit>, CrudError> {
    let Limit(limit) = SEARCH_LIMIT;
    let pattern = format!("%{query}%");
    let rows = sqlx::query(
        r#"
        SELECT id, username FROM users
        WHERE id != ? AND (username LIKE ? OR email LIKE ?)
        ORDER BY username
        LIMIT ?
    "#,
    )
    .bind(requesting_user)
    .bind(&pattern)
    .bind(&pattern)
    .bind(limit)
    .fetch_all(&mut **transaction)
    .await?;

    let mut hits = Vec::with_capacity(rows.len());
    for row in rows {
        let id: GeomarkId = row.try_get("id")?;
        let pending: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM friend_requests
            WHERE (sender_id = ?1 AND recipient_id = ?2) OR (sender_id = ?2 AND recipient_id = ?1)
        "#,
        )
        .bind(requesting_user)
        .bind(id)
        .fetch_one(&mut **transaction)
        .await?;

        hits.push(UserSearchHit {
            id,
            name: row.try_get("username")?,
            mutual_friends: mutual_friend_count(transaction, requesting_user, &id).await?,
            is_friend: are_friends(transaction, requesting_user, &id).await?,
            is_pending: pending > 0,
        });
    }
    Ok(hits)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::seed_user;
    use sqlx::Pool;

    #[sqlx::test]
    async fn add_list_remove(pool: Pool<Sqlite>) {
        let mut transaction = pool.begin().await.unwrap();
        let alice = seed_user(&mut transaction, "alice").await;
        let bella = seed_user(&mut transaction, "bella").await;

        add_friendship(&mut transaction, &alice.id, &bella.id)
            .await
            .unwrap();
        assert!(are_friends(&mut transaction, &bella.id, &alice.id)
            .await
            .unwrap());

        let friends = list_friends(&mut transaction, &alice.id).await.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].name, "bella");
        assert!(friends[0].created_at.is_some());

        remove_friendship(&mut transaction, &bella.id, &alice.id)
            .await
            .unwrap();
        assert!(list_friends(&mut transaction, &alice.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[sqlx::test]
    async fn add_deduplicates_both_orders(pool: Pool<Sqlite>) {
        let mut transaction = pool.begin().await.unwrap();
        let alice = seed_user(&mut transaction, "alice").await;
        let bella = seed_user(&mut transaction, "bella").await;

        add_friendship(&mut transaction, &alice.id, &bella.id)
            .await
            .unwrap();
        assert_eq!(
            add_friendship(&mut transaction, &bella.id, &alice.id)
                .await
                .unwrap_err(),
            CrudError::AlreadyFriends
        );
    }

    #[sqlx::test]
    async fn remove_unknown_pair(pool: Pool<Sqlite>) {
        let mut transaction = pool.begin().await.unwrap();
        let alice = seed_user(&mut transaction, "alice").await;
        let bella = seed_user(&mut transaction, "bella").await;

        assert_eq!(
            remove_friendship(&mut transaction, &alice.id, &bella.id)
                .await
                .unwrap_err(),
            CrudError::NotInDb
        );
    }

    #[sqlx::test]
    async fn request_lifecycle(pool: Pool<Sqlite>) {
        let mut transaction = pool.begin().await.unwrap();
        let alice = seed_user(&mut transaction, "alice").await;
        let bella = seed_user(&mut transaction, "bella").await;

        send_request(&mut transaction, &alice.id, &bella.id, Some("Hi!"))
            .await
            .unwrap();

        // Duplicate (and reverse-direction) requests are rejected
        assert_eq!(
            send_request(&mut transaction, &alice.id, &bella.id, None)
                .await
                .unwrap_err(),
            CrudError::RequestExists
        );
        assert_eq!(
            send_request(&mut transaction, &bella.id, &alice.id, None)
                .await
                .unwrap_err(),
            CrudError::RequestExists
        );

        let incoming = list_incoming_requests(&mut transaction, &bella.id)
            .await
            .unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].name, "alice");
        assert_eq!(incoming[0].message, "Hi!");

        // Only the recipient may handle it
        assert_eq!(
            handle_request(&mut transaction, &alice.id, &incoming[0].id, true)
                .await
                .unwrap_err(),
            CrudError::Forbidden
        );

        handle_request(&mut transaction, &bella.id, &incoming[0].id, true)
            .await
            .unwrap();
        assert!(are_friends(&mut transaction, &alice.id, &bella.id)
            .await
            .unwrap());

        // Consumed either way
        assert!(list_incoming_requests(&mut transaction, &bella.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[sqlx::test]
    async fn declined_request_is_consumed(pool: Pool<Sqlite>) {
        let mut transaction = pool.begin().await.unwrap();
        let alice = seed_user(&mut transaction, "alice").await;
        let bella = seed_user(&mut transaction, "bella").await;

        send_request(&mut transaction, &alice.id, &bella.id, None)
            .await
            .unwrap();
        let incoming = list_incoming_requests(&mut transaction, &bella.id)
            .await
            .unwrap();

        handle_request(&mut transaction, &bella.id, &incoming[0].id, false)
            .await
            .unwrap();
        assert!(!are_friends(&mut transaction, &alice.id, &bella.id)
            .await
            .unwrap());
        assert!(list_incoming_requests(&mut transaction, &bella.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[sqlx::test]
    async fn request_to_a_friend_is_rejected(pool: Pool<Sqlite>) {
        let mut transaction = pool.begin().await.unwrap();
        let alice = seed_user(&mut transaction, "alice").await;
        let bella = seed_user(&mut transaction, "bella").await;

        add_friendship(&mut transaction, &alice.id, &bella.id)
            .await
            .unwrap();
        assert_eq!(
            send_request(&mut transaction, &alice.id, &bella.id, None)
                .await
                .unwrap_err(),
            CrudError::AlreadyFriends
        );
    }

    #[sqlx::test]
    async fn mutual_friends(pool: Pool<Sqlite>) {
        let mut transaction = pool.begin().await.unwrap();
        let alice = seed_user(&mut transaction, "alice").await;
        let bella = seed_user(&mut transaction, "bella").await;
        let carol = seed_user(&mut transaction, "carol").await;

        // Carol is friends with both
        add_friendship(&mut transaction, &alice.id, &carol.id)
            .await
            .unwrap();
        add_friendship(&mut transaction, &bella.id, &carol.id)
            .await
            .unwrap();

        assert_eq!(
            mutual_friend_count(&mut transaction, &alice.id, &bella.id)
                .await
                .unwrap(),
            1
        );
    }

    #[sqlx::test]
    async fn search_flags(pool: Pool<Sqlite>) {
        let mut transaction = pool.begin().await.unwrap();
        let alice = seed_user(&mut transaction, "alice").await;
        let bella = seed_user(&mut transaction, "bella").await;
        let carol = seed_user(&mut transaction, "caroline").await;

        add_friendship(&mut transaction, &alice.id, &bella.id)
            .await
            .unwrap();
        send_request(&mut transaction, &alice.id, &carol.id, None)
            .await
            .unwrap();

        // Self is excluded even when the query matches
        let hits = search_users(&mut transaction, "l", &alice.id).await.unwrap();
        let names: Vec<&str> = hits.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["bella", "caroline"]);
        assert!(hits[0].is_friend && !hits[0].is_pending);
        assert!(!hits[1].is_friend && hits[1].is_pending);
    }
}
