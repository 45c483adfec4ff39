use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use crate::config::DatabaseSettings;
use crate::models::{GeoPoint, NewUser, ScoringWeights, UserId, UserPatch, UserProfile};
use crate::services::store::{StoreError, UserStore};

const USER_COLUMNS: &str = r#"
    id, name, email, age, gender, city, latitude, longitude,
    min_age_pref, max_age_pref, gender_pref, max_distance_pref,
    interest_weight, age_weight, distance_weight
"#;

/// Row of the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    age: i16,
    gender: String,
    city: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    min_age_pref: Option<i16>,
    max_age_pref: Option<i16>,
    gender_pref: Option<String>,
    max_distance_pref: i32,
    interest_weight: f64,
    age_weight: f64,
    distance_weight: f64,
}

fn age_from_db(value: i16) -> u8 {
    value.clamp(0, i16::from(u8::MAX)) as u8
}

impl UserRow {
    fn into_profile(self, interests: BTreeSet<String>) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name,
            email: self.email,
            age: age_from_db(self.age),
            gender: self.gender,
            city: self.city,
            location: GeoPoint::from_parts(self.latitude, self.longitude),
            interests,
            min_age_pref: self.min_age_pref.map(age_from_db),
            max_age_pref: self.max_age_pref.map(age_from_db),
            gender_pref: self.gender_pref,
            max_distance_pref: self.max_distance_pref.max(0) as u32,
            weights: ScoringWeights {
                interest: self.interest_weight,
                age: self.age_weight,
                distance: self.distance_weight,
            },
        }
    }
}

/// Map a unique-constraint violation on `users.email` to a domain error
fn map_unique_email(err: sqlx::Error, email: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateEmail(email.to_string());
        }
    }
    StoreError::SqlxError(err)
}

/// PostgreSQL-backed user store
///
/// Expects the `users` and `user_interests` tables from `sql/schema.sql`.
/// Interests are loaded in one query per batch of users and attached to
/// each profile before it is returned.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Attach interests to a batch of rows, keeping row order
    async fn hydrate(&self, rows: Vec<UserRow>) -> Result<Vec<UserProfile>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let interest_rows = sqlx::query(
            r#"
            SELECT user_id, name
            FROM user_interests
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut interests: HashMap<i64, BTreeSet<String>> = HashMap::new();
        for row in interest_rows {
            interests
                .entry(row.get("user_id"))
                .or_default()
                .insert(row.get("name"));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let names = interests.remove(&row.id).unwrap_or_default();
                row.into_profile(names)
            })
            .collect())
    }

    async fn insert_interests<'a, I>(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        names: I,
    ) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = &'a String>,
    {
        for name in names {
            sqlx::query(
                r#"
                INSERT INTO user_interests (user_id, name)
                VALUES ($1, $2)
                ON CONFLICT (user_id, name) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(name)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn get_user(&self, id: UserId) -> Result<Option<UserProfile>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_other_users(&self, excluding: UserId) -> Result<Vec<UserProfile>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id <> $1 ORDER BY id", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(excluding)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!("Loaded {} candidate users excluding {}", rows.len(), excluding);
        self.hydrate(rows).await
    }

    async fn list_users(&self, skip: u32, limit: u32) -> Result<Vec<UserProfile>, StoreError> {
        let query = format!("SELECT {} FROM users ORDER BY id LIMIT $1 OFFSET $2", USER_COLUMNS);
        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(i64::from(limit))
            .bind(i64::from(skip))
            .fetch_all(&self.pool)
            .await?;

        self.hydrate(rows).await
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (
                name, email, age, gender, city, latitude, longitude,
                min_age_pref, max_age_pref, gender_pref, max_distance_pref,
                interest_weight, age_weight, distance_weight
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(i16::from(user.age))
        .bind(&user.gender)
        .bind(&user.city)
        .bind(user.location.map(|p| p.latitude))
        .bind(user.location.map(|p| p.longitude))
        .bind(user.min_age_pref.map(i16::from))
        .bind(user.max_age_pref.map(i16::from))
        .bind(&user.gender_pref)
        .bind(i32::try_from(user.max_distance_pref).unwrap_or(i32::MAX))
        .bind(user.weights.interest)
        .bind(user.weights.age)
        .bind(user.weights.distance)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_email(e, &user.email))?;

        Self::insert_interests(&mut tx, id, &user.interests).await?;
        tx.commit().await?;

        tracing::debug!("Created user {} with {} interests", id, user.interests.len());
        Ok(user.into_profile(id))
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<Option<UserProfile>, StoreError> {
        let Some(mut profile) = self.get_user(id).await? else {
            return Ok(None);
        };
        patch.apply(&mut profile);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE users SET
                name = $2, email = $3, age = $4, gender = $5, city = $6,
                latitude = $7, longitude = $8,
                min_age_pref = $9, max_age_pref = $10, gender_pref = $11,
                max_distance_pref = $12,
                interest_weight = $13, age_weight = $14, distance_weight = $15
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(i16::from(profile.age))
        .bind(&profile.gender)
        .bind(&profile.city)
        .bind(profile.location.map(|p| p.latitude))
        .bind(profile.location.map(|p| p.longitude))
        .bind(profile.min_age_pref.map(i16::from))
        .bind(profile.max_age_pref.map(i16::from))
        .bind(&profile.gender_pref)
        .bind(i32::try_from(profile.max_distance_pref).unwrap_or(i32::MAX))
        .bind(profile.weights.interest)
        .bind(profile.weights.age)
        .bind(profile.weights.distance)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_email(e, &profile.email))?;

        if let Some(names) = &patch.interests {
            Self::insert_interests(&mut tx, id, names).await?;
        }
        tx.commit().await?;

        Ok(Some(profile))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        // user_interests rows go with the user via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
