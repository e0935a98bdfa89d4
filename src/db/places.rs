use chrono::Utc;
use rand::{seq::SliceRandom, Rng};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    error::{GameError, Result},
    models::{NewPlace, Place, PlaceSource, SeedPlace},
};

const PLACE_COLUMNS: &str =
    "place_id, name, latitude, longitude, image_name, image_data, source, created_at";

pub async fn all_places(pool: &SqlitePool) -> Result<Vec<Place>> {
    let places = sqlx::query_as::<_, Place>(&format!(
        "SELECT {} FROM places ORDER BY created_at, rowid",
        PLACE_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(places)
}

pub async fn get_place(pool: &SqlitePool, place_id: Uuid) -> Result<Option<Place>> {
    let place = sqlx::query_as::<_, Place>(&format!(
        "SELECT {} FROM places WHERE place_id = ?",
        PLACE_COLUMNS
    ))
    .bind(place_id)
    .fetch_optional(pool)
    .await?;

    Ok(place)
}

pub async fn count_places(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM places")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Validate and persist a user-submitted place
pub async fn add_place(pool: &SqlitePool, new_place: NewPlace) -> Result<Place> {
    let name = new_place.name.trim();
    if name.is_empty() {
        return Err(GameError::validation("place name must not be empty"));
    }
    new_place.coordinate.validate()?;
    if new_place.image.is_empty() {
        return Err(GameError::validation("place image must not be empty"));
    }

    let place = sqlx::query_as::<_, Place>(&format!(
        r#"
        INSERT INTO places (place_id, name, latitude, longitude, image_name, image_data, source, created_at)
        VALUES (?, ?, ?, ?, NULL, ?, ?, ?)
        RETURNING {}
        "#,
        PLACE_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(new_place.coordinate.latitude)
    .bind(new_place.coordinate.longitude)
    .bind(&new_place.image)
    .bind(PlaceSource::User)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::info!("Added place '{}' ({})", place.name, place.place_id);
    Ok(place)
}

/// Insert the built-in catalog when the repository holds no places.
/// Returns the number of places inserted (0 when already populated).
pub async fn seed_if_empty(pool: &SqlitePool, catalog: &[SeedPlace]) -> Result<u64> {
    // Count and inserts share one transaction so a half-seeded catalog is never visible
    let mut tx = pool.begin().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM places")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        tracing::info!("Place catalog already holds {} places, skipping seed", existing);
        return Ok(0);
    }

    let now = Utc::now();
    let mut inserted = 0;
    for seed in catalog {
        sqlx::query(
            r#"
            INSERT INTO places (place_id, name, latitude, longitude, image_name, image_data, source, created_at)
            VALUES (?, ?, ?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(seed.name)
        .bind(seed.latitude)
        .bind(seed.longitude)
        .bind(seed.image_name)
        .bind(PlaceSource::Seed)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        inserted += 1;
    }

    tx.commit().await?;
    tracing::info!("Seeded place catalog with {} places", inserted);
    Ok(inserted)
}

/// Shuffle the catalog and keep a prefix of at most `count` places
pub fn sample_places<R: Rng + ?Sized>(
    mut places: Vec<Place>,
    count: usize,
    rng: &mut R,
) -> Vec<Place> {
    places.shuffle(rng);
    places.truncate(count);
    places
}

/// Draw up to `count` distinct places for a session
pub async fn sample_for_session(pool: &SqlitePool, count: usize) -> Result<Vec<Place>> {
    let places = all_places(pool).await?;
    let available = places.len();
    let sample = sample_places(places, count, &mut rand::rng());

    if sample.len() < count {
        tracing::info!(
            "Catalog has {} places, session will play {} of {} rounds",
            available,
            sample.len(),
            count
        );
    }
    Ok(sample)
}
