//! Shopper profile repository: shipping address and jewelry preferences.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use diamant_rouge_core::{
    Email, MemberStatus, Preferences, PreferencesUpdate, Profile, ShippingAddress, UserId,
};

use super::RepositoryError;

const PROFILE_COLUMNS: &str = r"
    id, email, member_status, created_at,
    address, city, postal_code, country, phone_number,
    preferred_metals, preferred_gemstones, ring_size, bracelet_size, necklace_length
";

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: UserId,
    email: String,
    member_status: String,
    created_at: DateTime<Utc>,
    address: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
    phone_number: Option<String>,
    preferred_metals: Vec<String>,
    preferred_gemstones: Vec<String>,
    ring_size: Option<String>,
    bracelet_size: Option<String>,
    necklace_length: Option<String>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let member_status = MemberStatus::parse(&row.member_status).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "user {}: unknown member status {:?}",
                row.id, row.member_status
            ))
        })?;

        Ok(Self {
            id: row.id,
            email,
            member_status,
            address: ShippingAddress {
                address: row.address,
                city: row.city,
                postal_code: row.postal_code,
                country: row.country,
                phone_number: row.phone_number,
            },
            preferences: Preferences {
                preferred_metals: row.preferred_metals,
                preferred_gemstones: row.preferred_gemstones,
                ring_size: row.ring_size,
                bracelet_size: row.bracelet_size,
                necklace_length: row.necklace_length,
            },
            created_at: row.created_at,
        })
    }
}

/// Repository for shopper profiles.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` for an invalid stored email or status.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM storefront.user WHERE id = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Profile::try_from).transpose()
    }

    /// Replace the shipping address. `None` fields are stored as `NULL`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_address(
        &self,
        user_id: UserId,
        address: &ShippingAddress,
    ) -> Result<Profile, RepositoryError> {
        let sql = format!(
            r"
            UPDATE storefront.user
            SET address = $2, city = $3, postal_code = $4, country = $5,
                phone_number = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .bind(address.address.as_deref())
            .bind(address.city.as_deref())
            .bind(address.postal_code.as_deref())
            .bind(address.country.as_deref())
            .bind(address.phone_number.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Profile::try_from(row)
    }

    /// Apply a normalized preferences update.
    ///
    /// Lists that are `None` keep their stored value; sizes are always
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_preferences(
        &self,
        user_id: UserId,
        update: &PreferencesUpdate,
    ) -> Result<Profile, RepositoryError> {
        let sql = format!(
            r"
            UPDATE storefront.user
            SET preferred_metals = COALESCE($2, preferred_metals),
                preferred_gemstones = COALESCE($3, preferred_gemstones),
                ring_size = $4, bracelet_size = $5, necklace_length = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .bind(update.preferred_metals.as_deref())
            .bind(update.preferred_gemstones.as_deref())
            .bind(update.ring_size.as_deref())
            .bind(update.bracelet_size.as_deref())
            .bind(update.necklace_length.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Profile::try_from(row)
    }
}
