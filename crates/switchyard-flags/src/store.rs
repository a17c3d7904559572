// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::instrument;

use switchyard_flags_core::{Flag, FlagState, FlagsError};

use crate::error::{FlagsServerError, Result};

/// Durable storage for flag records.
///
/// Implementations convert the persisted state string into [`FlagState`] when
/// a record is loaded, so a corrupt value fails here with
/// [`FlagsError::InvalidState`] rather than during evaluation.
#[async_trait]
pub trait FlagStore: Send + Sync {
	async fn find_by_name(&self, name: &str) -> Result<Option<Flag>>;
	async fn create(&self, name: &str, state: FlagState) -> Result<Flag>;
	/// Fails with [`FlagsError::FlagNotFound`] when no record exists.
	async fn update(&self, name: &str, state: FlagState) -> Result<Flag>;
	/// Returns whether a record was removed.
	async fn delete(&self, name: &str) -> Result<bool>;
	async fn all(&self) -> Result<Vec<Flag>>;
}

/// SQLite implementation of the flag store.
#[derive(Clone)]
pub struct SqliteFlagStore {
	pool: SqlitePool,
}

impl SqliteFlagStore {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Creates the `features` table if it does not exist.
	pub async fn migrate(&self) -> Result<()> {
		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS features (
				name TEXT PRIMARY KEY NOT NULL,
				state TEXT NOT NULL,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&self.pool)
		.await?;

		Ok(())
	}
}

#[async_trait]
impl FlagStore for SqliteFlagStore {
	#[instrument(skip(self), fields(flag = %name))]
	async fn find_by_name(&self, name: &str) -> Result<Option<Flag>> {
		let row = sqlx::query_as::<_, FlagRow>(
			r#"
			SELECT name, state, created_at, updated_at
			FROM features
			WHERE name = ?
			"#,
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(TryInto::try_into).transpose()
	}

	#[instrument(skip(self), fields(flag = %name, state = %state))]
	async fn create(&self, name: &str, state: FlagState) -> Result<Flag> {
		let flag = Flag::new(name, state)?;

		sqlx::query(
			r#"
			INSERT INTO features (name, state, created_at, updated_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(&flag.name)
		.bind(flag.state.as_str())
		.bind(flag.created_at.to_rfc3339())
		.bind(flag.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		Ok(flag)
	}

	#[instrument(skip(self), fields(flag = %name, state = %state))]
	async fn update(&self, name: &str, state: FlagState) -> Result<Flag> {
		let result = sqlx::query(
			r#"
			UPDATE features
			SET state = ?, updated_at = ?
			WHERE name = ?
			"#,
		)
		.bind(state.as_str())
		.bind(Utc::now().to_rfc3339())
		.bind(name)
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(FlagsError::FlagNotFound(name.to_string()).into());
		}

		self
			.find_by_name(name)
			.await?
			.ok_or_else(|| FlagsError::FlagNotFound(name.to_string()).into())
	}

	#[instrument(skip(self), fields(flag = %name))]
	async fn delete(&self, name: &str) -> Result<bool> {
		let result = sqlx::query(
			r#"
			DELETE FROM features WHERE name = ?
			"#,
		)
		.bind(name)
		.execute(&self.pool)
		.await?;

		Ok(result.rows_affected() > 0)
	}

	#[instrument(skip(self))]
	async fn all(&self) -> Result<Vec<Flag>> {
		let rows = sqlx::query_as::<_, FlagRow>(
			r#"
			SELECT name, state, created_at, updated_at
			FROM features
			ORDER BY name ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.into_iter().map(TryInto::try_into).collect()
	}
}

#[derive(sqlx::FromRow)]
struct FlagRow {
	name: String,
	state: String,
	created_at: String,
	updated_at: String,
}

impl TryFrom<FlagRow> for Flag {
	type Error = FlagsServerError;

	fn try_from(row: FlagRow) -> Result<Self> {
		Ok(Flag {
			state: FlagState::parse(&row.state)?,
			created_at: parse_timestamp(&row.created_at, "created_at")?,
			updated_at: parse_timestamp(&row.updated_at, "updated_at")?,
			name: row.name,
		})
	}
}

fn parse_timestamp(raw: &str, column: &str) -> Result<chrono::DateTime<Utc>> {
	chrono::DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|_| FlagsServerError::Internal(format!("Invalid {column}")))
}
