use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseSettings;
use crate::models::{AdminStats, Answer, AnswerRecord, CandidateRecords, GenderCount, Question, ScoredMatch, ScoringError, User, UserAnswerSet};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid data: {0}")]
    InvalidData(#[from] ScoringError),
}

/// Registration details stored alongside a questionnaire
#[derive(Debug, Clone)]
pub struct Registration<'a> {
    pub name: &'a str,
    pub phone_number: &'a str,
    pub gender: &'a str,
}

/// PostgreSQL client for users, questions, answers and stored match scores
///
/// Owned by the application state and handed to handlers explicitly; the
/// scoring code never touches it.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, PostgresError> {
        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Create a client whose pool connects on first use, without running migrations
    pub fn connect_lazy(database_url: &str) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Store a questionnaire submission
    ///
    /// The user is matched by phone number: an existing user gets their
    /// details updated, otherwise a new one is created. Previous answers are
    /// replaced wholesale. Everything happens in one transaction.
    pub async fn submit_questionnaire(
        &self,
        registration: &Registration<'_>,
        answers: &[Answer],
    ) -> Result<String, PostgresError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<String> = sqlx::query("SELECT id FROM users WHERE phone_number = $1")
            .bind(registration.phone_number)
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| row.get("id"));

        let user_id = match existing {
            Some(id) => {
                sqlx::query(
                    r#"
                    UPDATE users
                    SET name = $1, gender = $2, updated_at = NOW()
                    WHERE id = $3
                    "#,
                )
                .bind(registration.name)
                .bind(registration.gender)
                .bind(&id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                sqlx::query(
                    r#"
                    INSERT INTO users (id, phone_number, name, gender, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, NOW(), NOW())
                    "#,
                )
                .bind(&id)
                .bind(registration.phone_number)
                .bind(registration.name)
                .bind(registration.gender)
                .execute(&mut *tx)
                .await?;
                id
            }
        };

        sqlx::query("DELETE FROM answers WHERE user_id = $1")
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;

        for answer in answers {
            sqlx::query(
                r#"
                INSERT INTO answers (id, user_id, question_id, my_attribute, desired_attribute, importance)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&user_id)
            .bind(&answer.question_id)
            .bind(&answer.my_attribute)
            .bind(&answer.desired_attribute)
            .bind(answer.importance.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!("Stored {} answers for user {}", answers.len(), user_id);

        Ok(user_id)
    }

    /// Look up a user by phone number
    pub async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>, PostgresError> {
        let query = r#"
            SELECT id, phone_number, name, gender, created_at, updated_at
            FROM users
            WHERE phone_number = $1
        "#;

        let row = sqlx::query(query)
            .bind(phone_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| user_from_row(&row)))
    }

    /// Get a user's stored answers
    pub async fn get_answers(&self, user_id: &str) -> Result<Vec<AnswerRecord>, PostgresError> {
        let query = r#"
            SELECT question_id, my_attribute, desired_attribute, importance
            FROM answers
            WHERE user_id = $1
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(answer_from_row).collect())
    }

    /// Get a user's answers as a validated answer set
    ///
    /// Fails with `InvalidData` when a stored importance tag is unrecognized.
    pub async fn get_answer_set(&self, user_id: &str) -> Result<UserAnswerSet, PostgresError> {
        let records = self.get_answers(user_id).await?;
        Ok(UserAnswerSet::from_records(user_id, records)?)
    }

    /// Get every user except `exclude_user_id`, each with their answers
    pub async fn get_candidates(&self, exclude_user_id: &str) -> Result<Vec<CandidateRecords>, PostgresError> {
        let users = sqlx::query(
            r#"
            SELECT id, phone_number, name, gender, created_at, updated_at
            FROM users
            WHERE id != $1
            ORDER BY id
            "#,
        )
        .bind(exclude_user_id)
        .fetch_all(&self.pool)
        .await?;

        let answer_rows = sqlx::query(
            r#"
            SELECT user_id, question_id, my_attribute, desired_attribute, importance
            FROM answers
            WHERE user_id != $1
            "#,
        )
        .bind(exclude_user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut answers_by_user: HashMap<String, Vec<AnswerRecord>> = HashMap::new();
        for row in &answer_rows {
            answers_by_user
                .entry(row.get("user_id"))
                .or_default()
                .push(answer_from_row(row));
        }

        let candidates: Vec<CandidateRecords> = users
            .iter()
            .map(|row| {
                let user = user_from_row(row);
                let answers = answers_by_user.remove(&user.id).unwrap_or_default();
                CandidateRecords { user, answers }
            })
            .collect();

        tracing::debug!("Loaded {} candidates excluding {}", candidates.len(), exclude_user_id);

        Ok(candidates)
    }

    /// Get all questions in questionnaire order
    pub async fn get_questions(&self) -> Result<Vec<Question>, PostgresError> {
        let query = r#"
            SELECT id, text, question_type, category
            FROM questions
            ORDER BY position, id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| Question {
                id: row.get("id"),
                text: row.get("text"),
                question_type: row.get("question_type"),
                category: row.get("category"),
            })
            .collect())
    }

    /// Store computed scores for a user's matches
    ///
    /// Pairs are keyed with the smaller id first, so the same pair computed
    /// from either side lands on one row.
    pub async fn record_matches(&self, user_id: &str, matches: &[ScoredMatch]) -> Result<u64, PostgresError> {
        let mut tx = self.pool.begin().await?;
        let mut stored = 0;

        for scored in matches {
            let (user_a, user_b) = ordered_pair(user_id, &scored.user_id);
            let result = sqlx::query(
                r#"
                INSERT INTO matches (user_a_id, user_b_id, score, created_at)
                VALUES ($1, $2, $3, NOW())
                ON CONFLICT (user_a_id, user_b_id)
                DO UPDATE SET
                    score = EXCLUDED.score,
                    created_at = EXCLUDED.created_at
                "#,
            )
            .bind(user_a)
            .bind(user_b)
            .bind(scored.score)
            .execute(&mut *tx)
            .await?;
            stored += result.rows_affected();
        }

        tx.commit().await?;

        tracing::debug!("Recorded {} match scores for user {}", stored, user_id);

        Ok(stored)
    }

    /// Aggregate waitlist statistics for the admin dashboard
    pub async fn get_admin_stats(&self) -> Result<AdminStats, PostgresError> {
        let totals = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(DISTINCT user_id) FROM answers) AS completed_users,
                (SELECT COUNT(*) FROM matches) AS total_matches
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let genders = sqlx::query(
            r#"
            SELECT gender, COUNT(*) AS count
            FROM users
            GROUP BY gender
            ORDER BY count DESC, gender
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(AdminStats {
            total_users: totals.get("total_users"),
            gender_breakdown: genders
                .iter()
                .map(|row| GenderCount {
                    gender: row.get("gender"),
                    count: row.get("count"),
                })
                .collect(),
            completed_users: totals.get("completed_users"),
            total_matches: totals.get("total_matches"),
        })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        phone_number: row.get("phone_number"),
        name: row.get("name"),
        gender: row.get("gender"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn answer_from_row(row: &sqlx::postgres::PgRow) -> AnswerRecord {
    AnswerRecord {
        question_id: row.get("question_id"),
        my_attribute: row.get("my_attribute"),
        desired_attribute: row.get("desired_attribute"),
        importance: row.get("importance"),
    }
}

/// Order a pair of user ids so the smaller comes first
fn ordered_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}
