//! Posting storage.
//!
//! Dates are stored as `YYYY-MM-DD` text, the experience tag as JSON and the
//! job type by its canonical name.

use crate::error::{DatabaseError, Result};
use chrono::NaiveDate;
use jobscout_core::{ExperienceTag, JobType, Posting, UserId};
use sqlx::{Pool, Row, Sqlite};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether `user` already has a posting matching title and company
/// case-insensitively, with equal posted dates or at least one unknown.
pub async fn exists_similar(
    pool: &Pool<Sqlite>,
    title: &str,
    company: &str,
    date_posted: Option<NaiveDate>,
    user: Option<&UserId>,
) -> Result<bool> {
    let date = date_posted.map(format_date);
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM postings
         WHERE user_id IS ?
           AND title = ? COLLATE NOCASE
           AND company = ? COLLATE NOCASE
           AND (date_posted IS NULL OR ? IS NULL OR date_posted = ?)",
    )
    .bind(user.map(UserId::as_str))
    .bind(title)
    .bind(company)
    .bind(date.as_deref())
    .bind(date.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Insert a posting, assigning an id when it has none.
pub async fn insert_posting(pool: &Pool<Sqlite>, mut posting: Posting) -> Result<Posting> {
    let id = posting
        .id
        .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
        .clone();
    let experience = serde_json::to_string(&posting.experience)?;
    let created_at = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO postings
         (id, user_id, title, company, location, description, url, date_posted,
          date_scraped, experience, job_type, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(posting.user_id.as_ref().map(UserId::as_str))
    .bind(&posting.title)
    .bind(&posting.company)
    .bind(&posting.location)
    .bind(posting.description.as_deref())
    .bind(posting.url.as_deref())
    .bind(posting.date_posted.map(format_date))
    .bind(format_date(posting.date_scraped))
    .bind(experience)
    .bind(posting.job_type.canonical_name())
    .bind(created_at)
    .execute(pool)
    .await?;

    tracing::debug!("Saved posting {} ({} at {})", id, posting.title, posting.company);
    Ok(posting)
}

/// Postings owned by `user`, most recently scraped first.
pub async fn list_postings(
    pool: &Pool<Sqlite>,
    user: Option<&UserId>,
    limit: u32,
) -> Result<Vec<Posting>> {
    let rows = sqlx::query(
        "SELECT id, user_id, title, company, location, description, url, date_posted,
                date_scraped, experience, job_type
         FROM postings
         WHERE user_id IS ?
         ORDER BY date_scraped DESC, created_at DESC
         LIMIT ?",
    )
    .bind(user.map(UserId::as_str))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.iter().map(posting_from_row).collect()
}

/// Most recent `date_scraped` among the user's postings.
pub async fn last_scrape_date(pool: &Pool<Sqlite>, user: &UserId) -> Result<Option<NaiveDate>> {
    let latest: Option<String> =
        sqlx::query_scalar("SELECT MAX(date_scraped) FROM postings WHERE user_id = ?")
            .bind(user.as_str())
            .fetch_one(pool)
            .await?;

    latest.as_deref().map(parse_date).transpose()
}

fn posting_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Posting> {
    let user_id = row
        .try_get::<Option<String>, _>("user_id")?
        .map(UserId::new)
        .transpose()
        .map_err(|e| DatabaseError::Decode(e.to_string()))?;
    let date_posted = row
        .try_get::<Option<String>, _>("date_posted")?
        .as_deref()
        .map(parse_date)
        .transpose()?;
    let date_scraped = parse_date(&row.try_get::<String, _>("date_scraped")?)?;
    let experience: ExperienceTag = serde_json::from_str(&row.try_get::<String, _>("experience")?)?;
    let job_type_name: String = row.try_get("job_type")?;
    let job_type = JobType::from_canonical_name(&job_type_name).ok_or_else(|| {
        DatabaseError::Decode(format!("Invalid job_type '{job_type_name}' in postings table"))
    })?;

    Ok(Posting {
        id: Some(row.try_get("id")?),
        title: row.try_get("title")?,
        company: row.try_get("company")?,
        location: row.try_get("location")?,
        description: row.try_get("description")?,
        url: row.try_get("url")?,
        date_posted,
        date_scraped,
        experience,
        job_type,
        user_id,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DatabaseError::Decode(format!("Invalid date '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use jobscout_core::ExperienceLevel;

    async fn setup() -> Database {
        let db = Database::in_memory().await.expect("create database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).expect("valid date")
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).expect("valid user")
    }

    fn posting(title: &str, company: &str, posted: Option<NaiveDate>, owner: &str) -> Posting {
        let mut posting = Posting::new(title, company, "Remote", day(10));
        posting.date_posted = posted;
        posting.user_id = Some(user(owner));
        posting
    }

    #[tokio::test]
    async fn test_insert_and_list_roundtrip() {
        let db = setup().await;
        let mut original = posting("Rust Engineer", "Acme", Some(day(3)), "u1");
        original.description = Some("Ship it".to_string());
        original.url = Some("https://jobs.test/view/1".to_string());
        original.experience = ExperienceTag::Facet(ExperienceLevel::Associate);
        original.job_type = JobType::Contract;

        let saved = insert_posting(db.pool(), original.clone()).await.expect("insert");
        assert!(saved.id.is_some());

        let listed = list_postings(db.pool(), Some(&user("u1")), 10)
            .await
            .expect("list");
        assert_eq!(listed, vec![saved]);
        assert_eq!(listed[0].job_type, JobType::Contract);
    }

    #[tokio::test]
    async fn test_similarity_rules() {
        let db = setup().await;
        insert_posting(db.pool(), posting("Rust Engineer", "Acme", Some(day(3)), "u1"))
            .await
            .expect("insert");
        let u1 = user("u1");

        assert!(exists_similar(db.pool(), "RUST ENGINEER", "acme", Some(day(3)), Some(&u1))
            .await
            .expect("query"));
        assert!(exists_similar(db.pool(), "Rust Engineer", "Acme", None, Some(&u1))
            .await
            .expect("query"));
        assert!(!exists_similar(db.pool(), "Rust Engineer", "Acme", Some(day(4)), Some(&u1))
            .await
            .expect("query"));
        assert!(
            !exists_similar(db.pool(), "Rust Engineer", "Acme", Some(day(3)), Some(&user("u2")))
                .await
                .expect("query")
        );
        assert!(!exists_similar(db.pool(), "Rust Engineer", "Acme", Some(day(3)), None)
            .await
            .expect("query"));
    }

    #[tokio::test]
    async fn test_unowned_postings_match_each_other() {
        let db = setup().await;
        let mut unowned = Posting::new("Engineer", "Acme", "", day(1));
        unowned.date_posted = None;
        insert_posting(db.pool(), unowned).await.expect("insert");

        assert!(exists_similar(db.pool(), "engineer", "ACME", Some(day(2)), None)
            .await
            .expect("query"));
    }

    #[tokio::test]
    async fn test_last_scrape_date() {
        let db = setup().await;
        let u1 = user("u1");
        assert_eq!(last_scrape_date(db.pool(), &u1).await.expect("query"), None);

        let mut older = posting("A", "Acme", None, "u1");
        older.date_scraped = day(2);
        let mut newer = posting("B", "Acme", None, "u1");
        newer.date_scraped = day(8);
        let mut other = posting("C", "Acme", None, "u2");
        other.date_scraped = day(20);
        for p in [older, newer, other] {
            insert_posting(db.pool(), p).await.expect("insert");
        }

        assert_eq!(last_scrape_date(db.pool(), &u1).await.expect("query"), Some(day(8)));
    }

    #[tokio::test]
    async fn test_corrupt_job_type_is_decode_error() {
        let db = setup().await;
        insert_posting(db.pool(), posting("A", "Acme", None, "u1"))
            .await
            .expect("insert");
        sqlx::query("UPDATE postings SET job_type = 'GIG'")
            .execute(db.pool())
            .await
            .expect("corrupt row");

        let result = list_postings(db.pool(), Some(&user("u1")), 10).await;
        match result {
            Err(DatabaseError::Decode(msg)) => assert!(msg.contains("GIG")),
            other => panic!("Expected Decode error, got {other:?}"),
        }
    }
}
