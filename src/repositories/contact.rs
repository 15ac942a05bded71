use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::{
    error::Result,
    models::{
        contact::{Contact, ContactChanges, ContactFields, ContactFilter},
        page::{Page, PageRequest},
    },
};

const CONTACT_COLUMNS: &str =
    "id, user_id, first_name, last_name, email, phone, created_at, updated_at";

// $1 owner; $2 name, $3 email, $4 phone patterns, NULL when the filter is absent.
const SEARCH_PREDICATE: &str = r#"
    user_id = $1
    AND ($2::text IS NULL OR first_name ILIKE $2 OR last_name ILIKE $2)
    AND ($3::text IS NULL OR email ILIKE $3)
    AND ($4::text IS NULL OR phone LIKE $4)
"#;

/// Storage for contact records. Every lookup is scoped to an owner.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Inserts a contact owned by `user_id`.
    async fn create(&self, user_id: i64, fields: ContactFields) -> Result<Contact>;

    /// Returns the contact only if it exists and belongs to `user_id`.
    async fn find_owned(&self, user_id: i64, id: i64) -> Result<Option<Contact>>;

    /// Applies `changes` if the contact belongs to `user_id`. Fields not named
    /// in `changes` keep whatever value is stored at the time of the write.
    async fn update_owned(
        &self,
        user_id: i64,
        id: i64,
        changes: &ContactChanges,
    ) -> Result<Option<Contact>>;

    /// Deletes the contact if it belongs to `user_id`. Returns whether a row was removed.
    async fn delete_owned(&self, user_id: i64, id: i64) -> Result<bool>;

    /// Filters and paginates the contacts of `user_id`, ordered by id.
    async fn search(
        &self,
        user_id: i64,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> Result<Page<Contact>>;
}

/// Escapes LIKE metacharacters and wraps the value for a substring match.
pub fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// PostgreSQL-backed [`ContactRepository`].
#[derive(Clone)]
pub struct PgContactRepository {
    pool: Pool,
}

impl PgContactRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn create(&self, user_id: i64, fields: ContactFields) -> Result<Contact> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!(
                r#"
                INSERT INTO contacts (user_id, first_name, last_name, email, phone)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {}
                "#,
                CONTACT_COLUMNS
            ))
            .await?;
        let row = client
            .query_one(
                &statement,
                &[
                    &user_id,
                    &fields.first_name,
                    &fields.last_name,
                    &fields.email,
                    &fields.phone,
                ],
            )
            .await?;
        Ok(Contact::try_from(&row)?)
    }

    async fn find_owned(&self, user_id: i64, id: i64) -> Result<Option<Contact>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!(
                "SELECT {} FROM contacts WHERE id = $1 AND user_id = $2",
                CONTACT_COLUMNS
            ))
            .await?;
        let row = client.query_opt(&statement, &[&id, &user_id]).await?;
        Ok(row.as_ref().map(Contact::try_from).transpose()?)
    }

    async fn update_owned(
        &self,
        user_id: i64,
        id: i64,
        changes: &ContactChanges,
    ) -> Result<Option<Contact>> {
        // Each optional column gets a "present" flag so absent fields keep the
        // stored value and present-but-empty ones become NULL.
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!(
                r#"
                UPDATE contacts
                SET first_name = COALESCE($3, first_name),
                    last_name = CASE WHEN $4::boolean THEN $5 ELSE last_name END,
                    email = CASE WHEN $6::boolean THEN $7 ELSE email END,
                    phone = CASE WHEN $8::boolean THEN $9 ELSE phone END,
                    updated_at = NOW()
                WHERE id = $1 AND user_id = $2
                RETURNING {}
                "#,
                CONTACT_COLUMNS
            ))
            .await?;

        let last_name = changes.last_name.clone().flatten();
        let email = changes.email.clone().flatten();
        let phone = changes.phone.clone().flatten();
        let row = client
            .query_opt(
                &statement,
                &[
                    &id,
                    &user_id,
                    &changes.first_name,
                    &changes.last_name.is_some(),
                    &last_name,
                    &changes.email.is_some(),
                    &email,
                    &changes.phone.is_some(),
                    &phone,
                ],
            )
            .await?;
        Ok(row.as_ref().map(Contact::try_from).transpose()?)
    }

    async fn delete_owned(&self, user_id: i64, id: i64) -> Result<bool> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("DELETE FROM contacts WHERE id = $1 AND user_id = $2")
            .await?;
        let deleted = client.execute(&statement, &[&id, &user_id]).await?;
        Ok(deleted > 0)
    }

    async fn search(
        &self,
        user_id: i64,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> Result<Page<Contact>> {
        let name = filter.name.as_deref().map(like_pattern);
        let email = filter.email.as_deref().map(like_pattern);
        let phone = filter.phone.as_deref().map(like_pattern);

        let client = self.pool.get().await?;

        let count_statement = client
            .prepare_cached(&format!("SELECT COUNT(*) FROM contacts WHERE {}", SEARCH_PREDICATE))
            .await?;
        let total: i64 = client
            .query_one(&count_statement, &[&user_id, &name, &email, &phone])
            .await?
            .try_get(0)?;

        let page_statement = client
            .prepare_cached(&format!(
                "SELECT {} FROM contacts WHERE {} ORDER BY id ASC LIMIT $5 OFFSET $6",
                CONTACT_COLUMNS, SEARCH_PREDICATE
            ))
            .await?;
        let rows = client
            .query(
                &page_statement,
                &[&user_id, &name, &email, &phone, &page.size, &page.offset()],
            )
            .await?;

        let items = rows
            .iter()
            .map(Contact::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!(
            user_id,
            total,
            page = page.page,
            size = page.size,
            "Contact search completed"
        );

        Ok(Page { items, total, request: page })
    }
}
