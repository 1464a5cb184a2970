use crate::domain::{Book, BookId, Goal, GoalBook, GoalBookEntry, GoalId, ReadingStatus, UserId};
use crate::ports::goal_repository::{
    BookRepository as BookRepositoryTrait, GoalRepository as GoalRepositoryTrait, Result,
};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use std::str::FromStr;

// ============================================================================
// 行マッピング
// ============================================================================

fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        book_id: BookId::from_uuid(row.get("book_id")),
        isbn13: row.get("isbn13"),
        title: row.get("title"),
        author: row.get("author"),
        publisher: row.get("publisher"),
        pubyear: row.get("pubyear"),
        ndc: row.get("ndc"),
        ndlc: row.get("ndlc"),
    }
}

fn map_row_to_goal(row: &PgRow) -> Goal {
    Goal {
        goal_id: GoalId::from_uuid(row.get("goal_id")),
        user_id: UserId::from_uuid(row.get("user_id")),
        title: row.get("title"),
        description: row.get("description"),
        due_date: row.get("due_date"),
        archived: row.get("archived"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// statusカラムの文字列をReadingStatusに変換する
///
/// CHECK制約があるため通常は失敗しないが、不正値はInvalidDataとして返す。
fn reading_status(row: &PgRow) -> Result<ReadingStatus> {
    let status_str: &str = row.get("status");
    ReadingStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })
}

fn map_row_to_goal_book(row: &PgRow) -> Result<GoalBook> {
    Ok(GoalBook {
        goal_id: GoalId::from_uuid(row.get("goal_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        position: row.get("position"),
        status: reading_status(row)?,
        completed_at: row.get("completed_at"),
    })
}

fn map_row_to_entry(row: &PgRow) -> Result<GoalBookEntry> {
    Ok(GoalBookEntry {
        book: map_row_to_book(row),
        status: reading_status(row)?,
        position: row.get("position"),
        completed_at: row.get("completed_at"),
    })
}

async fn upsert_goal_book(conn: &mut PgConnection, goal_book: &GoalBook) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO goal_books (goal_id, book_id, position, status, completed_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (goal_id, book_id)
        DO UPDATE SET
            position = EXCLUDED.position,
            status = EXCLUDED.status,
            completed_at = EXCLUDED.completed_at
        "#,
    )
    .bind(goal_book.goal_id.value())
    .bind(goal_book.book_id.value())
    .bind(goal_book.position)
    .bind(goal_book.status.as_str())
    .bind(goal_book.completed_at)
    .execute(conn)
    .await?;

    Ok(())
}

// ============================================================================
// 書籍
// ============================================================================

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn find_by_isbn(&self, isbn13: &str) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT book_id, isbn13, title, author, publisher, pubyear, ndc, ndlc
            FROM books
            WHERE isbn13 = $1
            "#,
        )
        .bind(isbn13)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    /// 同じISBNが既に登録されていれば何もしない
    async fn insert(&self, book: Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (book_id, isbn13, title, author, publisher, pubyear, ndc, ndlc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (isbn13) DO NOTHING
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.isbn13)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.pubyear)
        .bind(&book.ndc)
        .bind(&book.ndlc)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// 読書目標
// ============================================================================

/// GoalRepositoryのPostgreSQL実装
pub struct GoalRepository {
    pool: PgPool,
}

impl GoalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    async fn save(&self, goal: Goal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO goals (
                goal_id,
                user_id,
                title,
                description,
                due_date,
                archived,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (goal_id)
            DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                due_date = EXCLUDED.due_date,
                archived = EXCLUDED.archived,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(goal.goal_id.value())
        .bind(goal.user_id.value())
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.due_date)
        .bind(goal.archived)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, goal_id: GoalId) -> Result<Option<Goal>> {
        let row = sqlx::query(
            r#"
            SELECT goal_id, user_id, title, description, due_date, archived, created_at, updated_at
            FROM goals
            WHERE goal_id = $1
            "#,
        )
        .bind(goal_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_goal))
    }

    async fn find_by_user(&self, user_id: UserId, include_archived: bool) -> Result<Vec<Goal>> {
        let rows = sqlx::query(
            r#"
            SELECT goal_id, user_id, title, description, due_date, archived, created_at, updated_at
            FROM goals
            WHERE user_id = $1 AND ($2 OR archived = FALSE)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.value())
        .bind(include_archived)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_goal).collect())
    }

    async fn goal_books(&self, goal_id: GoalId) -> Result<Vec<GoalBook>> {
        let rows = sqlx::query(
            r#"
            SELECT goal_id, book_id, position, status, completed_at
            FROM goal_books
            WHERE goal_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(goal_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_goal_book).collect()
    }

    /// 目標と書籍の関連を1トランザクションで登録する
    async fn create_with_books(&self, goal: Goal, goal_books: Vec<GoalBook>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO goals (
                goal_id,
                user_id,
                title,
                description,
                due_date,
                archived,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(goal.goal_id.value())
        .bind(goal.user_id.value())
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.due_date)
        .bind(goal.archived)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .execute(&mut *tx)
        .await?;

        for goal_book in &goal_books {
            upsert_goal_book(&mut *tx, goal_book).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// 複数行を1トランザクションでupsertする
    async fn save_goal_books(&self, goal_books: Vec<GoalBook>) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for goal_book in &goal_books {
            upsert_goal_book(&mut *tx, goal_book).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn goal_book_entries(&self, goal_id: GoalId) -> Result<Vec<GoalBookEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT
                b.book_id,
                b.isbn13,
                b.title,
                b.author,
                b.publisher,
                b.pubyear,
                b.ndc,
                b.ndlc,
                gb.position,
                gb.status,
                gb.completed_at
            FROM goal_books gb
            JOIN books b ON b.book_id = gb.book_id
            WHERE gb.goal_id = $1
            ORDER BY gb.position ASC
            "#,
        )
        .bind(goal_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_entry).collect()
    }

    async fn find_goal_book_by_isbn(
        &self,
        goal_id: GoalId,
        isbn13: &str,
    ) -> Result<Option<GoalBook>> {
        let row = sqlx::query(
            r#"
            SELECT gb.goal_id, gb.book_id, gb.position, gb.status, gb.completed_at
            FROM goal_books gb
            JOIN books b ON b.book_id = gb.book_id
            WHERE gb.goal_id = $1 AND b.isbn13 = $2
            "#,
        )
        .bind(goal_id.value())
        .bind(isbn13)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_goal_book).transpose()
    }

    async fn count_progress(&self, goal_id: GoalId) -> Result<(i64, i64)> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_books,
                COUNT(*) FILTER (WHERE status = 'done') AS done_books
            FROM goal_books
            WHERE goal_id = $1
            "#,
        )
        .bind(goal_id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok((row.get("total_books"), row.get("done_books")))
    }
}
