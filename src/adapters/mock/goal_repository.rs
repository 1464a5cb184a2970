use crate::domain::{Book, Goal, GoalBook, GoalBookEntry, GoalId, UserId};
use crate::ports::goal_repository::{
    BookRepository as BookRepositoryTrait, GoalRepository as GoalRepositoryTrait, Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// BookRepositoryのインメモリ実装
#[derive(Default)]
pub struct BookRepository {
    books: Mutex<Vec<Book>>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録済み書籍の数
    pub fn count(&self) -> usize {
        self.books.lock().unwrap().len()
    }

    fn by_id(&self) -> HashMap<crate::domain::BookId, Book> {
        self.books
            .lock()
            .unwrap()
            .iter()
            .map(|b| (b.book_id, b.clone()))
            .collect()
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn find_by_isbn(&self, isbn13: &str) -> Result<Option<Book>> {
        Ok(self
            .books
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.isbn13 == isbn13)
            .cloned())
    }

    /// 同じISBNが既にあれば何もしない（PostgreSQL実装と同じ）
    async fn insert(&self, book: Book) -> Result<()> {
        let mut books = self.books.lock().unwrap();
        if !books.iter().any(|b| b.isbn13 == book.isbn13) {
            books.push(book);
        }
        Ok(())
    }
}

/// GoalRepositoryのインメモリ実装
///
/// 書籍情報の結合のためにBookRepositoryを共有する。
pub struct GoalRepository {
    books: Arc<BookRepository>,
    goals: Mutex<HashMap<GoalId, Goal>>,
    goal_books: Mutex<Vec<GoalBook>>,
}

impl GoalRepository {
    pub fn new(books: Arc<BookRepository>) -> Self {
        Self {
            books,
            goals: Mutex::new(HashMap::new()),
            goal_books: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    async fn save(&self, goal: Goal) -> Result<()> {
        self.goals.lock().unwrap().insert(goal.goal_id, goal);
        Ok(())
    }

    async fn get_by_id(&self, goal_id: GoalId) -> Result<Option<Goal>> {
        Ok(self.goals.lock().unwrap().get(&goal_id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId, include_archived: bool) -> Result<Vec<Goal>> {
        let mut goals: Vec<Goal> = self
            .goals
            .lock()
            .unwrap()
            .values()
            .filter(|g| g.user_id == user_id && (include_archived || !g.archived))
            .cloned()
            .collect();
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    async fn goal_books(&self, goal_id: GoalId) -> Result<Vec<GoalBook>> {
        let mut rows: Vec<GoalBook> = self
            .goal_books
            .lock()
            .unwrap()
            .iter()
            .filter(|gb| gb.goal_id == goal_id)
            .cloned()
            .collect();
        rows.sort_by_key(|gb| gb.position);
        Ok(rows)
    }

    async fn create_with_books(&self, goal: Goal, goal_books: Vec<GoalBook>) -> Result<()> {
        let mut goals = self.goals.lock().unwrap();
        let mut stored = self.goal_books.lock().unwrap();
        goals.insert(goal.goal_id, goal);
        stored.extend(goal_books);
        Ok(())
    }

    async fn save_goal_books(&self, goal_books: Vec<GoalBook>) -> Result<()> {
        let mut stored = self.goal_books.lock().unwrap();
        for goal_book in goal_books {
            match stored
                .iter_mut()
                .find(|gb| gb.goal_id == goal_book.goal_id && gb.book_id == goal_book.book_id)
            {
                Some(existing) => *existing = goal_book,
                None => stored.push(goal_book),
            }
        }
        Ok(())
    }

    async fn goal_book_entries(&self, goal_id: GoalId) -> Result<Vec<GoalBookEntry>> {
        let books = self.books.by_id();
        let goal_books = self.goal_books(goal_id).await?;
        Ok(goal_books
            .into_iter()
            .filter_map(|gb| {
                books.get(&gb.book_id).map(|book| GoalBookEntry {
                    book: book.clone(),
                    status: gb.status,
                    position: gb.position,
                    completed_at: gb.completed_at,
                })
            })
            .collect())
    }

    async fn find_goal_book_by_isbn(
        &self,
        goal_id: GoalId,
        isbn13: &str,
    ) -> Result<Option<GoalBook>> {
        let Some(book) = self.books.find_by_isbn(isbn13).await? else {
            return Ok(None);
        };
        Ok(self
            .goal_books
            .lock()
            .unwrap()
            .iter()
            .find(|gb| gb.goal_id == goal_id && gb.book_id == book.book_id)
            .cloned())
    }

    async fn count_progress(&self, goal_id: GoalId) -> Result<(i64, i64)> {
        let goal_books = self.goal_books.lock().unwrap();
        let rows = goal_books.iter().filter(|gb| gb.goal_id == goal_id);
        let (total, done) = rows.fold((0i64, 0i64), |(total, done), gb| {
            (total + 1, done + i64::from(gb.status.is_done()))
        });
        Ok((total, done))
    }
}
