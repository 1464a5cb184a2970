use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Book, BookId, CreateGoalError, GoalId, ReadingStatus, UserId};

/// 読書目標集約
///
/// ユーザーが設定した目的と、それに紐づく書籍リストの進捗を管理する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    // 識別子
    pub goal_id: GoalId,

    // 他の集約への参照（IDのみ）
    pub user_id: UserId,

    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub archived: bool,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 目標と書籍の関連（並び順と読書ステータス）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalBook {
    pub goal_id: GoalId,
    pub book_id: BookId,
    /// 1始まりの並び順
    pub position: i32,
    pub status: ReadingStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

/// 書籍情報を伴った目標内の書籍（詳細表示用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalBookEntry {
    pub book: Book,
    pub status: ReadingStatus,
    pub position: i32,
    pub completed_at: Option<DateTime<Utc>>,
}

/// 目標の進捗
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub total_books: i64,
    pub done_books: i64,
    pub progress: f64,
}

impl GoalProgress {
    pub fn new(total_books: i64, done_books: i64) -> Self {
        Self {
            total_books,
            done_books,
            progress: progress_ratio(total_books, done_books),
        }
    }
}

// ============================================================================
// 純粋関数
// ============================================================================

/// 純粋関数：進捗率を計算する
///
/// 書籍が0冊なら0.0。それ以外は読了数/総数を小数第4位で丸める。
pub fn progress_ratio(total: i64, done: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = done as f64 / total as f64;
    (ratio * 10_000.0).round() / 10_000.0
}

/// 純粋関数：読書目標を作成する
///
/// ビジネスルール：
/// - タイトルは空白のみであってはならない
/// - 作成直後はアーカイブされていない
///
/// 副作用なし。
pub fn create_goal(
    user_id: UserId,
    title: &str,
    description: Option<String>,
    due_date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Result<Goal, CreateGoalError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CreateGoalError::EmptyTitle);
    }

    Ok(Goal {
        goal_id: GoalId::new(),
        user_id,
        title: title.to_string(),
        description,
        due_date,
        archived: false,
        created_at: now,
        updated_at: now,
    })
}

/// 純粋関数：ISBNリストを目標に追加する順序で整える
///
/// 前後の空白を除き、空文字は無視する。
pub fn clean_isbns<'a, I>(isbns: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    isbns
        .into_iter()
        .map(|isbn| isbn.trim())
        .filter(|isbn| !isbn.is_empty())
        .map(str::to_string)
        .collect()
}

/// 純粋関数：書籍を目標に並べる
///
/// 位置は1から振り直す。既に紐づいている書籍は位置だけを更新し、
/// 読書ステータスは保持する。
pub fn arrange_goal_books(goal_id: GoalId, existing: &[GoalBook], books: &[Book]) -> Vec<GoalBook> {
    books
        .iter()
        .enumerate()
        .map(|(idx, book)| {
            let position = idx as i32 + 1;
            match existing.iter().find(|gb| gb.book_id == book.book_id) {
                Some(current) => GoalBook {
                    position,
                    ..current.clone()
                },
                None => GoalBook {
                    goal_id,
                    book_id: book.book_id,
                    position,
                    status: ReadingStatus::Unread,
                    completed_at: None,
                },
            }
        })
        .collect()
}

/// 純粋関数：目標内の書籍の読書ステータスを変更する
///
/// 読了（done）にした時点で完了日時を記録し、それ以外では消去する。
pub fn change_book_status(
    goal_book: &GoalBook,
    status: ReadingStatus,
    now: DateTime<Utc>,
) -> GoalBook {
    GoalBook {
        status,
        completed_at: status.is_done().then_some(now),
        ..goal_book.clone()
    }
}

/// 純粋関数：目標のアーカイブ状態を変更する
pub fn set_archived(goal: &Goal, archived: bool, now: DateTime<Utc>) -> Goal {
    Goal {
        archived,
        updated_at: now,
        ..goal.clone()
    }
}
