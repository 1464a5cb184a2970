use crate::domain::book::placeholder_book;
use crate::domain::errors::CreateGoalError;
use crate::domain::{self, Book, Goal, GoalBookEntry, GoalId, GoalProgress, ReadingStatus, UserId};
use crate::ports::*;
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use super::errors::{GoalApplicationError, Result};

/// サービスの依存関係
#[derive(Clone)]
pub struct GoalDependencies {
    pub goals: Arc<dyn GoalRepository>,
    pub books: Arc<dyn BookRepository>,
}

/// 目標作成の入力
#[derive(Debug, Clone, Default)]
pub struct CreateGoal {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub isbns: Vec<String>,
}

/// 目標と進捗
#[derive(Debug, Clone, PartialEq)]
pub struct GoalSummary {
    pub goal: Goal,
    pub progress: GoalProgress,
}

/// 目標・進捗と、並び順に並べた書籍
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDetail {
    pub goal: Goal,
    pub progress: GoalProgress,
    pub books: Vec<GoalBookEntry>,
}

fn repository_error(e: Box<dyn std::error::Error + Send + Sync>) -> GoalApplicationError {
    GoalApplicationError::RepositoryError(e)
}

/// ユーザーが所有する目標を取得するヘルパー関数
///
/// 存在しない目標と他人の目標は区別せずGoalNotFoundにする。
async fn load_owned_goal(
    goals: &Arc<dyn GoalRepository>,
    user_id: UserId,
    goal_id: GoalId,
) -> Result<Goal> {
    goals
        .get_by_id(goal_id)
        .await
        .map_err(repository_error)?
        .filter(|goal| goal.user_id == user_id)
        .ok_or(GoalApplicationError::GoalNotFound)
}

async fn compute_progress(goals: &Arc<dyn GoalRepository>, goal_id: GoalId) -> Result<GoalProgress> {
    let (total, done) = goals
        .count_progress(goal_id)
        .await
        .map_err(repository_error)?;
    Ok(GoalProgress::new(total, done))
}

/// ISBNごとに既存の書籍を引き、なければ仮タイトルで登録する
///
/// 入力順を保つ。
pub async fn get_or_create_books(books: &Arc<dyn BookRepository>, isbns: &[String]) -> Result<Vec<Book>> {
    let mut resolved = Vec::with_capacity(isbns.len());
    for isbn in isbns {
        let book = match books.find_by_isbn(isbn).await.map_err(repository_error)? {
            Some(book) => book,
            None => {
                books
                    .insert(placeholder_book(isbn))
                    .await
                    .map_err(repository_error)?;
                // 並行登録された場合に備えて登録後の行を読み直す
                books
                    .find_by_isbn(isbn)
                    .await
                    .map_err(repository_error)?
                    .ok_or_else(|| repository_error(format!("book {} vanished after insert", isbn).into()))?
            }
        };
        resolved.push(book);
    }
    Ok(resolved)
}

/// 読書目標を作成する
///
/// ISBNは前後の空白を除き、空文字と重複を捨てた順に1から位置を振る。
pub async fn create_goal(deps: &GoalDependencies, user_id: UserId, input: CreateGoal) -> Result<GoalSummary> {
    let now = Utc::now();

    // 1. ドメインルールで目標を作成
    let goal = domain::goal::create_goal(user_id, &input.title, input.description, input.due_date, now)
        .map_err(|e| match e {
            CreateGoalError::EmptyTitle => GoalApplicationError::EmptyTitle,
        })?;

    // 2. 書籍の解決
    let mut seen = HashSet::new();
    let isbns: Vec<String> = domain::goal::clean_isbns(&input.isbns)
        .into_iter()
        .filter(|isbn| seen.insert(isbn.clone()))
        .collect();
    let books = get_or_create_books(&deps.books, &isbns).await?;

    // 3. 目標と関連をまとめて保存
    let goal_books = domain::goal::arrange_goal_books(goal.goal_id, &[], &books);
    deps.goals
        .create_with_books(goal.clone(), goal_books)
        .await
        .map_err(repository_error)?;

    tracing::info!(goal_id = %goal.goal_id.value(), books = books.len(), "Goal created");

    let progress = compute_progress(&deps.goals, goal.goal_id).await?;
    Ok(GoalSummary { goal, progress })
}

/// 目標の詳細を取得する
pub async fn get_goal(deps: &GoalDependencies, user_id: UserId, goal_id: GoalId) -> Result<GoalDetail> {
    let goal = load_owned_goal(&deps.goals, user_id, goal_id).await?;
    let mut books = deps
        .goals
        .goal_book_entries(goal_id)
        .await
        .map_err(repository_error)?;
    books.sort_by_key(|entry| entry.position);
    let progress = compute_progress(&deps.goals, goal_id).await?;

    Ok(GoalDetail { goal, progress, books })
}

/// 目標内の書籍の読書ステータスを更新する
///
/// ステータス文字列の検証は副作用より先に行う。
pub async fn update_goal_book_status(
    deps: &GoalDependencies,
    user_id: UserId,
    goal_id: GoalId,
    isbn13: &str,
    status: &str,
) -> Result<GoalProgress> {
    let status = ReadingStatus::from_str(status)
        .map_err(|_| GoalApplicationError::InvalidStatus(status.to_string()))?;

    let goal = load_owned_goal(&deps.goals, user_id, goal_id).await?;
    let goal_book = deps
        .goals
        .find_goal_book_by_isbn(goal.goal_id, isbn13)
        .await
        .map_err(repository_error)?
        .ok_or(GoalApplicationError::GoalBookNotFound)?;

    let updated = domain::goal::change_book_status(&goal_book, status, Utc::now());
    deps.goals
        .save_goal_books(vec![updated])
        .await
        .map_err(repository_error)?;

    compute_progress(&deps.goals, goal.goal_id).await
}

/// 目標のアーカイブ状態を変更する
pub async fn archive_goal(
    deps: &GoalDependencies,
    user_id: UserId,
    goal_id: GoalId,
    archived: bool,
) -> Result<GoalSummary> {
    let goal = load_owned_goal(&deps.goals, user_id, goal_id).await?;
    let goal = domain::goal::set_archived(&goal, archived, Utc::now());
    deps.goals.save(goal.clone()).await.map_err(repository_error)?;

    let progress = compute_progress(&deps.goals, goal_id).await?;
    Ok(GoalSummary { goal, progress })
}

/// ユーザーの目標一覧（新しい順）
pub async fn list_goals(
    deps: &GoalDependencies,
    user_id: UserId,
    include_archived: bool,
) -> Result<Vec<GoalSummary>> {
    let goals = deps
        .goals
        .find_by_user(user_id, include_archived)
        .await
        .map_err(repository_error)?;

    let mut items = Vec::with_capacity(goals.len());
    for goal in goals {
        let progress = compute_progress(&deps.goals, goal.goal_id).await?;
        items.push(GoalSummary { goal, progress });
    }
    Ok(items)
}
