use crate::domain::availability::{AvailabilityRow, fallback_rows, rows_from_books};
use crate::ports::{AvailabilityProvider, CacheStore, LibraryDirectory};
use rand::Rng;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::cache;

/// 図書館システムIDのキャッシュ期間（30日）
pub const SYSTEMIDS_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// 照会結果のキャッシュ期間（15分）
pub const AVAILABILITY_TTL: Duration = Duration::from_secs(15 * 60);

/// フォールバック結果のキャッシュ期間（5分）
pub const FALLBACK_TTL: Duration = Duration::from_secs(5 * 60);

/// ポーリングの間隔と上限
///
/// 各ポーリングの前に `base_delay + U[0, jitter]` 待つ。
/// `max_polls` 回ポーリングしても照会が終わらなければ失敗として扱う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub base_delay: Duration,
    pub jitter: Duration,
    pub max_polls: u32,
}

impl PollPolicy {
    /// 0.8秒 + 0〜0.6秒のジッタ
    pub fn new(max_polls: u32) -> Self {
        Self {
            base_delay: Duration::from_millis(800),
            jitter: Duration::from_millis(600),
            max_polls,
        }
    }

    /// 待ち時間なし（テスト用）
    pub fn immediate(max_polls: u32) -> Self {
        Self {
            base_delay: Duration::ZERO,
            jitter: Duration::ZERO,
            max_polls,
        }
    }

    fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let extra = rand::thread_rng().gen_range(0..=jitter_ms);
        self.base_delay + Duration::from_millis(extra)
    }
}

/// 所蔵照会の依存関係
///
/// `provider` がNoneのとき（APIキー未設定）は常にフォールバック結果を返す。
#[derive(Clone)]
pub struct AvailabilityDependencies {
    pub cache: Arc<dyn CacheStore>,
    pub directory: Arc<dyn LibraryDirectory>,
    pub provider: Option<Arc<dyn AvailabilityProvider>>,
    pub poll_policy: PollPolicy,
}

/// 照会セッションの失敗
#[derive(Debug, Error)]
enum SessionError {
    #[error("availability provider error: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("polling did not finish within {0} polls")]
    PollLimitExceeded(u32),

    #[error("provider asked to continue without a session")]
    MissingSession,
}

// ============================================================================
// キャッシュキー
// ============================================================================

pub fn systemids_cache_key(city: &str) -> String {
    format!("sysids:{}", city)
}

/// 照会結果のキャッシュキー
///
/// ISBNをソートして連結し、都市名を続けたもののSHA-256。入力順には依存しない。
pub fn availability_cache_key(isbns: &[String], city: &str) -> String {
    let mut sorted: Vec<&str> = isbns.iter().map(String::as_str).collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(sorted.join(",").as_bytes());
    hasher.update(city.as_bytes());
    format!("avail:{}", hex::encode(hasher.finalize()))
}

/// 入力ISBNを整える
///
/// 前後の空白を除き、空文字と重複を捨てる（最初の出現順を保つ）。
pub fn clean_isbns(isbns: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    isbns
        .iter()
        .map(|isbn| isbn.trim())
        .filter(|isbn| !isbn.is_empty() && seen.insert(*isbn))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// 図書館システムIDの解決
// ============================================================================

/// 市区町村の図書館システムIDを返す
///
/// 失敗しない。ディレクトリのエラーはログに残して空リストを返し、キャッシュしない。
pub async fn resolve_systemids(deps: &AvailabilityDependencies, city: &str) -> Vec<String> {
    let key = systemids_cache_key(city);
    if let Some(systemids) = cache::get_json::<Vec<String>>(deps.cache.as_ref(), &key).await {
        return systemids;
    }

    match deps.directory.systemids_for_city(city).await {
        Ok(systemids) => {
            cache::set_json(deps.cache.as_ref(), &key, &systemids, SYSTEMIDS_TTL).await;
            systemids
        }
        Err(e) => {
            tracing::warn!("Failed to resolve systemids for '{}': {}", city, e);
            Vec::new()
        }
    }
}

// ============================================================================
// 所蔵照会
// ============================================================================

/// ISBN × 図書館システムの所蔵状況を返す
///
/// 失敗しない。プロバイダ未設定・通信失敗・ポーリング上限超過のときは
/// すべて照会中のフォールバック行を返す。
///
/// 行はISBN優先の順序で、件数は常に `ISBN数 × システムID数`。
pub async fn check_availability(
    deps: &AvailabilityDependencies,
    isbns: &[String],
    city: &str,
) -> Vec<AvailabilityRow> {
    let isbns = clean_isbns(isbns);
    if isbns.is_empty() {
        return Vec::new();
    }

    // 1. キャッシュ
    let key = availability_cache_key(&isbns, city);
    if let Some(rows) = cache::get_json::<Vec<AvailabilityRow>>(deps.cache.as_ref(), &key).await {
        return rows;
    }

    // 2. 図書館システムIDの解決
    let systemids = resolve_systemids(deps, city).await;
    if systemids.is_empty() {
        return Vec::new();
    }

    // 3. プロバイダ未設定
    let Some(provider) = deps.provider.as_ref() else {
        tracing::debug!("No availability provider configured; returning pending rows");
        return store_fallback(deps, &key, &isbns, &systemids).await;
    };

    // 4. 照会セッション
    match run_session(provider.as_ref(), &deps.poll_policy, &isbns, &systemids).await {
        Ok(books) => {
            let rows = rows_from_books(&books, &isbns, &systemids);
            cache::set_json(deps.cache.as_ref(), &key, &rows, AVAILABILITY_TTL).await;
            rows
        }
        Err(e) => {
            tracing::warn!("Availability lookup failed, falling back: {}", e);
            store_fallback(deps, &key, &isbns, &systemids).await
        }
    }
}

async fn store_fallback(
    deps: &AvailabilityDependencies,
    key: &str,
    isbns: &[String],
    systemids: &[String],
) -> Vec<AvailabilityRow> {
    let rows = fallback_rows(isbns, systemids);
    cache::set_json(deps.cache.as_ref(), key, &rows, FALLBACK_TTL).await;
    rows
}

/// 照会を開始し、`continue == 1` の間セッションでポーリングする
async fn run_session(
    provider: &dyn AvailabilityProvider,
    policy: &PollPolicy,
    isbns: &[String],
    systemids: &[String],
) -> Result<Value, SessionError> {
    let mut response = provider
        .check(isbns, systemids)
        .await
        .map_err(SessionError::Provider)?;

    let mut polls = 0u32;
    while response.should_continue() {
        if polls >= policy.max_polls {
            return Err(SessionError::PollLimitExceeded(policy.max_polls));
        }
        let session = match response.session.as_deref().map(str::trim) {
            Some(session) if !session.is_empty() => session.to_string(),
            _ => return Err(SessionError::MissingSession),
        };
        polls += 1;

        tokio::time::sleep(policy.next_delay()).await;

        response = provider
            .poll(&session)
            .await
            .map_err(SessionError::Provider)?;
    }

    tracing::debug!(polls, "Availability lookup finished");
    Ok(response.books)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isbns(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cache_key_ignores_input_order() {
        let a = availability_cache_key(&isbns(&["9784000000019", "9784000000026"]), "宮崎市");
        let b = availability_cache_key(&isbns(&["9784000000026", "9784000000019"]), "宮崎市");
        assert_eq!(a, b);
        assert!(a.starts_with("avail:"));
        // "avail:" + 64桁の16進数
        assert_eq!(a.len(), 6 + 64);
    }

    #[test]
    fn test_cache_key_depends_on_city() {
        let list = isbns(&["9784000000019"]);
        assert_ne!(
            availability_cache_key(&list, "宮崎市"),
            availability_cache_key(&list, "都城市")
        );
    }

    #[test]
    fn test_systemids_cache_key() {
        assert_eq!(systemids_cache_key("宮崎市"), "sysids:宮崎市");
    }

    #[test]
    fn test_clean_isbns_trims_and_dedups() {
        let cleaned = clean_isbns(&isbns(&[" 9784000000019 ", "", "9784000000026", "9784000000019"]));
        assert_eq!(cleaned, isbns(&["9784000000019", "9784000000026"]));
    }

    #[test]
    fn test_poll_policy_delay_within_bounds() {
        let policy = PollPolicy::new(30);
        for _ in 0..50 {
            let delay = policy.next_delay();
            assert!(delay >= Duration::from_millis(800));
            assert!(delay <= Duration::from_millis(1400));
        }
    }

    #[test]
    fn test_immediate_policy_has_no_delay() {
        assert_eq!(PollPolicy::immediate(3).next_delay(), Duration::ZERO);
    }
}
