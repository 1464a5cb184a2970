use crate::ports::library_directory::{LibraryDirectory as LibraryDirectoryTrait, Result};
use async_trait::async_trait;

/// 静的テーブルで使う図書館システムID
pub const STATIC_SYSTEMIDS: [&str; 2] = ["MiyazakiSys-001", "MiyazakiSys-002"];

/// OPAC設定（システムIDごとのISBN検索URLテンプレート）
struct OpacEntry {
    systemid: &'static str,
    isbn_url: &'static str,
}

const OPAC_TABLE: [OpacEntry; 2] = [
    // 宮崎市立図書館
    OpacEntry {
        systemid: "MiyazakiSys-001",
        isbn_url: "https://opac.lib.miyazaki.example/search?func=search&isbn={isbn}",
    },
    // 宮崎市 〇〇分館
    OpacEntry {
        systemid: "MiyazakiSys-002",
        isbn_url: "https://opac.lib.miyazaki.example/branch2/search?isbn={isbn}",
    },
];

/// LibraryDirectoryの静的実装
///
/// 図書館一覧APIに接続するまでの暫定実装。市区町村によらず固定のIDリストを返す。
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticLibraryDirectory;

impl StaticLibraryDirectory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LibraryDirectoryTrait for StaticLibraryDirectory {
    async fn systemids_for_city(&self, city: &str) -> Result<Vec<String>> {
        tracing::info!("Using static systemid list for city '{}'", city);
        Ok(STATIC_SYSTEMIDS.iter().map(|s| s.to_string()).collect())
    }

    fn opac_url(&self, systemid: &str, isbn13: &str) -> Option<String> {
        OPAC_TABLE
            .iter()
            .find(|entry| entry.systemid == systemid)
            .map(|entry| entry.isbn_url.replace("{isbn}", isbn13))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_systemids() {
        let directory = StaticLibraryDirectory::new();
        let ids = directory.systemids_for_city("宮崎市").await.unwrap();
        assert_eq!(ids, vec!["MiyazakiSys-001", "MiyazakiSys-002"]);

        // 市区町村によらず同じ
        let other = directory.systemids_for_city("札幌市").await.unwrap();
        assert_eq!(other, ids);
    }

    #[test]
    fn test_opac_url_known_system() {
        let directory = StaticLibraryDirectory::new();
        assert_eq!(
            directory.opac_url("MiyazakiSys-002", "9784000000000").as_deref(),
            Some("https://opac.lib.miyazaki.example/branch2/search?isbn=9784000000000")
        );
    }

    #[test]
    fn test_opac_url_unknown_system() {
        let directory = StaticLibraryDirectory::new();
        assert_eq!(directory.opac_url("Unknown", "9784000000000"), None);
    }
}
