use thiserror::Error;

/// 搜索接口错误
#[derive(Debug, Error)]
pub enum SearchError {
    /// 当前筛选条件下没有结果 (价格区间耗尽, 非真正错误)
    #[error("no exact matches for the given filters")]
    NoExactMatches,

    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search service returned {code}: {message}")]
    Service { code: String, message: String },
}

impl SearchError {
    pub fn is_no_exact_matches(&self) -> bool {
        matches!(self, SearchError::NoExactMatches)
    }
}

/// 详情页抓取错误 (可恢复)
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("detail page request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("detail page {url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// 目录加载错误 (致命)
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to fetch catalog: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("catalog row {row} has {found} columns, expected at least {expected}")]
    ShortRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("catalog row {row}: malformed {field} value `{value}`")]
    MalformedField {
        row: usize,
        field: &'static str,
        value: String,
    },
}

/// 输出写入错误 (致命)
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write record: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush output: {0}")]
    Io(#[from] std::io::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// 抓取流程错误: 只有致命错误会向上传播
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("strategy {0} requires at least one keyword")]
    NoKeywords(&'static str),
}
