use crate::error::ConfigError;
use crate::service::price::PriceBasis;
use crate::service::scorer::{ExactFieldOrFallbackFirst, MatchPolicy, MatchScorer, ScoredBestOf};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 环境变量前缀, 如 BRICK__CRAWL__SLEEP_MS=2000
pub const ENV_PREFIX: &str = "BRICK";

/// 应用配置 (启动时构建一次, 之后只读)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub crawl: CrawlConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub url: String,
    /// 本地 CSV, 设置后不再下载
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// 抓取策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// 每个目录条目搜索一到两次
    #[default]
    Targeted,
    /// 按关键词遍历所有分页
    KeywordSweep,
    /// 按关键词 + 价格区间遍历所有分页
    BucketedSweep,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Targeted => "targeted",
            Strategy::KeywordSweep => "keyword-sweep",
            Strategy::BucketedSweep => "bucketed-sweep",
        }
    }
}

/// 匹配策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    Scored,
    ExactOrFirst,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    pub strategy: Strategy,
    pub policy: PolicyKind,
    /// 只对 scored 策略生效; 为空表示不设阈值
    pub min_score: Option<i64>,
    pub brand: String,
    pub min_year: i32,
    pub min_parts: u32,
    /// 每次搜索调用之后的强制间隔
    pub sleep_ms: u64,
    /// 搜索出错后重试同一页之前的等待
    pub retry_backoff_ms: u64,
    pub keywords: Vec<String>,
    /// 价格区间 (最小货币单位)
    pub price_start: u64,
    pub price_ceiling: u64,
    pub price_step: u64,
    pub price_basis: PriceBasis,
    pub scrape_details: bool,
    pub part_count_label: String,
    pub weight_label: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: "https://m.rebrickable.com/media/downloads/sets.csv".to_string(),
            path: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080/search".to_string(),
            timeout_secs: 30,
            user_agent: concat!("brick-price-matcher/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Targeted,
            policy: PolicyKind::Scored,
            min_score: None,
            brand: "LEGO".to_string(),
            min_year: 2007,
            min_parts: 50,
            sleep_ms: 1500,
            retry_backoff_ms: 5000,
            keywords: [
                "LEGO Star Wars",
                "LEGO City",
                "LEGO Technic",
                "LEGO Creator",
                "LEGO Friends",
                "LEGO Ninjago",
                "LEGO Architecture",
                "LEGO Ideas",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            price_start: 100,
            price_ceiling: 100_000,
            price_step: 1000,
            price_basis: PriceBasis::Effective,
            scrape_details: true,
            part_count_label: "Anzahl Teile".to_string(),
            weight_label: "Artikelgewicht".to_string(),
        }
    }
}

impl CrawlConfig {
    pub fn sleep(&self) -> Duration {
        Duration::from_millis(self.sleep_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// 价格区间 [min, max], 首尾不重叠
    pub fn price_buckets(&self) -> Vec<(u64, u64)> {
        if self.price_step == 0 {
            return Vec::new();
        }
        let mut buckets = Vec::new();
        let mut price = self.price_start;
        while price < self.price_ceiling {
            buckets.push((price, price.saturating_add(self.price_step - 1)));
            price = price.saturating_add(self.price_step);
        }
        buckets
    }

    pub fn build_policy(&self) -> Box<dyn MatchPolicy> {
        let scorer = MatchScorer::new(&self.brand);
        match (self.policy, self.min_score) {
            (PolicyKind::Scored, None) => Box::new(ScoredBestOf::new(scorer)),
            (PolicyKind::Scored, Some(min)) => Box::new(ScoredBestOf::with_min_score(scorer, min)),
            (PolicyKind::ExactOrFirst, _) => Box::new(ExactFieldOrFallbackFirst::new(scorer)),
        }
    }
}

impl AppConfig {
    /// 默认值 -> 配置文件 (可选) -> 环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("crawl.keywords")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let crawl = &self.crawl;
        if crawl.brand.trim().is_empty() {
            return Err(ConfigError::Invalid("crawl.brand must not be empty".into()));
        }
        match crawl.strategy {
            Strategy::Targeted => {}
            Strategy::KeywordSweep | Strategy::BucketedSweep if crawl.keywords.is_empty() => {
                return Err(ConfigError::Invalid(format!(
                    "strategy {} needs at least one keyword",
                    crawl.strategy.name()
                )));
            }
            _ => {}
        }
        if crawl.strategy == Strategy::BucketedSweep {
            if crawl.price_step == 0 {
                return Err(ConfigError::Invalid("crawl.price_step must be positive".into()));
            }
            if crawl.price_ceiling <= crawl.price_start {
                return Err(ConfigError::Invalid(format!(
                    "crawl.price_ceiling ({}) must be above crawl.price_start ({})",
                    crawl.price_ceiling, crawl.price_start
                )));
            }
        }
        Ok(())
    }
}
