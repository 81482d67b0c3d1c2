use crate::config::{AppConfig, PolicyKind, Strategy};
use clap::Parser;
use std::path::PathBuf;

/// 命令行参数; 只覆盖配置中的少数常用项
#[derive(Parser, Debug, Clone)]
#[command(name = "brick-price-matcher", about = "Match a LEGO set catalog against marketplace search results")]
pub struct Cli {
    /// TSV file to write
    pub output: PathBuf,

    /// Optional TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Crawl strategy
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Matching policy for the targeted strategy
    #[arg(long, value_enum)]
    pub policy: Option<PolicyKind>,

    /// Reject scored matches below this score
    #[arg(long)]
    pub min_score: Option<i64>,

    /// Ignore sets older than this
    #[arg(long)]
    pub min_year: Option<i32>,

    /// Ignore sets with less parts than this
    #[arg(long)]
    pub min_parts: Option<u32>,

    /// Time between API calls in milliseconds
    #[arg(long)]
    pub sleep_ms: Option<u64>,

    /// Read the catalog from a local CSV instead of downloading it
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl Cli {
    /// 把命令行覆盖项写入配置
    pub fn apply(&self, config: &mut AppConfig) {
        let crawl = &mut config.crawl;
        if let Some(strategy) = self.strategy {
            crawl.strategy = strategy;
        }
        if let Some(policy) = self.policy {
            crawl.policy = policy;
        }
        if self.min_score.is_some() {
            crawl.min_score = self.min_score;
        }
        if let Some(min_year) = self.min_year {
            crawl.min_year = min_year;
        }
        if let Some(min_parts) = self.min_parts {
            crawl.min_parts = min_parts;
        }
        if let Some(sleep_ms) = self.sleep_ms {
            crawl.sleep_ms = sleep_ms;
        }
        if let Some(path) = &self.catalog {
            config.catalog.path = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_given_flags() {
        let cli = Cli::parse_from([
            "brick-price-matcher",
            "--strategy",
            "bucketed-sweep",
            "--policy",
            "exact-or-first",
            "--sleep-ms",
            "250",
            "out.tsv",
        ]);
        let mut config = AppConfig::default();
        cli.apply(&mut config);

        assert_eq!(cli.output, PathBuf::from("out.tsv"));
        assert_eq!(config.crawl.strategy, Strategy::BucketedSweep);
        assert_eq!(config.crawl.policy, PolicyKind::ExactOrFirst);
        assert_eq!(config.crawl.sleep_ms, 250);
        assert_eq!(config.crawl.min_year, 2007);
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn output_is_required() {
        assert!(Cli::try_parse_from(["brick-price-matcher"]).is_err());
    }
}
