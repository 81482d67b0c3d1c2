//! 外部协作方: 目录数据源、搜索接口、详情页抓取和输出。
//!
//! 抓取流程只依赖这里的 trait, 具体的 HTTP/CSV 实现可以在测试中替换。

pub mod catalog;
pub mod detail;
pub mod search;
pub mod sink;

use crate::error::{ScrapeError, SearchError, SinkError};
use crate::models::{EnrichedRecord, SearchPage, SearchRequest};
use async_trait::async_trait;
use indexmap::IndexMap;

pub use catalog::{fetch_catalog, load_catalog_file, parse_catalog};
pub use detail::{parse_detail_attributes, HtmlDetailScraper};
pub use search::HttpSearchClient;
pub use sink::CsvRecordSink;

/// 分页搜索接口
#[async_trait]
pub trait SearchCapability: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, SearchError>;
}

/// 详情页抓取: 返回 label -> value
#[async_trait]
pub trait DetailScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<IndexMap<String, String>, ScrapeError>;
}

/// 流式输出, 每条记录写入后立即落盘
pub trait RecordSink: Send {
    fn write(&mut self, record: &EnrichedRecord) -> Result<(), SinkError>;

    fn flush(&mut self) -> Result<(), SinkError>;
}
