use crate::config::{CrawlConfig, Strategy};
use crate::error::{CrawlError, SearchError};
use crate::gateway::{DetailScraper, RecordSink, SearchCapability};
use crate::models::{CatalogEntry, EnrichedRecord, SearchPage, SearchRequest, SearchResult};
use crate::service::cancel::CancellationCoordinator;
use crate::service::price::{self, parse_part_count, parse_weight_grams};
use crate::service::scorer::MatchPolicy;
use crate::service::throttle::Throttle;
use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// 一个工作单元结束后的走向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Cancelled,
}

/// 抓取统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    pub strategy: &'static str,
    pub searches: usize,
    pub pages: usize,
    pub records: usize,
    pub skipped: usize,
    pub unmatched: usize,
    pub retries: usize,
    pub scrape_failures: usize,
    pub cancelled: bool,
}

/// 抓取控制器 (单任务顺序执行, 输出顺序与输入顺序一致)
pub struct CrawlController<'a> {
    config: &'a CrawlConfig,
    search: Arc<dyn SearchCapability>,
    scraper: Option<Arc<dyn DetailScraper>>,
    policy: Box<dyn MatchPolicy>,
    throttle: Throttle,
    report: CrawlReport,
}

impl<'a> CrawlController<'a> {
    pub fn new(
        config: &'a CrawlConfig,
        search: Arc<dyn SearchCapability>,
        scraper: Option<Arc<dyn DetailScraper>>,
        policy: Box<dyn MatchPolicy>,
    ) -> Self {
        Self {
            config,
            search,
            scraper,
            policy,
            throttle: Throttle::new(config.sleep()),
            report: CrawlReport {
                strategy: config.strategy.name(),
                ..CrawlReport::default()
            },
        }
    }

    /// 执行配置的抓取策略直到完成或被取消
    ///
    /// 取消时: 等待未完成的调用间隔 -> Draining -> flush 输出 -> Stopped。
    pub async fn run(
        mut self,
        catalog: &[CatalogEntry],
        sink: &mut dyn RecordSink,
        cancel: &CancellationCoordinator,
    ) -> Result<CrawlReport, CrawlError> {
        tracing::info!(
            "Starting {} crawl with {} policy",
            self.config.strategy.name(),
            self.policy.name()
        );

        let flow = match self.config.strategy {
            Strategy::Targeted => self.run_targeted(catalog, sink, cancel).await,
            Strategy::KeywordSweep => self.run_keyword_sweep(sink, cancel).await,
            Strategy::BucketedSweep => self.run_bucketed_sweep(sink, cancel).await,
        };
        let flow = match flow {
            Ok(flow) => flow,
            Err(e) => {
                cancel.finish();
                return Err(e);
            }
        };

        self.throttle.settle().await;
        if flow == Flow::Cancelled {
            cancel.begin_drain();
            tracing::info!("Draining: flushing buffered output");
            self.report.cancelled = true;
        }
        let flushed = sink.flush();
        cancel.finish();
        flushed?;

        tracing::info!(
            "Crawl finished: {} searches, {} pages, {} records, {} unmatched, {} skipped, {} retries{}",
            self.report.searches,
            self.report.pages,
            self.report.records,
            self.report.unmatched,
            self.report.skipped,
            self.report.retries,
            if self.report.cancelled { " (cancelled)" } else { "" }
        );
        Ok(self.report)
    }

    fn cancelled(&self, cancel: &CancellationCoordinator) -> bool {
        if cancel.is_cancel_requested() {
            tracing::info!("Cancellation requested, stopping before next unit of work");
            return true;
        }
        false
    }

    // ---------- targeted ----------

    async fn run_targeted(
        &mut self,
        catalog: &[CatalogEntry],
        sink: &mut dyn RecordSink,
        cancel: &CancellationCoordinator,
    ) -> Result<Flow, CrawlError> {
        let total = catalog.len();
        for (idx, entry) in catalog.iter().enumerate() {
            if self.cancelled(cancel) {
                return Ok(Flow::Cancelled);
            }
            if !entry.passes_filter(self.config.min_year, self.config.min_parts) {
                self.report.skipped += 1;
                continue;
            }

            match self.match_entry(entry).await {
                Some(record) => {
                    sink.write(&record)?;
                    self.report.records += 1;
                }
                None => {
                    tracing::info!("No match for {} `{}`", entry.id, entry.name);
                    self.report.unmatched += 1;
                }
            }

            let current = idx + 1;
            if current % 100 == 0 || current == 1 {
                tracing::info!(
                    "Catalog progress: {}/{}, matched: {}, unmatched: {}",
                    current, total, self.report.records, self.report.unmatched
                );
            }
        }
        Ok(Flow::Continue)
    }

    /// 先按编号搜索, 没有精确命中再按编号+名称搜索
    async fn match_entry(&mut self, entry: &CatalogEntry) -> Option<EnrichedRecord> {
        let key = entry.key();
        let config = self.config;
        let brand = &config.brand;

        let by_id = format!("{} {}", brand, key.id);
        let first = self.search_targeted(&by_id).await;
        let first_pick = first
            .as_ref()
            .and_then(|page| self.policy.select(&page.items, &key))
            .map(|selection| (selection.exact, selection.candidate.result.clone()));
        if let Some((true, result)) = &first_pick {
            return Some(self.enrich(result, Some(entry), None).await);
        }

        let by_name = format!("{} {} {}", brand, key.id, key.name_prefix());
        let second = self.search_targeted(by_name.trim_end()).await;
        let second_pick = second
            .as_ref()
            .and_then(|page| self.policy.select(&page.items, &key))
            .map(|selection| (selection.exact, selection.candidate.result.clone()));

        // 精确命中优先, 否则取更具体的第二次搜索结果
        let chosen = match (first_pick, second_pick) {
            (_, Some((_, result))) => result,
            (Some((_, result)), None) => result,
            (None, None) => return None,
        };
        Some(self.enrich(&chosen, Some(entry), None).await)
    }

    /// 定向搜索只取第一页, 出错视为无结果
    async fn search_targeted(&mut self, keywords: &str) -> Option<SearchPage> {
        match self.search_once(SearchRequest::keywords(keywords)).await {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!("Error while searching `{}`: {}", keywords, e);
                None
            }
        }
    }

    // ---------- sweeps ----------

    async fn run_keyword_sweep(
        &mut self,
        sink: &mut dyn RecordSink,
        cancel: &CancellationCoordinator,
    ) -> Result<Flow, CrawlError> {
        let keywords = self.keywords()?;
        for keyword in &keywords {
            if self.cancelled(cancel) {
                return Ok(Flow::Cancelled);
            }
            if self.sweep(keyword, None, sink, cancel).await? == Flow::Cancelled {
                return Ok(Flow::Cancelled);
            }
        }
        Ok(Flow::Continue)
    }

    async fn run_bucketed_sweep(
        &mut self,
        sink: &mut dyn RecordSink,
        cancel: &CancellationCoordinator,
    ) -> Result<Flow, CrawlError> {
        let keywords = self.keywords()?;
        let buckets = self.config.price_buckets();
        for keyword in &keywords {
            for &(min, max) in &buckets {
                if self.cancelled(cancel) {
                    return Ok(Flow::Cancelled);
                }
                tracing::info!("Sweeping `{}` in price range {}..={}", keyword, min, max);
                if self.sweep(keyword, Some((min, max)), sink, cancel).await? == Flow::Cancelled {
                    return Ok(Flow::Cancelled);
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn keywords(&self) -> Result<Vec<String>, CrawlError> {
        if self.config.keywords.is_empty() {
            return Err(CrawlError::NoKeywords(self.config.strategy.name()));
        }
        Ok(self.config.keywords.clone())
    }

    /// 遍历一个关键词 (及价格区间) 的所有分页, 每个商品输出一条记录
    ///
    /// NoExactMatches 结束当前区间; 其它错误等待退避后重试同一页, 不限次数。
    async fn sweep(
        &mut self,
        keyword: &str,
        price_range: Option<(u64, u64)>,
        sink: &mut dyn RecordSink,
        cancel: &CancellationCoordinator,
    ) -> Result<Flow, CrawlError> {
        let mut page = 1u32;
        loop {
            if self.cancelled(cancel) {
                return Ok(Flow::Cancelled);
            }

            let mut request = SearchRequest::keywords(keyword).with_page(page);
            if let Some((min, max)) = price_range {
                request = request.with_price_range(min, max);
            }

            match self.search_once(request).await {
                Ok(result) => {
                    self.report.pages += 1;
                    for item in &result.items {
                        let record = self.enrich(item, None, Some(keyword)).await;
                        sink.write(&record)?;
                        self.report.records += 1;
                    }
                    if page >= result.total_pages {
                        return Ok(Flow::Continue);
                    }
                    page += 1;
                }
                Err(e) if e.is_no_exact_matches() => {
                    tracing::info!("No matches for `{}` in {:?}, range exhausted", keyword, price_range);
                    return Ok(Flow::Continue);
                }
                Err(e) => {
                    let backoff = self.config.retry_backoff();
                    tracing::warn!(
                        "Error while searching `{}` page {}: {}, retrying in {:?}",
                        keyword, page, e, backoff
                    );
                    self.report.retries += 1;
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    // ---------- shared ----------

    /// 发起一次搜索; 调用前等待上一次调用留下的间隔
    async fn search_once(&mut self, request: SearchRequest) -> Result<SearchPage, SearchError> {
        self.throttle.settle().await;
        tracing::info!("Searching for `{}` (page {})", request.keywords, request.page);

        let result = self.search.search(&request).await;
        self.throttle.mark_call();
        self.report.searches += 1;

        if let Ok(page) = &result {
            tracing::info!(
                "Found {} results for `{}` (page {}/{})",
                page.total_results, request.keywords, request.page, page.total_pages
            );
        }
        result
    }

    async fn scrape_details(&mut self, url: &str) -> IndexMap<String, String> {
        let Some(scraper) = &self.scraper else {
            return IndexMap::new();
        };
        if url.is_empty() {
            return IndexMap::new();
        }
        match scraper.scrape(url).await {
            Ok(attributes) => attributes,
            Err(e) => {
                tracing::warn!("Failed to scrape {}: {}", url, e);
                self.report.scrape_failures += 1;
                IndexMap::new()
            }
        }
    }

    /// 补全零件数/重量并计算价格
    async fn enrich(
        &mut self,
        result: &SearchResult,
        entry: Option<&CatalogEntry>,
        keyword: Option<&str>,
    ) -> EnrichedRecord {
        let attributes = self.scrape_details(&result.detail_page_url).await;
        let scraped = |label: &str| {
            attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(label))
                .map(|(_, value)| value.as_str())
        };

        let part_count = entry
            .map(|e| e.part_count)
            .filter(|&parts| parts > 0)
            .or_else(|| scraped(&self.config.part_count_label).and_then(parse_part_count))
            .unwrap_or(0);
        let weight_grams = scraped(&self.config.weight_label)
            .and_then(parse_weight_grams)
            .unwrap_or(0);

        let prices = price::extract(
            &result.list_price_amount,
            &result.lowest_new_price_amount,
            &result.offers,
            part_count,
            weight_grams,
            self.config.price_basis,
        );

        EnrichedRecord {
            catalog_entry: entry.cloned(),
            keyword: keyword.map(str::to_string),
            external_id: result.external_id.clone(),
            title: result.title.clone(),
            url: result.detail_page_url.clone(),
            list_price: prices.list_price,
            lowest_price: prices.lowest_price,
            expedited_price: prices.expedited_price,
            is_expedited_eligible: prices.is_expedited_eligible,
            part_count,
            weight_grams,
            price_per_part: prices.price_per_part,
            price_per_weight_unit: prices.price_per_weight_unit,
            matched_at: Utc::now(),
        }
    }
}
