use super::DetailScraper;
use crate::error::ScrapeError;
use async_trait::async_trait;
use indexmap::IndexMap;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").expect("valid selector"));
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("valid selector"));

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// 读取详情页中的属性表格 (`th`/`td` 或两列 `td`), 重复的 label 保留第一次出现的值
pub fn parse_detail_attributes(html: &str) -> IndexMap<String, String> {
    let document = Html::parse_document(html);
    let mut attributes = IndexMap::new();

    for row in document.select(&ROW) {
        let header = row.select(&HEADER_CELL).next();
        let mut cells = row.select(&DATA_CELL);
        let (label, value) = match header {
            Some(th) => (cell_text(th), cells.next().map(cell_text)),
            None => match cells.next() {
                Some(first) => (cell_text(first), cells.next().map(cell_text)),
                None => continue,
            },
        };

        let label = label.trim_end_matches(':').trim().to_string();
        let Some(value) = value else { continue };
        if label.is_empty() || value.is_empty() {
            continue;
        }
        attributes.entry(label).or_insert(value);
    }

    attributes
}

/// 抓取商品详情页的属性表
#[derive(Debug, Clone)]
pub struct HtmlDetailScraper {
    client: reqwest::Client,
}

impl HtmlDetailScraper {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DetailScraper for HtmlDetailScraper {
    async fn scrape(&self, url: &str) -> Result<IndexMap<String, String>, ScrapeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        Ok(parse_detail_attributes(&body))
    }
}
