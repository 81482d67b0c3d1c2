use serde::{Deserialize, Serialize};

/// 报价 (金额为最小货币单位, 如分)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub amount_minor_units: i64,
    #[serde(default)]
    pub is_expedited_eligible: bool,
}

/// 搜索返回的单个候选商品
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub external_id: String,   // ASIN
    pub title: String,
    pub part_number: String,
    pub manufacturer: String,
    pub label: String,
    pub publisher: String,
    pub studio: String,
    pub catalog_numbers: Vec<String>,
    pub offers: Vec<Offer>,
    pub detail_page_url: String,
    pub list_price_amount: String,       // 原始字符串, 可能无法解析
    pub lowest_new_price_amount: String,
}

/// 一次搜索请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub keywords: String,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub page: u32,
}

impl SearchRequest {
    pub fn keywords(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            price_min: None,
            price_max: None,
            page: 1,
        }
    }

    pub fn with_price_range(mut self, min: u64, max: u64) -> Self {
        self.price_min = Some(min);
        self.price_max = Some(max);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}

/// 一页搜索结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPage {
    pub total_results: u64,
    pub total_pages: u32,
    pub items: Vec<SearchResult>,
}
