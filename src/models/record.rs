use super::catalog::CatalogEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 输出记录: 每个匹配成功的目录条目 (或扫描到的商品) 一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    pub catalog_entry: Option<CatalogEntry>,
    pub keyword: Option<String>,   // 扫描策略下的关键词
    pub external_id: String,
    pub title: String,
    pub url: String,
    pub list_price: f64,
    pub lowest_price: f64,
    pub expedited_price: f64,
    pub is_expedited_eligible: bool,
    pub part_count: u32,
    pub weight_grams: u32,
    pub price_per_part: f64,
    pub price_per_weight_unit: f64,
    pub matched_at: DateTime<Utc>,
}

pub const RECORD_HEADERS: [&str; 16] = [
    "Num",
    "Name",
    "ASIN",
    "Title",
    "Year",
    "Lowest Price",
    "List Price",
    "Expedited Eligible",
    "Expedited Price",
    "Parts",
    "Weight (g)",
    "Price/Part",
    "Price/Weight",
    "URL",
    "Keyword",
    "Matched At",
];

impl EnrichedRecord {
    pub fn headers() -> &'static [&'static str] {
        &RECORD_HEADERS
    }

    /// 与 `headers()` 一一对应的列
    pub fn columns(&self) -> Vec<String> {
        let (num, name, year) = match &self.catalog_entry {
            Some(entry) => (
                entry.id.clone(),
                entry.name.clone(),
                entry.release_year.to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        vec![
            num,
            name,
            self.external_id.clone(),
            self.title.clone(),
            year,
            format!("{:.2}", self.lowest_price),
            format!("{:.2}", self.list_price),
            self.is_expedited_eligible.to_string(),
            format!("{:.2}", self.expedited_price),
            self.part_count.to_string(),
            self.weight_grams.to_string(),
            format!("{:.3}", self.price_per_part),
            format!("{:.3}", self.price_per_weight_unit),
            self.url.clone(),
            self.keyword.clone().unwrap_or_default(),
            self.matched_at.to_rfc3339(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_line_up_with_headers() {
        let record = EnrichedRecord {
            catalog_entry: Some(CatalogEntry::new("7140-1", "X-wing Fighter", 1999, 180)),
            keyword: None,
            external_id: "B000001".to_string(),
            title: "LEGO 7140 X-wing".to_string(),
            url: "https://example.test/dp/B000001".to_string(),
            list_price: 49.99,
            lowest_price: 45.5,
            expedited_price: 0.0,
            is_expedited_eligible: false,
            part_count: 180,
            weight_grams: 0,
            price_per_part: 45.5 / 180.0,
            price_per_weight_unit: 0.0,
            matched_at: Utc::now(),
        };

        let columns = record.columns();
        assert_eq!(columns.len(), EnrichedRecord::headers().len());
        assert_eq!(columns[0], "7140-1");
        assert_eq!(columns[4], "1999");
        assert_eq!(columns[5], "45.50");
        assert_eq!(columns[11], "0.253");
        assert_eq!(columns[14], "");

        let headers = EnrichedRecord::headers();
        assert_eq!(headers[3], "Title");
        assert_eq!(headers[12], "Price/Weight");
        assert_eq!(headers[15], "Matched At");
    }
}
