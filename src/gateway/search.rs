use super::SearchCapability;
use crate::error::SearchError;
use crate::models::{SearchPage, SearchRequest, SearchResult};
use async_trait::async_trait;
use serde::Deserialize;

/// 价格区间内没有结果时服务端返回的错误码
const NO_EXACT_MATCHES: &str = "NoExactMatches";

/// 搜索网关的 JSON 响应
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    total_results: u64,
    total_pages: u32,
    items: Vec<SearchResult>,
    error: Option<ServiceError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServiceError {
    code: String,
    message: String,
}

impl SearchResponse {
    fn into_page(self) -> Result<SearchPage, SearchError> {
        if let Some(error) = self.error {
            // 兼容 AWS.ECommerceService.NoExactMatches
            if error.code.ends_with(NO_EXACT_MATCHES) {
                return Err(SearchError::NoExactMatches);
            }
            return Err(SearchError::Service {
                code: error.code,
                message: error.message,
            });
        }
        Ok(SearchPage {
            total_results: self.total_results,
            total_pages: self.total_pages,
            items: self.items,
        })
    }
}

/// 通过 HTTP 调用商品搜索网关
#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSearchClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn query(request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("keywords", request.keywords.clone()),
            ("page", request.page.to_string()),
        ];
        if let Some(min) = request.price_min {
            query.push(("min_price", min.to_string()));
        }
        if let Some(max) = request.price_max {
            query.push(("max_price", max.to_string()));
        }
        query
    }
}

#[async_trait]
impl SearchCapability for HttpSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, SearchError> {
        let response: SearchResponse = self
            .client
            .get(&self.endpoint)
            .query(&Self::query(request))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_page()
    }
}
