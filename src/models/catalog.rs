use serde::{Deserialize, Serialize};

/// 目录条目 (Rebrickable sets.csv 的一行)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,          // 套装编号, 如 7140-1
    pub name: String,
    pub release_year: i32,
    pub part_count: u32,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, release_year: i32, part_count: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            release_year,
            part_count,
        }
    }

    /// 年份和零件数都严格大于下限才参与匹配
    pub fn passes_filter(&self, min_year: i32, min_parts: u32) -> bool {
        self.release_year > min_year && self.part_count > min_parts
    }

    pub fn key(&self) -> CatalogKey {
        CatalogKey::new(&self.id, &self.name)
    }
}

/// 匹配用的键: 归一化后的编号 + 名称
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogKey {
    pub id: String,
    pub name: String,
}

impl CatalogKey {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: normalize_id(id),
            name: name.to_string(),
        }
    }

    /// 名称的前 1~3 个空白分隔词, 用于第二轮关键词搜索
    pub fn name_prefix(&self) -> String {
        self.name
            .split_whitespace()
            .take(3)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

const REVISION_SUFFIX: &str = "-1";

/// 去掉末尾的版本后缀 `-1`; 对结果再次调用不会改变它
pub fn normalize_id(id: &str) -> String {
    id.trim_end_matches(REVISION_SUFFIX).to_string()
}
