use crate::error::CatalogError;
use crate::models::CatalogEntry;
use std::io::Read;
use std::path::Path;

// sets.csv: set_num,name,year,theme_id,num_parts
const COL_ID: usize = 0;
const COL_NAME: usize = 1;
const COL_YEAR: usize = 2;
const COL_PARTS: usize = 4;

/// 解析目录 CSV (跳过表头); 任一行格式错误都视为致命
pub fn parse_catalog<R: Read>(reader: R) -> Result<Vec<CatalogEntry>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut entries = Vec::new();
    for (idx, row) in csv_reader.records().enumerate() {
        let row = row?;
        let line = idx + 2; // 表头占第 1 行
        if row.len() <= COL_PARTS {
            return Err(CatalogError::ShortRow {
                row: line,
                found: row.len(),
                expected: COL_PARTS + 1,
            });
        }

        let year = &row[COL_YEAR];
        let release_year: i32 = year.trim().parse().map_err(|_| CatalogError::MalformedField {
            row: line,
            field: "year",
            value: year.to_string(),
        })?;

        let parts = &row[COL_PARTS];
        let part_count: u32 = parts.trim().parse().map_err(|_| CatalogError::MalformedField {
            row: line,
            field: "num_parts",
            value: parts.to_string(),
        })?;

        entries.push(CatalogEntry::new(&row[COL_ID], &row[COL_NAME], release_year, part_count));
    }

    Ok(entries)
}

/// 下载并解析完整目录, 抓取开始前一次性加载
pub async fn fetch_catalog(client: &reqwest::Client, url: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    tracing::info!("Downloading catalog from {}", url);
    let body = client.get(url).send().await?.error_for_status()?.bytes().await?;
    let entries = parse_catalog(body.as_ref())?;
    tracing::info!("Catalog loaded: {} entries", entries.len());
    Ok(entries)
}

pub fn load_catalog_file(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    tracing::info!("Reading catalog from {}", path.display());
    let file = std::fs::File::open(path)?;
    let entries = parse_catalog(file)?;
    tracing::info!("Catalog loaded: {} entries", entries.len());
    Ok(entries)
}
