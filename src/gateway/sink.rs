use super::RecordSink;
use crate::error::SinkError;
use crate::models::EnrichedRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// 制表符分隔的 CSV 输出, 先写表头, 每条记录后立即 flush
pub struct CsvRecordSink<W: Write + Send> {
    writer: csv::Writer<W>,
    written: usize,
}

impl CsvRecordSink<File> {
    /// 创建 (截断) 输出文件
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Self::new(file)
    }
}

impl<W: Write + Send> CsvRecordSink<W> {
    pub fn new(inner: W) -> Result<Self, SinkError> {
        let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(inner);
        writer.write_record(EnrichedRecord::headers())?;
        writer.flush()?;
        Ok(Self { writer, written: 0 })
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write + Send> RecordSink for CsvRecordSink<W> {
    fn write(&mut self, record: &EnrichedRecord) -> Result<(), SinkError> {
        let columns = record.columns();
        tracing::info!(target: "brick_price_matcher::record", "{}", columns.join("\t"));
        self.writer.write_record(&columns)?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogEntry;
    use chrono::Utc;

    fn record(id: &str) -> EnrichedRecord {
        EnrichedRecord {
            catalog_entry: Some(CatalogEntry::new(id, "Some Set", 2010, 100)),
            keyword: None,
            external_id: format!("ASIN-{id}"),
            title: "LEGO Some Set".to_string(),
            url: String::new(),
            list_price: 10.0,
            lowest_price: 9.5,
            expedited_price: 0.0,
            is_expedited_eligible: false,
            part_count: 100,
            weight_grams: 0,
            price_per_part: 0.095,
            price_per_weight_unit: 0.0,
            matched_at: Utc::now(),
        }
    }

    #[test]
    fn header_then_one_line_per_record() {
        let mut sink = CsvRecordSink::new(Vec::new()).unwrap();
        sink.write(&record("1000-1")).unwrap();
        sink.write(&record("2000-1")).unwrap();
        assert_eq!(sink.written(), 2);

        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Num\tName\tASIN"));
        assert!(lines[1].starts_with("1000-1\tSome Set\tASIN-1000-1"));
        assert!(lines[2].starts_with("2000-1\t"));
    }

    #[test]
    fn file_holds_prefix_after_each_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut sink = CsvRecordSink::create(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);

        sink.write(&record("1000-1")).unwrap();
        // 未关闭文件也应能读到完整的行
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
