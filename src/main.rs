use brick_price_matcher::cli::Cli;
use brick_price_matcher::config::Strategy;
use brick_price_matcher::gateway::{
    fetch_catalog, load_catalog_file, CsvRecordSink, DetailScraper, HtmlDetailScraper, HttpSearchClient,
};
use brick_price_matcher::{AppConfig, CancellationCoordinator, CrawlController};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置: 默认值 -> 配置文件 -> 环境变量 -> 命令行
    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;
    let config = config;
    info!("Starting with config: {:?}", config);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.search.timeout_secs))
        .user_agent(config.search.user_agent.clone())
        .build()?;

    // 目录必须在抓取前完整加载, 失败直接退出
    let catalog = match config.crawl.strategy {
        Strategy::Targeted => match &config.catalog.path {
            Some(path) => load_catalog_file(path)?,
            None => fetch_catalog(&http, &config.catalog.url).await?,
        },
        Strategy::KeywordSweep | Strategy::BucketedSweep => Vec::new(),
    };

    let search = Arc::new(HttpSearchClient::new(http.clone(), config.search.endpoint.clone()));
    let scraper: Option<Arc<dyn DetailScraper>> = if config.crawl.scrape_details {
        Some(Arc::new(HtmlDetailScraper::new(http)))
    } else {
        None
    };

    let mut sink = CsvRecordSink::create(&cli.output)?;
    info!("Writing records to {}", cli.output.display());

    // 信号监听任务与抓取任务共享同一个协调器
    let coordinator = Arc::new(CancellationCoordinator::new());
    let listener = coordinator.listen_for_interrupt();

    let controller = CrawlController::new(&config.crawl, search, scraper, config.crawl.build_policy());
    let report = controller.run(&catalog, &mut sink, &coordinator).await?;
    listener.await?;

    info!("Report: {}", serde_json::to_string(&report)?);
    info!("DONE!");
    Ok(())
}
