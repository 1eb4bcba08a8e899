use news_ingestor::{NewsConfig, NewsProvider, newsapi::NewsApiClient, recent_headlines};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore]
async fn test_newsapi_headlines() {
    // Requires NEWS_API_KEY in the environment.
    if std::env::var("NEWS_API_KEY").is_err() {
        println!("Skipping test_newsapi_headlines: NEWS_API_KEY not set.");
        return;
    }

    let client = NewsApiClient::new(NewsConfig::default()).expect("client");
    let titles = client.headlines("Apple").await.expect("headlines");
    assert!(titles.len() <= 10);

    let top = client.top_headlines().await.expect("top headlines");
    assert_eq!(top["status"], "ok");
}

#[tokio::test]
#[serial]
async fn test_missing_key_degrades_to_empty() {
    let client = NewsApiClient::with_api_key(NewsConfig::default(), None).expect("client");
    assert!(recent_headlines(&client, "TSLA").await.is_empty());
}
