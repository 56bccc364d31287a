//! Flickr REST client tests against a mock HTTP server

use flickr_harvester::adapters::flickr::{FlickrClient, PhotoSource};
use flickr_harvester::config::{parse_config, HarvesterConfig};
use flickr_harvester::domain::{FlickrError, HarvesterError, PageRequest};
use mockito::{Matcher, Server};
use serde_json::json;

fn test_config(base_url: &str) -> HarvesterConfig {
    parse_config(&format!(
        r#"
[flickr]
api_key = "test-key"
base_url = "{base_url}/"
group_id = "806927@N20"
machine_tags = ["taxonomy:scientificName="]
extras = ["description", "license", "machine_tags"]
per_page = 2

[flickr.retry]
max_retries = 3
initial_delay_ms = 1
max_delay_ms = 5
backoff_multiplier = 2.0
"#
    ))
    .unwrap()
}

fn pool_body() -> String {
    json!({
        "photos": {
            "page": 1,
            "pages": "3",
            "perpage": 2,
            "total": "5",
            "photo": [
                {
                    "id": "8562348712",
                    "owner": "12037949754@N01",
                    "secret": "a1b2c3",
                    "server": "8369",
                    "farm": 9,
                    "title": "Felis catus plate",
                    "ownername": "biodivlibrary",
                    "description": {"_content": "From http://www.biodiversitylibrary.org/page/1234"},
                    "license": "7",
                    "lastupdate": "1425168000",
                    "machine_tags": "taxonomy:scientificname=felis+catus"
                },
                {
                    "id": "8562348713",
                    "owner": "12037949754@N01",
                    "license": 7
                }
            ]
        },
        "stat": "ok"
    })
    .to_string()
}

#[tokio::test]
async fn test_fetch_page_sends_pool_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded(
                "method".into(),
                "flickr.groups.pools.getPhotos".into(),
            ),
            Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            Matcher::UrlEncoded("format".into(), "json".into()),
            Matcher::UrlEncoded("nojsoncallback".into(), "1".into()),
            Matcher::UrlEncoded("group_id".into(), "806927@N20".into()),
            Matcher::UrlEncoded("tags".into(), "taxonomy:scientificName=".into()),
            Matcher::UrlEncoded("extras".into(), "description,license,machine_tags".into()),
            Matcher::UrlEncoded("per_page".into(), "2".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(pool_body())
        .expect(1)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let client = FlickrClient::new(config.flickr.clone()).unwrap();
    let request = PageRequest::new(&config.pool_query(), 1).unwrap();
    let page = client.fetch_page(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.page, 1);
    assert_eq!(page.pages, 3);
    assert_eq!(page.total, 5);
    assert_eq!(page.photos.len(), 2);

    let first = &page.photos[0];
    assert_eq!(first.id, "8562348712");
    assert_eq!(first.owner.username, "biodivlibrary");
    assert_eq!(first.license, "7");
    assert_eq!(
        first.page_url,
        "https://flickr.com/photos/12037949754@N01/8562348712"
    );
    assert_eq!(first.machine_tags, vec!["taxonomy:scientificname=felis+catus"]);
    assert_eq!(first.last_update.unwrap().timestamp(), 1425168000);
    assert_eq!(page.photos[1].license, "7");
}

#[tokio::test]
async fn test_count_pages_requests_a_single_photo() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("per_page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_body(pool_body())
        .expect(1)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let client = FlickrClient::new(config.flickr.clone()).unwrap();
    let pages = client.count_pages(&config.pool_query()).await.unwrap();

    mock.assert_async().await;
    // 5 photos at 2 per page
    assert_eq!(pages, 3);
}

#[tokio::test]
async fn test_api_failure_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"stat":"fail","code":1,"message":"Group not found"}"#)
        .expect(1)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let client = FlickrClient::new(config.flickr.clone()).unwrap();
    let request = PageRequest::new(&config.pool_query(), 1).unwrap();
    let err = client.fetch_page(&request).await.unwrap_err();

    mock.assert_async().await;
    match err {
        HarvesterError::Flickr(FlickrError::Api { code, message }) => {
            assert_eq!(code, 1);
            assert_eq!(message, "Group not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_server_error_gives_up_after_max_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .expect(3)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let client = FlickrClient::new(config.flickr.clone()).unwrap();
    let request = PageRequest::new(&config.pool_query(), 1).unwrap();
    let err = client.fetch_page(&request).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err,
        HarvesterError::Flickr(FlickrError::ServerError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("Not Found")
        .expect(1)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let client = FlickrClient::new(config.flickr.clone()).unwrap();
    let request = PageRequest::new(&config.pool_query(), 1).unwrap();
    let err = client.fetch_page(&request).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(
        err,
        HarvesterError::Flickr(FlickrError::ClientError { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("jsonFlickrApi({})")
        .create_async()
        .await;

    let config = test_config(&server.url());
    let client = FlickrClient::new(config.flickr.clone()).unwrap();
    let request = PageRequest::new(&config.pool_query(), 1).unwrap();
    let err = client.fetch_page(&request).await.unwrap_err();

    assert!(matches!(
        err,
        HarvesterError::Flickr(FlickrError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_fetch_licenses() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_query(Matcher::UrlEncoded(
            "method".into(),
            "flickr.photos.licenses.getInfo".into(),
        ))
        .with_status(200)
        .with_body(
            json!({
                "licenses": {"license": [
                    {"id": 0, "name": "All Rights Reserved", "url": ""},
                    {"id": 7, "name": "No known copyright restrictions", "url": "https://www.flickr.com/commons/usage/"}
                ]},
                "stat": "ok"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let client = FlickrClient::new(config.flickr.clone()).unwrap();
    let licenses = client.fetch_licenses().await.unwrap();

    mock.assert_async().await;
    assert_eq!(licenses.len(), 2);
    assert_eq!(licenses.name("7"), Some("No known copyright restrictions"));
    assert_eq!(licenses.name("3"), None);
}
