//! Catalog fixtures and mock endpoint setup

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Timestamp shared by fixture illustrations
pub const UPDATE_DATE: &str = "2024-05-19T00:00:13+09:00";

/// Image path segment derived from [`UPDATE_DATE`]
pub const IMAGE_DATE_PATH: &str = "2024/05/19/00/00/13";

/// One catalog record as the endpoints send it
pub fn illustration(id: &str, tags: &[&str]) -> Value {
    json!({
        "id": id,
        "title": format!("work {id}"),
        "illustType": 0,
        "xRestrict": 0,
        "tags": tags,
        "userId": "1",
        "userName": "artist",
        "width": 1200,
        "height": 1600,
        "pageCount": 1,
        "createDate": UPDATE_DATE,
        "updateDate": UPDATE_DATE,
    })
}

/// Advertisement placeholder interleaved in search listings
pub fn ad_placeholder() -> Value {
    json!({ "isAdContainer": true })
}

/// Search endpoint response wrapping `data`
pub fn search_response(data: Vec<Value>) -> Value {
    let total = data.len();
    json!({
        "error": false,
        "message": "",
        "body": { "illustManga": { "data": data, "total": total } }
    })
}

/// Top endpoint response wrapping `illust`
pub fn top_response(illust: Vec<Value>) -> Value {
    json!({
        "error": false,
        "message": "",
        "body": { "thumbnails": { "illust": illust } }
    })
}

/// Serve `body` for the image of illustration `id`, only with the site referer
pub async fn mount_image(server: &MockServer, id: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/img-master/img/{}/{}_p0_master1200.jpg",
            IMAGE_DATE_PATH, id
        )))
        .and(header("referer", "https://www.pixiv.net"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

/// Answer the image of illustration `id` with `status`
pub async fn mount_image_status(server: &MockServer, id: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/img-master/img/{}/{}_p0_master1200.jpg",
            IMAGE_DATE_PATH, id
        )))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}
