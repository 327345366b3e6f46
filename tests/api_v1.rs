mod support;

use tide::http::{Method, StatusCode};

use photoverse_api_structs::{LikeResponse, PhotoSummary, UploadResponse};
use support::{gallery, request, upload_request, Gallery};

async fn upload(g: &Gallery, query: &str, body: &[u8]) -> String {
    let mut res = g
        .send(upload_request(&format!("/api/v1/photos?{}", query), body))
        .await;
    assert_eq!(res.status(), StatusCode::Created);
    let created: UploadResponse = res.body_json().await.unwrap();
    created.filename
}

async fn list(g: &Gallery) -> Vec<PhotoSummary> {
    let mut res = g.send(request(Method::Get, "/api/v1/photos")).await;
    assert_eq!(res.status(), StatusCode::Ok);
    res.body_json().await.unwrap()
}

#[async_std::test]
async fn cat_scenario_over_the_api() {
    let tmp = tempfile::tempdir().unwrap();
    let g = gallery(tmp.path(), &[]);

    let filename = upload(&g, "name=cat.png&caption=cute", b"meow").await;
    assert!(filename.ends_with(".png"));

    let photos = list(&g).await;
    assert_eq!(photos.len(), 1);
    assert_eq!(photos[0].filename, filename);
    assert_eq!(photos[0].original_name, "cat.png");
    assert_eq!(photos[0].caption, "cute");
    assert_eq!(photos[0].likes, 0);
    assert_eq!(photos[0].url, format!("/media/{}", filename));

    let like_path = format!("/api/v1/photo/{}/like", filename);
    g.send(request(Method::Post, &like_path)).await;
    let mut res = g.send(request(Method::Post, &like_path)).await;
    let liked: LikeResponse = res.body_json().await.unwrap();
    assert_eq!(
        liked,
        LikeResponse {
            filename: filename.clone(),
            likes: 2
        }
    );

    let photo_path = format!("/api/v1/photo/{}", filename);
    let res = g.send(request(Method::Delete, &photo_path)).await;
    assert_eq!(res.status(), StatusCode::NoContent);
    assert!(!g.state.photos.photo_dir().join(&filename).exists());
    assert!(list(&g).await.is_empty());

    let res = g.send(request(Method::Delete, &photo_path)).await;
    assert_eq!(res.status(), StatusCode::NoContent);

    let res = g.send(request(Method::Get, &photo_path)).await;
    assert_eq!(res.status(), StatusCode::NotFound);
}

#[async_std::test]
async fn get_single_photo() {
    let tmp = tempfile::tempdir().unwrap();
    let g = gallery(tmp.path(), &[]);
    let filename = upload(&g, "name=Dog.JPG", b"woof").await;
    assert!(filename.ends_with(".jpg"));

    let mut res = g
        .send(request(Method::Get, &format!("/api/v1/photo/{}", filename)))
        .await;
    assert_eq!(res.status(), StatusCode::Ok);
    let photo: PhotoSummary = res.body_json().await.unwrap();
    assert_eq!(photo.original_name, "Dog.JPG");
    assert_eq!(photo.caption, "");
}

#[async_std::test]
async fn like_unknown_returns_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let g = gallery(tmp.path(), &[]);
    upload(&g, "name=a.png", b"x").await;
    let before = std::fs::read(g.state.photos.store().path()).unwrap();

    let mut res = g
        .send(request(Method::Post, "/api/v1/photo/nope.png/like"))
        .await;
    assert_eq!(res.status(), StatusCode::Ok);
    let liked: LikeResponse = res.body_json().await.unwrap();
    assert_eq!(liked.likes, 0);
    assert_eq!(std::fs::read(g.state.photos.store().path()).unwrap(), before);
}

#[async_std::test]
async fn list_is_newest_first() {
    let tmp = tempfile::tempdir().unwrap();
    let g = gallery(tmp.path(), &[]);
    for i in 0..4 {
        upload(&g, &format!("name={}.png", i), b"x").await;
    }

    let photos = list(&g).await;
    assert_eq!(photos.len(), 4);
    assert!(photos
        .windows(2)
        .all(|w| w[0].uploaded_at >= w[1].uploaded_at));
}

#[async_std::test]
async fn rejected_uploads() {
    let tmp = tempfile::tempdir().unwrap();
    let g = gallery(tmp.path(), &["--max-upload-bytes", "8"]);

    let res = g.send(upload_request("/api/v1/photos", b"data")).await;
    assert_eq!(res.status(), StatusCode::BadRequest);

    let res = g.send(upload_request("/api/v1/photos?name=a.png", b"")).await;
    assert_eq!(res.status(), StatusCode::BadRequest);

    let res = g.send(upload_request("/api/v1/photos?name=a.gif", b"data")).await;
    assert_eq!(res.status(), StatusCode::UnsupportedMediaType);

    let res = g
        .send(upload_request("/api/v1/photos?name=a.png", b"far too many bytes"))
        .await;
    assert_eq!(res.status(), StatusCode::PayloadTooLarge);

    assert!(list(&g).await.is_empty());
}

#[async_std::test]
async fn custom_extension_list() {
    let tmp = tempfile::tempdir().unwrap();
    let g = gallery(tmp.path(), &["--allowed-extensions", "gif"]);

    let res = g.send(upload_request("/api/v1/photos?name=a.png", b"x")).await;
    assert_eq!(res.status(), StatusCode::UnsupportedMediaType);

    upload(&g, "name=a.GIF", b"x").await;
}

#[async_std::test]
async fn largest_upload_limit_is_accepted() {
    let tmp = tempfile::tempdir().unwrap();
    let g = gallery(tmp.path(), &["--max-upload-bytes", "18446744073709551615"]);

    let filename = upload(&g, "name=a.png", b"pixels").await;
    assert_eq!(list(&g).await[0].filename, filename);
}
