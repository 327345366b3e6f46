use tide::http::StatusCode;
use tide::{Request, Response};
use tracing::info;

use crate::models::photos::Photo;
use crate::web::api::utils::rejection;
use crate::web::upload::{receive_upload, UploadOutcome};
use crate::web::{filename_param, with_photos};
use photoverse_api_structs::{LikeResponse, PhotoSummary, UploadResponse};

pub(super) fn mount(mut route: tide::Route<crate::State>) {
    route.at("/photos").get(list_photos).post(create_photo);

    route.at("/photo/:filename").get(get_photo).delete(delete_photo);
    route.at("/photo/:filename/like").post(like_photo);
}

async fn list_photos(req: Request<crate::State>) -> tide::Result<Response> {
    let photos: Vec<PhotoSummary> = with_photos(req.state(), |photos| photos.list_photos())
        .await?
        .into_iter()
        .map(|entry| Photo::from(entry).into())
        .collect();

    let res = Response::builder(StatusCode::Ok)
        .body(tide::Body::from_json(&photos)?)
        .build();
    Ok(res)
}

async fn create_photo(mut req: Request<crate::State>) -> tide::Result<Response> {
    let res = match receive_upload(&mut req).await? {
        UploadOutcome::Saved(filename) => {
            info!(%filename, "photo uploaded through api");
            Response::builder(StatusCode::Created)
                .body(tide::Body::from_json(&UploadResponse { filename })?)
                .build()
        },
        UploadOutcome::MissingFile => rejection(
            StatusCode::BadRequest,
            "A file name and a non-empty body are required.",
        ),
        UploadOutcome::UnsupportedType => rejection(
            StatusCode::UnsupportedMediaType,
            "File extension is not accepted.",
        ),
        UploadOutcome::TooLarge => {
            rejection(StatusCode::PayloadTooLarge, "Upload exceeds the size limit.")
        },
    };

    Ok(res)
}

async fn get_photo(req: Request<crate::State>) -> tide::Result<Response> {
    let filename = filename_param(&req)?;
    let photo = with_photos(req.state(), move |photos| photos.get_photo(&filename)).await?;

    match photo {
        Some(entry) => {
            let summary: PhotoSummary = Photo::from(entry).into();
            Ok(Response::builder(StatusCode::Ok)
                .body(tide::Body::from_json(&summary)?)
                .build())
        },
        None => Ok(Response::builder(StatusCode::NotFound).build()),
    }
}

async fn like_photo(req: Request<crate::State>) -> tide::Result<Response> {
    let filename = filename_param(&req)?;
    let likes = {
        let filename = filename.clone();
        with_photos(req.state(), move |photos| photos.like_photo(&filename)).await?
    };

    Ok(Response::builder(StatusCode::Ok)
        .body(tide::Body::from_json(&LikeResponse { filename, likes })?)
        .build())
}

async fn delete_photo(req: Request<crate::State>) -> tide::Result<Response> {
    let filename = filename_param(&req)?;
    with_photos(req.state(), move |photos| photos.delete_photo(&filename)).await?;

    Ok(Response::builder(StatusCode::NoContent).build())
}
