use serde::{Deserialize, Serialize};
use tide::{Redirect, Request, Response};
use tracing::info;

use crate::models::photos::Photo;
use crate::web::upload::{receive_upload, UploadOutcome};
use crate::web::{filename_param, with_photos};

pub mod utils;

const PHOTOS_PER_ROW: usize = 3;

pub(in super::super) fn mount(route: &mut tide::Server<crate::State>) {
    route.at("/").get(gallery);
    route.at("/upload").post(upload);

    route.at("/photo/:filename/like").post(like);
    route.at("/photo/:filename/delete").post(delete);
}

/// One-shot status message carried in the redirect back to the gallery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Notice {
    Uploaded,
    MissingFile,
    UnsupportedType,
    TooLarge,
    Liked,
    Deleted,
}

impl Notice {
    fn level(self) -> &'static str {
        match self {
            Notice::Uploaded | Notice::Liked => "success",
            Notice::MissingFile | Notice::UnsupportedType | Notice::TooLarge => "warning",
            Notice::Deleted => "info",
        }
    }

    fn message(self, likes: Option<u64>) -> String {
        match self {
            Notice::Uploaded => "Photo uploaded successfully!".to_string(),
            Notice::MissingFile => "Please select a photo first!".to_string(),
            Notice::UnsupportedType => "That file type is not accepted.".to_string(),
            Notice::TooLarge => "That photo is too large.".to_string(),
            Notice::Liked => format!("Liked! Total likes: {}", likes.unwrap_or_default()),
            Notice::Deleted => "Photo deleted.".to_string(),
        }
    }
}

#[derive(Default, Deserialize, Serialize)]
#[serde(default)]
struct GalleryQueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    likes: Option<u64>,
}

#[derive(Serialize)]
struct RenderedNotice {
    level: &'static str,
    message: String,
}

fn back_to_gallery(notice: Notice, likes: Option<u64>) -> tide::Result<Response> {
    let qs = serde_qs::to_string(&GalleryQueryParams {
        notice: Some(notice),
        likes,
    })?;
    Ok(Redirect::see_other(format!("/?{}", qs)).into())
}

async fn gallery(req: Request<crate::State>) -> tide::Result<Response> {
    let state = req.state();
    let query: GalleryQueryParams = req.query()?;

    let photos: Vec<Photo> = with_photos(state, |photos| photos.list_photos())
        .await?
        .into_iter()
        .map(Photo::from)
        .collect();
    let rows: Vec<&[Photo]> = photos.chunks(PHOTOS_PER_ROW).collect();

    let accept = state
        .args
        .allowed_extensions
        .iter()
        .map(|ext| format!(".{}", ext.trim_start_matches('.')))
        .collect::<Vec<_>>()
        .join(",");

    let mut context = tera::Context::new();
    context.insert("title", &state.args.title);
    context.insert("rows", &rows);
    context.insert("photo_count", &photos.len());
    context.insert("accept", &accept);
    if let Some(notice) = query.notice {
        context.insert(
            "notice",
            &RenderedNotice {
                level: notice.level(),
                message: notice.message(query.likes),
            },
        );
    }

    let body = utils::render(state, "gallery.html", &context)?;
    let res = Response::builder(tide::http::StatusCode::Ok)
        .content_type(tide::http::mime::HTML)
        .body(body)
        .build();
    Ok(res)
}

async fn upload(mut req: Request<crate::State>) -> tide::Result<Response> {
    match receive_upload(&mut req).await? {
        UploadOutcome::Saved(filename) => {
            info!(%filename, "photo uploaded from gallery");
            back_to_gallery(Notice::Uploaded, None)
        },
        UploadOutcome::MissingFile => back_to_gallery(Notice::MissingFile, None),
        UploadOutcome::UnsupportedType => back_to_gallery(Notice::UnsupportedType, None),
        UploadOutcome::TooLarge => back_to_gallery(Notice::TooLarge, None),
    }
}

async fn like(req: Request<crate::State>) -> tide::Result<Response> {
    let filename = filename_param(&req)?;
    let likes = with_photos(req.state(), move |photos| photos.like_photo(&filename)).await?;

    back_to_gallery(Notice::Liked, Some(likes))
}

async fn delete(req: Request<crate::State>) -> tide::Result<Response> {
    let filename = filename_param(&req)?;
    with_photos(req.state(), move |photos| photos.delete_photo(&filename)).await?;

    back_to_gallery(Notice::Deleted, None)
}
