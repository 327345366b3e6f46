use async_std::io::ReadExt;
use tide::Request;
use tracing::debug;

use crate::db::photos::extension_of;
use crate::State;
use photoverse_api_structs::UploadQuery;

/// How an upload request ended. Only `Saved` touched the repository.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum UploadOutcome {
    Saved(String),
    MissingFile,
    UnsupportedType,
    TooLarge,
}

/// Reads a raw-body upload (`?name=<original name>&caption=<caption>`) and
/// stores it if it passes the name, extension and size checks.
pub(crate) async fn receive_upload(req: &mut Request<State>) -> tide::Result<UploadOutcome> {
    let query: UploadQuery = req.query()?;
    let state = req.state().clone();

    let name = match query.name {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(UploadOutcome::MissingFile),
    };

    match extension_of(&name) {
        Some(ext) if state.args.allows_extension(&ext) => {},
        _ => {
            debug!(%name, "rejecting upload with unsupported extension");
            return Ok(UploadOutcome::UnsupportedType);
        },
    }

    let limit = state.args.max_upload_bytes;
    if let Some(len) = req.len() {
        if len as u64 > limit {
            return Ok(UploadOutcome::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    req.take_body()
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .await?;

    if bytes.is_empty() {
        return Ok(UploadOutcome::MissingFile);
    }
    if bytes.len() as u64 > limit {
        return Ok(UploadOutcome::TooLarge);
    }

    let caption = query.caption;
    let filename = super::with_photos(&state, move |photos| {
        photos.save_upload(&bytes, &name, &caption)
    })
    .await?;

    Ok(UploadOutcome::Saved(filename))
}
