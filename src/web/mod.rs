use async_std::task;
use percent_encoding::percent_decode_str;
use tide::Request;

use crate::db::{self, photos::PhotoRepository};
use crate::State;

pub mod api;
pub mod html;
pub mod request_tracing;
pub mod upload;

/// Builds the tide application: HTML pages, JSON API and the photo files.
pub fn app(state: State) -> std::io::Result<tide::Server<State>> {
    let media_dir = state.photos.photo_dir().to_path_buf();
    let mut app = tide::with_state(state);

    app.with(request_tracing::RequestTracing);

    html::mount(&mut app);
    api::mount(app.at("/api"));
    app.at("/media").serve_dir(media_dir)?;

    Ok(app)
}

/// Runs a repository operation on the blocking thread pool.
pub(crate) async fn with_photos<T, F>(state: &State, f: F) -> Result<T, db::Error>
where
    F: FnOnce(&PhotoRepository) -> Result<T, db::Error> + Send + 'static,
    T: Send + 'static,
{
    let photos = state.photos.clone();
    task::spawn_blocking(move || f(&photos)).await
}

/// The percent-decoded `:filename` route parameter.
pub(crate) fn filename_param(req: &Request<State>) -> tide::Result<String> {
    let raw = req.param("filename")?;
    Ok(percent_decode_str(raw).decode_utf8_lossy().into_owned())
}
