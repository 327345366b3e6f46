use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use photoverse::{web, Args, State};
use structopt::StructOpt;
use tide::http::{Method, Request, Response, Url};

pub struct Gallery {
    pub app: tide::Server<State>,
    pub state: State,
}

pub fn gallery(dir: &Path, extra: &[&str]) -> Gallery {
    let mut argv: Vec<OsString> = vec![
        "photoverse".into(),
        "--media-dir".into(),
        dir.join("photos").into(),
        "--metadata-path".into(),
        dir.join("photos_meta.json").into(),
        "--template-path".into(),
        concat!(env!("CARGO_MANIFEST_DIR"), "/templates").into(),
    ];
    argv.extend(extra.iter().map(OsString::from));

    let args = Args::from_iter(argv);
    let state = State::new(Arc::new(args)).unwrap();
    let app = web::app(state.clone()).unwrap();
    Gallery { app, state }
}

pub fn request(method: Method, path: &str) -> Request {
    Request::new(method, Url::parse(&format!("http://localhost{}", path)).unwrap())
}

pub fn upload_request(path: &str, body: &[u8]) -> Request {
    let mut req = request(Method::Post, path);
    req.set_body(body.to_vec());
    req
}

impl Gallery {
    pub async fn send(&self, req: Request) -> Response {
        self.app.respond(req).await.unwrap()
    }
}

pub fn location(res: &Response) -> String {
    res.header("Location").unwrap().last().as_str().to_string()
}
