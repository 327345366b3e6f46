use std::sync::Arc;

use structopt::StructOpt;
use tracing::info;

pub mod db;
pub mod models;
pub mod telemetry;
pub mod web;

use db::metadata::{LoadPolicy, MetadataStore};
use db::photos::PhotoRepository;

#[derive(Clone, Debug)]
pub struct State {
    pub args: Arc<Args>,
    pub photos: Arc<PhotoRepository>,
    pub tera: Arc<tera::Tera>,
}

impl State {
    /// Opens the photo repository and parses the templates.
    pub fn new(args: Arc<Args>) -> Result<Self, Error> {
        let policy = if args.strict_metadata {
            LoadPolicy::Strict
        } else {
            LoadPolicy::Lenient
        };
        let store = MetadataStore::new(&args.metadata_path, policy);
        let photos = PhotoRepository::open(&args.media_dir, store).map_err(Error::StorageError)?;

        let pattern = args.template_path.join("**/*.html");
        let tera = tera::Tera::new(&pattern.to_string_lossy()).map_err(Error::TemplateParseError)?;

        Ok(State {
            args,
            photos: Arc::new(photos),
            tera: Arc::new(tera),
        })
    }
}

#[derive(Debug)]
pub enum Error {
    TemplateParseError(tera::Error),
    TelemetryInitError(anyhow::Error),
    StorageError(db::Error),
    ListenError(std::io::Error),
}

impl From<Error> for u8 {
    fn from(error: Error) -> u8 {
        match error {
            Error::TemplateParseError(_) => 3,
            Error::TelemetryInitError(_) => 4,
            Error::StorageError(_) => 5,
            Error::ListenError(_) => 6,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TemplateParseError(err) => {
                write!(f, "Template parsing error: {}", err)
            },
            Error::TelemetryInitError(err) => {
                write!(f, "Failed to init telemetry: {}", err)
            },
            Error::StorageError(err) => {
                write!(f, "Failed to open photo storage: {}", err)
            },
            Error::ListenError(err) => {
                write!(f, "Failed to serve: {}", err)
            },
        }
    }
}

#[derive(Debug, StructOpt)]
pub struct Args {
    /// Host address to bind to.
    #[structopt(long, default_value = "localhost", env = "PHOTOVERSE_BIND_ADDRESS")]
    address: String,
    /// Port to bind to.
    #[structopt(long, default_value = "8166", env = "PHOTOVERSE_BIND_PORT")]
    port: u16,

    /// Directory holding the uploaded photo files.
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "./media/photos",
        env = "PHOTOVERSE_MEDIA_DIR"
    )]
    pub media_dir: std::path::PathBuf,

    /// JSON document holding photo metadata.
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "./media/photos_meta.json",
        env = "PHOTOVERSE_METADATA_PATH"
    )]
    pub metadata_path: std::path::PathBuf,

    /// Fail requests when the metadata document is unreadable instead of
    /// treating it as empty.
    #[structopt(long, env = "PHOTOVERSE_STRICT_METADATA")]
    pub strict_metadata: bool,

    /// Path to Tera templates directory
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "./templates",
        env = "PHOTOVERSE_TEMPLATE_PATH"
    )]
    template_path: std::path::PathBuf,

    /// File extensions accepted for upload.
    #[structopt(
        long,
        use_delimiter = true,
        default_value = "png,jpg,jpeg,webp",
        env = "PHOTOVERSE_ALLOWED_EXTENSIONS"
    )]
    pub allowed_extensions: Vec<String>,

    /// Largest accepted upload, in bytes.
    #[structopt(long, default_value = "20971520", env = "PHOTOVERSE_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: u64,

    /// Page title shown in the gallery header.
    #[structopt(long, default_value = "PhotoVerse", env = "PHOTOVERSE_TITLE")]
    pub title: String,
}

impl Args {
    /// `extension` is compared case-insensitively, with or without a leading dot.
    pub fn allows_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}

pub async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let args = Arc::new(Args::from_args());

    telemetry::init().map_err(Error::TelemetryInitError)?;

    let state = State::new(args.clone())?;
    info!(
        media_dir = %args.media_dir.display(),
        metadata_path = %args.metadata_path.display(),
        "photo storage ready"
    );

    let app = web::app(state).map_err(Error::ListenError)?;

    let address: &str = args.address.as_ref();
    info!(address, port = args.port, "listening");
    app.listen((address, args.port))
        .await
        .map_err(Error::ListenError)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_allow_list() {
        let args = Args::from_iter(&["photoverse", "--allowed-extensions", "png,.JPG"]);

        assert!(args.allows_extension("png"));
        assert!(args.allows_extension(".jpg"));
        assert!(args.allows_extension("JPG"));
        assert!(!args.allows_extension("gif"));
    }

    #[test]
    fn default_extensions() {
        let args = Args::from_iter(&["photoverse"]);
        assert_eq!(args.allowed_extensions, vec!["png", "jpg", "jpeg", "webp"]);
        assert_eq!(args.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn strict_metadata_from_environment() {
        std::env::set_var("PHOTOVERSE_STRICT_METADATA", "true");
        let args = Args::from_iter(&["photoverse"]);
        std::env::remove_var("PHOTOVERSE_STRICT_METADATA");

        assert!(args.strict_metadata);
    }
}
