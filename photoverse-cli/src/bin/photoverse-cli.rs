use structopt::StructOpt;

use photoverse_cli::ApiClient;

#[derive(StructOpt)]
struct SharedApiArgs {
    /// PhotoVerse server base URL
    #[structopt(long, default_value = "http://localhost:8166", env = "PHOTOVERSE_API_ENDPOINT")]
    endpoint: String,
}

#[derive(StructOpt)]
pub struct UploadArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Caption to store with the photo.
    #[structopt(long, default_value = "")]
    caption: String,

    /// Path to photo file to upload.
    #[structopt(name = "PATH", parse(from_os_str))]
    file_path: std::path::PathBuf,
}

#[derive(StructOpt)]
pub struct ListArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Print the listing as JSON.
    #[structopt(long)]
    json: bool,
}

#[derive(StructOpt)]
pub struct FilenameArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Generated filename of the photo.
    #[structopt(name = "FILENAME")]
    filename: String,
}

#[derive(StructOpt)]
pub enum Command {
    Upload(UploadArgs),
    List(ListArgs),
    Like(FilenameArgs),
    Delete(FilenameArgs),
}

#[async_std::main]
async fn main() -> surf::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    match Command::from_args() {
        Command::Upload(args) => {
            let client = ApiClient::new(&args.api_arguments.endpoint)?;
            let created = client.upload(&args.file_path, &args.caption).await?;
            log::info!("Uploaded {}", args.file_path.display());
            println!("{}", created.filename);
        },
        Command::List(args) => {
            let client = ApiClient::new(&args.api_arguments.endpoint)?;
            let photos = client.list().await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&photos)?);
            } else {
                for photo in photos {
                    println!(
                        "{}\t{} likes\t{}\t{}",
                        photo.filename, photo.likes, photo.original_name, photo.caption
                    );
                }
            }
        },
        Command::Like(args) => {
            let client = ApiClient::new(&args.api_arguments.endpoint)?;
            let liked = client.like(&args.filename).await?;
            println!("{}", liked.likes);
        },
        Command::Delete(args) => {
            let client = ApiClient::new(&args.api_arguments.endpoint)?;
            client.delete(&args.filename).await?;
            log::info!("Deleted {}", args.filename);
        },
    }

    Ok(())
}
