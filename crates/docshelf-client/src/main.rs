//! # docshelf
//!
//! Command-line front end for a local document shelf.  Each invocation signs
//! in as the user given by `--user-id`, runs one action, and prints the
//! notices it produced.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docshelf_client::api::ApiClient;
use docshelf_client::{
    ClientConfig, ClientError, Notice, NoticeVariant, UploadResult, Workspace,
};
use docshelf_shared::codec::Blob;
use docshelf_shared::constants::{APP_NAME, DEFAULT_CATEGORY};
use docshelf_shared::types::{CategoryId, CommentId, DocumentId, Role, User, UserId};
use docshelf_store::backup::BackupPayload;
use docshelf_store::{Database, MemoryStorage, Storage};

#[derive(Parser)]
#[command(name = "docshelf", version, about = "Per-user document shelf")]
struct Cli {
    /// Id of the acting user
    #[arg(long, env = "DOCSHELF_USER_ID", global = true, default_value_t = 1)]
    user_id: i64,

    /// Display name recorded on uploads and comments
    #[arg(long, env = "DOCSHELF_USER_NAME", global = true)]
    user_name: Option<String>,

    #[arg(long, env = "DOCSHELF_USER_ROLE", global = true, value_enum, default_value_t = RoleArg::Member)]
    role: RoleArg,

    /// Overrides DOCSHELF_DATA_DIR
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Member,
    Administrator,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Member => Role::Member,
            RoleArg::Administrator => Role::Administrator,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Upload a file
    Upload {
        path: PathBuf,
        /// Move the new document into this category after upload
        #[arg(long)]
        category: Option<String>,
    },
    /// List documents, most recent first
    List {
        /// Only the N most recent
        #[arg(long)]
        recent: Option<usize>,
    },
    /// Find documents by name or category
    Search { term: String },
    /// Rename and/or recategorise a document
    Edit {
        id: DocumentId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
    },
    Delete { id: DocumentId },
    /// Show a document's metadata and preview handle
    View { id: DocumentId },
    /// Write a document's content to disk
    Download {
        id: DocumentId,
        /// Defaults to the document's name in the current directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Comment on a document
    Comment { document: DocumentId, text: String },
    /// Show a document's comments
    Comments { document: DocumentId },
    /// Delete a comment
    Uncomment { document: DocumentId, comment: CommentId },
    /// List categories with document counts
    Categories {
        /// Show the documents in one category instead
        #[arg(long)]
        id: Option<CategoryId>,
    },
    AddCategory {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    EditCategory {
        id: CategoryId,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    DeleteCategory { id: CategoryId },
    /// Write the user's documents and comments to a JSON file
    Export { path: PathBuf },
    /// Merge a backup file into the user's partitions
    Import { path: PathBuf },
    /// List documents held by the REST backend
    RemoteDocuments {
        #[arg(long, env = "DOCSHELF_API_TOKEN")]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("docshelf_client=debug,docshelf_store=info,warn")
            }),
        )
        .init();

    let cli = Cli::parse();
    info!("Starting {} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let mut config = ClientConfig::from_env();
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }

    let storage = open_storage(&config)?;
    let (workspace, mut notices) = Workspace::open(storage, config)?;

    let user = User {
        id: UserId(cli.user_id),
        name: cli.user_name.clone().unwrap_or_else(|| format!("User {}", cli.user_id)),
        email: String::new(),
        role: cli.role.into(),
    };
    let session = workspace.sign_in(user).await?;
    info!(
        user_id = %session.user.id,
        documents = session.documents,
        "Signed in"
    );

    let outcome = run(&workspace, cli.command).await;
    drain(&mut notices);
    outcome
}

fn open_storage(config: &ClientConfig) -> anyhow::Result<Arc<dyn Storage>> {
    if let Some(quota) = config.storage_quota {
        info!(quota, "Using ephemeral in-memory storage");
        return Ok(Arc::new(MemoryStorage::with_quota(quota)));
    }
    let db = match &config.data_dir {
        Some(dir) => Database::open_in_dir(dir),
        None => Database::new(),
    }
    .context("failed to open the local database")?;
    Ok(Arc::new(db))
}

async fn run(ws: &Workspace, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Upload { path, category } => {
            let (file_name, blob) = read_file(&path, ws.config().max_file_size)?;
            let filed = upload_and_file(ws, &file_name, blob, category).await?;
            let up = &filed.uploaded;
            println!("{}\t{}\t{}\t{}", up.id, up.name, up.size, filed.category);
            if let Some(e) = filed.refile_error {
                return Err(anyhow::Error::new(e).context(format!(
                    "{} was uploaded as {} but stays in {}",
                    up.name, up.id, filed.category
                )));
            }
        }
        Command::List { recent } => {
            let docs = match recent {
                Some(n) => ws.recent_documents(n).await?,
                None => ws.list_documents().await?,
            };
            print_json(&docs)?;
        }
        Command::Search { term } => print_json(&ws.search_documents(&term).await?)?,
        Command::Edit { id, name, category } => {
            print_json(&ws.edit_document(id, &name, &category).await?)?;
        }
        Command::Delete { id } => ws.delete_document(id).await?,
        Command::View { id } => print_json(&ws.view_document(id).await?)?,
        Command::Download { id, output } => {
            let download = ws.download_document(id).await?;
            let target = output.unwrap_or_else(|| PathBuf::from(&download.name));
            std::fs::write(&target, &download.blob.bytes)
                .with_context(|| format!("failed to write {}", target.display()))?;
            println!("{}", target.display());
        }
        Command::Comment { document, text } => {
            let comment = ws.add_comment(document, &text).await?;
            println!("{}", comment.id);
        }
        Command::Comments { document } => {
            for c in ws.comments_for(document).await? {
                println!(
                    "{}\t{} {}\t{}\t{}",
                    c.id, c.created_date, c.created_time, c.author_name, c.text
                );
            }
        }
        Command::Uncomment { document, comment } => ws.delete_comment(document, comment).await?,
        Command::Categories { id: Some(id) } => print_json(&ws.category_documents(id).await?)?,
        Command::Categories { id: None } => print_json(&ws.list_categories().await)?,
        Command::AddCategory { name, description } => {
            print_json(&ws.add_category(&name, &description).await?)?;
        }
        Command::EditCategory { id, name, description } => {
            print_json(&ws.edit_category(id, &name, &description).await?)?;
        }
        Command::DeleteCategory { id } => ws.delete_category(id).await?,
        Command::Export { path } => {
            let payload = ws.export_backup().await?;
            let json = serde_json::to_string_pretty(&payload)?;
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("{}", path.display());
        }
        Command::Import { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let payload: BackupPayload =
                serde_json::from_str(&raw).context("backup file is not valid")?;
            print_json(&ws.import_backup(&payload).await?)?;
        }
        Command::RemoteDocuments { token } => remote_documents(ws.config(), token).await?,
    }
    Ok(())
}

/// Result of an upload with an optional target category.  The upload stands
/// even when moving it into the category fails.
struct Filed {
    uploaded: UploadResult,
    category: String,
    refile_error: Option<ClientError>,
}

async fn upload_and_file(
    ws: &Workspace,
    file_name: &str,
    blob: Blob,
    category: Option<String>,
) -> Result<Filed, ClientError> {
    let uploaded = ws.upload_document(file_name, blob).await?;
    let mut filed = Filed {
        uploaded,
        category: DEFAULT_CATEGORY.to_string(),
        refile_error: None,
    };

    if let Some(category) = category {
        match ws.edit_document(filed.uploaded.id, &filed.uploaded.name, &category).await {
            Ok(summary) => filed.category = summary.category,
            Err(e) => filed.refile_error = Some(e),
        }
    }
    Ok(filed)
}

async fn remote_documents(config: &ClientConfig, token: Option<String>) -> anyhow::Result<()> {
    let mut client = ApiClient::new(config.api_url.clone());
    client.set_token(token);
    match client.list_documents().await {
        Ok(docs) => print_json(&docs),
        Err(e) => {
            print_notice(&Notice::from_error(&e));
            Err(e.into())
        }
    }
}

/// Read a file and guess its MIME type from the extension.
fn read_file(path: &Path, max_size: usize) -> anyhow::Result<(String, Blob)> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?;
    if meta.len() > max_size as u64 {
        anyhow::bail!(
            "{} is larger than the {} byte limit",
            path.display(),
            max_size
        );
    }

    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("path has no file name")?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok((file_name, Blob::new(mime.essence_str(), bytes)))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn drain(notices: &mut UnboundedReceiver<Notice>) {
    while let Ok(notice) = notices.try_recv() {
        print_notice(&notice);
    }
}

fn print_notice(notice: &Notice) {
    let marker = match notice.variant {
        NoticeVariant::Info => "*",
        NoticeVariant::Destructive => "!",
    };
    let retry = if notice.retryable { " (retry)" } else { "" };
    eprintln!("{marker} {}: {}{retry}", notice.title, notice.description);
}
