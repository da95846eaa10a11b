use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use marknote_note::{mime, NoteId};
use marknote_project::{load_tree, TreeNode};
use marknote_session::{SessionController, SessionEvent};

#[derive(Parser)]
#[command(
    name = "marknote-cli",
    about = "Headless utility commands for the Marknote session core",
    author,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列印資料夾的專案樹。 / Print the project tree for a folder.
    Tree(TreeArgs),
    /// 依副檔名推斷路徑的 mime 類型。 / Resolve the mime type for paths.
    Mime(MimeArgs),
    /// 重播開啟/關閉操作並列印工作階段事件。 / Replay open/close operations and print session events.
    Session(SessionArgs),
}

#[derive(Args)]
struct TreeArgs {
    /// 專案根目錄。 / Project root folder.
    path: PathBuf,
    /// 以 JSON 輸出。 / Emit the tree as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct MimeArgs {
    /// 要推斷的路徑。 / Paths to resolve.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[derive(Args)]
struct SessionArgs {
    /// 專案根目錄。 / Project root folder.
    root: PathBuf,
    /// 依序開啟的檔案。 / Files to open, in order.
    #[arg(long = "open", value_name = "PATH")]
    open: Vec<PathBuf>,
    /// 開啟後依序關閉的檔案。 / Files to close afterwards, in order.
    #[arg(long = "close", value_name = "PATH")]
    close: Vec<PathBuf>,
    /// 建立的未命名筆記數量。 / Number of untitled notes to create.
    #[arg(long = "new-notes", default_value_t = 0)]
    new_notes: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Tree(args) => run_tree(args),
        Commands::Mime(args) => run_mime(args),
        Commands::Session(args) => run_session(args),
    }
}

fn run_tree(args: TreeArgs) -> Result<()> {
    let tree = load_tree(&args.path)
        .with_context(|| format!("failed to enumerate {}", args.path.display()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print_node(&tree, 0);
        println!("{} nodes", tree.node_count());
    }
    Ok(())
}

fn print_node(node: &TreeNode, depth: usize) {
    let indent = "  ".repeat(depth);
    if node.is_folder() {
        println!("{indent}{}/", node.name);
    } else {
        println!("{indent}{} ({} bytes)", node.name, node.stats.len);
    }
    for child in &node.children {
        print_node(child, depth + 1);
    }
}

fn run_mime(args: MimeArgs) -> Result<()> {
    for path in &args.paths {
        println!("{}\t{}", path.display(), mime::for_path(path));
    }
    Ok(())
}

fn run_session(args: SessionArgs) -> Result<()> {
    let session = SessionController::new();
    let _events = session.subscribe(|event| println!("event: {}", describe(event)));

    session
        .open_project(&args.root)
        .with_context(|| format!("failed to open project {}", args.root.display()))?;

    for path in &args.open {
        session.open(NoteId::file(path));
    }
    for _ in 0..args.new_notes {
        session.new_note();
    }
    for path in &args.close {
        session.close(NoteId::file(path));
    }

    println!("open order:");
    for (index, note) in session.open_notes().iter().enumerate() {
        let marker = if session.active_id().as_ref() == Some(note.id()) {
            "*"
        } else {
            " "
        };
        println!("  {marker} {index}: {} <{}>", note.display_name(), note.id());
    }
    if session.open_count() == 0 {
        println!("  (empty)");
    }
    Ok(())
}

fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Reset => "reset".into(),
        SessionEvent::ProjectChange => "projectChange".into(),
        SessionEvent::OpenNote { note, index } => {
            format!("openNote {} index={index}", note.id())
        }
        SessionEvent::ActiveNote { note, index } => match (note, index) {
            (Some(note), Some(index)) => format!("activeNote {} index={index}", note.id()),
            (Some(note), None) => format!("activeNote {}", note.id()),
            _ => "activeNote none".into(),
        },
        SessionEvent::CloseNote { note, index } => {
            format!("closeNote {} index={index}", note.id())
        }
        SessionEvent::Note { note, event } => {
            format!("noteEvent {event:?} {}", note.id())
        }
    }
}
