//! mmchat CLI
//!
//! Terminal chat page for the multi-model chat backend:
//! - Create a conversation or a room and chat in it
//! - Open an existing conversation/room page by path
//! - Resume the last created room
//! - Generate a default config file

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use mmchat::client::{ApiClient, PathNavigator, WsConnector};
use mmchat::config::{generate_default_config, Config};
use mmchat::create::CreateRequest;
use mmchat::logging::init_logging;
use mmchat::protocol::{ChatMode, RoomDescriptor};
use mmchat::render::{Renderer, TerminalRenderer};
use mmchat::route::PageRoute;
use mmchat::session::{PageState, SendOutcome, Session, SocketHandle};
use mmchat::store::{ClientStore, FileStore};

#[derive(Parser)]
#[command(name = "mmchat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat with one model, or compare two side by side")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Chat backend URL (overrides config)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Config file (default: ~/.config/mmchat/config.toml or ./mmchat.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a conversation, or a room with --mode, and open it
    New {
        /// Room mode: sm (single model) or cm (comparison)
        #[arg(short, long)]
        mode: Option<ChatMode>,
    },

    /// Open a page, e.g. /conversation/{id} or /room/cm/{room_id}
    Open {
        /// Page path or full page URL
        target: String,
    },

    /// Reopen the last created conversation or room
    Resume,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(server) = cli.server {
        config.server.http_url = server;
        config.server.ws_url = None;
    }

    init_logging(&config.logging);

    match cli.command {
        Commands::New { mode } => {
            let request = match mode {
                Some(mode) => CreateRequest::Room(mode),
                None => CreateRequest::Conversation,
            };

            let api = ApiClient::new(
                config.server.endpoints(),
                Duration::from_secs(config.server.request_timeout_secs),
            )?;
            let mut store = FileStore::new(&config.client.state_file);
            let mut navigator = PathNavigator::new();

            let route = api
                .create(request, &mut store, &mut navigator)
                .await
                .with_context(|| format!("cannot create on {}", config.server.http_url))?;

            if let Some(path) = navigator.location() {
                println!("Created {}", path);
            }
            run_page(route, &config).await?;
        }

        Commands::Open { target } => {
            let route = PageRoute::parse(&page_path(&target));
            if !route.is_bound() {
                bail!("{} is not a conversation or room page", target);
            }
            run_page(route, &config).await?;
        }

        Commands::Resume => {
            let store = FileStore::new(&config.client.state_file);
            let descriptor = store
                .load()?
                .with_context(|| format!("nothing to resume in {:?}", store.path()))?;

            run_page(resume_route(&descriptor), &config).await?;
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

/// Bind a page and pump stdin and socket events into its session until
/// stdin closes.
async fn run_page(route: PageRoute, config: &Config) -> anyhow::Result<()> {
    let endpoints = config.server.endpoints();
    let store = FileStore::new(&config.client.state_file);
    let (mut connector, mut events) = WsConnector::new();
    let mut renderer = TerminalRenderer::new(std::io::stdout());

    let mut session = Session::bind(route, &endpoints, &store, &mut connector, &mut renderer);
    if session.state() != PageState::Bound {
        bail!("page could not be bound");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        handle_line(&mut session, &line, &mut renderer);
                    }
                    None => break,
                }
            }
            event = events.recv() => {
                match event {
                    Some(event) => event.dispatch(&mut session, &mut renderer),
                    None => break,
                }
            }
        }
    }

    tracing::info!("Leaving page");
    Ok(())
}

/// Send one line of stdin as typed, minus its line terminator.
///
/// The outcome is logged by the session.
fn handle_line<S, R>(session: &mut Session<S>, line: &str, renderer: &mut R) -> SendOutcome
where
    S: SocketHandle,
    R: Renderer + ?Sized,
{
    session.send(line, renderer)
}

/// Accept either a bare path or a full page URL
fn page_path(target: &str) -> String {
    match reqwest::Url::parse(target) {
        Ok(url) => url.path().to_string(),
        Err(_) => target.to_string(),
    }
}

/// Page a stored descriptor belongs to
fn resume_route(descriptor: &RoomDescriptor) -> PageRoute {
    let mode = match descriptor.conversations().len() {
        0 => {
            return PageRoute::Conversation {
                id: descriptor.id().to_string(),
            }
        }
        1 => ChatMode::Single,
        _ => ChatMode::Comparison,
    };

    PageRoute::Room {
        mode,
        room_id: descriptor.id().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmchat::error::ChatResult;
    use mmchat::protocol::{Endpoints, Role};
    use mmchat::render::MemoryRenderer;
    use mmchat::session::Connector;
    use mmchat::store::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct RecordingSocket {
        sent: Rc<RefCell<Vec<String>>>,
    }

    impl SocketHandle for RecordingSocket {
        fn is_open(&self) -> bool {
            true
        }

        fn send_text(&self, text: &str) -> ChatResult<()> {
            self.sent.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    struct RecordingConnector(RecordingSocket);

    impl Connector for RecordingConnector {
        type Socket = RecordingSocket;

        fn connect(&mut self, _url: &str, _conversation_id: &str) -> ChatResult<RecordingSocket> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_lines_are_sent_as_typed() {
        let socket = RecordingSocket::default();
        let mut connector = RecordingConnector(socket.clone());
        let mut renderer = MemoryRenderer::new();
        let mut session = Session::bind(
            PageRoute::parse("/conversation/abc123"),
            &Endpoints::default(),
            &MemoryStore::new(),
            &mut connector,
            &mut renderer,
        );

        for line in ["   ", "trailing  ", "\tindented"] {
            assert!(handle_line(&mut session, line, &mut renderer).is_sent());
        }
        assert!(!handle_line(&mut session, "", &mut renderer).is_sent());

        assert_eq!(
            *socket.sent.borrow(),
            vec!["   ".to_string(), "trailing  ".to_string(), "\tindented".to_string()]
        );
        assert_eq!(renderer.count(Role::User), 3);
    }

    #[test]
    fn test_page_path_accepts_urls() {
        assert_eq!(page_path("http://localhost:8000/room/cm/r1"), "/room/cm/r1");
        assert_eq!(page_path("/conversation/abc"), "/conversation/abc");
    }
}
