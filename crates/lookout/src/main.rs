use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use clap::Parser;
use lookout::client::{HttpTransport, TransportOptions};
use lookout::host::{Gallery, Notifier, Presenter, Severity};
use lookout::http_client::reqwest_client;
use lookout::moderation::{ModerationOptions, Resolution, ScanOrchestrator, ScanOutcome};
use lookout::{ItemId, url::Url};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Lookout - walk a gallery through a moderation server")]
struct Args {
    /// Gallery item ids or links (e.g. https://imgur.com/gallery/abc123)
    #[arg(required = true)]
    items: Vec<String>,

    /// Moderation server base URL
    #[arg(long, default_value = "http://localhost:3030/")]
    server: Url,

    /// Base of the item links sent to the server
    #[arg(long, default_value = "https://imgur.com/gallery/")]
    gallery_base: Url,

    /// Number of upcoming items to prefetch
    #[arg(long, default_value_t = 5)]
    lookahead: usize,

    /// Attempts per item before giving up
    #[arg(long, default_value_t = 3)]
    max_attempts: u32,

    /// Delay between attempts, in milliseconds
    #[arg(long, default_value_t = 500)]
    backoff_ms: u64,

    /// Give up on a single request after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print an error line when an item could not be checked
    #[arg(long)]
    notify_errors: bool,
}

/// Items given on the command line, viewed one after another.
struct Walk {
    items: Vec<ItemId>,
    current: Mutex<Option<usize>>,
}

impl Walk {
    fn current(&self) -> MutexGuard<'_, Option<usize>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn step(&self) {
        let mut current = self.current();
        *current = current
            .map(|index| index + 1)
            .filter(|&index| index < self.items.len());
    }
}

impl Gallery for Walk {
    fn current_index(&self) -> Option<usize> {
        *self.current()
    }

    fn item_at(&self, index: usize) -> Option<ItemId> {
        self.items.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Prints presentation decisions and follows skip requests.
struct Terminal {
    walk: Arc<Walk>,
}

impl Presenter for Terminal {
    fn mark_unrecoverable(&self, element_id: &str) {
        println!("    hide image {element_id}");
    }

    fn replace_element(&self, element_id: &str, replacement: &str) {
        println!("    replace image {element_id} with {replacement:?}");
    }

    fn advance_to_next_item(&self) {
        self.walk.step();
    }
}

impl Notifier for Terminal {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => println!("    {message}"),
            Severity::Error => eprintln!("    error: {message}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(EnvFilter::from_env("LOOKOUT_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let items = args
        .items
        .iter()
        .map(|raw| match raw.parse::<Url>() {
            Ok(_) => ItemId::from_link(raw),
            Err(_) => ItemId::new(raw),
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let walk = Arc::new(Walk {
        items,
        current: Mutex::new(Some(0)),
    });
    let terminal = Arc::new(Terminal { walk: walk.clone() });

    let client = reqwest_client(args.timeout_ms.map(Duration::from_millis)).into_diagnostic()?;
    let transport = HttpTransport::new(
        client,
        TransportOptions::new()
            .endpoint(args.server)
            .gallery_base(args.gallery_base)
            .build(),
    );
    let options = ModerationOptions::new()
        .lookahead(args.lookahead)
        .max_attempts(args.max_attempts)
        .retry_backoff(Duration::from_millis(args.backoff_ms))
        .debounce(Duration::ZERO)
        .notify_errors(args.notify_errors)
        .build();
    tracing::info!(?options, "starting gallery walk");

    let session = ScanOrchestrator::new(transport, walk.clone(), terminal.clone(), terminal, options);

    while let Some((index, item)) = walk.current_item() {
        println!("[{}/{}] {item}", index + 1, walk.len());
        let outcome = session.on_navigation_change().await;
        match outcome {
            ScanOutcome::Resolved(Resolution::Skipped) => continue,
            ScanOutcome::Resolved(Resolution::Marked { count: 0 }) => println!("    clean"),
            ScanOutcome::Resolved(Resolution::Marked { .. }) => {}
            ScanOutcome::Resolved(Resolution::Exhausted { attempts }) => {
                println!("    unchecked after {attempts} attempts")
            }
            ScanOutcome::Resolved(Resolution::Stale) | ScanOutcome::Superseded => {}
        }
        walk.step();
    }

    println!("checked {} items, {} verdicts cached", walk.len(), session.cache().len());
    Ok(())
}
