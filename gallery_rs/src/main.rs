use clap::{Parser, Subcommand};
use gallery_core::{
    Event, EventGallery, FanOutPaginator, FeedConfig, FeedStep, LoadOutcome, OrgFeed,
    Organization, PaginatorConfig, Viewer, search_filter,
};
use gallery_rs::{
    ApiMode, ClientConfig, EventPages, GalleryClient, GalleryError, HttpEventGallery,
    OrganizationPages,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "gallery", version, about = "Browse organizations, events and photos")]
struct Cli {
    /// Deployment to talk to when --base-url is not given [env: GALLERY_API_MODE].
    #[arg(long, global = true, value_enum)]
    mode: Option<ApiMode>,

    /// [env: GALLERY_API_BASE_URL]
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Session token sent as a bearer credential [env: GALLERY_API_TOKEN].
    #[arg(long, global = true)]
    token: Option<String>,

    /// [env: GALLERY_USER_ID]
    #[arg(long, global = true)]
    user_id: Option<String>,

    /// [env: GALLERY_API_TIMEOUT_MS]
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List organizations.
    Orgs {
        #[arg(long, default_value = "")]
        search: String,

        /// Number of "load more" steps to take after the first page.
        #[arg(long, default_value_t = 0)]
        pages: usize,

        /// Keep running and re-fetch on the feed refresh interval.
        #[arg(long)]
        watch: bool,
    },

    /// List public events across all organizations.
    Events {
        #[arg(long, default_value = "")]
        search: String,

        /// Number of batches to load, including the first.
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Include members-only events; needs a token.
        #[arg(long)]
        private: bool,
    },

    /// Show the photos of one event and what the viewer may do there.
    Photos {
        #[arg(long)]
        org: String,
        #[arg(long)]
        event: String,
        #[arg(long, default_value = "")]
        search: String,
    },

    /// Attend an event as the configured user.
    Attend {
        #[arg(long)]
        org: String,
        #[arg(long)]
        event: String,
    },

    /// Flip an event between public and private.
    TogglePublicity {
        #[arg(long)]
        org: String,
        #[arg(long)]
        event: String,
    },
}

impl Cli {
    /// Environment configuration with command-line flags taking precedence.
    fn client_config(&self) -> Result<ClientConfig, GalleryError> {
        let mut cfg = ClientConfig::from_env()?;
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(url) = &self.base_url {
            cfg.base_url = Some(url.clone());
        }
        if let Some(token) = &self.token {
            cfg.token = Some(token.clone());
        }
        if let Some(user_id) = &self.user_id {
            cfg.user_id = Some(user_id.clone());
        }
        if let Some(ms) = self.timeout_ms {
            cfg.timeout = Duration::from_millis(ms);
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn viewer(cfg: &ClientConfig) -> Option<Viewer> {
    cfg.user_id.as_ref().map(|user_id| Viewer {
        user_id: user_id.clone(),
        signed_in: cfg.token.is_some(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gallery_core::o11y::init_global_from_env()?;
    let cli = Cli::parse();
    let cfg = cli.client_config()?;
    let client = GalleryClient::from_config(&cfg)?;
    tracing::debug!(base_url = client.base_url(), "client configured");

    match &cli.cmd {
        Command::Orgs {
            search,
            pages,
            watch,
        } => {
            let mut feed: OrgFeed<Organization> = OrgFeed::new(
                Arc::new(OrganizationPages::new(client)),
                FeedConfig::from_env()?,
            );
            feed.set_search_term(search.clone());
            feed.load_initial().await?;
            for _ in 0..*pages {
                if feed.load_more().await? == FeedStep::Idle {
                    break;
                }
            }
            print_orgs(&feed);

            if *watch {
                let mut ticker = tokio::time::interval(feed.refresh_interval());
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    if let Err(err) = feed.refresh().await {
                        tracing::warn!(error = %err, "feed refresh failed");
                        continue;
                    }
                    print_orgs(&feed);
                }
            }
        }
        Command::Events {
            search,
            pages,
            private,
        } => {
            let mut events = EventPages::new(client.clone());
            if *private {
                if !client.has_token() {
                    anyhow::bail!("--private needs a token");
                }
                events = events.including_private();
            }
            let paginator: FanOutPaginator<Organization, Event> = FanOutPaginator::new(
                Arc::new(OrganizationPages::new(client)),
                Arc::new(events),
            )
            .with_config(PaginatorConfig::from_env()?);

            let mut outcome = paginator.load_initial().await;
            for _ in 1..*pages {
                if !matches!(outcome, LoadOutcome::Loaded(_)) {
                    break;
                }
                outcome = paginator.load_more().await;
            }
            if let Some(message) = paginator.last_error().await {
                anyhow::bail!(message);
            }

            for event in search_filter(search, &paginator.items().await) {
                println!("{}\t{}", event.id, event.title);
            }
            println!(
                "-- state: {}, more: {}",
                paginator.state().await,
                paginator.has_more().await
            );
        }
        Command::Photos { org, event, search } => {
            let mut page = event_page(&cfg, client, org, event);
            page.load().await?;
            if let Some(details) = page.event() {
                println!("# {}", details.title);
            }
            for photo in page.photos(search) {
                println!(
                    "{}\t{}\t{}",
                    photo.id,
                    photo.title().unwrap_or("-"),
                    photo.url.as_deref().unwrap_or("-")
                );
            }
            let a = page.affordances();
            println!(
                "-- upload: {}, attend: {}, toggle publicity: {}",
                a.can_upload, a.can_attend, a.can_toggle_publicity
            );
            if let Some(public) = a.publicity_badge {
                println!("-- {}", if public { "public" } else { "private" });
            }
            if let Some(message) = page.error() {
                eprintln!("{message}");
            }
        }
        Command::Attend { org, event } => {
            let mut page = event_page(&cfg, client, org, event);
            page.load().await?;
            if !page.affordances().can_attend {
                anyhow::bail!("not allowed to attend {org}/{event}");
            }
            page.attend().await?;
            println!("attending {org}/{event}");
        }
        Command::TogglePublicity { org, event } => {
            let mut page = event_page(&cfg, client, org, event);
            page.load().await?;
            if !page.affordances().can_toggle_publicity {
                anyhow::bail!("not allowed to change publicity of {org}/{event}");
            }
            page.toggle_publicity().await?;
            let public = page.publicity().unwrap_or(false);
            println!(
                "{org}/{event} is now {}",
                if public { "public" } else { "private" }
            );
        }
    }

    Ok(())
}

fn event_page(cfg: &ClientConfig, client: GalleryClient, org: &str, event: &str) -> EventGallery {
    EventGallery::new(
        Arc::new(HttpEventGallery::new(client)),
        org,
        event,
        viewer(cfg),
    )
}

fn print_orgs(feed: &OrgFeed<Organization>) {
    for org in feed.visible() {
        println!(
            "{}\t{}",
            org.name,
            org.description.as_deref().unwrap_or("")
        );
    }
    if feed.can_load_more() {
        println!("-- more available");
    }
}
