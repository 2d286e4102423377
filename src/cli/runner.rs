//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, load_profile, ClientConfig};
use crate::error::{Result, ResultExt};
use crate::listing::CommentForest;
use crate::models::{Kind, Post};
use crate::reddit::Reddit;
use futures::StreamExt;
use serde::Serialize;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

/// Output document of the `comments` command
#[derive(Serialize)]
struct Thread<'a> {
    post: &'a Post,
    comments: &'a CommentForest,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let reddit = Reddit::from_config(&self.load_config()?)?;

        match &self.cli.command {
            Commands::List {
                endpoint,
                limit,
                kinds,
            } => self.list(&reddit, endpoint, *limit, kinds).await,
            Commands::Stream {
                endpoint,
                skip_existing,
                max_items,
            } => {
                self.stream(&reddit, endpoint, *skip_existing, *max_items)
                    .await
            }
            Commands::Comments { id, expand } => self.comments(&reddit, id, *expand).await,
            Commands::Me => self.output(&reddit.me().await?),
        }
    }

    fn load_config(&self) -> Result<ClientConfig> {
        let path = &self.cli.config;
        let loaded = match &self.cli.profile {
            Some(profile) => load_profile(path, profile),
            None => load_config(path),
        };
        loaded.with_context(|| format!("Failed to load {}", path.display()))
    }

    async fn list(
        &self,
        reddit: &Reddit,
        endpoint: &str,
        limit: Option<usize>,
        kinds: &[String],
    ) -> Result<()> {
        let mut generator = reddit.listing(endpoint).limit(limit);
        if !kinds.is_empty() {
            generator = generator.kind_filter(kinds.iter().map(|k| Kind::from_tag(k)).collect());
        }

        let mut stream = generator.into_stream();
        let mut count = 0usize;
        while let Some(item) = stream.next().await {
            self.output(&item?)?;
            count += 1;
        }
        info!(endpoint, count, "listing finished");
        Ok(())
    }

    async fn stream(
        &self,
        reddit: &Reddit,
        endpoint: &str,
        skip_existing: bool,
        max_items: Option<usize>,
    ) -> Result<()> {
        if max_items == Some(0) {
            return Ok(());
        }

        let mut stream = reddit.stream(endpoint, skip_existing);
        let mut count = 0usize;
        while let Some(item) = stream.next().await {
            self.output(&item?)?;
            count += 1;
            if max_items.is_some_and(|max| count >= max) {
                break;
            }
        }
        info!(endpoint, count, "stream stopped");
        Ok(())
    }

    async fn comments(&self, reddit: &Reddit, id: &str, expand: bool) -> Result<()> {
        let (post, mut forest) = reddit.submission(id).await?;
        if expand {
            reddit.expander().expand(&mut forest).await?;
        }
        info!(
            id,
            comments = forest.flatten().len(),
            placeholders = forest.placeholder_count(),
            "fetched comment tree"
        );
        self.output(&Thread {
            post: &post,
            comments: &forest,
        })
    }

    /// Print one document in the selected format
    fn output(&self, value: &impl Serialize) -> Result<()> {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{line}");
        Ok(())
    }
}
