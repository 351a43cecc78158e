//! `confsync publish` command implementation.

use std::cell::Cell;
use std::path::PathBuf;

use clap::Args;
use confsync_config::{CliSettings, Config};
use confsync_confluence::publisher::{
    PublishListener, PublishStrategy, Publisher, PublisherMetadata,
};
use confsync_confluence::{ChildPage, ConfluenceClient, RemotePage};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub struct PublishArgs {
    /// Path to configuration file (default: auto-discover confsync.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the publish metadata file written by the renderer.
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Key of the space to publish into.
    #[arg(short, long)]
    space: Option<String>,

    /// ID of the remote page the published tree attaches to.
    #[arg(short, long)]
    ancestor: Option<String>,

    /// Publishing strategy: append-delete-orphans, append-keep-children
    /// or replace-ancestor.
    #[arg(long)]
    strategy: Option<String>,

    /// Version message recorded on created and updated pages.
    #[arg(long)]
    message: Option<String>,
}

impl PublishArgs {
    /// Execute the publish command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or metadata cannot be loaded, or
    /// if the publish itself fails.
    pub fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        // Load config with CLI overrides
        let settings = CliSettings {
            space_key: self.space,
            ancestor_id: self.ancestor,
            strategy: self.strategy,
            version_message: self.message,
            metadata_file: self.metadata,
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        let confluence = config.require_confluence()?;
        let publish = &config.publish_resolved;

        let strategy = match &publish.strategy {
            Some(raw) => raw.parse().map_err(CliError::Validation)?,
            None => PublishStrategy::default(),
        };

        let Some(metadata_file) = &publish.metadata_file else {
            return Err(CliError::Validation(
                "metadata file required (set publish.metadata_file or pass --metadata)".to_owned(),
            ));
        };
        let mut metadata = PublisherMetadata::from_file(metadata_file)?;

        // Config and CLI values take precedence over the renderer's hand-off
        if let Some(space_key) = &publish.space_key {
            metadata.space_key.clone_from(space_key);
        }
        if let Some(ancestor_id) = &publish.ancestor_id {
            metadata.ancestor_id.clone_from(ancestor_id);
        }

        output.info(&format!(
            "Publishing {} root page(s) to space '{}' under ancestor {} ({strategy})",
            metadata.root_pages.len(),
            metadata.space_key,
            metadata.ancestor_id
        ));

        let client = ConfluenceClient::new(
            &confluence.base_url,
            &confluence.username,
            &confluence.api_token,
        );
        let listener = ConsoleListener::new();

        let publisher = Publisher::new(&client, metadata)
            .with_strategy(strategy)
            .with_listener(&listener);
        let publisher = match &publish.version_message {
            Some(message) => publisher.with_version_message(message.as_str()),
            None => publisher,
        };
        publisher.publish()?;

        Ok(())
    }
}

/// Listener that reports each applied change and a final summary.
#[derive(Default)]
struct ConsoleListener {
    output: Output,
    pages_added: Cell<usize>,
    pages_updated: Cell<usize>,
    pages_deleted: Cell<usize>,
    attachments_added: Cell<usize>,
    attachments_updated: Cell<usize>,
    attachments_deleted: Cell<usize>,
}

impl ConsoleListener {
    fn new() -> Self {
        Self::default()
    }

    fn bump(counter: &Cell<usize>) {
        counter.set(counter.get() + 1);
    }

    fn change_count(&self) -> usize {
        self.pages_added.get()
            + self.pages_updated.get()
            + self.pages_deleted.get()
            + self.attachments_added.get()
            + self.attachments_updated.get()
            + self.attachments_deleted.get()
    }
}

impl PublishListener for ConsoleListener {
    fn page_added(&self, page: &RemotePage) {
        Self::bump(&self.pages_added);
        self.output
            .success(&format!("+ Added page '{}' (id={})", page.title, page.id));
    }

    fn page_updated(&self, _existing: &RemotePage, updated: &RemotePage) {
        Self::bump(&self.pages_updated);
        self.output.info(&format!(
            "~ Updated page '{}' to version {}",
            updated.title, updated.version
        ));
    }

    fn page_deleted(&self, page: &ChildPage) {
        Self::bump(&self.pages_deleted);
        self.output
            .warning(&format!("- Deleted page '{}' (id={})", page.title, page.id));
    }

    fn attachment_added(&self, filename: &str, _content_id: &str) {
        Self::bump(&self.attachments_added);
        self.output
            .success(&format!("+ Added attachment '{filename}'"));
    }

    fn attachment_updated(&self, filename: &str, _content_id: &str) {
        Self::bump(&self.attachments_updated);
        self.output
            .info(&format!("~ Updated attachment '{filename}'"));
    }

    fn attachment_deleted(&self, filename: &str, _content_id: &str) {
        Self::bump(&self.attachments_deleted);
        self.output
            .warning(&format!("- Deleted attachment '{filename}'"));
    }

    fn publish_completed(&self) {
        if self.change_count() == 0 {
            self.output
                .success("Publish complete, everything up to date");
            return;
        }
        self.output.success(&format!(
            "Publish complete: {} page(s) added, {} updated, {} deleted; \
             {} attachment(s) added, {} updated, {} deleted",
            self.pages_added.get(),
            self.pages_updated.get(),
            self.pages_deleted.get(),
            self.attachments_added.get(),
            self.attachments_updated.get(),
            self.attachments_deleted.get(),
        ));
    }
}
