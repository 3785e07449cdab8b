use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use posts_client::listing::PostItem;
use posts_client::{ClientConfig, Confirm, CreatePostForm, DeleteOutcome, ListingView, Post};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

mod logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL of the remote post collection, e.g. https://host/api/posts
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// JSON config file with an `apiBaseUrl` entry
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all posts, newest first
    List,

    /// Publish a new post
    Create {
        #[arg(short, long)]
        author: String,

        #[arg(short, long)]
        content: String,

        #[arg(short, long)]
        image_url: Option<String>,
    },

    /// Change the author, content or image of a post
    Edit {
        #[arg(long)]
        id: i64,

        #[arg(short, long)]
        author: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(short, long, conflicts_with = "clear_image")]
        image_url: Option<String>,

        #[arg(long)]
        clear_image: bool,
    },

    /// Delete a post after confirmation
    Delete {
        #[arg(long)]
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        }
    }
}

struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(url) = cli.api_base_url {
        config = config
            .with_api_base_url(url)
            .context("Invalid --api-base-url")?;
    }

    let store = posts_client::connect(&config);

    match cli.command {
        Commands::List => {
            let view = ListingView::open(store);
            if let Err(e) = view.refresh().await {
                fail(&e.to_string());
            }
            print_listing(&view).await;
        }

        Commands::Create {
            author,
            content,
            image_url,
        } => {
            println!("📝 Creating new post...");

            let mut form = CreatePostForm::new(store);
            form.author = author;
            form.content = content;
            form.image_url = image_url.unwrap_or_default();

            match form.submit().await {
                Ok(post) => {
                    println!("✅ Post created successfully!");
                    print_post(&post);
                }
                Err(e) => fail(&e.to_string()),
            }
        }

        Commands::Edit {
            id,
            author,
            content,
            image_url,
            clear_image,
        } => {
            println!("✏️ Editing post #{}", id);

            let view = ListingView::open(store);
            if let Err(e) = view.refresh().await {
                fail(&e.to_string());
            }

            let Some(mut session) = view.begin_edit(id).await else {
                fail(&format!("Post #{} not found", id));
            };

            if let Some(author) = author {
                session.author = author;
            }
            if let Some(content) = content {
                session.content = content;
            }
            if let Some(image_url) = image_url {
                session.image_url = image_url;
            }
            if clear_image {
                session.image_url.clear();
            }

            match session.submit().await {
                Ok(post) => {
                    println!("✅ Post updated successfully!");
                    print_post(&post);
                }
                Err(failed) => {
                    if failed.error.is_not_found() {
                        fail(&format!("Post #{} no longer exists", id));
                    }
                    fail(&failed.error.to_string());
                }
            }
        }

        Commands::Delete { id, yes } => {
            println!("🗑️ Deleting post #{}", id);

            let view = ListingView::open(store);
            let outcome = if yes {
                view.delete(id, &AlwaysConfirm).await
            } else {
                view.delete(id, &StdinConfirm).await
            };

            match outcome {
                Ok(DeleteOutcome::Deleted) => println!("✅ Post deleted successfully!"),
                Ok(DeleteOutcome::Declined) => println!("Cancelled, nothing was deleted"),
                Err(e) if e.is_not_found() => fail(&format!("Post #{} not found", id)),
                Err(e) => fail(&e.to_string()),
            }
        }
    }

    Ok(())
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "❌".red(), message.red());
    std::process::exit(1);
}

async fn print_listing(view: &ListingView) {
    let listing = view.render().await;

    println!("📋 {}", "Recent posts".bold());
    println!();

    if let Some(status) = listing.status() {
        println!("   {}", status);
    }
    if let Some(error) = &listing.error {
        eprintln!("{}", error.red());
    }

    for item in &listing.items {
        print_item(item);
    }
}

fn print_item(item: &PostItem) {
    println!(
        "   [{}] {}  {}",
        item.id,
        item.author.bold(),
        item.created.dimmed()
    );
    for line in item.content.lines() {
        println!("      {}", line);
    }
    if let Some(url) = &item.image_url {
        println!("      🖼  {}", url.cyan());
    }
    if let Some(modified) = &item.modified {
        println!("      {}", format!("Modified: {}", modified).dimmed());
    }
    println!();
}

fn print_post(post: &Post) {
    print_item(&PostItem::from(post));
}
