//! Knowledge-base browsing commands.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};

use crate::commands;
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct LearnCommand {
    #[command(subcommand)]
    pub command: LearnSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum LearnSubcommand {
    /// List content categories
    Categories,

    /// List sections in a category
    Sections(SectionsArgs),

    /// List articles in a category or section
    Articles(ArticlesArgs),

    /// Show a full article
    Article(ArticleArgs),

    /// List bookmarked articles
    Bookmarks,

    /// Bookmark an article
    Bookmark(BookmarkArgs),

    /// Remove a bookmark
    Unbookmark(UnbookmarkArgs),
}

#[derive(Args, Debug)]
pub struct SectionsArgs {
    /// Category slug
    #[arg(long)]
    pub category: String,
}

#[derive(Args, Debug)]
pub struct ArticlesArgs {
    /// Category slug
    #[arg(long, conflicts_with = "section")]
    pub category: Option<String>,

    /// Section ID
    #[arg(long)]
    pub section: Option<String>,
}

#[derive(Args, Debug)]
pub struct ArticleArgs {
    /// Article ID
    #[arg(long)]
    pub id: String,
}

#[derive(Args, Debug)]
pub struct BookmarkArgs {
    /// Article ID to bookmark
    #[arg(long)]
    pub article_id: String,
}

#[derive(Args, Debug)]
pub struct UnbookmarkArgs {
    /// Bookmark ID to remove
    #[arg(long)]
    pub bookmark_id: String,
}

pub async fn handle(cmd: LearnCommand) -> Result<()> {
    match cmd.command {
        LearnSubcommand::Categories => categories().await,
        LearnSubcommand::Sections(args) => sections(args).await,
        LearnSubcommand::Articles(args) => articles(args).await,
        LearnSubcommand::Article(args) => article(args).await,
        LearnSubcommand::Bookmarks => bookmarks().await,
        LearnSubcommand::Bookmark(args) => bookmark(args).await,
        LearnSubcommand::Unbookmark(args) => unbookmark(args).await,
    }
}

async fn categories() -> Result<()> {
    let config = Config::load()?;
    let client = commands::client(&config)?;

    let categories = client
        .list_categories()
        .await
        .context("Failed to fetch categories")?;

    for category in &categories {
        output::heading(&format!("{} ({})", category.name, category.slug));
        if !category.description.is_empty() {
            println!("  {}", category.description);
        }
    }

    Ok(())
}

async fn sections(args: SectionsArgs) -> Result<()> {
    let config = Config::load()?;
    let client = commands::client(&config)?;

    let sections = client
        .list_category_sections(&args.category)
        .await
        .context("Failed to fetch sections")?;

    if sections.is_empty() {
        output::warn("No sections in this category");
        return Ok(());
    }

    for section in &sections {
        output::heading(&format!("{} ({})", section.name, section.id));
        if !section.description.is_empty() {
            println!("  {}", section.description);
        }
    }

    Ok(())
}

async fn articles(args: ArticlesArgs) -> Result<()> {
    let config = Config::load()?;
    let client = commands::client(&config)?;

    let articles = match (&args.category, &args.section) {
        (Some(category), None) => client
            .list_category_articles(category)
            .await
            .context("Failed to fetch articles")?,
        (None, Some(section)) => client
            .list_section_articles(section)
            .await
            .context("Failed to fetch articles")?,
        _ => bail!("Provide either --category or --section"),
    };

    if articles.is_empty() {
        output::warn("No articles found");
        return Ok(());
    }

    for article in &articles {
        output::heading(&format!("{} ({})", article.title, article.id));
        if !article.summary.is_empty() {
            println!("  {}", article.summary);
        }
        if article.read_time > 0 {
            println!("  {} min read", article.read_time);
        }
    }

    Ok(())
}

async fn article(args: ArticleArgs) -> Result<()> {
    let config = Config::load()?;
    let client = commands::client(&config)?;

    let article = client
        .get_article(&args.id)
        .await
        .context("Failed to fetch article")?;

    output::heading(&article.title);
    if !article.author.is_empty() {
        output::field("Author", &article.author);
    }
    if article.read_time > 0 {
        output::field("Read time", &format!("{} min", article.read_time));
    }
    if !article.tags.is_empty() {
        output::field("Tags", &article.tags);
    }
    println!();
    println!("{}", article.content);

    Ok(())
}

async fn bookmarks() -> Result<()> {
    let mut config = Config::load()?;
    let client = commands::authenticated_client(&config)?;

    let bookmarks = client
        .list_bookmarks()
        .await
        .context("Failed to fetch bookmarks")?;
    commands::persist_session(&mut config, &client)?;

    if bookmarks.is_empty() {
        output::warn("No bookmarks yet");
        return Ok(());
    }

    for bookmark in &bookmarks {
        output::heading(&format!("{} ({})", bookmark.article.title, bookmark.id));
        if !bookmark.article.summary.is_empty() {
            println!("  {}", bookmark.article.summary);
        }
    }

    Ok(())
}

async fn bookmark(args: BookmarkArgs) -> Result<()> {
    let mut config = Config::load()?;
    let client = commands::authenticated_client(&config)?;

    let bookmark = client
        .create_bookmark(&args.article_id)
        .await
        .context("Failed to create bookmark")?;
    commands::persist_session(&mut config, &client)?;

    output::success(&format!("Bookmarked \"{}\"", bookmark.article.title));
    Ok(())
}

async fn unbookmark(args: UnbookmarkArgs) -> Result<()> {
    let mut config = Config::load()?;
    let client = commands::authenticated_client(&config)?;

    client
        .delete_bookmark(&args.bookmark_id)
        .await
        .context("Failed to remove bookmark")?;
    commands::persist_session(&mut config, &client)?;

    output::success("Bookmark removed");
    Ok(())
}
