use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use prettytable::{Cell, Row, Table};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use newslens::article::{Article, RawArticle};
use newslens::entity::{CapitalizedEntityTagger, OllamaEntityTagger};
use newslens::environment::{Backend, Config};
use newslens::llm::LlmParams;
use newslens::news::{GoogleNewsSource, Period};
use newslens::sentiment::{LexiconSentimentModel, OllamaSentimentModel, SentimentLabel};
use newslens::summary::{LeadSummarizer, OllamaSummarizer};
use newslens::text::StopWords;
use newslens::topic::KeywordTopicModel;
use newslens::{AnalysisEngine, AnalysisReport, ModelSet, RunOutcome, TARGET_ENGINE};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (git ",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ", ",
    env!("RUST_VERSION"),
    ")"
);

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
#[clap(
    name = "newslens",
    version,
    long_version = LONG_VERSION,
    about = "Sentiment, entity, topic and relation analysis over a batch of news articles"
)]
struct Cli {
    /// Search query sent to Google News
    #[clap(short, long, required_unless_present = "input")]
    query: Option<String>,

    /// How far back to search: 1d, 7d, 1m or 3m
    #[clap(short, long, default_value = "7d")]
    period: Period,

    /// Maximum number of articles to fetch
    #[clap(short, long, default_value = "10")]
    max_results: usize,

    /// Analyze a JSON array of article records instead of fetching
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// Output format
    #[clap(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Also print each article's summary and entities (table output)
    #[clap(short, long)]
    details: bool,
}

fn build_models(config: &Config) -> ModelSet {
    let topics = Arc::new(KeywordTopicModel::new(
        0.1,
        2,
        StopWords::with_extra(&config.engine.extra_stopwords),
    ));

    match config.backend {
        Backend::Lexicon => ModelSet::new(
            Arc::new(LexiconSentimentModel::new()),
            Arc::new(CapitalizedEntityTagger::new()),
            topics,
        )
        .with_summarizer(Arc::new(LeadSummarizer::new(config.summary_max_words))),
        Backend::Ollama => {
            let params = LlmParams::new(
                &config.ollama_host,
                config.ollama_port,
                &config.ollama_model,
                config.temperature,
            );
            ModelSet::new(
                Arc::new(OllamaSentimentModel::new(params.clone())),
                Arc::new(OllamaEntityTagger::new(params.clone())),
                topics,
            )
            .with_summarizer(Arc::new(OllamaSummarizer::new(params)))
        }
    }
}

fn load_articles(path: &PathBuf) -> Result<Vec<RawArticle>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of articles", path.display()))
}

fn header(title: &str) {
    println!("\n{}", title.bold().bright_blue());
}

fn label_cell(label: SentimentLabel) -> Cell {
    let style = match label {
        SentimentLabel::Positive => "Fg",
        SentimentLabel::Neutral => "Fy",
        SentimentLabel::Negative => "Fr",
    };
    Cell::new(label.as_str()).style_spec(style)
}

/// Articles as JSON, each with its entity-highlighted HTML attached.
fn articles_json(articles: &[Article]) -> Result<Vec<serde_json::Value>> {
    articles
        .iter()
        .map(|article| -> Result<serde_json::Value> {
            let mut value = serde_json::to_value(article)?;
            if let serde_json::Value::Object(fields) = &mut value {
                fields.insert(
                    "highlighted".to_string(),
                    serde_json::Value::String(article.highlighted_html()),
                );
            }
            Ok(value)
        })
        .collect()
}

fn print_details(articles: &[Article]) {
    header("Article details");
    for (i, article) in articles.iter().enumerate() {
        let label = article.sentiment.map(|s| s.label).unwrap_or(SentimentLabel::Neutral);
        let label = match label {
            SentimentLabel::Positive => label.as_str().green(),
            SentimentLabel::Neutral => label.as_str().yellow(),
            SentimentLabel::Negative => label.as_str().red(),
        };
        println!(
            "\n{} {} ({}, {:+.2})",
            format!("{}.", i + 1).bold(),
            article.title.bold(),
            label,
            article.signed_score()
        );
        println!("  {} {}", "Summary:".bold(), article.summary.as_deref().unwrap_or("-"));
        if !article.entities.is_empty() {
            let entities: Vec<String> = article
                .entities
                .iter()
                .map(|e| format!("{} [{}]", e.text, e.entity_type))
                .collect();
            println!("  {} {}", "Entities:".bold(), entities.join(", "));
        }
        println!(
            "  {} {} (id {})",
            "Topic:".bold(),
            article.topic_name.as_deref().unwrap_or("-"),
            article.topic_id
        );
        println!("  {} {} | {}", "Source:".bold(), article.publisher, article.url.dimmed());
    }
}

fn print_report(report: &AnalysisReport, articles: &[Article]) {
    header("Articles");
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Published"),
        Cell::new("Publisher"),
        Cell::new("Title"),
        Cell::new("Sentiment"),
        Cell::new("Score"),
        Cell::new("Topic"),
    ]));
    for article in articles {
        let published = article
            .published_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let title: String = article.title.chars().take(60).collect();
        let label = article.sentiment.map(|s| s.label).unwrap_or(SentimentLabel::Neutral);
        table.add_row(Row::new(vec![
            Cell::new(&published),
            Cell::new(&article.publisher),
            Cell::new(&title),
            label_cell(label),
            Cell::new(&format!("{:+.2}", article.signed_score())),
            Cell::new(article.topic_name.as_deref().unwrap_or("-")),
        ]));
    }
    table.printstd();

    header("Sentiment composition");
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Label"),
        Cell::new("Count"),
        Cell::new("Percentage"),
    ]));
    for row in &report.composition {
        table.add_row(Row::new(vec![
            label_cell(row.label),
            Cell::new(&row.count.to_string()),
            Cell::new(&format!("{:.1}%", row.percentage)),
        ]));
    }
    table.printstd();

    header("Sentiment trend");
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Date"),
        Cell::new("Articles"),
        Cell::new("Average score"),
        Cell::new("Event"),
    ]));
    for point in &report.trend {
        let event = if report.events.contains(&point.date) { "*" } else { "" };
        table.add_row(Row::new(vec![
            Cell::new(&point.date.to_string()),
            Cell::new(&point.article_count.to_string()),
            Cell::new(&format!("{:+.3}", point.average_score)),
            Cell::new(event),
        ]));
    }
    table.printstd();

    if !report.entity_matrix.is_empty() {
        header("Entity frequency vs sentiment");
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("Entity"),
            Cell::new("Frequency"),
            Cell::new("Average sentiment"),
        ]));
        for stat in &report.entity_matrix {
            table.add_row(Row::new(vec![
                Cell::new(&stat.entity),
                Cell::new(&stat.frequency.to_string()),
                Cell::new(&format!("{:+.3}", stat.average_sentiment)),
            ]));
        }
        table.printstd();
    }

    if !report.topics.is_empty() {
        header("Topics");
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("Topic"),
            Cell::new("Name"),
            Cell::new("Articles"),
            Cell::new("Keywords"),
        ]));
        for topic in &report.topics {
            let keywords = report
                .topic_keywords
                .iter()
                .find(|k| k.topic == topic.id)
                .map(|k| k.keywords.join(", "))
                .unwrap_or_default();
            table.add_row(Row::new(vec![
                Cell::new(&topic.id.to_string()),
                Cell::new(&topic.name),
                Cell::new(&topic.count.to_string()),
                Cell::new(&keywords),
            ]));
        }
        table.printstd();
    }

    if !report.relation_counts.is_empty() {
        header("Entity relations");
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("Entity 1"),
            Cell::new("Entity 2"),
            Cell::new("Co-occurrences"),
        ]));
        for relation in &report.relation_counts {
            table.add_row(Row::new(vec![
                Cell::new(&relation.entity_a),
                Cell::new(&relation.entity_b),
                Cell::new(&relation.count.to_string()),
            ]));
        }
        table.printstd();
        println!(
            "Graph: {} nodes, {} edges",
            report.entity_graph.node_count(),
            report.entity_graph.edge_count()
        );
    }

    if !report.word_corpus.is_empty() {
        header("Top words");
        let words: Vec<String> = report
            .word_corpus
            .iter()
            .take(20)
            .map(|w| format!("{} ({})", w.word, w.count))
            .collect();
        println!("{}", words.join(", "));
    }

    if report.is_degraded() {
        header("Warnings");
        for warning in &report.warnings {
            println!("{}", warning.to_string().yellow());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    newslens::logging::configure_logging(&config.log_dir);

    let models = build_models(&config);
    let engine = AnalysisEngine::new(models, config.engine.clone());

    let (outcome, articles) = match &cli.input {
        Some(path) => {
            let raw = load_articles(path)?;
            info!(target: TARGET_ENGINE, "Loaded {} articles from {}", raw.len(), path.display());
            let mut articles = engine.normalize(raw);
            let outcome = engine.analyze(&mut articles).await;
            (outcome, articles)
        }
        None => {
            let query = cli.query.as_deref().unwrap_or_default();
            let source = GoogleNewsSource::new(&config.news_language, &config.news_country)?;
            engine
                .fetch_and_analyze(&source, query, cli.period, cli.max_results)
                .await?
        }
    };

    match (outcome, cli.output) {
        (RunOutcome::Empty, OutputFormat::Json) => {
            println!("{}", serde_json::json!({ "status": "empty", "articles": [] }));
        }
        (RunOutcome::Empty, OutputFormat::Table) => {
            println!("{}", "No articles found. Try another query or a longer period.".yellow());
        }
        (RunOutcome::Ready(report), OutputFormat::Json) => {
            let output = serde_json::json!({
                "status": "ready",
                "report": report,
                "articles": articles_json(&articles)?,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        (RunOutcome::Ready(report), OutputFormat::Table) => {
            print_report(&report, &articles);
            if cli.details {
                print_details(&articles);
            }
        }
    }

    Ok(())
}
