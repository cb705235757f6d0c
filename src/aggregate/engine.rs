use futures::stream::{self, StreamExt};
use std::fmt;
use tokio::sync::watch;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::corpus::word_corpus;
use super::matrix::entity_matrix;
use super::report::{AnalysisReport, Stage, TopicAssignment, Warning};
use super::sentiment::{detect_events, sentiment_composition, sentiment_trend};
use crate::article::{Article, RawArticle};
use crate::entity::extract_entities;
use crate::environment::EngineConfig;
use crate::news::{NewsSource, Period};
use crate::relation::{build_graph, count_pairs, relation_table};
use crate::sentiment::score_sentiment;
use crate::summary::summarize_text;
use crate::text::StopWords;
use crate::topic::model_topics;
use crate::{ModelSet, TARGET_ENGINE};

/// Where a batch run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Fetching,
    Normalizing,
    Analyzing,
    BatchAnalyzing,
    Aggregating,
    Ready,
    /// Terminal: the batch had no articles.
    Empty,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Fetching => "fetching",
            RunState::Normalizing => "normalizing",
            RunState::Analyzing => "analyzing",
            RunState::BatchAnalyzing => "batch-analyzing",
            RunState::Aggregating => "aggregating",
            RunState::Ready => "ready",
            RunState::Empty => "empty",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Nothing to analyze; the run stopped before any model was called.
    Empty,
    Ready(AnalysisReport),
}

impl RunOutcome {
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            RunOutcome::Empty => None,
            RunOutcome::Ready(report) => Some(report),
        }
    }
}

/// Drives one batch at a time through the analyzers and merges their output.
///
/// The engine keeps only its shared models, its configuration and the current
/// [`RunState`]. Every accumulator lives inside a single call to
/// [`AnalysisEngine::analyze`], so consecutive runs never share batch data.
pub struct AnalysisEngine {
    models: ModelSet,
    config: EngineConfig,
    stopwords: StopWords,
    state: watch::Sender<RunState>,
}

impl AnalysisEngine {
    pub fn new(models: ModelSet, config: EngineConfig) -> Self {
        let stopwords = StopWords::with_extra(&config.extra_stopwords);
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            models,
            config,
            stopwords,
            state,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Watch state transitions, e.g. to drive a progress display.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    fn transition(&self, next: RunState) {
        let previous = self.state.send_replace(next);
        debug!(target: TARGET_ENGINE, "Run state {} -> {}", previous, next);
    }

    fn analyzer_timeout(&self) -> Duration {
        Duration::from_secs(self.config.analyzer_timeout_secs)
    }

    /// Fetch a batch from `source`, then normalize and analyze it.
    ///
    /// Fetch errors are returned as-is; the engine goes back to idle.
    pub async fn fetch_and_analyze(
        &self,
        source: &dyn NewsSource,
        query: &str,
        period: Period,
        max_results: usize,
    ) -> anyhow::Result<(RunOutcome, Vec<Article>)> {
        self.transition(RunState::Fetching);
        let raw = match source.fetch(query, period, max_results).await {
            Ok(raw) => raw,
            Err(e) => {
                self.transition(RunState::Idle);
                return Err(e);
            }
        };
        info!(
            target: TARGET_ENGINE,
            "Fetched {} articles for query '{}' ({})",
            raw.len(),
            query,
            period
        );

        let mut articles = self.normalize(raw);
        let outcome = self.analyze(&mut articles).await;
        Ok((outcome, articles))
    }

    /// Turn raw records into articles with clean text attached.
    pub fn normalize(&self, raw: Vec<RawArticle>) -> Vec<Article> {
        self.transition(RunState::Normalizing);
        raw.into_iter().map(Article::from_raw).collect()
    }

    /// Analyze one batch, annotating every article in place.
    ///
    /// Per-article analyses run concurrently but are applied in input order.
    /// Topic modeling and relation counting start only once every article has
    /// been analyzed.
    pub async fn analyze(&self, articles: &mut [Article]) -> RunOutcome {
        if articles.is_empty() {
            self.transition(RunState::Empty);
            info!(target: TARGET_ENGINE, "No articles to analyze");
            return RunOutcome::Empty;
        }

        let started = Instant::now();
        let limit = self.analyzer_timeout();
        let mut warnings = Vec::new();

        self.transition(RunState::Analyzing);
        info!(
            target: TARGET_ENGINE,
            "Analyzing {} articles with {:?} (concurrency {})",
            articles.len(),
            self.models,
            self.config.concurrency
        );
        let models = &self.models;
        let per_article: Vec<_> = stream::iter(articles.iter())
            .map(move |article| async move {
                let text = article.clean_text.as_str();
                tokio::join!(
                    score_sentiment(models.sentiment.as_ref(), text, limit),
                    extract_entities(models.tagger.as_ref(), text, limit),
                    summarize_text(models.summarizer.as_ref(), text, limit)
                )
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        for (article, (sentiment, entities, summary)) in articles.iter_mut().zip(per_article) {
            if let Some(reason) = sentiment.reason() {
                warnings.push(Warning::new(Stage::Sentiment, Some(article.url.as_str()), reason));
            }
            if let Some(reason) = entities.reason() {
                warnings.push(Warning::new(Stage::Entities, Some(article.url.as_str()), reason));
            }
            if let Some(reason) = summary.reason() {
                warnings.push(Warning::new(Stage::Summary, Some(article.url.as_str()), reason));
            }
            article.sentiment = Some(sentiment.into_value());
            article.entities = entities.into_value();
            article.summary = Some(summary.into_value());
        }

        self.transition(RunState::BatchAnalyzing);
        let docs: Vec<String> = articles.iter().map(|a| a.clean_text.clone()).collect();
        let topics = model_topics(
            models.topics.as_ref(),
            &docs,
            limit,
            self.config.topic_keywords,
        )
        .await;
        if let Some(reason) = topics.reason() {
            warnings.push(Warning::new(Stage::Topics, None, reason));
        }
        let topics = topics.into_value();
        for ((article, &topic_id), name) in articles
            .iter_mut()
            .zip(&topics.assignments)
            .zip(&topics.names)
        {
            article.topic_id = topic_id;
            article.topic_name = Some(name.clone());
        }

        let pair_counts = count_pairs(articles, self.config.sentence_matching);

        self.transition(RunState::Aggregating);
        let labels: Vec<_> = articles
            .iter()
            .filter_map(|a| a.sentiment.map(|s| s.label))
            .collect();
        let composition = sentiment_composition(&labels);

        let mut dated = Vec::with_capacity(articles.len());
        for article in articles.iter() {
            match article.published_day() {
                Some(day) => dated.push((day, article.signed_score())),
                None => {
                    warn!(
                        target: TARGET_ENGINE,
                        "Article {} has no usable publication date, leaving it out of the trend",
                        article.url
                    );
                    warnings.push(Warning::new(
                        Stage::Trend,
                        Some(article.url.as_str()),
                        "missing or unparsable publication date",
                    ));
                }
            }
        }
        let trend = sentiment_trend(&dated);
        let events = detect_events(
            &trend,
            self.config.event_stddev,
            self.config.min_trend_points,
        );

        let report = AnalysisReport {
            article_count: articles.len(),
            composition,
            events,
            trend,
            entity_matrix: entity_matrix(articles, self.config.sentence_matching),
            topics: topics.topics,
            topic_keywords: topics.keywords,
            topic_assignments: articles
                .iter()
                .map(|a| TopicAssignment {
                    url: a.url.clone(),
                    topic_id: a.topic_id,
                    topic_name: a.topic_name.clone().unwrap_or_default(),
                })
                .collect(),
            word_corpus: word_corpus(
                articles.iter().map(|a| a.clean_text.as_str()),
                &self.stopwords,
                self.config.max_corpus_words,
            ),
            relation_counts: relation_table(&pair_counts),
            entity_graph: build_graph(&pair_counts, self.config.relation_threshold),
            warnings,
        };

        self.transition(RunState::Ready);
        info!(
            target: TARGET_ENGINE,
            "Analyzed {} articles in {:.2}s: {} topics, {} matrix entities, {} graph edges, {} warnings",
            report.article_count,
            started.elapsed().as_secs_f64(),
            report.topics.len(),
            report.entity_matrix.len(),
            report.entity_graph.edge_count(),
            report.warnings.len()
        );
        RunOutcome::Ready(report)
    }
}
