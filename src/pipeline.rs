use std::path::PathBuf;

use anyhow::Context as _;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{Config, PipelineMode};
use crate::enrich::Enricher;
use crate::extract::{ListingRow, parse_listing};
use crate::fetch::{build_client, fetch_html};
use crate::record::{BookRecord, write_books_json};
use crate::throttle::Throttle;

/// Counts reported after a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub emitted: usize,
    pub discarded: usize,
    pub output_path: PathBuf,
}

/// Fetches the listing, builds one record per row and writes them all at the end.
///
/// Failing to fetch the listing or to write the output aborts the run; enrichment
/// failures only drop the affected row.
pub async fn run(config: &Config) -> anyhow::Result<RunSummary> {
    tracing::info!(url = %config.source_url, mode = ?config.mode, "scraping book listing");

    let client = build_client()?;
    let html = fetch_html(&client, &config.source_url)
        .await
        .context("fetch listing page")?;

    let rows = parse_listing(&html);
    let row_count = rows.len();
    tracing::info!(rows = row_count, "found book rows");

    let records: Vec<BookRecord> = match config.mode {
        PipelineMode::ListingOnly => rows.iter().map(listing_record).collect(),
        PipelineMode::Enriched => {
            let enricher = Enricher::new(
                client,
                config.volumes_endpoint.clone(),
                config.detail_base_url.clone(),
            );
            enrich_rows(&enricher, rows, Throttle::new(config.item_delay)).await?
        }
    };

    write_books_json(&config.output_path, &records)?;

    let summary = RunSummary {
        rows: row_count,
        emitted: records.len(),
        discarded: row_count - records.len(),
        output_path: config.output_path.clone(),
    };
    tracing::info!(
        emitted = summary.emitted,
        discarded = summary.discarded,
        path = %summary.output_path.display(),
        "wrote book records"
    );

    Ok(summary)
}

/// Record with listing fields only; enrichment fields stay empty.
pub fn listing_record(row: &ListingRow) -> BookRecord {
    BookRecord {
        title: row.title.clone(),
        author: row.author.clone(),
        image: String::new(),
        publication_date: String::new(),
        rating: row.rating.map(|summary| summary.rating),
        ratings_count: row.rating.map(|summary| summary.ratings_count),
    }
}

/// Processes rows one at a time, in order, pausing after each one.
async fn enrich_rows(
    enricher: &Enricher,
    rows: Vec<ListingRow>,
    throttle: Throttle,
) -> anyhow::Result<Vec<BookRecord>> {
    let progress = ProgressBar::new(rows.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({percent}%)")?
            .progress_chars("=> "),
    );

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match enrich_row(enricher, &row).await {
            Ok(record) => records.push(record),
            Err(err) => {
                let title = row.title.as_deref().unwrap_or_default();
                progress.suspend(|| {
                    tracing::error!(title, error = %format!("{err:#}"), "discarding book record");
                });
            }
        }

        progress.inc(1);
        throttle.pause().await;
    }

    progress.finish_and_clear();
    Ok(records)
}

async fn enrich_row(enricher: &Enricher, row: &ListingRow) -> anyhow::Result<BookRecord> {
    let mut record = listing_record(row);

    let title = row.title.as_deref().filter(|title| !title.is_empty());
    let (Some(title), Some(detail_href)) = (title, row.detail_href.as_deref()) else {
        tracing::debug!(title = ?row.title, "no title or detail link; skipping enrichment");
        return Ok(record);
    };

    let enrichment = enricher.enrich(title, detail_href).await?;
    tracing::debug!(title, image = %enrichment.image, date = %enrichment.publication_date, "enriched");

    record.image = enrichment.image;
    record.publication_date = enrichment.publication_date;
    Ok(record)
}
