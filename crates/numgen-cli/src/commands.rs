use anyhow::Context;
use numgen::{
    GenerationConfig, Number, NumberCounts, NumberStore, ProducerOrchestrator, RandSource,
    RunState, SeededRandom, ThreadRandom,
};
use numgen_sqlite::SqliteStore;
use serde::Serialize;
use std::{sync::Arc, time::Instant};

/// Outcome of `numgen generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub state: RunState,
    pub counts: NumberCounts,
    /// Records handed to the database; absent when `--save` was not given.
    pub saved: Option<usize>,
    pub elapsed_ms: u128,
}

/// Runs one generation cycle and, if `database_url` is set, persists it.
pub async fn generate(
    config: GenerationConfig,
    seed: Option<u64>,
    database_url: Option<&str>,
) -> anyhow::Result<GenerateReport> {
    match seed {
        Some(seed) => run_generation(config, SeededRandom::new(seed), database_url).await,
        None => run_generation(config, ThreadRandom, database_url).await,
    }
}

async fn run_generation<R>(
    config: GenerationConfig,
    rng: R,
    database_url: Option<&str>,
) -> anyhow::Result<GenerateReport>
where
    R: RandSource + 'static,
{
    // Connect first so a bad URL fails before minutes of generation.
    let store = match database_url {
        Some(url) => Some(
            SqliteStore::connect(url)
                .await
                .with_context(|| format!("failed to open {url}"))?,
        ),
        None => None,
    };

    let orchestrator = Arc::new(ProducerOrchestrator::with_rand(config, rng));
    let interrupt = tokio::spawn({
        let orchestrator = Arc::clone(&orchestrator);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Received Ctrl+C signal, stopping producers");
                orchestrator.cancel();
            }
        }
    });

    let started = Instant::now();
    let result = orchestrator.start().await;
    interrupt.abort();
    let counts = result?;

    let saved = match &store {
        Some(store) => {
            let saved = orchestrator.save(store).await?;
            store.close().await;
            Some(saved)
        }
        None => None,
    };

    Ok(GenerateReport {
        state: orchestrator.state(),
        counts,
        saved,
        elapsed_ms: started.elapsed().as_millis(),
    })
}

pub fn print_report(report: &GenerateReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("state:   {}", report.state);
    println!("total:   {}", report.counts.total);
    println!("odd:     {}", report.counts.odd);
    println!("even:    {}", report.counts.even);
    println!("prime:   {}", report.counts.prime);
    if let Some(saved) = report.saved {
        println!("saved:   {saved}");
    }
    println!("elapsed: {} ms", report.elapsed_ms);
    Ok(())
}

pub async fn show(database_url: &str, count: usize) -> anyhow::Result<()> {
    let store = SqliteStore::connect(database_url).await?;
    let numbers = store.fetch_first(count).await?;
    store.close().await;

    if numbers.is_empty() {
        println!("no numbers stored");
        return Ok(());
    }

    for number in numbers {
        println!("{:>10}  {}", number.value, number.prime_flag());
    }
    Ok(())
}

/// Totals over a set of stored numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoredStats {
    pub total: usize,
    pub negative: usize,
    pub odd: usize,
    pub even: usize,
    pub flagged_prime: usize,
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl StoredStats {
    pub fn collect(numbers: &[Number]) -> Self {
        numbers.iter().fold(Self::default(), |mut stats, number| {
            stats.total += 1;
            if number.value < 0 {
                stats.negative += 1;
            } else if number.value % 2 == 0 {
                stats.even += 1;
            } else {
                stats.odd += 1;
            }
            if number.is_prime {
                stats.flagged_prime += 1;
            }
            stats.min = Some(stats.min.map_or(number.value, |min| min.min(number.value)));
            stats.max = Some(stats.max.map_or(number.value, |max| max.max(number.value)));
            stats
        })
    }
}

pub async fn stats(database_url: &str) -> anyhow::Result<()> {
    let store = SqliteStore::connect(database_url).await?;
    let numbers = store.fetch_all().await?;
    store.close().await;

    let stats = StoredStats::collect(&numbers);
    println!("total:         {}", stats.total);
    println!("negative:      {}", stats.negative);
    println!("odd:           {}", stats.odd);
    println!("even:          {}", stats.even);
    println!("flagged prime: {}", stats.flagged_prime);
    if let (Some(min), Some(max)) = (stats.min, stats.max) {
        println!("range:         {min}..={max}");
    }
    Ok(())
}

pub async fn purge(database_url: &str) -> anyhow::Result<()> {
    let store = SqliteStore::connect(database_url).await?;
    let deleted = store.delete_all().await?;
    store.close().await;

    tracing::info!(deleted, "Purged stored numbers");
    println!("deleted {deleted} numbers");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(dir: &tempfile::TempDir) -> String {
        format!("sqlite://{}", dir.path().join("numbers.db").display())
    }

    #[test]
    fn stats_partition_stored_values() {
        let numbers = [
            Number::new(-7, false),
            Number::new(-2, false),
            Number::new(3, true),
            Number::new(9, false),
            Number::new(10, false),
        ];

        let stats = StoredStats::collect(&numbers);
        assert_eq!(
            stats,
            StoredStats {
                total: 5,
                negative: 2,
                odd: 2,
                even: 1,
                flagged_prime: 1,
                min: Some(-7),
                max: Some(10),
            }
        );
        assert_eq!(StoredStats::collect(&[]), StoredStats::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn generate_without_save() {
        let config = GenerationConfig::new(2_000, 500, 10_000).unwrap();
        let report = generate(config, Some(7), None).await.unwrap();

        assert_eq!(report.state, RunState::Completed);
        assert_eq!(report.counts.total, 2_000);
        assert_eq!(report.counts.categorized(), 2_000);
        assert_eq!(report.saved, None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn generate_and_save_then_purge() {
        let dir = tempfile::tempdir().unwrap();
        let url = url(&dir);
        let config = GenerationConfig::new(3_000, 750, 10_000).unwrap();

        let report = generate(config, None, Some(&url)).await.unwrap();
        assert_eq!(report.saved, Some(3_000));

        let store = SqliteStore::connect(&url).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 3_000);
        let stats = StoredStats::collect(&store.fetch_all().await.unwrap());
        assert_eq!(stats.negative, report.counts.prime);
        assert_eq!(stats.odd, report.counts.odd);
        assert_eq!(stats.even, report.counts.even);
        store.close().await;

        purge(&url).await.unwrap();
        let store = SqliteStore::connect(&url).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn report_serializes_for_json_output() {
        let report = GenerateReport {
            state: RunState::Completed,
            counts: NumberCounts {
                odd: 1,
                even: 2,
                prime: 3,
                total: 6,
            },
            saved: Some(6),
            elapsed_ms: 12,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["state"], "Completed");
        assert_eq!(json["counts"]["total"], 6);
        assert_eq!(json["saved"], 6);
    }
}
