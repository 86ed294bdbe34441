//! 🔧 App Configuration: the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. Nothing." (every developer at 3am) 🦆
//!
//! 🏗️ Powered by Figment. Every field has a default, so running with no file and no
//! env vars gets you the stock crawl: the dwyl English word list, the sample job list,
//! six parallel fetches, three pages, top ten words.

use anyhow::{Context, bail};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

const DEFAULT_WORD_BANK_SOURCE: &str = "https://raw.githubusercontent.com/dwyl/english-words/master/words.txt";
const DEFAULT_JOB_LIST_SOURCE: &str =
    "https://drive.usercontent.google.com/u/0/uc?id=1TF4RPuj8iFwpa-lyhxG67V8NDlktmTGi&export=download";
const DEFAULT_SELECTION_QUERY: &str = "article p, article h1, article h2, article h3, article h4, article h5, article h6";

/// 📦 The AppConfig: one struct to rule them all, and in the Figment bind them.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// 🕸️ How the fetching side behaves.
    #[serde(alias = "scraper")]
    pub crawler: CrawlerConfig,
    /// 📜 How the job list is streamed.
    pub job_loader: JobLoaderConfig,
    /// 📖 URL or file path of the reference word list.
    #[serde(alias = "word_bank_url")]
    pub word_bank_source: String,
    /// 📜 URL or file path of the job list, one target per line.
    #[serde(alias = "jobs_url")]
    pub job_list_source: String,
    /// 🏆 How many podium spots (ties get extra spots for free).
    pub top_k: usize,
    /// 📏 Shortest word worth counting, in characters.
    pub min_word_length: usize,
    /// 📊 Draw the spinner on stderr.
    pub show_progress: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            job_loader: JobLoaderConfig::default(),
            word_bank_source: DEFAULT_WORD_BANK_SOURCE.to_string(),
            job_list_source: DEFAULT_JOB_LIST_SOURCE.to_string(),
            top_k: 10,
            min_word_length: 3,
            show_progress: true,
        }
    }
}

/// 🕸️ Knobs for the crawler and the fetcher behind it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CrawlerConfig {
    /// 🧵 Max visits in flight at once.
    pub parallelism: usize,
    /// 🎯 CSS selector; each match is one text fragment.
    #[serde(alias = "selector")]
    pub selection_query: String,
    /// ⏱️ Per-request timeout. 500ms is tight, and that's the point.
    pub request_timeout_ms: u64,
    /// 📬 Merge queue depth. Unset means `parallelism`; never less than `parallelism`.
    pub merge_queue_capacity: Option<usize>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            parallelism: 6,
            selection_query: DEFAULT_SELECTION_QUERY.to_string(),
            request_timeout_ms: 500,
            merge_queue_capacity: None,
        }
    }
}

impl CrawlerConfig {
    pub fn effective_merge_queue_capacity(&self) -> usize {
        self.merge_queue_capacity
            .unwrap_or(self.parallelism)
            .max(self.parallelism)
            .max(1)
    }
}

/// 📜 Knobs for streaming the job list.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct JobLoaderConfig {
    /// 🚦 Job queue depth. The producer waits once this many targets are undelivered.
    pub backpressure: usize,
    /// ✂️ Stop after this many targets. 0 = no limit, godspeed.
    #[serde(alias = "page_cutoff")]
    pub cutoff: usize,
}

impl Default for JobLoaderConfig {
    fn default() -> Self {
        Self {
            backpressure: 10,
            // -- safety valve against loading too many pages and getting blocked
            cutoff: 3,
        }
    }
}

impl JobLoaderConfig {
    /// 🚦 A bounded channel needs room for at least one.
    pub fn effective_backpressure(&self) -> usize {
        self.backpressure.max(1)
    }
}

impl AppConfig {
    /// ✅ Catches the configs that would parse fine and then do something silly.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.top_k == 0 {
            bail!("💀 top_k must be greater than 0. A podium with no spots is just a floor.");
        }
        if self.crawler.parallelism == 0 {
            bail!("💀 crawler.parallelism must be greater than 0, or nothing will ever be fetched.");
        }
        if self.crawler.request_timeout_ms == 0 {
            bail!("💀 crawler.request_timeout_ms must be greater than 0, or every visit times out before it starts.");
        }
        if self.crawler.selection_query.trim().is_empty() {
            bail!("💀 crawler.selection_query is empty. Select what, exactly?");
        }
        if self.word_bank_source.trim().is_empty() || self.job_list_source.trim().is_empty() {
            bail!("💀 word_bank_source and job_list_source both need to point somewhere.");
        }
        Ok(())
    }
}

/// 🚀 Load the config from env vars (`WCX_*`) and an optional TOML file, then validate.
///
/// 📐 Nested keys use a double underscore: `WCX_CRAWLER__PARALLELISM=12`.
/// If a file is given it is merged last, so the file wins on conflicts.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let config = Figment::new().merge(Env::prefixed("WCX_").split("__"));
    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (WCX_*).",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (WCX_*). \
                 No file was provided, this one's all on the environment."
            .to_string(),
    };

    let app_config: AppConfig = config.extract().context(context_msg)?;
    app_config.validate()?;
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("💀 Failed to create a temp config. The filesystem said 'new phone who dis'.");
        file.write_all(contents.as_bytes())
            .expect("💀 Failed to write test config.");
        file
    }

    #[test]
    fn the_one_where_a_file_overrides_the_stock_crawl() {
        let file = write_test_config(
            r#"
            word_bank_source = "words.txt"
            job_list_source = "jobs.txt"
            top_k = 25

            [crawler]
            parallelism = 3
            selection_query = "main p"
            request_timeout_ms = 2000

            [job_loader]
            backpressure = 1
            cutoff = 0
            "#,
        );

        let app_config = load_config(Some(file.path()))
            .expect("💀 A perfectly reasonable config failed to load.");

        assert_eq!(app_config.top_k, 25);
        assert_eq!(app_config.crawler.parallelism, 3);
        assert_eq!(app_config.crawler.selection_query, "main p");
        assert_eq!(app_config.crawler.request_timeout_ms, 2000);
        assert_eq!(app_config.job_loader.backpressure, 1);
        assert_eq!(app_config.job_loader.cutoff, 0);
        assert_eq!(app_config.word_bank_source, "words.txt");
        // -- 🧘 untouched fields keep their defaults
        assert_eq!(app_config.min_word_length, 3);
    }

    #[test]
    fn the_one_where_defaults_show_up_uninvited_but_helpful() {
        let app_config: AppConfig = toml::from_str("").expect("💀 empty TOML should be all defaults");
        assert_eq!(app_config, AppConfig::default());
        assert_eq!(app_config.crawler.parallelism, 6);
        assert_eq!(app_config.job_loader.backpressure, 10);
        assert_eq!(app_config.job_loader.cutoff, 3);
        assert_eq!(app_config.top_k, 10);
        assert!(app_config.crawler.selection_query.starts_with("article p"));
    }

    #[test]
    fn the_one_where_the_old_names_still_answer_to_roll_call() {
        let app_config: AppConfig = toml::from_str(
            r#"
            word_bank_url = "https://words.example/list.txt"
            jobs_url = "https://jobs.example/list.txt"

            [scraper]
            selector = "div.content"

            [job_loader]
            page_cutoff = 7
            "#,
        )
        .expect("💀 aliases should parse");

        assert_eq!(app_config.word_bank_source, "https://words.example/list.txt");
        assert_eq!(app_config.job_list_source, "https://jobs.example/list.txt");
        assert_eq!(app_config.crawler.selection_query, "div.content");
        assert_eq!(app_config.job_loader.cutoff, 7);
    }

    #[test]
    fn the_one_where_a_zero_top_k_is_turned_away() {
        let file = write_test_config("top_k = 0\n");
        let err = load_config(Some(file.path())).expect_err("💀 top_k = 0 must not load");
        assert!(format!("{err:#}").contains("top_k"));
    }

    #[test]
    fn the_one_where_a_zero_timeout_is_turned_away() {
        let file = write_test_config("[crawler]\nrequest_timeout_ms = 0\n");
        let err = load_config(Some(file.path())).expect_err("💀 a zero request timeout must not load");
        assert!(format!("{err:#}").contains("request_timeout_ms"));
    }

    #[test]
    fn the_one_where_queue_sizes_never_drop_below_sane() {
        let mut crawler = CrawlerConfig {
            parallelism: 4,
            merge_queue_capacity: Some(2),
            ..Default::default()
        };
        assert_eq!(crawler.effective_merge_queue_capacity(), 4);
        crawler.merge_queue_capacity = Some(16);
        assert_eq!(crawler.effective_merge_queue_capacity(), 16);
        crawler.merge_queue_capacity = None;
        assert_eq!(crawler.effective_merge_queue_capacity(), 4);

        let loader = JobLoaderConfig {
            backpressure: 0,
            cutoff: 0,
        };
        assert_eq!(loader.effective_backpressure(), 1);
    }
}
