//! Yoga Journal CLI
//!
//! Command-line client for a running yoga journal API server:
//! - Record, list, search and edit entries
//! - Show the monthly dashboard as a text heatmap
//! - Browse the pose library and frequent sequences
//! - Back up and restore the journal

use anyhow::{bail, Context};
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

use yoga_journal::analytics::ViewMonth;
use yoga_journal::api::dto::{
    DayHeatDto, EntryListResponse, HealthResponse, MonthlyAnalyticsResponse, PoseLibraryResponse,
    SequenceListResponse,
};
use yoga_journal::api::error::ErrorResponse;
use yoga_journal::journal::{JournalEntry, YogaPose};
use yoga_journal::store::RestoreReport;

#[derive(Parser)]
#[command(name = "yoga-journal-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Yoga practice journal")]
#[command(long_about = "Record yoga sessions and look back at them.\nTalks to a running yoga-journal API server.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List entries, newest first
    List {
        /// Search notes, hashtags and pose names
        #[arg(short, long)]
        query: Option<String>,
        /// Only favorites
        #[arg(long)]
        favorites: bool,
    },

    /// Record a session
    Add {
        /// What you practiced
        #[arg(short, long, default_value = "")]
        notes: String,
        /// Free-text duration, e.g. "45분" or "about 60 min"
        #[arg(short, long)]
        duration: Option<String>,
        /// Intensity from 1 to 5
        #[arg(short, long)]
        intensity: Option<u8>,
        /// Comma-separated hashtags
        #[arg(short = 't', long)]
        hashtags: Option<String>,
        /// Pose as "Name" or "Name:Sanskrit name"; repeat in practice order
        #[arg(short, long = "pose")]
        poses: Vec<String>,
        /// Session time (RFC 3339, default: now)
        #[arg(long)]
        date: Option<String>,
        /// Photo URL (at most two)
        #[arg(long = "photo")]
        photos: Vec<String>,
        /// Mark as favorite
        #[arg(long)]
        favorite: bool,
    },

    /// Show one entry
    Show {
        id: String,
    },

    /// Delete an entry
    Delete {
        id: String,
    },

    /// Toggle an entry's favorite flag
    Favorite {
        id: String,
    },

    /// Monthly dashboard with a heatmap calendar
    Stats {
        /// Month as YYYY-MM (default: this month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Practiced poses
    Poses {
        /// Filter by name or sanskrit name
        #[arg(short, long)]
        query: Option<String>,
        /// Only poses from entries matching this search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Most frequent pose pairs
    Sequences {
        /// How many to show
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Download a backup of every entry
    Backup {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge a backup file into the journal
    Restore {
        /// Backup file
        path: PathBuf,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let api = |path: &str| format!("{}/api/v1{}", cli.api_url.trim_end_matches('/'), path);
    let json_output = cli.format == "json";

    match cli.command {
        Commands::List { query, favorites } => {
            let mut params: Vec<(&str, String)> = Vec::new();
            if let Some(q) = query {
                params.push(("q", q));
            }
            if favorites {
                params.push(("favorites", "true".to_string()));
            }

            let response = client.get(api("/entries")).query(&params).send().await;
            let list: EntryListResponse = read_json(response).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&list.entries)?);
            } else if list.entries.is_empty() {
                println!("No entries found.");
                println!();
                println!("Record your first session with:");
                println!("  yoga-journal-cli add --notes \"morning flow\" --duration 30분");
            } else {
                print_entry_table(&list.entries);
                println!();
                println!("{} entries", list.total);
            }
        }

        Commands::Add {
            notes,
            duration,
            intensity,
            hashtags,
            poses,
            date,
            photos,
            favorite,
        } => {
            let date = date
                .map(|d| DateTime::<FixedOffset>::parse_from_rfc3339(&d))
                .transpose()
                .context("invalid --date, expected RFC 3339 like 2024-08-01T07:30:00+09:00")?;

            let poses: Vec<YogaPose> = poses.iter().map(|p| parse_pose_arg(p)).collect();
            let photos: Vec<serde_json::Value> = photos
                .into_iter()
                .map(|url| serde_json::json!({ "url": url }))
                .collect();

            let body = serde_json::json!({
                "date": date,
                "notes": notes,
                "duration": duration,
                "intensity": intensity,
                "hashtags": hashtags.unwrap_or_default(),
                "poses": poses,
                "photos": photos,
                "isFavorite": favorite,
            });

            let response = client.post(api("/entries")).json(&body).send().await;
            let entry: JournalEntry = read_json(response).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                println!("Recorded entry {} on {}", entry.id, entry.date.format("%Y-%m-%d %H:%M"));
            }
        }

        Commands::Show { id } => {
            let response = client.get(api(&format!("/entries/{}", id))).send().await;
            let entry: JournalEntry = read_json(response).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                print_entry_detail(&entry);
            }
        }

        Commands::Delete { id } => {
            let response = client.delete(api(&format!("/entries/{}", id))).send().await;
            check_status(response).await?;
            println!("Deleted entry {}", id);
        }

        Commands::Favorite { id } => {
            let response = client
                .post(api(&format!("/entries/{}/favorite", id)))
                .send()
                .await;
            let entry: JournalEntry = read_json(response).await?;
            if entry.is_favorite() {
                println!("★ Entry {} is now a favorite", entry.id);
            } else {
                println!("☆ Entry {} is no longer a favorite", entry.id);
            }
        }

        Commands::Stats { month } => {
            let month = match month {
                Some(m) => m
                    .parse::<ViewMonth>()
                    .map_err(|_| anyhow::anyhow!("invalid --month '{}', expected YYYY-MM", m))?,
                None => ViewMonth::current(),
            };

            let response = client
                .get(api(&format!("/analytics/{}/{}", month.year(), month.month())))
                .send()
                .await;
            let stats: MonthlyAnalyticsResponse = read_json(response).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", stats.month);
                println!();
                println!("  Total minutes:   {}", stats.total_minutes);
                println!("  Sessions:        {}", stats.total_sessions);
                println!("  Longest streak:  {} days", stats.longest_streak);
                println!();
                print!("{}", render_calendar(&stats.calendar, &stats.heatmap));
                println!();
                println!("  · none  ░ ≤20m  ▒ ≤40m  ▓ ≤60m  █ >60m");
            }
        }

        Commands::Poses { query, search } => {
            let mut params: Vec<(&str, String)> = Vec::new();
            if let Some(q) = query {
                params.push(("q", q));
            }
            if let Some(search) = search {
                params.push(("search", search));
            }
            let request = client.get(api("/library/poses")).query(&params);
            let library: PoseLibraryResponse = read_json(request.send().await).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&library.poses)?);
            } else if library.poses.is_empty() {
                println!("No poses recorded yet.");
            } else {
                println!("{:<24} {:<28} {:>8}", "Pose", "Sanskrit", "Sessions");
                println!("{}", "-".repeat(62));
                for item in &library.poses {
                    println!(
                        "{:<24} {:<28} {:>8}",
                        truncate(&item.pose.name, 24),
                        truncate(&item.pose.sanskrit_name, 28),
                        item.times_practiced
                    );
                }
            }
        }

        Commands::Sequences { top } => {
            let mut request = client.get(api("/library/sequences"));
            if let Some(top) = top {
                request = request.query(&[("top", top)]);
            }
            let list: SequenceListResponse = read_json(request.send().await).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&list.sequences)?);
            } else if list.sequences.is_empty() {
                println!("No pose pair has been practiced more than once yet.");
            } else {
                for (rank, seq) in list.sequences.iter().enumerate() {
                    println!("{}. {}  ({} times)", rank + 1, seq.label, seq.count);
                }
            }
        }

        Commands::Backup { output } => {
            let response = client.get(api("/backup")).send().await;
            let data = check_status(response).await?.text().await?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &data)?;
                    println!("Backup written to {:?}", path);
                }
                None => {
                    print!("{}", data);
                }
            }
        }

        Commands::Restore { path } => {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read backup {:?}", path))?;

            let response = client
                .post(api("/restore"))
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(data)
                .send()
                .await;
            let report: RestoreReport = read_json(response).await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Restored {} entries", report.inserted);
                if !report.skipped.is_empty() {
                    println!("Skipped {} already present", report.skipped.len());
                }
                for rejected in &report.rejected {
                    println!("Rejected {}: {}", rejected.id, rejected.error);
                }
            }
        }

        Commands::Status => {
            let url = format!("{}/health", cli.api_url.trim_end_matches('/'));
            let response = client.get(&url).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: HealthResponse = resp.json().await?;

                    println!("Yoga Journal v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API status:  {}", health.status);
                    println!("Store:       {} ({})", health.backend, health.store);
                    println!("Server:      v{}", health.version);
                    println!("Uptime:      {}", format_uptime(health.uptime_seconds));
                }
                Ok(resp) => bail!("API returned error: {}", resp.status()),
                Err(e) => {
                    eprintln!("Cannot connect to the yoga journal API at {}", cli.api_url);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin yoga-journal");
                    return Err(e.into());
                }
            }
        }

        Commands::Config { output } => {
            let config = yoga_journal::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Fail with the server's error message on non-success statuses
async fn check_status(
    response: reqwest::Result<reqwest::Response>,
) -> anyhow::Result<reqwest::Response> {
    let response = response.context("request to the yoga journal API failed")?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&text) {
        Ok(err) => bail!("{} ({}): {}", status, err.error.code, err.error.message),
        Err(_) => bail!("{}: {}", status, text),
    }
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Result<reqwest::Response>,
) -> anyhow::Result<T> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

/// "Name" or "Name:Sanskrit name"
fn parse_pose_arg(arg: &str) -> YogaPose {
    match arg.split_once(':') {
        Some((name, sanskrit)) => YogaPose::new(name.trim(), sanskrit.trim()),
        None => YogaPose::new(arg.trim(), ""),
    }
}

fn print_entry_table(entries: &[JournalEntry]) {
    println!(
        "{:<8}  {:<16}  {:>5}  {:<1}  {}",
        "ID", "Date", "Min", "★", "Notes"
    );
    println!("{}", "-".repeat(72));

    for entry in entries {
        println!(
            "{:<8}  {:<16}  {:>5}  {:<1}  {}",
            truncate(&entry.id, 8),
            entry.date.format("%Y-%m-%d %H:%M"),
            entry.duration_minutes(),
            if entry.is_favorite() { "★" } else { " " },
            truncate(entry.notes.lines().next().unwrap_or(""), 36)
        );
    }
}

fn print_entry_detail(entry: &JournalEntry) {
    println!("{}{}", entry.id, if entry.is_favorite() { "  ★" } else { "" });
    println!("{}", entry.date.format("%Y-%m-%d %H:%M %:z"));
    println!();

    if let Some(duration) = &entry.duration {
        println!("Duration:   {} ({} min)", duration, entry.duration_minutes());
    }
    if let Some(intensity) = entry.intensity {
        println!("Intensity:  {}", "●".repeat(intensity as usize));
    }
    if !entry.hashtags().is_empty() {
        let tags: Vec<String> = entry.hashtags().iter().map(|t| format!("#{}", t)).collect();
        println!("Hashtags:   {}", tags.join(" "));
    }
    if !entry.poses().is_empty() {
        let names: Vec<&str> = entry.poses().iter().map(|p| p.name.as_str()).collect();
        println!("Poses:      {}", names.join(" → "));
    }
    for photo in entry.photos() {
        match &photo.theme {
            Some(theme) => println!("Photo:      {} [{}]", photo.url, theme),
            None => println!("Photo:      {}", photo.url),
        }
    }

    if !entry.notes.is_empty() {
        println!();
        println!("{}", entry.notes);
    }
}

/// Seven-column calendar, Sunday first, each day prefixed by its shade
fn render_calendar(calendar: &[Option<u32>], heatmap: &[DayHeatDto]) -> String {
    let mut out = String::from("  Su  Mo  Tu  We  Th  Fr  Sa\n");

    for week in calendar.chunks(7) {
        let mut line = String::new();
        for cell in week {
            match cell {
                Some(day) => {
                    let shade = heatmap
                        .iter()
                        .find(|h| h.day == *day)
                        .map(|h| h.tier.shade())
                        .unwrap_or('·');
                    line.push_str(&format!(" {}{:>2}", shade, day));
                }
                None => line.push_str("    "),
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

fn format_uptime(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
