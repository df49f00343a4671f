use std::thread;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProviderConfig;
use crate::http_client::http_client;
use crate::locate;
use crate::population::{PlayerRecord, Population, PositionCode, Stat};
use crate::synthetic;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unavailable {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid provider url: {0}")]
    InvalidUrl(String),
    #[error("provider response unreadable: {0}")]
    Malformed(String),
    #[error("gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// Capability for reaching the remote provider. Implementations report
/// transport failures only; status handling lives in [`fetch_with_backoff`].
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<FetchResponse, Unavailable>;
}

pub struct HttpFetch {
    client: &'static Client,
}

impl HttpFetch {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }
}

impl Fetch for HttpFetch {
    fn fetch(&self, url: &str) -> Result<FetchResponse, Unavailable> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|e| Unavailable::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .map_err(|e| Unavailable::Transport(e.to_string()))?;
        Ok(FetchResponse { status, body })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn rate_limit_wait(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1) * 2
    }

    pub fn retry_wait(&self, attempt: u32) -> Duration {
        self.base_delay * (attempt + 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
        }
    }
}

/// Fetches `url`, backing off on 429 and retrying other failures, until a
/// 2xx body arrives or the attempt ceiling is reached.
pub fn fetch_with_backoff(
    fetcher: &dyn Fetch,
    url: &str,
    policy: RetryPolicy,
) -> Result<String, Unavailable> {
    let attempts = policy.max_attempts.max(1);
    for attempt in 0..attempts {
        tracing::debug!(attempt = attempt + 1, url, "provider request");
        match fetcher.fetch(url) {
            Ok(resp) if resp.status == StatusCode::TOO_MANY_REQUESTS.as_u16() => {
                let wait = policy.rate_limit_wait(attempt);
                tracing::warn!(wait_ms = wait.as_millis() as u64, "provider rate limited");
                thread::sleep(wait);
                continue;
            }
            Ok(resp) if (200..300).contains(&resp.status) => return Ok(resp.body),
            Ok(resp) => tracing::warn!(status = resp.status, "provider returned an error status"),
            Err(err) => tracing::warn!(error = %err, "provider request failed"),
        }
        if attempt + 1 < attempts {
            thread::sleep(policy.retry_wait(attempt));
        }
    }
    Err(Unavailable::Exhausted { attempts })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteQuery {
    pub name: String,
    pub team: Option<String>,
    pub season: Option<String>,
    pub league: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Provider,
    Synthetic,
}

#[derive(Debug, Clone)]
pub struct SourcedRecord {
    pub record: PlayerRecord,
    pub source: RecordSource,
}

/// Anything that can answer "do you have real numbers for this player".
/// `None` covers both "not found" and "could not ask".
pub trait PlayerSource {
    fn find(&self, query: &RemoteQuery) -> Option<PlayerRecord>;
}

pub struct RemoteProvider<F: Fetch> {
    fetcher: F,
    base_url: String,
    policy: RetryPolicy,
}

impl<F: Fetch> RemoteProvider<F> {
    pub fn new(fetcher: F, base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    pub fn lookup(&self, query: &RemoteQuery) -> Result<Option<PlayerRecord>, Unavailable> {
        let url = self.players_url(query)?;
        let body = fetch_with_backoff(&self.fetcher, url.as_str(), self.policy)?;
        let population = parse_provider_players(&body)?;
        Ok(locate::locate(&population, &query.name, query.team.as_deref())
            .map(|hit| hit.record.clone()))
    }

    fn players_url(&self, query: &RemoteQuery) -> Result<Url, Unavailable> {
        let mut params = vec![("name", query.name.as_str())];
        if let Some(team) = query.team.as_deref() {
            params.push(("team", team));
        }
        if let Some(season) = query.season.as_deref() {
            params.push(("season", season));
        }
        if let Some(league) = query.league.as_deref() {
            params.push(("league", league));
        }
        Url::parse_with_params(&format!("{}/players", self.base_url), &params)
            .map_err(|e| Unavailable::InvalidUrl(e.to_string()))
    }
}

impl<F: Fetch> PlayerSource for RemoteProvider<F> {
    fn find(&self, query: &RemoteQuery) -> Option<PlayerRecord> {
        match self.lookup(query) {
            Ok(found) => {
                if found.is_none() {
                    tracing::info!(name = %query.name, "provider has no such player");
                }
                found
            }
            Err(err) => {
                tracing::warn!(error = %err, "provider unavailable");
                None
            }
        }
    }
}

pub fn http_provider(config: &ProviderConfig) -> Option<RemoteProvider<HttpFetch>> {
    let base_url = config.active_url()?;
    let fetcher = match HttpFetch::new(config.timeout) {
        Ok(fetcher) => fetcher,
        Err(err) => {
            tracing::warn!(error = %err, "provider disabled");
            return None;
        }
    };
    let policy = RetryPolicy {
        max_attempts: config.max_attempts,
        base_delay: config.retry_delay,
    };
    Some(RemoteProvider::new(fetcher, base_url, policy))
}

/// Real numbers when the provider has them, otherwise the deterministic
/// synthetic record for the same name and team.
pub fn resolve_record(source: Option<&dyn PlayerSource>, query: &RemoteQuery) -> SourcedRecord {
    if let Some(record) = source.and_then(|s| s.find(query)) {
        return SourcedRecord {
            record,
            source: RecordSource::Provider,
        };
    }
    tracing::info!(name = %query.name, "using synthetic fallback data");
    SourcedRecord {
        record: synthetic::synthetic_record(&query.name, query.team.as_deref()),
        source: RecordSource::Synthetic,
    }
}

#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    players: Vec<ProviderPlayer>,
}

#[derive(Debug, Deserialize)]
struct ProviderPlayer {
    player: String,
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(default)]
    league: Option<String>,
    #[serde(default)]
    age: Option<f64>,
    #[serde(default)]
    born: Option<f64>,
    #[serde(default)]
    matches: Option<f64>,
    #[serde(default)]
    starts: Option<f64>,
    #[serde(default)]
    minutes: Option<f64>,
    #[serde(default)]
    goals: Option<f64>,
    #[serde(default)]
    assists: Option<f64>,
    #[serde(default)]
    penalty_goals: Option<f64>,
    #[serde(default)]
    cards_yellow: Option<f64>,
    #[serde(default)]
    cards_red: Option<f64>,
    #[serde(default)]
    xg: Option<f64>,
    #[serde(default)]
    npxg: Option<f64>,
    #[serde(default)]
    xag: Option<f64>,
    #[serde(default)]
    progressive_carries: Option<f64>,
    #[serde(default)]
    progressive_passes: Option<f64>,
    #[serde(default)]
    progressive_receptions: Option<f64>,
    #[serde(default)]
    shots: Option<f64>,
    #[serde(default)]
    tackles: Option<f64>,
    #[serde(default)]
    interceptions: Option<f64>,
}

impl ProviderPlayer {
    fn into_record(self) -> PlayerRecord {
        let stats = [
            (Stat::Goals, self.goals),
            (Stat::Assists, self.assists),
            (Stat::PenaltyGoals, self.penalty_goals),
            (Stat::YellowCards, self.cards_yellow),
            (Stat::RedCards, self.cards_red),
            (Stat::Xg, self.xg),
            (Stat::Npxg, self.npxg),
            (Stat::Xag, self.xag),
            (Stat::ProgressiveCarries, self.progressive_carries),
            (Stat::ProgressivePasses, self.progressive_passes),
            (Stat::ProgressiveReceptions, self.progressive_receptions),
            (Stat::Shots, self.shots),
            (Stat::Tackles, self.tackles),
            (Stat::Interceptions, self.interceptions),
        ]
        .into_iter()
        .filter_map(|(stat, value)| value.filter(|v| v.is_finite() && *v >= 0.0).map(|v| (stat, v)))
        .collect();

        PlayerRecord {
            name: self.player,
            team: self.team.unwrap_or_default(),
            position: PositionCode::new(self.position.as_deref().unwrap_or_default()),
            age: whole(self.age),
            birth_year: whole(self.born),
            nationality: self.nationality.unwrap_or_default(),
            league: self.league.unwrap_or_default(),
            matches: whole(self.matches).unwrap_or(0),
            starts: whole(self.starts).unwrap_or(0),
            minutes: whole(self.minutes).unwrap_or(0),
            stats,
        }
    }
}

fn whole(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u32)
}

pub fn parse_provider_players(raw: &str) -> Result<Population, Unavailable> {
    let parsed: ProviderResponse =
        serde_json::from_str(raw.trim()).map_err(|e| Unavailable::Malformed(e.to_string()))?;
    Ok(Population::new(
        parsed
            .players
            .into_iter()
            .map(ProviderPlayer::into_record)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_waits_scale_with_attempt() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
        };
        assert_eq!(policy.rate_limit_wait(0), Duration::from_secs(10));
        assert_eq!(policy.rate_limit_wait(2), Duration::from_secs(30));
        assert_eq!(policy.retry_wait(1), Duration::from_secs(10));
    }

    #[test]
    fn provider_json_keeps_unknowns_absent() {
        let raw = r#"{"players":[{"player":"Alpha","team":"Club","position":"FW","minutes":900,"goals":4,"xg":null}]}"#;
        let population = parse_provider_players(raw).expect("parses");
        let record = &population.records()[0];
        assert_eq!(record.minutes, 900);
        assert_eq!(record.stat(Stat::Goals), Some(4.0));
        assert_eq!(record.stat(Stat::Xg), None);
    }

    #[test]
    fn malformed_body_is_unavailable() {
        assert!(matches!(
            parse_provider_players("<html>"),
            Err(Unavailable::Malformed(_))
        ));
    }

    #[test]
    fn url_carries_query_params() {
        struct Never;
        impl Fetch for Never {
            fn fetch(&self, _url: &str) -> Result<FetchResponse, Unavailable> {
                Err(Unavailable::Transport("offline".to_string()))
            }
        }
        let provider = RemoteProvider::new(Never, "https://stats.example/api/", RetryPolicy::default());
        let url = provider
            .players_url(&RemoteQuery {
                name: "Bukayo Saka".to_string(),
                team: Some("Arsenal".to_string()),
                season: None,
                league: None,
            })
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://stats.example/api/players?name=Bukayo+Saka&team=Arsenal"
        );
    }
}
