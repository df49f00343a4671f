use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::locate::{Located, locate};
use crate::population::Population;
use crate::profile::{PersonalInfo, build_profile};
use crate::provider::{PlayerSource, RemoteQuery, resolve_record};
use crate::synthetic::seed_for;
use crate::zones::activity_heatmap;

pub const PLAYER_NOT_FOUND: &str = "Player not found";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Player name required")]
    MissingPlayerName,
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Missing value for {0}")]
    MissingOptionValue(String),
    #[error("Unknown option: {0}")]
    UnknownOption(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LocatePlayer,
    BuildCompleteProfile,
    BuildActivityHeatmap,
    RemoteReport,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::LocatePlayer,
        Action::BuildCompleteProfile,
        Action::BuildActivityHeatmap,
        Action::RemoteReport,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::LocatePlayer => "locate-player",
            Action::BuildCompleteProfile => "build-complete-profile",
            Action::BuildActivityHeatmap => "build-activity-heatmap",
            Action::RemoteReport => "remote-report",
        }
    }

    pub fn parse(raw: &str) -> Result<Action, QueryError> {
        let key = raw.trim();
        match key {
            "locate-player" | "search_player" => Ok(Action::LocatePlayer),
            "build-complete-profile" | "get_complete_profile" => Ok(Action::BuildCompleteProfile),
            "build-activity-heatmap" | "generate_heatmap" => Ok(Action::BuildActivityHeatmap),
            "remote-report" | "remote_report" => Ok(Action::RemoteReport),
            _ => Err(QueryError::UnknownAction(key.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub name: Option<String>,
    pub team: Option<String>,
    pub season: Option<String>,
    pub league: Option<String>,
}

impl QueryParams {
    /// Positional `<name> [team]` plus `--team`, `--season`, `--league` in
    /// either `--key value` or `--key=value` form. Blank values count as
    /// absent; any other dash-prefixed argument is rejected.
    pub fn parse(args: &[String]) -> Result<Self, QueryError> {
        let mut params = QueryParams::default();
        let mut positional = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let Some(flag) = arg.strip_prefix("--") else {
                if arg.len() > 1 && arg.starts_with('-') {
                    return Err(QueryError::UnknownOption(arg.clone()));
                }
                positional.push(arg.as_str());
                continue;
            };
            let (key, inline) = match flag.split_once('=') {
                Some((key, value)) => (key, Some(value.to_string())),
                None => (flag, None),
            };
            let slot = match key {
                "team" => &mut params.team,
                "season" => &mut params.season,
                "league" => &mut params.league,
                _ => return Err(QueryError::UnknownOption(format!("--{key}"))),
            };
            let value = match inline {
                Some(value) => value,
                None => iter
                    .next()
                    .cloned()
                    .ok_or_else(|| QueryError::MissingOptionValue(format!("--{key}")))?,
            };
            *slot = non_blank(&value);
        }

        let mut positional = positional.into_iter();
        params.name = positional.next().and_then(non_blank);
        if params.team.is_none() {
            params.team = positional.next().and_then(non_blank);
        }
        Ok(params)
    }

    pub fn require_name(&self) -> Result<&str, QueryError> {
        self.name.as_deref().ok_or(QueryError::MissingPlayerName)
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Clone, Copy)]
pub struct QueryContext<'a> {
    pub population: &'a Population,
    pub provider: Option<&'a dyn PlayerSource>,
}

impl<'a> QueryContext<'a> {
    pub fn local(population: &'a Population) -> Self {
        Self {
            population,
            provider: None,
        }
    }
}

/// One structured result per call. `success` drives the process exit code.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub success: bool,
    pub body: Value,
}

impl QueryOutcome {
    fn ok(body: Value) -> Self {
        Self {
            success: true,
            body,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            body: json!({ "success": false, "error": message.into() }),
        }
    }
}

pub fn run_query(ctx: QueryContext<'_>, action: &str, args: &[String]) -> QueryOutcome {
    let result = Action::parse(action).and_then(|action| {
        let params = QueryParams::parse(args)?;
        dispatch(ctx, action, &params)
    });
    match result {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(error = %err, action, "query rejected");
            QueryOutcome::failed(err.to_string())
        }
    }
}

pub fn dispatch(
    ctx: QueryContext<'_>,
    action: Action,
    params: &QueryParams,
) -> Result<QueryOutcome, QueryError> {
    let name = params.require_name()?;
    let outcome = match action {
        Action::LocatePlayer => locate_player(ctx, name, params.team.as_deref()),
        Action::BuildCompleteProfile => complete_profile(ctx, name, params.team.as_deref()),
        Action::BuildActivityHeatmap => heatmap(ctx, name, params.team.as_deref()),
        Action::RemoteReport => remote_report(ctx, name, params),
    };
    Ok(outcome)
}

#[derive(Serialize)]
struct LocatedPlayer<'a> {
    found: bool,
    match_count: usize,
    player: PersonalInfo,
    minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

fn locate_player(ctx: QueryContext<'_>, name: &str, team: Option<&str>) -> QueryOutcome {
    let Some(hit) = locate(ctx.population, name, team) else {
        return QueryOutcome {
            success: false,
            body: json!({ "found": false, "message": PLAYER_NOT_FOUND }),
        };
    };
    let located = LocatedPlayer {
        found: true,
        match_count: hit.match_count,
        player: PersonalInfo::of(hit.record),
        minutes: hit.record.minutes,
        note: hit
            .is_ambiguous()
            .then_some("several players matched; narrow the search with a team"),
    };
    to_outcome(&located, &[])
}

fn complete_profile(ctx: QueryContext<'_>, name: &str, team: Option<&str>) -> QueryOutcome {
    let Some(hit) = locate(ctx.population, name, team) else {
        return QueryOutcome::failed(PLAYER_NOT_FOUND);
    };
    let profile = build_profile(ctx.population, hit.record);
    to_outcome(
        &profile,
        &[
            ("success", json!(true)),
            ("match_count", json!(hit.match_count)),
        ],
    )
}

fn heatmap(ctx: QueryContext<'_>, name: &str, team: Option<&str>) -> QueryOutcome {
    let Some(Located {
        record,
        match_count,
        ..
    }) = locate(ctx.population, name, team)
    else {
        return QueryOutcome::failed(PLAYER_NOT_FOUND);
    };
    let grid = activity_heatmap(&record.position, seed_for(&record.name, Some(record.team.as_str())));
    QueryOutcome::ok(json!({
        "success": true,
        "player": record.name,
        "team": record.team,
        "position": record.position.as_str(),
        "match_count": match_count,
        "heatmap": grid,
    }))
}

fn remote_report(ctx: QueryContext<'_>, name: &str, params: &QueryParams) -> QueryOutcome {
    let request = RemoteQuery {
        name: name.to_string(),
        team: params.team.clone(),
        season: params.season.clone(),
        league: params.league.clone(),
    };
    let sourced = resolve_record(ctx.provider, &request);
    let profile = build_profile(ctx.population, &sourced.record);
    let generated_at = chrono::Utc::now().to_rfc3339();
    to_outcome(
        &profile,
        &[
            ("success", json!(true)),
            ("source", json!(sourced.source)),
            ("season", json!(params.season)),
            ("league", json!(params.league)),
            ("generated_at", json!(generated_at)),
        ],
    )
}

/// Serializes `value` as an object and adds the `extra` fields to it.
fn to_outcome<T: Serialize>(value: &T, extra: &[(&str, Value)]) -> QueryOutcome {
    let fields = match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            let mut map = Map::new();
            map.insert("result".to_string(), other);
            map
        }
        Err(err) => return QueryOutcome::failed(format!("failed to serialize result: {err}")),
    };
    let mut body = Map::new();
    for (key, value) in extra {
        body.insert((*key).to_string(), value.clone());
    }
    body.extend(fields);
    QueryOutcome::ok(Value::Object(body))
}
