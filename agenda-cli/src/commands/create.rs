use agenda_core::appointment::{Frequency, Recurrence, UserId};
use agenda_core::time::parse_timestamp;
use agenda_core::validate::AppointmentDraft;
use agenda_core::window::Granularity;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use clap::Args;
use dialoguer::Input;
use owo_colors::OwoColorize;

use super::{Ctx, report_validation, with_spinner};

/// Fields of an appointment as given on the command line.
#[derive(Args, Debug, Clone, Default)]
pub struct DraftArgs {
    /// Title (prompted for when omitted)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Start, e.g. "2025-03-20T15:00" or "tomorrow 3pm" (prompted for when omitted)
    #[arg(short, long)]
    pub start: Option<String>,

    /// End date/time
    #[arg(short, long, conflicts_with = "duration")]
    pub end: Option<String>,

    /// Length instead of an end, e.g. "45m" or "1h 30m" (default 1h)
    #[arg(short, long)]
    pub duration: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    /// Meeting link
    #[arg(long)]
    pub link: Option<String>,

    /// Participant user id (repeatable, see `agenda users`)
    #[arg(short, long = "participant")]
    pub participants: Vec<UserId>,

    /// Repeat daily, weekly or monthly
    #[arg(long, value_parser = parse_frequency)]
    pub repeat: Option<Frequency>,

    /// Repeat every N days/weeks/months
    #[arg(long, default_value_t = 1)]
    pub every: u32,

    /// Weekdays for weekly repeats, e.g. "mon,wed"
    #[arg(long, value_delimiter = ',', value_parser = parse_weekday)]
    pub on: Vec<Weekday>,

    /// Days of the month for monthly repeats, e.g. "1,15"
    #[arg(long, value_delimiter = ',')]
    pub days: Vec<u32>,

    /// First day of the series (defaults to the start)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day of the series
    #[arg(long)]
    pub until: Option<String>,
}

impl DraftArgs {
    /// Build a draft, prompting for a missing title or start.
    pub fn into_draft(self, organizer_id: UserId) -> Result<AppointmentDraft> {
        let title = match self.title {
            Some(t) => t,
            None => Input::<String>::new()
                .with_prompt("  Title")
                .interact_text()?,
        };

        let start = match self.start.as_deref() {
            Some(s) => parse_when(s)?,
            None => prompt_with_retry("  When?", parse_when)?,
        };

        let end = match (self.end.as_deref(), self.duration.as_deref()) {
            (Some(e), _) => parse_when(e)?,
            (None, Some(d)) => start + parse_duration(d)?,
            (None, None) => start + Duration::hours(1),
        };

        let recurrence = match self.repeat {
            None | Some(Frequency::None) => None,
            Some(frequency) => Some(Recurrence {
                frequency,
                interval: self.every,
                start: match self.from.as_deref() {
                    Some(s) => parse_when(s)?,
                    None => start,
                },
                end: self.until.as_deref().map(parse_until).transpose()?,
                days_of_week: self.on,
                days_of_month: self.days,
            }),
        };

        Ok(AppointmentDraft {
            description: self.description,
            location: self.location,
            meeting_link: self.link,
            participant_ids: self.participants,
            recurrence,
            ..AppointmentDraft::new(organizer_id, title, start, end)
        })
    }
}

pub async fn run(ctx: &Ctx, args: DraftArgs) -> Result<()> {
    let organizer = require_user(ctx)?;
    let draft = args.into_draft(organizer)?;

    let mut session = ctx.session(draft.start.date(), Granularity::Day)?;
    with_spinner("Creating appointment", session.create(&draft))
        .await
        .map_err(report_validation)?;

    Ok(())
}

/// The logged-in user, who organizes what they create.
pub fn require_user(ctx: &Ctx) -> Result<UserId> {
    ctx.config.user_id.context(
        "No user_id configured. Set `user_id` in your config (see `agenda users` for ids)",
    )
}

/// Parse a date/time: the API's format first, then natural language.
pub fn parse_when(input: &str) -> Result<NaiveDateTime> {
    if let Some(dt) = parse_timestamp(input) {
        return Ok(dt);
    }
    fuzzydate::parse(input).map_err(|_| anyhow::anyhow!("Could not parse date/time: \"{input}\""))
}

/// A bare date means the whole of that day.
fn parse_until(input: &str) -> Result<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
        return Ok(date.and_time(last_second));
    }
    parse_when(input)
}

fn parse_duration(input: &str) -> Result<Duration> {
    let std = humantime::parse_duration(input.trim())
        .map_err(|e| anyhow::anyhow!("Could not parse duration \"{input}\": {e}"))?;
    Duration::from_std(std).context("Duration out of range")
}

fn parse_frequency(input: &str) -> Result<Frequency, String> {
    Frequency::parse(input).ok_or_else(|| format!("expected daily, weekly or monthly, got '{input}'"))
}

fn parse_weekday(input: &str) -> Result<Weekday, String> {
    input
        .trim()
        .parse::<Weekday>()
        .map_err(|_| format!("unknown weekday '{input}'"))
}

/// Prompt the user with retry on parse errors.
fn prompt_with_retry<F>(prompt: &str, parse: F) -> Result<NaiveDateTime>
where
    F: Fn(&str) -> Result<NaiveDateTime>,
{
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        match parse(&input) {
            Ok(result) => return Ok(result),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}
