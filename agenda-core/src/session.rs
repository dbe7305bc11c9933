//! The calendar session: navigation, the appointment snapshot and
//! mutations, wired to a backend and a notifier.
//!
//! The snapshot is replaced wholesale on every refresh and never patched
//! locally. Layout is recomputed from it on demand.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::AppointmentApi;
use crate::appointment::{Appointment, AppointmentId, UserId};
use crate::error::AgendaResult;
use crate::layout::{LayoutBlock, LayoutEngine, MonthLayout};
use crate::notifier::{Notifier, ToastSurface};
use crate::recurrence::expand_all;
use crate::upcoming::{AccessMode, upcoming};
use crate::validate::AppointmentDraft;
use crate::window::{Granularity, Navigator, ViewWindow};

/// Layout of whichever view is selected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ViewLayout<'a> {
    Day {
        date: NaiveDate,
        blocks: Vec<LayoutBlock<'a>>,
    },
    Week {
        week_start: NaiveDate,
        blocks: Vec<LayoutBlock<'a>>,
    },
    Month(MonthLayout<'a>),
}

impl<'a> ViewLayout<'a> {
    pub fn blocks(&self) -> &[LayoutBlock<'a>] {
        match self {
            ViewLayout::Day { blocks, .. } | ViewLayout::Week { blocks, .. } => blocks,
            ViewLayout::Month(layout) => &layout.blocks,
        }
    }
}

pub struct CalendarSession<A: AppointmentApi, S: ToastSurface> {
    api: A,
    engine: LayoutEngine,
    navigator: Navigator,
    notifier: Notifier<S>,
    user: Option<UserId>,
    appointments: Vec<Appointment>,
    rejected: usize,
}

impl<A: AppointmentApi, S: ToastSurface> CalendarSession<A, S> {
    pub fn new(
        api: A,
        engine: LayoutEngine,
        notifier: Notifier<S>,
        anchor: NaiveDate,
        granularity: Granularity,
    ) -> Self {
        let navigator = Navigator::new(anchor, granularity, engine.config().week_start);
        CalendarSession {
            api,
            engine,
            navigator,
            notifier,
            user: None,
            appointments: Vec::new(),
            rejected: 0,
        }
    }

    /// Set the logged-in user, which decides edit vs. view access.
    pub fn with_user(mut self, user: Option<UserId>) -> Self {
        self.user = user;
        self
    }

    /// Re-fetch everything the current view shows, replacing the snapshot.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn refresh(&mut self) -> AgendaResult<&[Appointment]> {
        let window = self.navigator.fetch_window();
        let report = match self.api.fetch_appointments(&window).await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "failed to fetch appointments");
                return Err(e);
            }
        };

        self.rejected = report.rejected.len();
        self.appointments = report.into_appointments();
        info!(
            from = %window.start,
            to = %window.end,
            appointments = self.appointments.len(),
            rejected = self.rejected,
            "refreshed appointments"
        );
        Ok(&self.appointments)
    }

    pub async fn create(&mut self, draft: &AppointmentDraft) -> AgendaResult<()> {
        draft.validate()?;
        let result = self.api.create_appointment(draft).await;
        self.after_mutation(result, "Appointment created successfully!", "Error creating appointment!")
            .await
    }

    pub async fn update(&mut self, id: AppointmentId, draft: &AppointmentDraft) -> AgendaResult<()> {
        draft.validate()?;
        let result = self.api.update_appointment(id, draft).await;
        self.after_mutation(result, "Appointment updated successfully!", "Error updating appointment!")
            .await
    }

    pub async fn cancel(&mut self, id: AppointmentId, reason: &str) -> AgendaResult<()> {
        let result = self.api.cancel_appointment(id, reason).await;
        self.after_mutation(
            result,
            "Appointment cancelled successfully!",
            "Error cancelling appointment!",
        )
        .await
    }

    async fn after_mutation(
        &mut self,
        result: AgendaResult<()>,
        success: &str,
        failure: &str,
    ) -> AgendaResult<()> {
        match result {
            Ok(()) => {
                self.notifier.success(success);
                // The mutation went through; a failed re-fetch only leaves the view stale.
                if let Err(e) = self.refresh().await {
                    warn!(error = %e, "re-fetch after mutation failed");
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "{failure}");
                self.notifier.error(failure);
                Err(e)
            }
        }
    }

    pub fn next(&mut self) {
        self.navigator.next();
    }

    pub fn previous(&mut self) {
        self.navigator.previous();
    }

    pub fn jump_to(&mut self, date: NaiveDate) {
        self.navigator.jump_to(date);
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.navigator.set_granularity(granularity);
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn window(&self) -> ViewWindow {
        self.navigator.window()
    }

    /// Base appointments from the last refresh.
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    /// Records the last refresh excluded as malformed.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Snapshot expanded into concrete instances for the current view.
    pub fn instances(&self) -> Vec<Appointment> {
        let window = self.navigator.fetch_window();
        expand_all(&self.appointments, window.start, window.end)
    }

    /// Lay out `instances` (see [`Self::instances`]) for the selected view.
    pub fn layout<'a>(&self, instances: &'a [Appointment]) -> ViewLayout<'a> {
        let window = self.navigator.window();
        match self.navigator.granularity() {
            Granularity::Day => ViewLayout::Day {
                date: window.start_date(),
                blocks: self.engine.layout_day(window.start_date(), instances),
            },
            Granularity::Week => ViewLayout::Week {
                week_start: window.start_date(),
                blocks: self.engine.layout_week(window.start_date(), instances),
            },
            Granularity::Month => {
                ViewLayout::Month(self.engine.layout_month(window.start_date(), instances))
            }
        }
    }

    /// Instances that have not ended by `now`, up to the end of the fetched
    /// range. Recurring series contribute their future occurrences.
    pub fn upcoming(&self, now: NaiveDateTime, limit: usize) -> Vec<Appointment> {
        let window = self.navigator.fetch_window();
        let instances = expand_all(&self.appointments, now, window.end);
        upcoming(&instances, now, limit).into_iter().cloned().collect()
    }

    pub fn access_mode(&self, appointment: &Appointment) -> AccessMode {
        AccessMode::for_user(self.user, appointment)
    }

    pub fn notifier(&self) -> &Notifier<S> {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier<S> {
        &mut self.notifier
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::api::{AppointmentSource, MutationSink};
    use crate::appointment::{Frequency, Recurrence};
    use crate::config::LayoutConfig;
    use crate::error::AgendaError;
    use crate::layout::Placement;
    use crate::layout::test_support::{appt, dt};
    use crate::notifier::ToastKind;
    use crate::notifier::test_support::RecordingSurface;
    use crate::record::{AppointmentRecord, SanitizeReport, sanitize};

    #[derive(Default)]
    struct FakeApi {
        records: Mutex<Vec<AppointmentRecord>>,
        windows: Mutex<Vec<ViewWindow>>,
        calls: Mutex<Vec<String>>,
        fail_mutations: bool,
        fail_fetch: bool,
    }

    impl FakeApi {
        fn with(appointments: &[Appointment]) -> Self {
            FakeApi {
                records: Mutex::new(appointments.iter().map(AppointmentRecord::from).collect()),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AppointmentSource for FakeApi {
        async fn fetch_appointments(&self, window: &ViewWindow) -> AgendaResult<SanitizeReport> {
            if self.fail_fetch {
                return Err(AgendaError::Api {
                    status: 500,
                    message: "boom".into(),
                });
            }
            self.windows.lock().unwrap().push(*window);
            Ok(sanitize(self.records.lock().unwrap().clone()))
        }
    }

    #[async_trait]
    impl MutationSink for FakeApi {
        async fn create_appointment(&self, draft: &AppointmentDraft) -> AgendaResult<()> {
            self.calls.lock().unwrap().push(format!("create {}", draft.title));
            if self.fail_mutations {
                return Err(AgendaError::Api {
                    status: 400,
                    message: "rejected".into(),
                });
            }
            let mut record = draft.to_record();
            let mut records = self.records.lock().unwrap();
            record.appointment_id = Some(100 + records.len() as i64);
            records.push(record);
            Ok(())
        }

        async fn update_appointment(&self, id: AppointmentId, draft: &AppointmentDraft) -> AgendaResult<()> {
            self.calls.lock().unwrap().push(format!("update {id} {}", draft.title));
            Ok(())
        }

        async fn cancel_appointment(&self, id: AppointmentId, reason: &str) -> AgendaResult<()> {
            self.calls.lock().unwrap().push(format!("cancel {id} {reason}"));
            if self.fail_mutations {
                return Err(AgendaError::Unauthorized);
            }
            Ok(())
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn session(api: FakeApi, granularity: Granularity) -> CalendarSession<FakeApi, RecordingSurface> {
        CalendarSession::new(
            api,
            LayoutEngine::new(LayoutConfig::default()).unwrap(),
            Notifier::new(RecordingSurface::default(), Duration::from_secs(3)),
            day("2025-01-15"),
            granularity,
        )
    }

    fn draft(title: &str) -> AppointmentDraft {
        AppointmentDraft {
            participant_ids: vec![2],
            ..AppointmentDraft::new(1, title, dt("2025-01-15T09:00"), dt("2025-01-15T10:00"))
        }
    }

    #[tokio::test]
    async fn month_refresh_fetches_the_whole_grid() {
        let mut s = session(FakeApi::default(), Granularity::Month);
        s.refresh().await.unwrap();

        let windows = s.api().windows.lock().unwrap().clone();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start, dt("2024-12-29T00:00"));
        assert_eq!(windows[0].end, dt("2025-02-02T00:00"));
    }

    #[tokio::test]
    async fn refresh_replaces_the_snapshot_and_counts_rejections() {
        let api = FakeApi::with(&[appt(1, "2025-01-15T09:00", "2025-01-15T10:00")]);
        api.records.lock().unwrap().push(AppointmentRecord {
            appointment_id: Some(2),
            start_time: Some("2025-01-15T11:00:00".into()),
            end_time: Some("2025-01-15T10:00:00".into()),
            ..Default::default()
        });
        let mut s = session(api, Granularity::Day);

        assert_eq!(s.refresh().await.unwrap().len(), 1);
        assert_eq!(s.rejected(), 1);

        s.api().records.lock().unwrap().clear();
        s.refresh().await.unwrap();
        assert!(s.appointments().is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let mut s = session(FakeApi::with(&[appt(1, "2025-01-15T09:00", "2025-01-15T10:00")]), Granularity::Day);
        s.refresh().await.unwrap();

        s.api = FakeApi {
            fail_fetch: true,
            ..Default::default()
        };
        assert!(s.refresh().await.is_err());
        assert_eq!(s.appointments().len(), 1);
        assert!(s.notifier().current().is_none());
    }

    #[tokio::test]
    async fn create_toasts_and_refetches() {
        let mut s = session(FakeApi::default(), Granularity::Day);
        s.create(&draft("Checkup")).await.unwrap();

        assert_eq!(s.api().calls(), vec!["create Checkup"]);
        assert_eq!(s.appointments().len(), 1);
        let toast = s.notifier().current().unwrap();
        assert_eq!(toast.kind, ToastKind::Success);
        assert_eq!(toast.message, "Appointment created successfully!");
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_api() {
        let mut s = session(FakeApi::default(), Granularity::Day);
        let bad = AppointmentDraft {
            title: String::new(),
            ..draft("x")
        };
        let err = s.create(&bad).await.unwrap_err();
        assert!(matches!(err, AgendaError::Validation(_)));
        assert!(s.api().calls().is_empty());
        assert!(s.notifier().current().is_none());
    }

    #[tokio::test]
    async fn failed_mutation_shows_error_toast() {
        let mut s = session(
            FakeApi {
                fail_mutations: true,
                ..Default::default()
            },
            Granularity::Day,
        );
        assert!(s.cancel(7, "clash").await.is_err());
        assert_eq!(s.api().calls(), vec!["cancel 7 clash"]);
        let toast = s.notifier().current().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Error cancelling appointment!");
        assert!(s.api().windows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_sends_id_and_refetches() {
        let mut s = session(FakeApi::default(), Granularity::Week);
        s.update(12, &draft("Moved")).await.unwrap();
        assert_eq!(s.api().calls(), vec!["update 12 Moved"]);
        assert_eq!(s.api().windows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn navigation_changes_only_the_window() {
        let mut s = session(FakeApi::default(), Granularity::Week);
        s.next();
        assert_eq!(s.window().start, dt("2025-01-19T00:00"));
        s.set_granularity(Granularity::Day);
        s.jump_to(day("2025-03-01"));
        assert_eq!(s.window().start, dt("2025-03-01T00:00"));
        s.previous();
        assert_eq!(s.window().start, dt("2025-02-28T00:00"));
        assert!(s.api().windows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upcoming_lists_future_occurrences_of_a_started_series() {
        let mut weekly = appt(1, "2025-01-06T10:00", "2025-01-06T11:00");
        weekly.recurrence = Some(Recurrence {
            frequency: Frequency::Weekly,
            interval: 1,
            start: dt("2025-01-06T10:00"),
            end: None,
            days_of_week: vec![chrono::Weekday::Mon],
            days_of_month: vec![],
        });
        let mut s = session(FakeApi::with(&[weekly]), Granularity::Month);
        s.refresh().await.unwrap();

        let starts: Vec<NaiveDateTime> =
            s.upcoming(dt("2025-01-15T12:00"), 10).iter().map(|a| a.start).collect();
        assert_eq!(starts, vec![dt("2025-01-20T10:00"), dt("2025-01-27T10:00")]);

        let next = s.upcoming(dt("2025-01-15T12:00"), 1);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].occurrence, Some(day("2025-01-20")));
    }

    #[tokio::test]
    async fn layout_expands_recurrences_for_the_view() {
        let mut weekly = appt(1, "2025-01-13T10:00", "2025-01-13T11:00");
        weekly.recurrence = Some(Recurrence {
            frequency: Frequency::Weekly,
            interval: 1,
            start: dt("2025-01-13T10:00"),
            end: Some(dt("2025-01-31T11:00")),
            days_of_week: vec![chrono::Weekday::Mon, chrono::Weekday::Wed],
            days_of_month: vec![],
        });
        let mut s = session(FakeApi::with(&[weekly]), Granularity::Week);
        s.refresh().await.unwrap();

        let instances = s.instances();
        let view = s.layout(&instances);
        let ViewLayout::Week { week_start, blocks } = &view else {
            panic!("expected week layout");
        };
        assert_eq!(*week_start, day("2025-01-12"));
        let columns: Vec<usize> = blocks.iter().map(|b| b.column).collect();
        assert_eq!(columns, vec![1, 3]);

        s.set_granularity(Granularity::Month);
        let instances = s.instances();
        let view = s.layout(&instances);
        assert_eq!(view.blocks().len(), 6);
        assert!(view
            .blocks()
            .iter()
            .all(|b| matches!(b.placement, Placement::MonthBar { .. })));
    }

    #[tokio::test]
    async fn access_follows_the_organizer() {
        let s = session(FakeApi::default(), Granularity::Day).with_user(Some(1));
        let mine = appt(1, "2025-01-15T09:00", "2025-01-15T10:00");
        let mut theirs = mine.clone();
        theirs.organizer_id = 5;
        assert_eq!(s.access_mode(&mine), AccessMode::Edit);
        assert_eq!(s.access_mode(&theirs), AccessMode::View);
    }
}
