//! Date-driven "current" flag transitions for terms and sessions.
//!
//! A pass runs in two phases per entity kind:
//!
//! 1. Demote every non-manual current period whose end date has passed.
//! 2. Walk the non-manual, active periods whose window contains today in
//!    `(start_date, id)` order. Each one becomes current unless a manual pin
//!    or an already-current period covering today exists in the same scope;
//!    otherwise the other non-manual current periods of the scope are cleared.
//!
//! Terms are scoped by their session; sessions share a single global scope.
//! Manual pins are never touched. A second pass on the same day plans nothing.

use chrono::NaiveDate;
use tracing::{info, instrument};

use gradeline_core::AppError;
use gradeline_models::{AcademicSession, AcademicSessionId, CurrentFlags, Term, TermId};
use gradeline_observability::track_period_transition;

use crate::store::SessionDirectory;

/// A period whose current flag follows the calendar.
pub trait Schedulable {
    type Id: Copy + Ord;
    type Scope: Copy + Eq;

    fn id(&self) -> Self::Id;
    /// Only one non-manual period per scope may be current.
    fn scope(&self) -> Self::Scope;
    fn start_date(&self) -> NaiveDate;
    fn end_date(&self) -> NaiveDate;
    fn flags(&self) -> CurrentFlags;
    fn is_active(&self) -> bool;

    fn contains(&self, day: NaiveDate) -> bool {
        self.start_date() <= day && day <= self.end_date()
    }
}

impl Schedulable for Term {
    type Id = TermId;
    type Scope = AcademicSessionId;

    fn id(&self) -> TermId {
        self.id
    }

    fn scope(&self) -> AcademicSessionId {
        self.academic_session_id
    }

    fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    fn flags(&self) -> CurrentFlags {
        CurrentFlags::new(self.is_current, self.is_manual)
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Schedulable for AcademicSession {
    type Id = AcademicSessionId;
    type Scope = ();

    fn id(&self) -> AcademicSessionId {
        self.id
    }

    fn scope(&self) -> Self::Scope {}

    fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    fn flags(&self) -> CurrentFlags {
        CurrentFlags::new(self.is_current, self.is_manual)
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// One planned flag change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<Id> {
    pub id: Id,
    pub before: CurrentFlags,
    pub after: CurrentFlags,
}

impl<Id> Transition<Id> {
    pub fn change(&self) -> &'static str {
        if self.after.is_current {
            "activated"
        } else {
            "deactivated"
        }
    }
}

/// Changes applied by one [`TermStateMachine::run`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionReport {
    pub terms: Vec<Transition<TermId>>,
    pub sessions: Vec<Transition<AcademicSessionId>>,
}

impl TransitionReport {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.sessions.is_empty()
    }
}

fn siblings<T: Schedulable>(items: &[T], index: usize) -> impl Iterator<Item = usize> + '_ {
    let scope = items[index].scope();
    (0..items.len()).filter(move |&i| i != index && items[i].scope() == scope)
}

pub struct TermStateMachine;

impl TermStateMachine {
    /// Plan the flag changes for `items` on `today` without touching storage.
    pub fn plan<T: Schedulable>(items: &[T], today: NaiveDate) -> Vec<Transition<T::Id>> {
        let mut flags: Vec<CurrentFlags> = items.iter().map(Schedulable::flags).collect();

        for (item, f) in items.iter().zip(flags.iter_mut()) {
            if f.is_current && !f.is_manual && item.end_date() < today {
                f.is_current = false;
            }
        }

        let mut candidates: Vec<usize> = (0..items.len())
            .filter(|&i| {
                let item = &items[i];
                !flags[i].is_current && !flags[i].is_manual && item.is_active() && item.contains(today)
            })
            .collect();
        candidates.sort_by_key(|&i| (items[i].start_date(), items[i].id()));

        for candidate in candidates {
            let blocked = siblings(items, candidate).any(|i| {
                flags[i].is_current && (flags[i].is_manual || items[i].contains(today))
            });
            if blocked {
                continue;
            }

            for i in siblings(items, candidate) {
                if flags[i].is_current && !flags[i].is_manual {
                    flags[i].is_current = false;
                }
            }
            flags[candidate] = CurrentFlags::new(true, false);
        }

        items
            .iter()
            .zip(flags)
            .filter(|(item, after)| item.flags() != *after)
            .map(|(item, after)| Transition {
                id: item.id(),
                before: item.flags(),
                after,
            })
            .collect()
    }

    /// Run one pass over every term, then every session, persisting the
    /// planned changes through `store`.
    #[instrument(skip(store))]
    pub async fn run<S>(store: &mut S, today: NaiveDate) -> Result<TransitionReport, AppError>
    where
        S: SessionDirectory + Send,
    {
        let terms = store.list_all_terms().await?;
        let term_changes = Self::plan(&terms, today);
        for transition in &term_changes {
            store
                .update_term_flags(transition.id, transition.after)
                .await?;
            track_period_transition("term", transition.change());
            info!(term_id = %transition.id, change = transition.change(), "Term transitioned");
        }

        let sessions = store.list_sessions().await?;
        let session_changes = Self::plan(&sessions, today);
        for transition in &session_changes {
            store
                .update_session_flags(transition.id, transition.after)
                .await?;
            track_period_transition("session", transition.change());
            info!(session_id = %transition.id, change = transition.change(), "Academic session transitioned");
        }

        Ok(TransitionReport {
            terms: term_changes,
            sessions: session_changes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use gradeline_models::TermName;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn term(
        session: AcademicSessionId,
        name: TermName,
        start: NaiveDate,
        end: NaiveDate,
        flags: CurrentFlags,
    ) -> Term {
        let now = Utc::now();
        Term {
            id: TermId::new(),
            academic_session_id: session,
            name,
            display_name: name.display_name().to_string(),
            start_date: start,
            end_date: end,
            is_current: flags.is_current,
            is_manual: flags.is_manual,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn school_year(session: AcademicSessionId, current: Option<TermName>) -> Vec<Term> {
        let flags = |name| CurrentFlags::new(current == Some(name), false);
        vec![
            term(session, TermName::First, d(2024, 9, 1), d(2024, 12, 31), flags(TermName::First)),
            term(session, TermName::Second, d(2025, 1, 1), d(2025, 4, 30), flags(TermName::Second)),
            term(session, TermName::Third, d(2025, 5, 1), d(2025, 7, 31), flags(TermName::Third)),
        ]
    }

    fn apply(terms: &mut [Term], plan: &[Transition<TermId>]) {
        for t in plan {
            let term = terms.iter_mut().find(|x| x.id == t.id).unwrap();
            term.is_current = t.after.is_current;
            term.is_manual = t.after.is_manual;
        }
    }

    #[test]
    fn test_expired_term_hands_over_to_next() {
        let session = AcademicSessionId::new();
        let terms = school_year(session, Some(TermName::First));

        let plan = TermStateMachine::plan(&terms, d(2025, 1, 15));

        assert_eq!(plan.len(), 2);
        let demoted = plan.iter().find(|t| t.id == terms[0].id).unwrap();
        assert!(!demoted.after.is_current);
        let promoted = plan.iter().find(|t| t.id == terms[1].id).unwrap();
        assert_eq!(promoted.after, CurrentFlags::new(true, false));
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let session = AcademicSessionId::new();
        let mut terms = school_year(session, None);
        let today = d(2025, 3, 1);

        let first = TermStateMachine::plan(&terms, today);
        assert_eq!(first.len(), 1);
        apply(&mut terms, &first);

        assert!(TermStateMachine::plan(&terms, today).is_empty());
    }

    #[test]
    fn test_manual_pin_is_never_replaced_or_demoted() {
        let session = AcademicSessionId::new();
        let mut terms = school_year(session, None);
        terms[0].is_current = true;
        terms[0].is_manual = true;

        // Well past the pinned term's end date, inside the third term.
        let plan = TermStateMachine::plan(&terms, d(2025, 6, 1));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_gap_between_windows_leaves_nothing_current() {
        let session = AcademicSessionId::new();
        let mut terms = school_year(session, Some(TermName::Third));
        terms[2].end_date = d(2025, 7, 31);

        let plan = TermStateMachine::plan(&terms, d(2025, 8, 15));
        assert_eq!(plan.len(), 1);
        assert!(!plan[0].after.is_current);
    }

    #[test]
    fn test_overlapping_windows_first_processed_wins() {
        let session = AcademicSessionId::new();
        let none = CurrentFlags::default();
        let early = term(session, TermName::First, d(2025, 1, 1), d(2025, 3, 31), none);
        let late = term(session, TermName::Second, d(2025, 2, 1), d(2025, 4, 30), none);
        let mut terms = vec![late, early];

        let plan = TermStateMachine::plan(&terms, d(2025, 2, 15));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].id, terms[1].id);

        apply(&mut terms, &plan);
        assert!(TermStateMachine::plan(&terms, d(2025, 2, 15)).is_empty());
    }

    #[test]
    fn test_terms_are_scoped_per_session() {
        let a = AcademicSessionId::new();
        let b = AcademicSessionId::new();
        let mut terms = school_year(a, Some(TermName::Second));
        terms.push(term(
            b,
            TermName::First,
            d(2025, 1, 1),
            d(2025, 4, 30),
            CurrentFlags::default(),
        ));

        let plan = TermStateMachine::plan(&terms, d(2025, 2, 1));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].id, terms[3].id);
    }

    #[test]
    fn test_inactive_period_is_not_promoted() {
        let session = AcademicSessionId::new();
        let mut terms = school_year(session, None);
        terms[1].is_active = false;

        assert!(TermStateMachine::plan(&terms, d(2025, 2, 1)).is_empty());
    }

    #[test]
    fn test_upcoming_current_flag_is_cleared_when_window_starts() {
        let session = AcademicSessionId::new();
        let terms = school_year(session, Some(TermName::Third));

        let plan = TermStateMachine::plan(&terms, d(2025, 2, 1));
        assert_eq!(plan.len(), 2);
        assert!(plan.iter().any(|t| t.id == terms[2].id && !t.after.is_current));
        assert!(plan.iter().any(|t| t.id == terms[1].id && t.after.is_current));
    }

    #[tokio::test]
    async fn test_run_persists_terms_and_sessions() {
        let mut store = MemoryStore::new();
        let now = Utc::now();
        let session = AcademicSession {
            id: AcademicSessionId::new(),
            name: "2024/2025".to_string(),
            start_date: d(2024, 9, 1),
            end_date: d(2025, 7, 31),
            is_current: false,
            is_manual: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        store.terms = school_year(session.id, None);
        store.sessions.push(session.clone());

        let report = TermStateMachine::run(&mut store, d(2024, 10, 1)).await.unwrap();
        assert_eq!(report.terms.len(), 1);
        assert_eq!(report.sessions.len(), 1);
        assert!(store.session(session.id).unwrap().is_current);
        assert!(store.terms[0].is_current);

        let again = TermStateMachine::run(&mut store, d(2024, 10, 1)).await.unwrap();
        assert!(again.is_empty());
    }
}
