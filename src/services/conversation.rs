use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::db::queries;
use crate::models::{Booking, BookingDraft, Session, Step};
use crate::services::extract::{
    extract_name, is_yes, parse_confirmation, parse_date, parse_guests, parse_payment_method,
    Confirmation,
};
use crate::state::AppState;

const DATE_EXAMPLES: &str = "(e.g., 'tomorrow', 'January 15th', or '2027-01-15')";
const RESTART_WORDS: &[&str] = &["restart", "start over", "reset", "cancel"];
const STORAGE_FAILURE: &str =
    "Sorry, something went wrong while saving your booking. Please type 'confirm' to try again.";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The step's value was accepted and the session moved on.
    Advanced(String),
    /// Nothing usable in the text; the session stays where it was.
    Rejected(String),
    /// Slots cleared and the script restarted at the name step.
    Reset(String),
    /// The user confirmed; the draft must be persisted before the session completes.
    Book(BookingDraft),
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub complete: bool,
    pub booking: Option<Booking>,
    pub session_id: String,
}

pub fn process_message(
    state: &AppState,
    session_id: Option<&str>,
    message: &str,
) -> anyhow::Result<ChatReply> {
    let ttl = state.config.session_ttl_minutes;

    let existing = match session_id {
        Some(id) => {
            let db = state.db();
            queries::get_session(&db, id)?
        }
        None => None,
    };

    let mut session = existing.unwrap_or_else(|| {
        let session = Session::new(ttl);
        tracing::info!(session = %session.id, requested = ?session_id, "starting new session");
        session
    });

    let today = Local::now().date_naive();
    let from_step = session.step;
    let outcome = advance(&mut session, message, today);
    session.touch(ttl);

    let mut booking = None;
    let reply = match outcome {
        Outcome::Advanced(reply) | Outcome::Rejected(reply) | Outcome::Reset(reply) => reply,
        Outcome::Book(draft) => {
            let stored = {
                let mut db = state.db();
                queries::complete_booking(&mut db, &session, &draft)
            };
            match stored {
                Ok((completed, stored)) => {
                    tracing::info!(session = %session.id, booking_id = stored.id, "booking confirmed");
                    session = completed;
                    let reply = confirmed_reply(&stored);
                    booking = Some(stored);
                    reply
                }
                Err(e) => {
                    tracing::error!(session = %session.id, error = %e, "failed to save booking");
                    STORAGE_FAILURE.to_string()
                }
            }
        }
    };

    tracing::info!(
        session = %session.id,
        from = from_step.as_str(),
        to = session.step.as_str(),
        "processed message"
    );

    {
        let db = state.db();
        queries::save_session(&db, &session)?;
    }

    Ok(ChatReply {
        reply,
        complete: booking.is_some(),
        booking,
        session_id: session.id,
    })
}

/// Runs one step of the script against `text`. Pure apart from mutating
/// `session`; persistence is left to the caller via [`Outcome::Book`].
pub fn advance(session: &mut Session, text: &str, today: NaiveDate) -> Outcome {
    let text = text.trim();
    let lowered = text.to_lowercase();

    let restartable = !matches!(session.step, Step::Confirm | Step::Complete);
    if restartable && RESTART_WORDS.contains(&lowered.as_str()) {
        session.reset();
        return Outcome::Reset("No problem, let's start over! What's your name?".to_string());
    }

    match session.step {
        Step::Name => match extract_name(text) {
            Some(name) => {
                let reply = format!(
                    "Nice to meet you, {name}! When would you like to check in? {DATE_EXAMPLES}"
                );
                session.slots.name = Some(name);
                move_on(session, reply)
            }
            None => Outcome::Rejected(
                "I didn't catch your name. Could you please tell me your name?".to_string(),
            ),
        },

        Step::Checkin => match parse_date(text, today) {
            Some(date) if date < today => Outcome::Rejected(format!(
                "Check-in can't be in the past (today is {today}). Please choose today or a later date."
            )),
            Some(date) => {
                session.slots.checkin = Some(date);
                move_on(
                    session,
                    format!("Great! Check-in on {date}. When would you like to check out?"),
                )
            }
            None => Outcome::Rejected(format!(
                "I couldn't understand the date. Please provide your check-in date {DATE_EXAMPLES}."
            )),
        },

        Step::Checkout => {
            let Some(checkin) = session.slots.checkin else {
                // Only reachable through a hand-edited session row.
                session.step = Step::Checkin;
                return Outcome::Rejected(format!(
                    "I seem to have lost your check-in date. When would you like to check in? {DATE_EXAMPLES}"
                ));
            };
            match parse_date(text, today) {
                Some(date) if date <= checkin => Outcome::Rejected(format!(
                    "Check-out date must be after check-in date ({checkin}). Please provide a later check-out date."
                )),
                Some(date) => {
                    session.slots.checkout = Some(date);
                    let nights = (date - checkin).num_days();
                    move_on(
                        session,
                        format!(
                            "Perfect! Check-out on {date} ({nights} {}). How many guests will be staying?",
                            plural(nights, "night", "nights")
                        ),
                    )
                }
                None => Outcome::Rejected(
                    "I couldn't understand the check-out date. Please provide a valid date."
                        .to_string(),
                ),
            }
        }

        Step::Guests => match parse_guests(text) {
            Some(guests) => {
                session.slots.guests = Some(guests);
                move_on(
                    session,
                    format!(
                        "Noted: {guests} {}. Would you like to include breakfast? (yes/no)",
                        plural(i64::from(guests), "guest", "guests")
                    ),
                )
            }
            None => {
                Outcome::Rejected("Please tell me the number of guests (1-10 people).".to_string())
            }
        },

        Step::Breakfast => match is_yes(text) {
            Some(breakfast) => {
                session.slots.breakfast = Some(breakfast);
                let with = if breakfast { "with" } else { "without" };
                move_on(
                    session,
                    format!(
                        "Excellent, {with} breakfast! What's your preferred payment method? \
                         (credit card, debit card, cash, paypal, or 'skip')"
                    ),
                )
            }
            None => Outcome::Rejected(
                "Please answer yes or no for breakfast preference.".to_string(),
            ),
        },

        Step::Payment => match parse_payment_method(text) {
            Some(method) => {
                session.slots.payment_method = Some(method.to_string());
                match session.slots.to_draft() {
                    Some(draft) => move_on(session, summary(&draft)),
                    None => restart_incomplete(session),
                }
            }
            None => Outcome::Rejected(
                "What's your preferred payment method? (credit card, debit card, cash, paypal, or 'skip')"
                    .to_string(),
            ),
        },

        Step::Confirm => match parse_confirmation(text) {
            Some(Confirmation::Confirm) => match session.slots.to_draft() {
                Some(draft) => Outcome::Book(draft),
                None => restart_incomplete(session),
            },
            Some(Confirmation::Cancel) => {
                session.reset();
                Outcome::Reset("Booking cancelled. Let's start over! What's your name?".to_string())
            }
            None => Outcome::Rejected(
                "Please type 'confirm' to complete your booking or 'cancel' to start over."
                    .to_string(),
            ),
        },

        // Whatever was said, a finished session begins the next booking.
        Step::Complete => {
            let previous = session.booking_id;
            session.reset();
            Outcome::Reset(match previous {
                Some(id) => format!(
                    "Your booking #{id} is already confirmed. Let's start a new one! What's your name?"
                ),
                None => "Let's start over! What's your name?".to_string(),
            })
        }
    }
}

fn move_on(session: &mut Session, reply: String) -> Outcome {
    session.step = session.step.next();
    Outcome::Advanced(reply)
}

fn restart_incomplete(session: &mut Session) -> Outcome {
    tracing::warn!(session = %session.id, "session reached confirmation with missing details");
    session.reset();
    Outcome::Reset(
        "Some of your booking details went missing, so let's start over. What's your name?"
            .to_string(),
    )
}

fn summary(draft: &BookingDraft) -> String {
    let nights = draft.nights();
    format!(
        "Please confirm your booking details:\n\n\
         • Name: {}\n\
         • Check-in: {}\n\
         • Check-out: {} ({nights} {})\n\
         • Guests: {}\n\
         • Breakfast: {}\n\
         • Payment: {}\n\n\
         Type 'confirm' to complete your booking or 'cancel' to start over.",
        draft.name,
        draft.checkin,
        draft.checkout,
        plural(nights, "night", "nights"),
        draft.guests,
        if draft.breakfast { "Yes" } else { "No" },
        draft.payment_method,
    )
}

fn confirmed_reply(booking: &Booking) -> String {
    let nights = booking.nights();
    format!(
        "🎉 Booking confirmed! Your reservation ID is #{}. See you on {} for {nights} {}. \
         Thank you for choosing our hotel!",
        booking.id,
        booking.checkin,
        plural(nights, "night", "nights"),
    )
}

fn plural<'a>(n: i64, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A Monday.
    fn today() -> NaiveDate {
        date("2026-10-19")
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn run(session: &mut Session, inputs: &[&str]) -> Outcome {
        let mut last = None;
        for input in inputs {
            last = Some(advance(session, input, today()));
        }
        last.unwrap()
    }

    fn at_confirm() -> Session {
        let mut session = Session::new(60);
        run(
            &mut session,
            &["Hi, I'm Dana", "tomorrow", "friday", "two", "yes", "cash"],
        );
        assert_eq!(session.step, Step::Confirm);
        session
    }

    #[test]
    fn test_name_step() {
        let mut session = Session::new(60);
        let outcome = advance(&mut session, "Hi, I'm Dana", today());
        assert!(matches!(outcome, Outcome::Advanced(ref r) if r.contains("Dana") && r.contains("check in")));
        assert_eq!(session.step, Step::Checkin);
        assert_eq!(session.slots.name.as_deref(), Some("Dana"));
    }

    #[test]
    fn test_unclear_input_keeps_step() {
        let mut session = Session::new(60);
        assert!(matches!(advance(&mut session, "hello", today()), Outcome::Rejected(_)));
        assert_eq!(session.step, Step::Name);

        run(&mut session, &["Dana"]);
        assert!(matches!(advance(&mut session, "whenever", today()), Outcome::Rejected(_)));
        assert_eq!(session.step, Step::Checkin);
        assert_eq!(session.slots.checkin, None);
    }

    #[test]
    fn test_checkin_stores_iso_date() {
        let mut session = Session::new(60);
        let outcome = run(&mut session, &["Dana", "tomorrow"]);
        assert_eq!(
            outcome,
            Outcome::Advanced(
                "Great! Check-in on 2026-10-20. When would you like to check out?".to_string()
            )
        );
        assert_eq!(session.slots.checkin, Some(date("2026-10-20")));
        assert_eq!(session.step, Step::Checkout);
    }

    #[test]
    fn test_checkin_in_past_rejected() {
        let mut session = Session::new(60);
        let outcome = run(&mut session, &["Dana", "2026-10-01"]);
        assert!(matches!(outcome, Outcome::Rejected(ref r) if r.contains("past")));
        assert_eq!(session.step, Step::Checkin);
    }

    #[test]
    fn test_checkout_must_follow_checkin() {
        let mut session = Session::new(60);
        run(&mut session, &["Dana", "friday"]);

        for earlier in ["friday", "tomorrow", "2026-10-22"] {
            let outcome = advance(&mut session, earlier, today());
            assert!(
                matches!(outcome, Outcome::Rejected(ref r) if r.contains("after check-in date (2026-10-23)")),
                "{earlier} should be rejected"
            );
            assert_eq!(session.step, Step::Checkout);
            assert_eq!(session.slots.checkout, None);
        }

        let outcome = advance(&mut session, "next week", today());
        assert!(matches!(outcome, Outcome::Advanced(ref r) if r.contains("3 nights")));
        assert_eq!(session.slots.checkout, Some(date("2026-10-26")));
    }

    #[test]
    fn test_checkout_unparseable_uses_generic_reprompt() {
        let mut session = Session::new(60);
        let outcome = run(
            &mut session,
            &["Dana", "tomorrow", "next day is earlier date than checkin"],
        );
        assert!(matches!(outcome, Outcome::Rejected(ref r) if r.contains("check-out date")));
        assert_eq!(session.step, Step::Checkout);
    }

    #[test]
    fn test_guests_and_breakfast() {
        let mut session = Session::new(60);
        run(&mut session, &["Dana", "tomorrow", "friday"]);

        assert!(matches!(advance(&mut session, "11", today()), Outcome::Rejected(_)));
        let outcome = advance(&mut session, "just me", today());
        assert!(matches!(outcome, Outcome::Advanced(ref r) if r.contains("1 guest.")));
        assert_eq!(session.slots.guests, Some(1));

        assert!(matches!(advance(&mut session, "maybe", today()), Outcome::Rejected(_)));
        let outcome = advance(&mut session, "yse", today());
        assert!(matches!(outcome, Outcome::Advanced(ref r) if r.contains("with breakfast")));
        assert_eq!(session.slots.breakfast, Some(true));
        assert_eq!(session.step, Step::Payment);
    }

    #[test]
    fn test_payment_shows_summary() {
        let mut session = Session::new(60);
        let outcome = run(
            &mut session,
            &["Dana", "tomorrow", "friday", "two", "no", "skip"],
        );
        let Outcome::Advanced(summary) = outcome else {
            panic!("expected summary, got {outcome:?}");
        };
        assert!(summary.contains("• Name: Dana"));
        assert!(summary.contains("• Check-out: 2026-10-23 (3 nights)"));
        assert!(summary.contains("• Breakfast: No"));
        assert!(summary.contains("• Payment: Not specified"));
        assert_eq!(session.step, Step::Confirm);
    }

    #[test]
    fn test_confirm_requests_booking() {
        let mut session = at_confirm();
        let outcome = advance(&mut session, "confirm", today());
        assert_eq!(
            outcome,
            Outcome::Book(BookingDraft {
                name: "Dana".to_string(),
                checkin: date("2026-10-20"),
                checkout: date("2026-10-23"),
                guests: 2,
                breakfast: true,
                payment_method: "Cash".to_string(),
            })
        );
        // The caller completes the session once the booking is stored.
        assert_eq!(session.step, Step::Confirm);
    }

    #[test]
    fn test_book_now_is_a_confirmation() {
        let mut session = at_confirm();
        assert!(matches!(advance(&mut session, "book now", today()), Outcome::Book(_)));
        assert_eq!(session.slots.name.as_deref(), Some("Dana"));

        assert!(matches!(advance(&mut session, "now", today()), Outcome::Rejected(_)));
        assert_eq!(session.step, Step::Confirm);
    }

    #[test]
    fn test_confirm_reprompts_on_other_input() {
        let mut session = at_confirm();
        assert!(matches!(advance(&mut session, "what about parking?", today()), Outcome::Rejected(_)));
        assert_eq!(session.step, Step::Confirm);
    }

    #[test]
    fn test_cancel_resets() {
        let mut session = at_confirm();
        assert!(matches!(advance(&mut session, "cancel", today()), Outcome::Reset(_)));
        assert_eq!(session.step, Step::Name);
        assert_eq!(session.slots.name, None);
    }

    #[test]
    fn test_restart_mid_script() {
        let mut session = Session::new(60);
        run(&mut session, &["Dana", "tomorrow", "friday"]);
        assert!(matches!(advance(&mut session, "Start over", today()), Outcome::Reset(_)));
        assert_eq!(session.step, Step::Name);
        assert_eq!(session.slots.checkin, None);
    }

    #[test]
    fn test_steps_only_move_forward_without_cancel() {
        let mut session = Session::new(60);
        let inputs = [
            "hello", "Dana", "whenever", "tomorrow", "yesterday", "2026-10-19", "friday", "lots",
            "3", "hmm", "no", "paypal", "what?", "confirm",
        ];
        let mut previous = session.step;
        for input in inputs {
            advance(&mut session, input, today());
            assert!(session.step >= previous, "{input} moved the script backwards");
            previous = session.step;
        }
    }

    #[test]
    fn test_message_after_completion_starts_over() {
        let mut session = at_confirm();
        session.step = Step::Complete;
        session.booking_id = Some(7);
        let outcome = advance(&mut session, "hello again", today());
        assert!(matches!(outcome, Outcome::Reset(ref r) if r.contains("#7")));
        assert_eq!(session.step, Step::Name);
        assert_eq!(session.booking_id, None);
    }
}
