use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Booking, BookingDraft, Session, Slots, Step};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Sessions ──

pub fn get_session(conn: &Connection, id: &str) -> anyhow::Result<Option<Session>> {
    let now = format_ts(&Utc::now().naive_utc());
    let row = conn
        .query_row(
            "SELECT id, step, slots, booking_id, created_at, last_activity, expires_at
             FROM sessions WHERE id = ?1 AND expires_at > ?2",
            params![id, now],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        )
        .optional()?;

    let Some((id, step, slots_json, booking_id, created_at, last_activity, expires_at)) = row
    else {
        return Ok(None);
    };

    // A row whose slots no longer deserialize restarts the script rather than failing the chat.
    let (step, slots) = match serde_json::from_str::<Slots>(&slots_json) {
        Ok(slots) => (Step::parse(&step), slots),
        Err(e) => {
            tracing::warn!(session = %id, error = %e, "discarding unreadable session slots");
            (Step::Name, Slots::default())
        }
    };

    Ok(Some(Session {
        id,
        step,
        slots,
        booking_id,
        created_at: parse_ts(&created_at),
        last_activity: parse_ts(&last_activity),
        expires_at: parse_ts(&expires_at),
    }))
}

pub fn save_session(conn: &Connection, session: &Session) -> anyhow::Result<()> {
    let slots_json = serde_json::to_string(&session.slots)?;

    conn.execute(
        "INSERT INTO sessions (id, step, slots, booking_id, created_at, last_activity, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
           step = excluded.step,
           slots = excluded.slots,
           booking_id = excluded.booking_id,
           last_activity = excluded.last_activity,
           expires_at = excluded.expires_at",
        params![
            session.id,
            session.step.as_str(),
            slots_json,
            session.booking_id,
            format_ts(&session.created_at),
            format_ts(&session.last_activity),
            format_ts(&session.expires_at),
        ],
    )?;
    Ok(())
}

pub fn expire_old_sessions(conn: &Connection) -> anyhow::Result<usize> {
    let now = format_ts(&Utc::now().naive_utc());
    let count = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
    Ok(count)
}

// ── Bookings ──

const BOOKING_COLUMNS: &str =
    "id, session_id, name, checkin, checkout, guests, breakfast, payment_method, created_at";

pub fn create_booking(
    conn: &Connection,
    session_id: &str,
    draft: &BookingDraft,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO bookings (session_id, name, checkin, checkout, guests, breakfast, payment_method, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            session_id,
            draft.name,
            draft.checkin.format(DATE_FORMAT).to_string(),
            draft.checkout.format(DATE_FORMAT).to_string(),
            draft.guests,
            draft.breakfast,
            draft.payment_method,
            format_ts(&Utc::now().naive_utc()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Stores the booking and moves the session to `Complete` in one transaction,
/// so a failed session write never leaves a booking behind to be repeated.
pub fn complete_booking(
    conn: &mut Connection,
    session: &Session,
    draft: &BookingDraft,
) -> anyhow::Result<(Session, Booking)> {
    let tx = conn.transaction()?;

    let id = create_booking(&tx, &session.id, draft)?;
    let booking = get_booking_by_id(&tx, id)?
        .ok_or_else(|| anyhow::anyhow!("booking {id} not found after insert"))?;

    let mut completed = session.clone();
    completed.step = Step::Complete;
    completed.booking_id = Some(id);
    save_session(&tx, &completed)?;

    tx.commit()?;
    Ok((completed, booking))
}

pub fn get_booking_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let result = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            |row| Ok(parse_booking_row(row)),
        )
        .optional()?;

    result.transpose()
}

pub fn get_all_bookings(conn: &Connection, limit: i64) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC, id DESC LIMIT ?1"
    ))?;

    let rows = stmt.query_map(params![limit], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_bookings_for_session(
    conn: &Connection,
    session_id: &str,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE session_id = ?1 ORDER BY id ASC"
    ))?;

    let rows = stmt.query_map(params![session_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let checkin_str: String = row.get(3)?;
    let checkout_str: String = row.get(4)?;
    let created_at_str: String = row.get(8)?;

    Ok(Booking {
        id: row.get(0)?,
        session_id: row.get(1)?,
        name: row.get(2)?,
        checkin: NaiveDate::parse_from_str(&checkin_str, DATE_FORMAT)?,
        checkout: NaiveDate::parse_from_str(&checkout_str, DATE_FORMAT)?,
        guests: row.get(5)?,
        breakfast: row.get(6)?,
        payment_method: row.get(7)?,
        created_at: parse_ts(&created_at_str),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Duration;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draft() -> BookingDraft {
        BookingDraft {
            name: "John Smith".to_string(),
            checkin: date("2027-01-15"),
            checkout: date("2027-01-18"),
            guests: 2,
            breakfast: true,
            payment_method: "Credit Card".to_string(),
        }
    }

    #[test]
    fn test_booking_ids_are_sequential() {
        let conn = setup_db();
        let first = create_booking(&conn, "s-1", &draft()).unwrap();
        let second = create_booking(&conn, "s-2", &draft()).unwrap();
        assert_eq!(second, first + 1);

        let stored = get_booking_by_id(&conn, second).unwrap().unwrap();
        assert_eq!(stored.session_id, "s-2");
        assert_eq!(stored.name, "John Smith");
        assert_eq!(stored.checkin, date("2027-01-15"));
        assert_eq!(stored.checkout, date("2027-01-18"));
        assert_eq!(stored.nights(), 3);
        assert!(stored.breakfast);
    }

    #[test]
    fn test_missing_booking_is_none() {
        let conn = setup_db();
        assert!(get_booking_by_id(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn test_storage_rejects_invalid_stay() {
        let conn = setup_db();

        let mut backwards = draft();
        backwards.checkout = backwards.checkin;
        assert!(create_booking(&conn, "s-1", &backwards).is_err());

        let mut crowd = draft();
        crowd.guests = 11;
        assert!(create_booking(&conn, "s-1", &crowd).is_err());

        assert!(get_all_bookings(&conn, 10).unwrap().is_empty());
    }

    #[test]
    fn test_bookings_for_session() {
        let conn = setup_db();
        create_booking(&conn, "s-1", &draft()).unwrap();
        create_booking(&conn, "s-2", &draft()).unwrap();
        create_booking(&conn, "s-1", &draft()).unwrap();

        let mine = get_bookings_for_session(&conn, "s-1").unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].id < mine[1].id);

        let all = get_all_bookings(&conn, 2).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_complete_booking_updates_session() {
        let mut conn = setup_db();
        let mut session = Session::new(60);
        session.step = Step::Confirm;
        save_session(&conn, &session).unwrap();

        let (completed, booking) = complete_booking(&mut conn, &session, &draft()).unwrap();
        assert_eq!(completed.step, Step::Complete);
        assert_eq!(completed.booking_id, Some(booking.id));

        let loaded = get_session(&conn, &session.id).unwrap().unwrap();
        assert_eq!(loaded.step, Step::Complete);
        assert_eq!(loaded.booking_id, Some(booking.id));
    }

    #[test]
    fn test_failed_session_write_rolls_back_booking() {
        let mut conn = setup_db();
        let mut session = Session::new(60);
        session.step = Step::Confirm;
        save_session(&conn, &session).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER block_complete BEFORE UPDATE ON sessions
             WHEN NEW.step = 'complete'
             BEGIN SELECT RAISE(ABORT, 'session write failed'); END;",
        )
        .unwrap();

        assert!(complete_booking(&mut conn, &session, &draft()).is_err());
        assert!(get_all_bookings(&conn, 10).unwrap().is_empty());
        let loaded = get_session(&conn, &session.id).unwrap().unwrap();
        assert_eq!(loaded.step, Step::Confirm);
        assert_eq!(loaded.booking_id, None);
    }

    #[test]
    fn test_session_roundtrip() {
        let conn = setup_db();
        let mut session = Session::new(60);
        session.step = Step::Guests;
        session.slots.name = Some("Dana".to_string());
        session.slots.checkin = Some(date("2027-05-01"));
        save_session(&conn, &session).unwrap();

        let loaded = get_session(&conn, &session.id).unwrap().unwrap();
        assert_eq!(loaded.step, Step::Guests);
        assert_eq!(loaded.slots, session.slots);

        session.step = Step::Breakfast;
        save_session(&conn, &session).unwrap();
        let loaded = get_session(&conn, &session.id).unwrap().unwrap();
        assert_eq!(loaded.step, Step::Breakfast);
    }

    #[test]
    fn test_expired_session_is_not_loaded() {
        let conn = setup_db();
        let mut session = Session::new(60);
        session.expires_at = Utc::now().naive_utc() - Duration::minutes(1);
        save_session(&conn, &session).unwrap();

        assert!(get_session(&conn, &session.id).unwrap().is_none());
        assert_eq!(expire_old_sessions(&conn).unwrap(), 1);
    }

    #[test]
    fn test_unreadable_slots_restart_session() {
        let conn = setup_db();
        let session = Session::new(60);
        save_session(&conn, &session).unwrap();
        conn.execute(
            "UPDATE sessions SET step = 'confirm', slots = 'not json' WHERE id = ?1",
            params![session.id],
        )
        .unwrap();

        let loaded = get_session(&conn, &session.id).unwrap().unwrap();
        assert_eq!(loaded.step, Step::Name);
        assert_eq!(loaded.slots, Slots::default());
    }
}
