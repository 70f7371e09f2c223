//! [`SqliteStore`] — the SQLite implementation of [`DialerStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cadence_core::{
  disposition::{self, DispositionContext, DispositionReceipt},
  history::CallHistoryEntry,
  lead::{DEFAULT_MAX_ATTEMPTS, Lead, LeadPatch, LeadQuery, NewLead, LeadStatus},
  outcome::Outcome,
  pool::{
    DEFAULT_COOLDOWN_MINUTES, DEFAULT_MAX_CALLS_PER_HOUR, NewPoolEntry,
    PoolEntry, PoolStatus, SPAM_REPORT_LIMIT,
  },
  queue::RegionBreakdown,
  region::Region,
  stats::{DailyStats, StatsDelta},
  store::DialerStore,
  webhook::{CallEvent, CallLog},
};

use crate::{
  encode::{
    RawCallLog, RawDailyStats, RawHistoryEntry, RawLead, RawPoolEntry,
    decode_region, encode_date, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

/// Filter shared by every "still callable" read: non-terminal status and an
/// attempt budget left.
const CALLABLE: &str =
  "status IN ('queued', 'in_progress', 'callback') AND attempt_count < max_attempts";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cadence dialer store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// statements for one store run on one connection thread, so the SQL-side
/// counter arithmetic below is never interleaved mid-statement.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Read one lead row as raw strings.
  async fn raw_lead(&self, id: Uuid) -> Result<Option<RawLead>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM leads WHERE lead_id = ?1", RawLead::COLUMNS),
              rusqlite::params![id_str],
              RawLead::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }

  /// Read one pool row as raw strings.
  async fn raw_number(&self, id: Uuid) -> Result<Option<RawPoolEntry>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM pool_numbers WHERE number_id = ?1",
                RawPoolEntry::COLUMNS
              ),
              rusqlite::params![id_str],
              RawPoolEntry::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }
}

// ─── DialerStore impl ────────────────────────────────────────────────────────

impl DialerStore for SqliteStore {
  type Error = Error;

  // ── Leads ─────────────────────────────────────────────────────────────────

  async fn add_lead(&self, input: NewLead) -> Result<Lead> {
    let region = input
      .region
      .or_else(|| input.state.as_deref().and_then(Region::from_state));

    let lead = Lead {
      lead_id:        Uuid::new_v4(),
      business_name:  input.business_name,
      contact_name:   input.contact_name,
      phone:          input.phone,
      website:        input.website,
      state:          input.state,
      region,
      status:         LeadStatus::Queued,
      attempt_count:  0,
      max_attempts:   input.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
      next_call_at:   None,
      last_called_at: None,
      last_outcome:   None,
      demo_booked:    false,
      demo_date:      None,
      not_interested: false,
      wrong_number:   false,
      notes:          String::new(),
      created_at:     Utc::now(),
    };

    let id_str      = encode_uuid(lead.lead_id);
    let business    = lead.business_name.clone();
    let contact     = lead.contact_name.clone();
    let phone       = lead.phone.clone();
    let website     = lead.website.clone();
    let state       = lead.state.clone();
    let region_str  = lead.region.map(|r| r.to_string());
    let status_str  = lead.status.to_string();
    let max_att     = lead.max_attempts as i64;
    let created_str = encode_dt(lead.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO leads (
             lead_id, business_name, contact_name, phone, website, state,
             region, status, attempt_count, max_attempts, notes, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, '', ?10)",
          rusqlite::params![
            id_str, business, contact, phone, website, state, region_str,
            status_str, max_att, created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(lead)
  }

  async fn get_lead(&self, id: Uuid) -> Result<Option<Lead>> {
    self.raw_lead(id).await?.map(RawLead::into_lead).transpose()
  }

  async fn list_leads(&self, query: &LeadQuery) -> Result<Vec<Lead>> {
    let status_str   = query.status.map(|s| s.to_string());
    let region_str   = query.region.map(|r| r.to_string());
    let text_pattern = query.text.as_deref().map(|t| format!("%{t}%"));
    let limit_val    = query.limit.unwrap_or(100) as i64;
    let offset_val   = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawLead> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; numbered placeholders keep the
        // parameter list fixed.
        let mut conds: Vec<&'static str> = vec![];
        if status_str.is_some() {
          conds.push("status = ?1");
        }
        if region_str.is_some() {
          conds.push("region = ?2");
        }
        if text_pattern.is_some() {
          conds.push("(business_name LIKE ?3 OR phone LIKE ?3)");
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {} FROM leads {where_clause}
           ORDER BY created_at DESC LIMIT ?4 OFFSET ?5",
          RawLead::COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              status_str.as_deref(),
              region_str.as_deref(),
              text_pattern.as_deref(),
              limit_val,
              offset_val,
            ],
            RawLead::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLead::into_lead).collect()
  }

  async fn patch_lead(&self, id: Uuid, patch: LeadPatch) -> Result<Option<Lead>> {
    let current = match self.get_lead(id).await? {
      Some(lead) => lead,
      None => return Ok(None),
    };

    let id_str     = encode_uuid(id);
    let business   = patch.business_name.unwrap_or(current.business_name);
    let contact    = patch.contact_name.or(current.contact_name);
    let phone      = patch.phone.unwrap_or(current.phone);
    let website    = patch.website.or(current.website);
    let state      = patch.state.or(current.state);
    let region_str = patch.region.or(current.region).map(|r| r.to_string());
    let status_str = patch.status.unwrap_or(current.status).to_string();
    let max_att    = patch.max_attempts.unwrap_or(current.max_attempts) as i64;

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE leads SET
             business_name = ?2, contact_name = ?3, phone = ?4, website = ?5,
             state = ?6, region = ?7, status = ?8, max_attempts = ?9
           WHERE lead_id = ?1",
          rusqlite::params![
            id_str, business, contact, phone, website, state, region_str,
            status_str, max_att,
          ],
        )?;

        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM leads WHERE lead_id = ?1", RawLead::COLUMNS),
              rusqlite::params![id_str],
              RawLead::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLead::into_lead).transpose()
  }

  // ── Disposition ───────────────────────────────────────────────────────────

  async fn record_disposition(
    &self,
    lead_id: Uuid,
    outcome: Outcome,
    ctx: DispositionContext,
    now: DateTime<Utc>,
    jitter: f64,
  ) -> Result<Option<DispositionReceipt>> {
    let lead = match self.raw_lead(lead_id).await? {
      Some(raw) => raw.into_lead()?,
      None => return Ok(None),
    };

    let plan = disposition::plan(&lead, outcome, &ctx, now, jitter);

    let history = CallHistoryEntry {
      entry_id:       Uuid::new_v4(),
      lead_id,
      attempt_number: plan.attempt_number,
      outcome,
      notes:          plan.notes.clone(),
      demo_date:      plan.demo_date,
      callback_at:    plan.callback_at,
      recorded_at:    now,
    };

    let id_str       = encode_uuid(lead_id);
    let status_str   = plan.new_status.to_string();
    let next_call    = plan.next_call_at.map(encode_dt);
    let now_str      = encode_dt(now);
    let outcome_str  = outcome.to_string();
    let demo_date    = plan.demo_date.map(encode_dt);
    let note_line    = plan.note_line.clone();
    let set_demo     = plan.set_demo_booked;
    let set_not_int  = plan.set_not_interested;
    let set_wrong    = plan.set_wrong_number;

    let entry_id_str = encode_uuid(history.entry_id);
    let attempt_num  = history.attempt_number as i64;
    let hist_notes   = history.notes.clone();
    let hist_demo    = history.demo_date.map(encode_dt);
    let hist_cb      = history.callback_at.map(encode_dt);

    let date_str     = encode_date(now.date_naive());
    let delta        = plan.stats;

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Counter math stays in SQL: the increment cannot be lost to a
        // concurrent read-then-write, and the note append never replaces
        // prior lines.
        tx.execute(
          "UPDATE leads SET
             status         = ?2,
             attempt_count  = attempt_count + 1,
             next_call_at   = COALESCE(?3, next_call_at),
             last_called_at = ?4,
             last_outcome   = ?5,
             demo_booked    = CASE WHEN ?6 THEN 1 ELSE demo_booked END,
             demo_date      = COALESCE(?7, demo_date),
             not_interested = CASE WHEN ?8 THEN 1 ELSE not_interested END,
             wrong_number   = CASE WHEN ?9 THEN 1 ELSE wrong_number END,
             notes          = CASE WHEN notes = '' THEN ?10
                              ELSE notes || char(10) || ?10 END
           WHERE lead_id = ?1",
          rusqlite::params![
            id_str, status_str, next_call, now_str, outcome_str, set_demo,
            demo_date, set_not_int, set_wrong, note_line,
          ],
        )?;

        tx.execute(
          "INSERT INTO call_history (
             entry_id, lead_id, attempt_number, outcome, notes, demo_date,
             callback_at, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            entry_id_str, id_str, attempt_num, outcome_str, hist_notes,
            hist_demo, hist_cb, now_str,
          ],
        )?;

        tx.execute(
          "INSERT INTO daily_stats (
             stat_date, total_dials, contacts, conversations, demos_booked,
             demos_held, deals_closed, hours_dialed
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT(stat_date) DO UPDATE SET
             total_dials   = total_dials   + excluded.total_dials,
             contacts      = contacts      + excluded.contacts,
             conversations = conversations + excluded.conversations,
             demos_booked  = demos_booked  + excluded.demos_booked,
             demos_held    = demos_held    + excluded.demos_held,
             deals_closed  = deals_closed  + excluded.deals_closed,
             hours_dialed  = hours_dialed  + excluded.hours_dialed",
          rusqlite::params![
            date_str,
            delta.total_dials as i64,
            delta.contacts as i64,
            delta.conversations as i64,
            delta.demos_booked as i64,
            delta.demos_held as i64,
            delta.deals_closed as i64,
            delta.hours_dialed,
          ],
        )?;

        let raw = tx.query_row(
          &format!("SELECT {} FROM leads WHERE lead_id = ?1", RawLead::COLUMNS),
          rusqlite::params![id_str],
          RawLead::from_row,
        )?;

        tx.commit()?;
        Ok(raw)
      })
      .await?;

    Ok(Some(DispositionReceipt { lead: raw.into_lead()?, history }))
  }

  // ── Queue reads ───────────────────────────────────────────────────────────

  async fn due_callbacks(
    &self,
    now: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<Lead>> {
    let now_str   = encode_dt(now);
    let limit_val = limit as i64;

    let raws: Vec<RawLead> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM leads
           WHERE status = 'callback'
             AND next_call_at IS NOT NULL
             AND next_call_at <= ?1
             AND attempt_count < max_attempts
           ORDER BY next_call_at ASC
           LIMIT ?2",
          RawLead::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![now_str, limit_val], RawLead::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLead::into_lead).collect()
  }

  async fn queued_leads(
    &self,
    now: DateTime<Utc>,
    region: Option<Region>,
    limit: usize,
  ) -> Result<Vec<Lead>> {
    let now_str    = encode_dt(now);
    let region_str = region.map(|r| r.to_string());
    let limit_val  = limit as i64;

    let raws: Vec<RawLead> = self
      .conn
      .call(move |conn| {
        // Fresh, least-attempted leads first, so new imports aren't starved
        // behind a tail of repeatedly-failed ones.
        let rows = if let Some(r) = region_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM leads
             WHERE status = 'queued'
               AND attempt_count < max_attempts
               AND (next_call_at IS NULL OR next_call_at <= ?1)
               AND region = ?2
             ORDER BY attempt_count ASC, created_at ASC
             LIMIT ?3",
            RawLead::COLUMNS
          ))?;
          stmt
            .query_map(rusqlite::params![now_str, r, limit_val], RawLead::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM leads
             WHERE status = 'queued'
               AND attempt_count < max_attempts
               AND (next_call_at IS NULL OR next_call_at <= ?1)
             ORDER BY attempt_count ASC, created_at ASC
             LIMIT ?2",
            RawLead::COLUMNS
          ))?;
          stmt
            .query_map(rusqlite::params![now_str, limit_val], RawLead::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLead::into_lead).collect()
  }

  async fn callable_by_region(&self) -> Result<RegionBreakdown> {
    let counts: Vec<(Option<String>, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT region, COUNT(*) FROM leads WHERE {CALLABLE} GROUP BY region",
        ))?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut breakdown = RegionBreakdown::default();
    for (region_str, count) in counts {
      // Leads with no region don't belong to any bucket.
      if let Some(s) = region_str {
        breakdown.set(decode_region(&s)?, count as u64);
      }
    }
    Ok(breakdown)
  }

  async fn callable_remaining(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!("SELECT COUNT(*) FROM leads WHERE {CALLABLE}"),
          [],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn dials_on(&self, date: NaiveDate) -> Result<u64> {
    let date_str = encode_date(date);
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM call_history WHERE substr(recorded_at, 1, 10) = ?1",
          rusqlite::params![date_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn history_for_lead(&self, lead_id: Uuid) -> Result<Vec<CallHistoryEntry>> {
    let id_str = encode_uuid(lead_id);
    let raws: Vec<RawHistoryEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM call_history WHERE lead_id = ?1 ORDER BY attempt_number ASC",
          RawHistoryEntry::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawHistoryEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistoryEntry::into_entry).collect()
  }

  async fn history_on(&self, date: NaiveDate) -> Result<Vec<CallHistoryEntry>> {
    let date_str = encode_date(date);
    let raws: Vec<RawHistoryEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM call_history
           WHERE substr(recorded_at, 1, 10) = ?1
           ORDER BY recorded_at ASC",
          RawHistoryEntry::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![date_str], RawHistoryEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistoryEntry::into_entry).collect()
  }

  // ── Phone number pool ─────────────────────────────────────────────────────

  async fn add_number(&self, input: NewPoolEntry) -> Result<Option<PoolEntry>> {
    let entry = PoolEntry {
      number_id:          Uuid::new_v4(),
      phone_number:       input.phone_number,
      label:              input.label,
      area_code:          input.area_code,
      state:              input.state,
      provider_sid:       input.provider_sid,
      status:             PoolStatus::Active,
      calls_this_hour:    0,
      calls_today:        0,
      total_calls:        0,
      max_calls_per_hour: input.max_calls_per_hour.unwrap_or(DEFAULT_MAX_CALLS_PER_HOUR),
      cooldown_minutes:   input.cooldown_minutes.unwrap_or(DEFAULT_COOLDOWN_MINUTES),
      spam_reports:       0,
      last_used_at:       None,
      created_at:         Utc::now(),
    };

    let id_str      = encode_uuid(entry.number_id);
    let phone       = entry.phone_number.clone();
    let label       = entry.label.clone();
    let area_code   = entry.area_code.clone();
    let state       = entry.state.clone();
    let provider    = entry.provider_sid.clone();
    let status_str  = entry.status.to_string();
    let max_hour    = entry.max_calls_per_hour as i64;
    let cooldown    = entry.cooldown_minutes as i64;
    let created_str = encode_dt(entry.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO pool_numbers (
             number_id, phone_number, label, area_code, state, provider_sid,
             status, max_calls_per_hour, cooldown_minutes, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            id_str, phone, label, area_code, state, provider, status_str,
            max_hour, cooldown, created_str,
          ],
        );
        match result {
          Ok(_) => Ok(true),
          // The UNIQUE constraint on phone_number is the conflict signal.
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(inserted.then_some(entry))
  }

  async fn get_number(&self, id: Uuid) -> Result<Option<PoolEntry>> {
    self.raw_number(id).await?.map(RawPoolEntry::into_entry).transpose()
  }

  async fn list_numbers(&self, status: Option<PoolStatus>) -> Result<Vec<PoolEntry>> {
    let status_str = status.map(|s| s.to_string());

    let raws: Vec<RawPoolEntry> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = status_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM pool_numbers WHERE status = ?1 ORDER BY created_at ASC",
            RawPoolEntry::COLUMNS
          ))?;
          stmt
            .query_map(rusqlite::params![s], RawPoolEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM pool_numbers ORDER BY created_at ASC",
            RawPoolEntry::COLUMNS
          ))?;
          stmt
            .query_map([], RawPoolEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPoolEntry::into_entry).collect()
  }

  async fn record_pool_call(
    &self,
    id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<Option<PoolEntry>> {
    let id_str  = encode_uuid(id);
    let now_str = encode_dt(now);

    let raw = self
      .conn
      .call(move |conn| {
        // One statement: increments and the status decision can't tear.
        // Spam past the limit overrides everything, including the fresh
        // call; the cooling flip never downgrades a retired number.
        let updated = conn.execute(
          &format!(
            "UPDATE pool_numbers SET
               calls_this_hour = calls_this_hour + 1,
               calls_today     = calls_today + 1,
               total_calls     = total_calls + 1,
               last_used_at    = ?2,
               status = CASE
                 WHEN spam_reports > {SPAM_REPORT_LIMIT} AND status != 'retired'
                   THEN 'retired'
                 WHEN status = 'active'
                      AND calls_this_hour + 1 >= max_calls_per_hour
                   THEN 'cooling'
                 ELSE status
               END
             WHERE number_id = ?1"
          ),
          rusqlite::params![id_str, now_str],
        )?;

        if updated == 0 {
          return Ok(None);
        }

        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM pool_numbers WHERE number_id = ?1",
                RawPoolEntry::COLUMNS
              ),
              rusqlite::params![id_str],
              RawPoolEntry::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPoolEntry::into_entry).transpose()
  }

  async fn record_spam_report(&self, phone_number: &str) -> Result<Option<PoolEntry>> {
    let phone = phone_number.to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          &format!(
            "UPDATE pool_numbers SET
               spam_reports = spam_reports + 1,
               status = CASE
                 WHEN spam_reports + 1 > {SPAM_REPORT_LIMIT} AND status != 'retired'
                   THEN 'retired'
                 ELSE status
               END
             WHERE phone_number = ?1"
          ),
          rusqlite::params![phone],
        )?;

        if updated == 0 {
          return Ok(None);
        }

        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM pool_numbers WHERE phone_number = ?1",
                RawPoolEntry::COLUMNS
              ),
              rusqlite::params![phone],
              RawPoolEntry::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPoolEntry::into_entry).transpose()
  }

  async fn retire_number(&self, id: Uuid) -> Result<Option<PoolEntry>> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE pool_numbers SET status = 'retired' WHERE number_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    self.get_number(id).await
  }

  async fn reactivate_number(&self, id: Uuid) -> Result<Option<PoolEntry>> {
    let id_str = encode_uuid(id);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE pool_numbers SET status = 'active', calls_this_hour = 0
           WHERE number_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(())
      })
      .await?;
    self.get_number(id).await
  }

  async fn reset_hourly_counters(&self, reset_daily: bool) -> Result<u64> {
    let touched: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE pool_numbers SET
             calls_this_hour = 0,
             calls_today     = CASE WHEN ?1 THEN 0 ELSE calls_today END,
             status          = CASE WHEN status = 'cooling' THEN 'active'
                               ELSE status END
           WHERE status != 'retired'",
          rusqlite::params![reset_daily],
        )?)
      })
      .await?;
    Ok(touched as u64)
  }

  // ── Daily stats ───────────────────────────────────────────────────────────

  async fn increment_stats(
    &self,
    date: NaiveDate,
    delta: StatsDelta,
  ) -> Result<DailyStats> {
    let date_str = encode_date(date);

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO daily_stats (
             stat_date, total_dials, contacts, conversations, demos_booked,
             demos_held, deals_closed, hours_dialed
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT(stat_date) DO UPDATE SET
             total_dials   = total_dials   + excluded.total_dials,
             contacts      = contacts      + excluded.contacts,
             conversations = conversations + excluded.conversations,
             demos_booked  = demos_booked  + excluded.demos_booked,
             demos_held    = demos_held    + excluded.demos_held,
             deals_closed  = deals_closed  + excluded.deals_closed,
             hours_dialed  = hours_dialed  + excluded.hours_dialed",
          rusqlite::params![
            date_str,
            delta.total_dials as i64,
            delta.contacts as i64,
            delta.conversations as i64,
            delta.demos_booked as i64,
            delta.demos_held as i64,
            delta.deals_closed as i64,
            delta.hours_dialed,
          ],
        )?;

        conn.query_row(
          &format!("SELECT {} FROM daily_stats WHERE stat_date = ?1", RawDailyStats::COLUMNS),
          rusqlite::params![date_str],
          RawDailyStats::from_row,
        ).map_err(Into::into)
      })
      .await?;

    raw.into_stats()
  }

  async fn stats_for(&self, date: NaiveDate) -> Result<Option<DailyStats>> {
    let date_str = encode_date(date);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM daily_stats WHERE stat_date = ?1",
                RawDailyStats::COLUMNS
              ),
              rusqlite::params![date_str],
              RawDailyStats::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDailyStats::into_stats).transpose()
  }

  async fn recent_stats(&self, days: u32) -> Result<Vec<DailyStats>> {
    let limit_val = days as i64;
    let raws: Vec<RawDailyStats> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM daily_stats ORDER BY stat_date DESC LIMIT ?1",
          RawDailyStats::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawDailyStats::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDailyStats::into_stats).collect()
  }

  // ── Call log ──────────────────────────────────────────────────────────────

  async fn upsert_call_log(&self, event: CallEvent) -> Result<CallLog> {
    let sid        = event.call_sid.clone();
    let status_str = event.status.to_string();
    let from       = event.from_number.clone();
    let to         = event.to_number.clone();
    let duration   = event.duration_secs.map(|d| d as i64);
    let at_str     = encode_dt(event.occurred_at);

    let raw = self
      .conn
      .call(move |conn| {
        // First event for a SID fixes started_at; later events only advance
        // status, duration and updated_at.
        conn.execute(
          "INSERT INTO call_log (
             call_sid, status, from_number, to_number, duration_secs,
             started_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
           ON CONFLICT(call_sid) DO UPDATE SET
             status        = excluded.status,
             from_number   = COALESCE(excluded.from_number, call_log.from_number),
             to_number     = COALESCE(excluded.to_number, call_log.to_number),
             duration_secs = COALESCE(excluded.duration_secs, call_log.duration_secs),
             updated_at    = excluded.updated_at",
          rusqlite::params![sid, status_str, from, to, duration, at_str],
        )?;

        conn
          .query_row(
            &format!("SELECT {} FROM call_log WHERE call_sid = ?1", RawCallLog::COLUMNS),
            rusqlite::params![sid],
            RawCallLog::from_row,
          )
          .map_err(Into::into)
      })
      .await?;

    raw.into_log()
  }
}
