//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`, enums as their snake_case strum forms, and UUIDs as
//! hyphenated lowercase strings. Booleans ride SQLite INTEGER 0/1.

use cadence_core::{
  history::CallHistoryEntry,
  lead::{Lead, LeadStatus},
  outcome::Outcome,
  pool::{PoolEntry, PoolStatus},
  region::Region,
  stats::DailyStats,
  webhook::{CallLog, CallLogStatus},
};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|_| Error::DateParse(format!("bad calendar date: {s:?}")))
}

// Enum columns round-trip through their strum string forms.

fn decode_enum<T: std::str::FromStr>(s: &str, what: &str) -> Result<T> {
  s.parse().map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

pub fn decode_lead_status(s: &str) -> Result<LeadStatus> {
  decode_enum(s, "lead status")
}

pub fn decode_outcome(s: &str) -> Result<Outcome> { decode_enum(s, "outcome") }

pub fn decode_region(s: &str) -> Result<Region> { decode_enum(s, "region") }

pub fn decode_pool_status(s: &str) -> Result<PoolStatus> {
  decode_enum(s, "pool status")
}

pub fn decode_call_log_status(s: &str) -> Result<CallLogStatus> {
  decode_enum(s, "call log status")
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `leads` row.
pub struct RawLead {
  pub lead_id:        String,
  pub business_name:  String,
  pub contact_name:   Option<String>,
  pub phone:          String,
  pub website:        Option<String>,
  pub state:          Option<String>,
  pub region:         Option<String>,
  pub status:         String,
  pub attempt_count:  i64,
  pub max_attempts:   i64,
  pub next_call_at:   Option<String>,
  pub last_called_at: Option<String>,
  pub last_outcome:   Option<String>,
  pub demo_booked:    bool,
  pub demo_date:      Option<String>,
  pub not_interested: bool,
  pub wrong_number:   bool,
  pub notes:          String,
  pub created_at:     String,
}

impl RawLead {
  /// Column list matching the field order of [`RawLead::from_row`].
  pub const COLUMNS: &'static str = "lead_id, business_name, contact_name, \
     phone, website, state, region, status, attempt_count, max_attempts, \
     next_call_at, last_called_at, last_outcome, demo_booked, demo_date, \
     not_interested, wrong_number, notes, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      lead_id:        row.get(0)?,
      business_name:  row.get(1)?,
      contact_name:   row.get(2)?,
      phone:          row.get(3)?,
      website:        row.get(4)?,
      state:          row.get(5)?,
      region:         row.get(6)?,
      status:         row.get(7)?,
      attempt_count:  row.get(8)?,
      max_attempts:   row.get(9)?,
      next_call_at:   row.get(10)?,
      last_called_at: row.get(11)?,
      last_outcome:   row.get(12)?,
      demo_booked:    row.get(13)?,
      demo_date:      row.get(14)?,
      not_interested: row.get(15)?,
      wrong_number:   row.get(16)?,
      notes:          row.get(17)?,
      created_at:     row.get(18)?,
    })
  }

  pub fn into_lead(self) -> Result<Lead> {
    Ok(Lead {
      lead_id:        decode_uuid(&self.lead_id)?,
      business_name:  self.business_name,
      contact_name:   self.contact_name,
      phone:          self.phone,
      website:        self.website,
      state:          self.state,
      region:         self.region.as_deref().map(decode_region).transpose()?,
      status:         decode_lead_status(&self.status)?,
      attempt_count:  self.attempt_count as u32,
      max_attempts:   self.max_attempts as u32,
      next_call_at:   self.next_call_at.as_deref().map(decode_dt).transpose()?,
      last_called_at: self.last_called_at.as_deref().map(decode_dt).transpose()?,
      last_outcome:   self.last_outcome.as_deref().map(decode_outcome).transpose()?,
      demo_booked:    self.demo_booked,
      demo_date:      self.demo_date.as_deref().map(decode_dt).transpose()?,
      not_interested: self.not_interested,
      wrong_number:   self.wrong_number,
      notes:          self.notes,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `pool_numbers` row.
pub struct RawPoolEntry {
  pub number_id:          String,
  pub phone_number:       String,
  pub label:              Option<String>,
  pub area_code:          Option<String>,
  pub state:              Option<String>,
  pub provider_sid:       Option<String>,
  pub status:             String,
  pub calls_this_hour:    i64,
  pub calls_today:        i64,
  pub total_calls:        i64,
  pub max_calls_per_hour: i64,
  pub cooldown_minutes:   i64,
  pub spam_reports:       i64,
  pub last_used_at:       Option<String>,
  pub created_at:         String,
}

impl RawPoolEntry {
  pub const COLUMNS: &'static str = "number_id, phone_number, label, \
     area_code, state, provider_sid, status, calls_this_hour, calls_today, \
     total_calls, max_calls_per_hour, cooldown_minutes, spam_reports, \
     last_used_at, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      number_id:          row.get(0)?,
      phone_number:       row.get(1)?,
      label:              row.get(2)?,
      area_code:          row.get(3)?,
      state:              row.get(4)?,
      provider_sid:       row.get(5)?,
      status:             row.get(6)?,
      calls_this_hour:    row.get(7)?,
      calls_today:        row.get(8)?,
      total_calls:        row.get(9)?,
      max_calls_per_hour: row.get(10)?,
      cooldown_minutes:   row.get(11)?,
      spam_reports:       row.get(12)?,
      last_used_at:       row.get(13)?,
      created_at:         row.get(14)?,
    })
  }

  pub fn into_entry(self) -> Result<PoolEntry> {
    Ok(PoolEntry {
      number_id:          decode_uuid(&self.number_id)?,
      phone_number:       self.phone_number,
      label:              self.label,
      area_code:          self.area_code,
      state:              self.state,
      provider_sid:       self.provider_sid,
      status:             decode_pool_status(&self.status)?,
      calls_this_hour:    self.calls_this_hour as u32,
      calls_today:        self.calls_today as u32,
      total_calls:        self.total_calls as u32,
      max_calls_per_hour: self.max_calls_per_hour as u32,
      cooldown_minutes:   self.cooldown_minutes as u32,
      spam_reports:       self.spam_reports as u32,
      last_used_at:       self.last_used_at.as_deref().map(decode_dt).transpose()?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `call_history` row.
pub struct RawHistoryEntry {
  pub entry_id:       String,
  pub lead_id:        String,
  pub attempt_number: i64,
  pub outcome:        String,
  pub notes:          Option<String>,
  pub demo_date:      Option<String>,
  pub callback_at:    Option<String>,
  pub recorded_at:    String,
}

impl RawHistoryEntry {
  pub const COLUMNS: &'static str = "entry_id, lead_id, attempt_number, \
     outcome, notes, demo_date, callback_at, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:       row.get(0)?,
      lead_id:        row.get(1)?,
      attempt_number: row.get(2)?,
      outcome:        row.get(3)?,
      notes:          row.get(4)?,
      demo_date:      row.get(5)?,
      callback_at:    row.get(6)?,
      recorded_at:    row.get(7)?,
    })
  }

  pub fn into_entry(self) -> Result<CallHistoryEntry> {
    Ok(CallHistoryEntry {
      entry_id:       decode_uuid(&self.entry_id)?,
      lead_id:        decode_uuid(&self.lead_id)?,
      attempt_number: self.attempt_number as u32,
      outcome:        decode_outcome(&self.outcome)?,
      notes:          self.notes,
      demo_date:      self.demo_date.as_deref().map(decode_dt).transpose()?,
      callback_at:    self.callback_at.as_deref().map(decode_dt).transpose()?,
      recorded_at:    decode_dt(&self.recorded_at)?,
    })
  }
}

/// Raw values read directly from a `daily_stats` row.
pub struct RawDailyStats {
  pub stat_date:     String,
  pub total_dials:   i64,
  pub contacts:      i64,
  pub conversations: i64,
  pub demos_booked:  i64,
  pub demos_held:    i64,
  pub deals_closed:  i64,
  pub hours_dialed:  f64,
}

impl RawDailyStats {
  pub const COLUMNS: &'static str = "stat_date, total_dials, contacts, \
     conversations, demos_booked, demos_held, deals_closed, hours_dialed";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      stat_date:     row.get(0)?,
      total_dials:   row.get(1)?,
      contacts:      row.get(2)?,
      conversations: row.get(3)?,
      demos_booked:  row.get(4)?,
      demos_held:    row.get(5)?,
      deals_closed:  row.get(6)?,
      hours_dialed:  row.get(7)?,
    })
  }

  pub fn into_stats(self) -> Result<DailyStats> {
    Ok(DailyStats {
      date:          decode_date(&self.stat_date)?,
      total_dials:   self.total_dials as u64,
      contacts:      self.contacts as u64,
      conversations: self.conversations as u64,
      demos_booked:  self.demos_booked as u64,
      demos_held:    self.demos_held as u64,
      deals_closed:  self.deals_closed as u64,
      hours_dialed:  self.hours_dialed,
    })
  }
}

/// Raw strings read directly from a `call_log` row.
pub struct RawCallLog {
  pub call_sid:      String,
  pub status:        String,
  pub from_number:   Option<String>,
  pub to_number:     Option<String>,
  pub duration_secs: Option<i64>,
  pub started_at:    String,
  pub updated_at:    String,
}

impl RawCallLog {
  pub const COLUMNS: &'static str =
    "call_sid, status, from_number, to_number, duration_secs, started_at, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      call_sid:      row.get(0)?,
      status:        row.get(1)?,
      from_number:   row.get(2)?,
      to_number:     row.get(3)?,
      duration_secs: row.get(4)?,
      started_at:    row.get(5)?,
      updated_at:    row.get(6)?,
    })
  }

  pub fn into_log(self) -> Result<CallLog> {
    Ok(CallLog {
      call_sid:      self.call_sid,
      status:        decode_call_log_status(&self.status)?,
      from_number:   self.from_number,
      to_number:     self.to_number,
      duration_secs: self.duration_secs.map(|d| d as u32),
      started_at:    decode_dt(&self.started_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}
