//! SQL schema for the Cadence SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS leads (
    lead_id        TEXT PRIMARY KEY,
    business_name  TEXT NOT NULL,
    contact_name   TEXT,
    phone          TEXT NOT NULL,
    website        TEXT,
    state          TEXT,
    region         TEXT,            -- 'eastern' | 'central' | 'mountain' | 'pacific'
    status         TEXT NOT NULL DEFAULT 'queued',
    attempt_count  INTEGER NOT NULL DEFAULT 0,
    max_attempts   INTEGER NOT NULL DEFAULT 5,
    next_call_at   TEXT,            -- ISO 8601 UTC; NULL = no schedule
    last_called_at TEXT,
    last_outcome   TEXT,
    demo_booked    INTEGER NOT NULL DEFAULT 0,
    demo_date      TEXT,
    not_interested INTEGER NOT NULL DEFAULT 0,
    wrong_number   INTEGER NOT NULL DEFAULT 0,
    notes          TEXT NOT NULL DEFAULT '',
    created_at     TEXT NOT NULL
);

-- One row per disposition event; strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS call_history (
    entry_id       TEXT PRIMARY KEY,
    lead_id        TEXT NOT NULL REFERENCES leads(lead_id),
    attempt_number INTEGER NOT NULL,
    outcome        TEXT NOT NULL,
    notes          TEXT,
    demo_date      TEXT,
    callback_at    TEXT,
    recorded_at    TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS pool_numbers (
    number_id          TEXT PRIMARY KEY,
    phone_number       TEXT NOT NULL UNIQUE,
    label              TEXT,
    area_code          TEXT,
    state              TEXT,
    provider_sid       TEXT,
    status             TEXT NOT NULL DEFAULT 'active',
    calls_this_hour    INTEGER NOT NULL DEFAULT 0,
    calls_today        INTEGER NOT NULL DEFAULT 0,
    total_calls        INTEGER NOT NULL DEFAULT 0,
    max_calls_per_hour INTEGER NOT NULL DEFAULT 20,
    cooldown_minutes   INTEGER NOT NULL DEFAULT 30,
    spam_reports       INTEGER NOT NULL DEFAULT 0,
    last_used_at       TEXT,
    created_at         TEXT NOT NULL
);

-- Upsert key is the calendar date; counters only ever increase.
CREATE TABLE IF NOT EXISTS daily_stats (
    stat_date     TEXT PRIMARY KEY, -- 'YYYY-MM-DD'
    total_dials   INTEGER NOT NULL DEFAULT 0,
    contacts      INTEGER NOT NULL DEFAULT 0,
    conversations INTEGER NOT NULL DEFAULT 0,
    demos_booked  INTEGER NOT NULL DEFAULT 0,
    demos_held    INTEGER NOT NULL DEFAULT 0,
    deals_closed  INTEGER NOT NULL DEFAULT 0,
    hours_dialed  REAL NOT NULL DEFAULT 0
);

-- Provider lifecycle events, keyed by the provider's call SID.
-- Independent of lead state; written only by the webhook receiver.
CREATE TABLE IF NOT EXISTS call_log (
    call_sid      TEXT PRIMARY KEY,
    status        TEXT NOT NULL,
    from_number   TEXT,
    to_number     TEXT,
    duration_secs INTEGER,
    started_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS leads_status_idx     ON leads(status);
CREATE INDEX IF NOT EXISTS leads_next_call_idx  ON leads(next_call_at);
CREATE INDEX IF NOT EXISTS leads_region_idx     ON leads(region);
CREATE INDEX IF NOT EXISTS history_lead_idx     ON call_history(lead_id);
CREATE INDEX IF NOT EXISTS history_recorded_idx ON call_history(recorded_at);
CREATE INDEX IF NOT EXISTS pool_status_idx      ON pool_numbers(status);

PRAGMA user_version = 1;
";
