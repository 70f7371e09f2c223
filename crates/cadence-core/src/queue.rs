//! Read-side queue assembly for the dial floor.
//!
//! The queue is a pure merge over two store reads: callbacks that have come
//! due (time-sensitive promises, always first) and the regular queue of
//! least-attempted leads. It makes no claim of uniqueness between
//! concurrent readers — the disposition engine is the serialization point,
//! and a double-dialed lead is tolerated, not corruption.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::{lead::Lead, pool::PoolEntry, region::Region};

/// Cap on due callbacks pulled ahead of the regular queue.
pub const CALLBACK_BATCH_LIMIT: usize = 20;

/// Regular-queue size when the caller doesn't ask for one.
pub const DEFAULT_QUEUE_LIMIT: usize = 50;

/// Merge due callbacks ahead of the regular queue, dropping any lead that
/// already appeared as a callback.
pub fn merge(callbacks: Vec<Lead>, queued: Vec<Lead>) -> Vec<Lead> {
  let mut seen: HashSet<Uuid> = HashSet::with_capacity(callbacks.len() + queued.len());
  let mut merged = Vec::with_capacity(callbacks.len() + queued.len());

  for lead in callbacks.into_iter().chain(queued) {
    if seen.insert(lead.lead_id) {
      merged.push(lead);
    }
  }

  merged
}

// ─── Display metadata ────────────────────────────────────────────────────────

/// Remaining-callable counts per region. Computed across the whole store,
/// independent of any target-region filter — it is display data, not the
/// queue itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegionBreakdown {
  pub eastern:  u64,
  pub central:  u64,
  pub mountain: u64,
  pub pacific:  u64,
}

impl RegionBreakdown {
  pub fn get(&self, region: Region) -> u64 {
    match region {
      Region::Eastern => self.eastern,
      Region::Central => self.central,
      Region::Mountain => self.mountain,
      Region::Pacific => self.pacific,
    }
  }

  pub fn set(&mut self, region: Region, count: u64) {
    match region {
      Region::Eastern => self.eastern = count,
      Region::Central => self.central = count,
      Region::Mountain => self.mountain = count,
      Region::Pacific => self.pacific = count,
    }
  }
}

/// Everything the dial floor needs to render "what now".
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
  /// Merged call order: due callbacks first, then the regular queue.
  pub leads:           Vec<Lead>,
  /// The due callbacks, repeated for UI emphasis.
  pub callbacks_due:   Vec<Lead>,
  /// The region the schedule (or the override) resolved to, if any.
  pub current_region:  Option<Region>,
  /// Dials already recorded today.
  pub completed_today: u64,
  /// Leads still callable today across all regions.
  pub remaining_today: u64,
  pub breakdown:       RegionBreakdown,
  /// Suggested caller ID; `None` means dial unmanaged.
  pub selected_number: Option<PoolEntry>,
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::lead::LeadStatus;

  fn lead(n: u32) -> Lead {
    Lead {
      lead_id:        Uuid::new_v4(),
      business_name:  format!("Business {n}"),
      contact_name:   None,
      phone:          format!("+1212555{n:04}"),
      website:        None,
      state:          None,
      region:         None,
      status:         LeadStatus::Queued,
      attempt_count:  0,
      max_attempts:   5,
      next_call_at:   None,
      last_called_at: None,
      last_outcome:   None,
      demo_booked:    false,
      demo_date:      None,
      not_interested: false,
      wrong_number:   false,
      notes:          String::new(),
      created_at:     Utc::now(),
    }
  }

  #[test]
  fn callbacks_come_first() {
    let cb = lead(1);
    let q = lead(2);
    let merged = merge(vec![cb.clone()], vec![q.clone()]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].lead_id, cb.lead_id);
    assert_eq!(merged[1].lead_id, q.lead_id);
  }

  #[test]
  fn duplicate_leads_are_dropped_from_the_regular_queue() {
    let cb = lead(1);
    let merged = merge(vec![cb.clone()], vec![cb.clone(), lead(2)]);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].lead_id, cb.lead_id);
  }

  #[test]
  fn empty_inputs_merge_to_empty() {
    assert!(merge(vec![], vec![]).is_empty());
  }

  #[test]
  fn breakdown_get_set_round_trip() {
    let mut b = RegionBreakdown::default();
    for (i, region) in Region::ALL.into_iter().enumerate() {
      b.set(region, i as u64 + 1);
    }
    assert_eq!(b.get(Region::Eastern), 1);
    assert_eq!(b.get(Region::Pacific), 4);
  }
}
