//! Outcome — the closed-set result of a single call attempt.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What happened on one dial, as recorded by the human caller.
///
/// The string forms (serde and strum agree on `snake_case`) are the wire and
/// database vocabulary; anything outside this set is rejected before a
/// disposition is recorded.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
  NoAnswer,
  Voicemail,
  /// Reached a receptionist or assistant, not the decision maker.
  Gatekeeper,
  Conversation,
  DemoBooked,
  NotInterested,
  WrongNumber,
  /// The prospect asked to be called back at a specific time.
  Callback,
}

impl Outcome {
  /// Did the dial reach a human who engaged at all? Feeds the daily
  /// `contacts` counter.
  pub fn contact_made(self) -> bool {
    matches!(
      self,
      Self::Conversation | Self::DemoBooked | Self::Callback | Self::NotInterested
    )
  }

  /// Did an actual pitch conversation happen? Feeds `conversations`.
  pub fn is_conversation(self) -> bool {
    matches!(self, Self::Conversation | Self::DemoBooked)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn string_round_trip() {
    for (s, o) in [
      ("no_answer", Outcome::NoAnswer),
      ("voicemail", Outcome::Voicemail),
      ("gatekeeper", Outcome::Gatekeeper),
      ("conversation", Outcome::Conversation),
      ("demo_booked", Outcome::DemoBooked),
      ("not_interested", Outcome::NotInterested),
      ("wrong_number", Outcome::WrongNumber),
      ("callback", Outcome::Callback),
    ] {
      assert_eq!(s.parse::<Outcome>().unwrap(), o);
      assert_eq!(o.to_string(), s);
    }
  }

  #[test]
  fn out_of_vocabulary_is_rejected() {
    assert!("hung_up".parse::<Outcome>().is_err());
    assert!("".parse::<Outcome>().is_err());
  }

  #[test]
  fn contact_classification() {
    assert!(Outcome::Conversation.contact_made());
    assert!(Outcome::DemoBooked.contact_made());
    assert!(Outcome::Callback.contact_made());
    assert!(Outcome::NotInterested.contact_made());
    assert!(!Outcome::NoAnswer.contact_made());
    assert!(!Outcome::Voicemail.contact_made());
    assert!(!Outcome::Gatekeeper.contact_made());
    assert!(!Outcome::WrongNumber.contact_made());
  }

  #[test]
  fn conversation_classification() {
    assert!(Outcome::Conversation.is_conversation());
    assert!(Outcome::DemoBooked.is_conversation());
    assert!(!Outcome::Callback.is_conversation());
    assert!(!Outcome::NotInterested.is_conversation());
  }
}
