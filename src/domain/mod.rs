//! Domain layer: participant identity, waiting registry, candidate
//! selection, match records, and the event system.

pub mod event_bus;
pub mod match_event;
pub mod match_result;
pub mod notification;
pub mod participant;
pub mod participant_id;
pub mod registry;
pub mod room_id;
pub mod selector;
pub mod topic;

pub use event_bus::EventBus;
pub use match_event::MatchEvent;
pub use match_result::MatchResult;
pub use notification::{MatchNotification, WaitTimeoutNotice};
pub use participant::{Participant, ParticipantSink};
pub use participant_id::ParticipantId;
pub use registry::{ClaimOutcome, ClaimedPair, ParticipantRegistry};
pub use room_id::RoomId;
pub use selector::{MatchCandidate, MatchKind};
pub use topic::{Metatopic, Topic};
