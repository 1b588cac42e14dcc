//! Candidate selection over a snapshot of waiting participants.
//!
//! Everything here is pure: no locking, no removal. The registry calls
//! [`select_candidate`] while holding its lock so the decision and the claim
//! observe the same state.

use super::Participant;

/// How a candidate was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Shares at least one tag with the requester and has the highest score.
    Best,
    /// No waiting participant shares a tag; the earliest arrival was taken.
    Fallback,
}

/// A participant proposed for pairing with the requester.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    /// The proposed opponent.
    pub participant: Participant,
    /// Tag overlap with the requester.
    pub score: usize,
    /// Whether this is a scored match or the fallback.
    pub kind: MatchKind,
}

/// Counts pairs of equal tags across both lists.
///
/// Every `(x, y)` with `x == y` counts once, so a tag repeated in either list
/// inflates the score.
#[must_use]
pub fn match_score(a: &[String], b: &[String]) -> usize {
    a.iter()
        .map(|x| b.iter().filter(|y| *y == x).count())
        .sum()
}

/// Tags of `candidate` that also appear in `requester`, in the candidate's
/// order.
#[must_use]
pub fn shared_tags<'a>(requester: &[String], candidate: &'a [String]) -> Vec<&'a str> {
    candidate
        .iter()
        .filter(|tag| requester.contains(*tag))
        .map(String::as_str)
        .collect()
}

/// Picks the opponent for `requester` from `waiting`.
///
/// `waiting` must be in a deterministic order (the registry yields arrival
/// order). The requester itself is skipped if present.
///
/// The first participant with the strictly highest positive score wins.
/// Only when the whole scan finds no positive score is the first other
/// participant returned as a [`MatchKind::Fallback`].
pub fn select_candidate<'a, I>(requester: &Participant, waiting: I) -> Option<MatchCandidate>
where
    I: IntoIterator<Item = &'a Participant>,
{
    let mut best: Option<(&Participant, usize)> = None;
    let mut fallback: Option<&Participant> = None;

    for other in waiting {
        if other.id() == requester.id() {
            continue;
        }
        if fallback.is_none() {
            fallback = Some(other);
        }
        let score = match_score(requester.tags(), other.tags());
        let best_score = best.map_or(0, |(_, s)| s);
        if score > best_score {
            best = Some((other, score));
        }
    }

    match (best, fallback) {
        (Some((participant, score)), _) => Some(MatchCandidate {
            participant: participant.clone(),
            score,
            kind: MatchKind::Best,
        }),
        (None, Some(participant)) => Some(MatchCandidate {
            participant: participant.clone(),
            score: 0,
            kind: MatchKind::Fallback,
        }),
        (None, None) => None,
    }
}
