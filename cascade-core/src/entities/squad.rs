//! Capacity-bounded squads.
//!
//! Members keep insertion order, which doubles as the host tie-breaker.

use crate::entities::participant::Participant;
use crate::entities::region::Region;
use cascade_sdk::objects::UserId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub const SQUAD_CAPACITY: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Squad {
    members: SmallVec<[Participant; SQUAD_CAPACITY]>,
}

impl Squad {
    pub fn new(first: Participant) -> Self {
        let mut members = SmallVec::new();
        members.push(first);
        Self { members }
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= SQUAD_CAPACITY
    }

    pub fn open_slots(&self) -> usize {
        SQUAD_CAPACITY.saturating_sub(self.members.len())
    }

    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.members.iter().map(|m| m.region)
    }

    pub fn position(&self, id: &UserId) -> Option<usize> {
        self.members.iter().position(|m| &m.id == id)
    }

    pub fn member_mut(&mut self, index: usize) -> Option<&mut Participant> {
        self.members.get_mut(index)
    }

    pub(crate) fn push(&mut self, participant: Participant) {
        self.members.push(participant);
    }

    pub(crate) fn remove(&mut self, index: usize) -> Participant {
        self.members.remove(index)
    }
}

impl FromIterator<Participant> for Squad {
    fn from_iter<I: IntoIterator<Item = Participant>>(iter: I) -> Self {
        Self {
            members: iter.into_iter().collect(),
        }
    }
}
