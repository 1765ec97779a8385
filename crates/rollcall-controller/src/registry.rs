//! Person registry: profiles plus the mutable location of each person.
//!
//! Every enrolled person always has exactly one [`Location`]; entries are
//! never removed. The registry is owned by the controller and only the zone
//! policy and gate machine paths call [`PersonRegistry::set_location`].

use std::collections::HashMap;

use rollcall_core::{Error as CoreError, Location, Person, PersonId};
use serde::Serialize;

use crate::error::{ControllerError, Result};

/// Occupancy counts per location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub unknown: usize,
    pub classroom: usize,
    pub hostel: usize,
    pub at_gate: usize,
    pub left: usize,
    pub sneaked: usize,
}

impl Counts {
    /// Sum over all locations; always equals the number of enrolled people.
    pub fn total(&self) -> usize {
        self.unknown + self.classroom + self.hostel + self.at_gate + self.left + self.sneaked
    }

    fn slot(&mut self, location: Location) -> &mut usize {
        match location {
            Location::Unknown => &mut self.unknown,
            Location::Classroom => &mut self.classroom,
            Location::Hostel => &mut self.hostel,
            Location::AtGate => &mut self.at_gate,
            Location::Left => &mut self.left,
            Location::Sneaked => &mut self.sneaked,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    person: Person,
    location: Location,
}

/// Enrolled people in enrollment order.
#[derive(Debug, Clone, Default)]
pub struct PersonRegistry {
    entries: Vec<Entry>,
    index: HashMap<PersonId, usize>,
    counts: Counts,
}

impl PersonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a person with location [`Location::Unknown`].
    ///
    /// # Errors
    /// Returns `DuplicatePerson` if the id is already enrolled.
    pub fn insert(&mut self, person: Person) -> Result<()> {
        if self.index.contains_key(&person.id) {
            return Err(CoreError::DuplicatePerson(person.id.0).into());
        }
        self.index.insert(person.id, self.entries.len());
        self.entries.push(Entry {
            person,
            location: Location::Unknown,
        });
        self.counts.unknown += 1;
        Ok(())
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.index.get(&id).map(|&i| &self.entries[i].person)
    }

    pub fn location(&self, id: PersonId) -> Option<Location> {
        self.index.get(&id).map(|&i| self.entries[i].location)
    }

    /// Display name of `id`, or an empty string for an unknown id.
    pub fn name(&self, id: PersonId) -> &str {
        self.get(id).map_or("", |p| p.name.as_str())
    }

    /// Move a person to `location` and return the previous one.
    ///
    /// # Errors
    /// Returns `ControllerError::UnknownPerson` if `id` is not enrolled.
    pub fn set_location(&mut self, id: PersonId, location: Location) -> Result<Location> {
        let &i = self
            .index
            .get(&id)
            .ok_or(ControllerError::UnknownPerson(id))?;
        let entry = &mut self.entries[i];
        let previous = std::mem::replace(&mut entry.location, location);

        *self.counts.slot(previous) -= 1;
        *self.counts.slot(location) += 1;
        Ok(previous)
    }

    /// Current occupancy counts.
    pub fn counts(&self) -> Counts {
        self.counts
    }

    /// Every person with their location, in enrollment order.
    pub fn iter(&self) -> impl Iterator<Item = (&Person, Location)> {
        self.entries.iter().map(|e| (&e.person, e.location))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
