//! In-memory dragon collection with per-record ownership.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use lair_protocol::RecordDraft;
use time::OffsetDateTime;

use crate::dispatch::DispatchError;

/// A stored dragon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    id: i64,
    owner: String,
    name: String,
    age: u32,
    description: Option<String>,
    killer: Option<String>,
    created_at: OffsetDateTime,
}

impl Record {
    fn from_draft(id: i64, owner: &str, draft: RecordDraft) -> Self {
        Self {
            id,
            owner: owner.to_owned(),
            name: draft.name,
            age: draft.age,
            description: draft.description,
            killer: draft.killer,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub(crate) const fn id(&self) -> i64 {
        self.id
    }

    pub(crate) const fn age(&self) -> u32 {
        self.age
    }

    pub(crate) fn owner(&self) -> &str {
        &self.owner
    }

    /// Natural ordering of the collection: by age, then name.
    fn rank(&self) -> (u32, &str) {
        (self.age, &self.name)
    }

    fn outranks(&self, draft: &RecordDraft) -> bool {
        self.rank().cmp(&(draft.age, draft.name.as_str())) == Ordering::Greater
    }
}

impl fmt::Display for Record {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} {} ({})", self.id, self.name, self.age)?;
        if let Some(description) = &self.description {
            write!(formatter, ": {description}")?;
        }
        if let Some(killer) = &self.killer {
            write!(formatter, ", slain by {killer}")?;
        }
        write!(formatter, " [owner {}]", self.owner)
    }
}

/// Collection of records keyed by id.
#[derive(Debug)]
pub(crate) struct RecordStore {
    records: BTreeMap<i64, Record>,
    next_id: i64,
    created_at: OffsetDateTime,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

impl RecordStore {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn owned_by(&self, owner: &str) -> usize {
        self.records
            .values()
            .filter(|record| record.owner == owner)
            .count()
    }

    pub(crate) const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Records in ascending id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Records from the highest rank down.
    pub(crate) fn descending(&self) -> Vec<&Record> {
        let mut records: Vec<&Record> = self.records.values().collect();
        records.sort_by(|left, right| (right.rank(), right.id).cmp(&(left.rank(), left.id)));
        records
    }

    pub(crate) fn ages_descending(&self) -> Vec<u32> {
        let mut ages: Vec<u32> = self.records.values().map(Record::age).collect();
        ages.sort_unstable_by(|left, right| right.cmp(left));
        ages
    }

    /// Stores a new record owned by `owner` and returns its id.
    pub(crate) fn insert(&mut self, owner: &str, draft: RecordDraft) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.records.insert(id, Record::from_draft(id, owner, draft));
        id
    }

    /// Replaces the fields of an owned record, keeping its id and creation
    /// time.
    pub(crate) fn update(
        &mut self,
        owner: &str,
        id: i64,
        draft: RecordDraft,
    ) -> Result<(), DispatchError> {
        let record = self.owned_mut(owner, id)?;
        record.name = draft.name;
        record.age = draft.age;
        record.description = draft.description;
        record.killer = draft.killer;
        Ok(())
    }

    pub(crate) fn remove(&mut self, owner: &str, id: i64) -> Result<Record, DispatchError> {
        self.owned_mut(owner, id)?;
        self.records
            .remove(&id)
            .ok_or(DispatchError::NoSuchId { id })
    }

    /// Removes the record with the lowest id, provided `owner` owns it.
    pub(crate) fn remove_first(&mut self, owner: &str) -> Result<Option<Record>, DispatchError> {
        let Some(id) = self.records.keys().next().copied() else {
            return Ok(None);
        };
        self.remove(owner, id).map(Some)
    }

    /// Removes the lowest-id record of `owner` slain by `killer`.
    ///
    /// Fails with `NoSuchKiller` when no record at all names the killer, and
    /// with `NoRights` when every such record belongs to someone else.
    pub(crate) fn remove_any_by_killer(
        &mut self,
        owner: &str,
        killer: &str,
    ) -> Result<Record, DispatchError> {
        let mut slain = self
            .records
            .values()
            .filter(|record| record.killer.as_deref() == Some(killer));
        let Some(first) = slain.next() else {
            return Err(DispatchError::no_such_killer(killer));
        };
        let id = std::iter::once(first)
            .chain(slain)
            .find(|record| record.owner == owner)
            .map_or(first.id, Record::id);
        self.remove(owner, id)
    }

    /// Removes every record of `owner` that outranks the draft.
    pub(crate) fn remove_greater(&mut self, owner: &str, draft: &RecordDraft) -> usize {
        self.remove_where(|record| record.owner == owner && record.outranks(draft))
    }

    /// Removes every record of `owner`.
    pub(crate) fn clear(&mut self, owner: &str) -> usize {
        self.remove_where(|record| record.owner == owner)
    }

    fn remove_where(&mut self, doomed: impl Fn(&Record) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|_, record| !doomed(record));
        before - self.records.len()
    }

    fn owned_mut(&mut self, owner: &str, id: i64) -> Result<&mut Record, DispatchError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(DispatchError::NoSuchId { id })?;
        if record.owner != owner {
            return Err(DispatchError::NoRights { id });
        }
        Ok(record)
    }
}
