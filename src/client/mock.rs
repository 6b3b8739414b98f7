//! In-memory [`Store`] for unit tests.
//!
//! Understands just enough of the expression language to exercise the
//! composers: `attribute_exists`/`attribute_not_exists` conditions, `SET`
//! assignments, an equality partition key condition and plain projections.
//! Filters are recorded but not evaluated.

use crate::client::{
    DeleteItemRequest, GetItemRequest, Item, Page, PutItemRequest, QueryRequest, ScanRequest,
    Store, StoreError, StoreErrorKind, UpdateItemRequest,
};

use async_trait::async_trait;
use aws_sdk_dynamodb::types;
use serde::{Serialize, Serializer, ser};
use std::{collections, sync};

/// A record whose serialization always fails.
#[derive(Debug)]
pub(crate) struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(ser::Error::custom("unserializable record"))
    }
}

/// A request received by the mock.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Request {
    Put(PutItemRequest),
    Get(GetItemRequest),
    Update(UpdateItemRequest),
    Delete(DeleteItemRequest),
    Query(QueryRequest, Option<Item>),
    Scan(ScanRequest, Option<Item>),
}

#[derive(Debug, Default)]
pub(crate) struct MockStore {
    failure: sync::Mutex<Option<StoreErrorKind>>,
    items: sync::Mutex<Vec<Item>>,
    key_names: Vec<String>,
    requests: sync::Mutex<Vec<Request>>,
}

impl MockStore {
    pub(crate) fn new(key_names: &[&str]) -> Self {
        Self {
            key_names: key_names.iter().map(ToString::to_string).collect(),
            ..Default::default()
        }
    }

    /// Stores an item directly, replacing any item with the same key.
    pub(crate) fn insert(&self, item: impl Serialize) {
        let item: Item = serde_dynamo::to_item(item).unwrap();
        self.upsert(item);
    }

    pub(crate) fn get(&self, key: &impl Serialize) -> Option<Item> {
        let key: Item = serde_dynamo::to_item(key).unwrap();
        let items = self.items.lock().unwrap();
        items.iter().find(|item| self.key_of(item) == key).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    /// Makes the next call fail with `kind`.
    pub(crate) fn fail_next(&self, kind: StoreErrorKind) {
        *self.failure.lock().unwrap() = Some(kind);
    }

    pub(crate) fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn receive(&self, request: Request) -> Result<(), StoreError> {
        self.requests.lock().unwrap().push(request);
        match self.failure.lock().unwrap().take() {
            Some(kind) => Err(StoreError::new(kind, "injected failure")),
            None => Ok(()),
        }
    }

    fn key_of(&self, item: &Item) -> Item {
        self.key_names
            .iter()
            .filter_map(|name| item.get(name).map(|value| (name.clone(), value.clone())))
            .collect()
    }

    fn upsert(&self, item: Item) {
        let key = self.key_of(&item);
        let mut items = self.items.lock().unwrap();
        match items.iter_mut().find(|existing| self.key_of(existing) == key) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    fn find(&self, key: &Item) -> Option<Item> {
        let items = self.items.lock().unwrap();
        items.iter().find(|item| &self.key_of(item) == key).cloned()
    }

    fn page(
        &self,
        candidates: Vec<Item>,
        request: &crate::read::common::MultipleReadInput,
        exclusive_start_key: Option<Item>,
    ) -> Page {
        let start = match exclusive_start_key {
            Some(start_key) => candidates
                .iter()
                .position(|item| self.key_of(item) == start_key)
                .map_or(candidates.len(), |position| position + 1),
            None => 0,
        };
        let remaining = &candidates[start..];
        let limit = request
            .limit
            .map_or(remaining.len(), |limit| usize::try_from(limit).unwrap());
        let taken: Vec<Item> = remaining.iter().take(limit).cloned().collect();
        let last_evaluated_key = match (taken.last(), remaining.len() > taken.len()) {
            (Some(last), true) => Some(self.key_of(last)),
            _ => None,
        };
        let count = i32::try_from(taken.len()).unwrap();
        let items = match request.select {
            Some(types::Select::Count) => None,
            _ => Some(
                taken
                    .into_iter()
                    .map(|item| {
                        project(
                            item,
                            request.projection_expression.as_deref(),
                            request.expression_attribute_names.as_ref(),
                        )
                    })
                    .collect(),
            ),
        };
        Page {
            items,
            count,
            last_evaluated_key,
        }
    }
}

fn resolve_name<'a>(
    name: &'a str,
    names: Option<&'a collections::HashMap<String, String>>,
) -> &'a str {
    let name = name.trim();
    match names.and_then(|names| names.get(name)) {
        Some(resolved) => resolved.as_str(),
        None => name,
    }
}

fn check(
    condition: Option<&str>,
    names: Option<&collections::HashMap<String, String>>,
    existing: Option<&Item>,
) -> Result<(), StoreError> {
    let Some((function, argument)) = condition.and_then(|condition| condition.split_once('('))
    else {
        return Ok(());
    };
    let attribute = resolve_name(argument.trim_end_matches(')'), names);
    let exists = existing.is_some_and(|item| item.contains_key(attribute));
    let holds = match function.trim() {
        "attribute_exists" => exists,
        "attribute_not_exists" => !exists,
        _ => true,
    };
    if holds {
        Ok(())
    } else {
        Err(StoreError::new(
            StoreErrorKind::ConditionalCheckFailed,
            "The conditional request failed",
        ))
    }
}

fn project(
    item: Item,
    projection: Option<&str>,
    names: Option<&collections::HashMap<String, String>>,
) -> Item {
    let Some(projection) = projection else {
        return item;
    };
    let attributes: Vec<&str> = projection
        .split(',')
        .map(|attribute| resolve_name(attribute, names))
        .collect();
    item.into_iter()
        .filter(|(name, _)| attributes.contains(&name.as_str()))
        .collect()
}

#[async_trait]
impl Store for MockStore {
    async fn put_item(&self, request: PutItemRequest) -> Result<(), StoreError> {
        self.receive(Request::Put(request.clone()))?;
        let existing = self.find(&self.key_of(&request.item));
        check(
            request.write_input.condition_expression.as_deref(),
            request.write_input.expression_attribute_names.as_ref(),
            existing.as_ref(),
        )?;
        self.upsert(request.item);
        Ok(())
    }

    async fn get_item(&self, request: GetItemRequest) -> Result<Option<Item>, StoreError> {
        self.receive(Request::Get(request.clone()))?;
        let item = self.find(&request.key).map(|item| {
            project(
                item,
                request.single_read_input.projection_expression.as_deref(),
                request.single_read_input.expression_attribute_names.as_ref(),
            )
        });
        Ok(item)
    }

    async fn update_item(&self, request: UpdateItemRequest) -> Result<(), StoreError> {
        self.receive(Request::Update(request.clone()))?;
        let write_input = &request.write_input;
        let existing = self.find(&request.key);
        check(
            write_input.condition_expression.as_deref(),
            write_input.expression_attribute_names.as_ref(),
            existing.as_ref(),
        )?;
        let mut item = existing.unwrap_or_else(|| request.key.clone());
        let assignments = request
            .update_expression
            .as_deref()
            .and_then(|update| update.trim().strip_prefix("SET "))
            .unwrap_or_default();
        for assignment in assignments.split(',').filter(|a| !a.trim().is_empty()) {
            let Some((name, placeholder)) = assignment.split_once('=') else {
                continue;
            };
            let name = resolve_name(name, write_input.expression_attribute_names.as_ref());
            let value = write_input
                .expression_attribute_values
                .as_ref()
                .and_then(|values| values.get(placeholder.trim()))
                .cloned()
                .ok_or_else(|| {
                    StoreError::new(StoreErrorKind::Validation, "undefined attribute value")
                })?;
            item.insert(name.to_string(), value);
        }
        self.upsert(item);
        Ok(())
    }

    async fn delete_item(&self, request: DeleteItemRequest) -> Result<(), StoreError> {
        self.receive(Request::Delete(request.clone()))?;
        let existing = self.find(&request.key);
        check(
            request.write_input.condition_expression.as_deref(),
            request.write_input.expression_attribute_names.as_ref(),
            existing.as_ref(),
        )?;
        let mut items = self.items.lock().unwrap();
        items.retain(|item| self.key_of(item) != request.key);
        Ok(())
    }

    async fn query_page(
        &self,
        request: &QueryRequest,
        exclusive_start_key: Option<Item>,
    ) -> Result<Page, StoreError> {
        self.receive(Request::Query(request.clone(), exclusive_start_key.clone()))?;
        let read_input = &request.multiple_read_input;
        let partition_condition = request
            .key_condition_expression
            .split(" AND ")
            .next()
            .and_then(|condition| condition.split_once('='));
        let Some((name, placeholder)) = partition_condition else {
            return Err(StoreError::new(
                StoreErrorKind::Validation,
                "unsupported key condition",
            ));
        };
        let name = resolve_name(name, read_input.expression_attribute_names.as_ref());
        let value = read_input
            .expression_attribute_values
            .as_ref()
            .and_then(|values| values.get(placeholder.trim()));
        let candidates: Vec<Item> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| item.get(name) == value)
            .cloned()
            .collect();
        Ok(self.page(candidates, read_input, exclusive_start_key))
    }

    async fn scan_page(
        &self,
        request: &ScanRequest,
        exclusive_start_key: Option<Item>,
    ) -> Result<Page, StoreError> {
        self.receive(Request::Scan(request.clone(), exclusive_start_key.clone()))?;
        let candidates = self.items.lock().unwrap().clone();
        Ok(self.page(
            candidates,
            &request.multiple_read_input,
            exclusive_start_key,
        ))
    }
}
