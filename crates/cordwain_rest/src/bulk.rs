//! Bulk message deletion.
//!
//! Discord's bulk delete endpoint takes 2 to 100 message ids and refuses
//! messages older than two weeks. [`BulkDeletePlan`] splits an arbitrary set of
//! ids into bulk batches and single deletes; [`RestClient::delete_messages`]
//! sends them all concurrently and reports every failure.

use crate::client::RestClient;
use crate::endpoint::RestEndpoint;
use crate::request::RestRequest;
use crate::{RequestBody, RestMethod};
use chrono::{DateTime, Duration, Utc};
use cordwain_core::Snowflake;
use cordwain_error::{RestError, RestResult};
use futures::future::{BoxFuture, FutureExt, join_all};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Largest number of ids the bulk endpoint accepts.
pub const MAX_BULK_DELETE: usize = 100;

/// Age limit of the bulk endpoint, in days.
pub const BULK_DELETE_MAX_AGE_DAYS: i64 = 14;

/// How a set of message ids will be deleted.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use cordwain_core::Snowflake;
/// use cordwain_rest::BulkDeletePlan;
///
/// let now = Utc::now();
/// let young = Snowflake::from_datetime(now - Duration::days(1));
/// let old = Snowflake::from_datetime(now - Duration::days(30));
///
/// let plan = BulkDeletePlan::new([young, old, young], now);
/// assert!(plan.bulk_batches().is_empty());
/// assert_eq!(plan.single_deletes(), &[young, old]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_getters::Getters)]
pub struct BulkDeletePlan {
    /// Batches of 2 to 100 young ids for the bulk endpoint
    bulk_batches: Vec<Vec<Snowflake>>,
    /// Ids deleted one at a time: old ids and young batches of one
    single_deletes: Vec<Snowflake>,
}

impl BulkDeletePlan {
    /// Partition ids relative to `now`.
    ///
    /// Duplicates are dropped, keeping first-occurrence order. Ids created
    /// strictly after `now - 14 days` are young.
    pub fn new(ids: impl IntoIterator<Item = Snowflake>, now: DateTime<Utc>) -> Self {
        let cutoff = now - Duration::days(BULK_DELETE_MAX_AGE_DAYS);

        let mut seen = HashSet::new();
        let (young, old): (Vec<_>, Vec<_>) = ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .partition(|id| id.created_at() > cutoff);

        let mut plan = Self {
            bulk_batches: Vec::new(),
            single_deletes: Vec::new(),
        };
        for chunk in young.chunks(MAX_BULK_DELETE) {
            match chunk {
                [single] => plan.single_deletes.push(*single),
                batch => plan.bulk_batches.push(batch.to_vec()),
            }
        }
        plan.single_deletes.extend(old);
        plan
    }

    /// Number of requests the plan will issue.
    pub fn request_count(&self) -> usize {
        self.bulk_batches.len() + self.single_deletes.len()
    }

    /// Whether there is nothing to delete.
    pub fn is_empty(&self) -> bool {
        self.request_count() == 0
    }
}

impl RestClient {
    /// Delete many messages from one channel.
    ///
    /// Every request is issued concurrently. The call completes once all of
    /// them have; a single failure is returned as is, several are returned as
    /// one aggregate error holding all of them.
    #[instrument(skip(self, ids), fields(channel = %channel))]
    pub async fn delete_messages(
        &self,
        channel: Snowflake,
        ids: impl IntoIterator<Item = Snowflake>,
    ) -> RestResult<()> {
        let plan = BulkDeletePlan::new(ids, Utc::now());
        debug!(
            bulk = plan.bulk_batches().len(),
            single = plan.single_deletes().len(),
            "Planned message deletion"
        );

        let mut requests: Vec<BoxFuture<'_, RestResult<()>>> =
            Vec::with_capacity(plan.request_count());
        for batch in plan.bulk_batches() {
            requests.push(self.bulk_delete(channel, batch).boxed());
        }
        for id in plan.single_deletes() {
            requests.push(self.delete_message(channel, *id).boxed());
        }

        let failures: Vec<RestError> = join_all(requests)
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RestError::aggregate(failures))
        }
    }

    /// Delete many messages given as strings.
    ///
    /// Fails before sending anything if any id is not a valid snowflake.
    pub async fn delete_messages_str<I, S>(&self, channel: &str, ids: I) -> RestResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let channel = Snowflake::parse(channel)?;
        let ids = ids
            .into_iter()
            .map(|id| Snowflake::parse(id.as_ref()))
            .collect::<RestResult<Vec<_>>>()?;
        self.delete_messages(channel, ids).await
    }

    /// One call to the bulk endpoint.
    async fn bulk_delete(&self, channel: Snowflake, batch: &[Snowflake]) -> RestResult<()> {
        let body = RequestBody::json(&serde_json::json!({ "messages": batch }))?;
        let request = RestRequest::new(RestMethod::Post, RestEndpoint::MessagesBulkDelete)
            .url_params([channel])
            .body(body);
        self.execute(request).await
    }
}
